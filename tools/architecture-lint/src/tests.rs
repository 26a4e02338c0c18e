//! Unit tests for the architecture lint.

use std::path::PathBuf;

use rstest::fixture;
use rstest::rstest;

use super::*;

#[derive(Clone, Copy)]
struct LintSingle;

impl LintSingle {
    fn lint(self, file: &str, contents: &str) -> Result<(), ArchitectureLintError> {
        lint_sources(&[LintSource {
            file: PathBuf::from(file),
            contents: contents.to_owned(),
        }])
    }
}

#[fixture]
fn lint_single() -> LintSingle {
    LintSingle
}

#[rstest]
#[case::inbound_uses_domain(
    "inbound/cli/mod.rs",
    "use crate::domain::OrganizationId; fn run() { let _ = OrganizationId(5); }",
    true
)]
#[case::inbound_uses_outbound(
    "inbound/cli/mod.rs",
    "use crate::outbound::records::HttpOrganizationRecords; fn run() { let _ = HttpOrganizationRecords::new; }",
    false
)]
#[case::inbound_uses_outbound_by_crate_name(
    "inbound/cli/mod.rs",
    "use registry_client::outbound::postal::PrimaryPostalLookup; fn run() {}",
    false
)]
#[case::inbound_uses_http_client(
    "inbound/cli/output.rs",
    "fn run() { let _ = reqwest::Client::new(); }",
    false
)]
#[case::domain_uses_inbound(
    "domain/association.rs",
    "use crate::inbound::cli; fn thing() {}",
    false
)]
#[case::domain_uses_sibling(
    "domain/forms/organization.rs",
    "use super::super::ports::OrganizationRecords; use super::AddressCheck; fn thing() {}",
    true
)]
#[case::domain_uses_configuration(
    "domain/notices.rs",
    "use ortho_config::OrthoConfig; fn thing() {}",
    false
)]
#[case::domain_uses_async_runtime(
    "domain/query_pipeline/mod.rs",
    "use tokio::sync::watch; use tracing::debug; fn thing() {}",
    true
)]
#[case::outbound_uses_inbound(
    "outbound/records/transport.rs",
    "use crate::inbound::cli::Command; fn thing() {}",
    false
)]
#[case::outbound_uses_cli_parser(
    "outbound/postal/http_source.rs",
    "use clap::Parser; fn thing() {}",
    false
)]
#[case::outbound_uses_http_client(
    "outbound/postal/http_source.rs",
    "use reqwest::Client; use url::Url; fn thing(_: Client, _: Url) {}",
    true
)]
fn detects_boundary_violations(
    lint_single: LintSingle,
    #[case] file: &str,
    #[case] contents: &str,
    #[case] ok: bool,
) {
    let result = lint_single.lint(file, contents);
    assert_eq!(result.is_ok(), ok, "result: {result:?}");
}

#[rstest]
fn files_outside_the_layers_are_rejected(lint_single: LintSingle) {
    let result = lint_single.lint("main.rs", "fn main() {}");
    assert!(matches!(result, Err(ArchitectureLintError::Parse { .. })));
}

#[rstest]
fn each_crossing_is_reported_once_per_file(lint_single: LintSingle) {
    let result = lint_single.lint(
        "domain/postal.rs",
        "use reqwest::Client; fn a(_: reqwest::Client) {} fn b() { let _ = reqwest::get; }",
    );
    let Err(ArchitectureLintError::Violations(violations)) = result else {
        panic!("expected violations, got {result:?}");
    };
    assert_eq!(violations.len(), 1, "{violations:?}");
    assert!(violations[0].message.contains("external crate `reqwest`"));
}
