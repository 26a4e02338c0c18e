//! Behaviour tests for the architecture guardrails.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use architecture_lint::{ArchitectureLintError, LintSource, Violation};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

#[derive(Debug, Default)]
struct LintWorld {
    sources: Vec<LintSource>,
    result: Option<Result<(), ArchitectureLintError>>,
}

#[fixture]
fn world() -> Mutex<LintWorld> {
    Mutex::new(LintWorld::default())
}

fn add_source(world: &Mutex<LintWorld>, file: &str, contents: &str) {
    let mut world = world.lock().expect("world lock");
    world.sources.push(LintSource {
        file: PathBuf::from(file),
        contents: contents.to_owned(),
    });
}

const INBOUND_USES_OUTBOUND: &str = "use registry_client::outbound::records::HttpOrganizationRecords; \
     fn run() { let _ = HttpOrganizationRecords::new; }";
const DOMAIN_USES_REQWEST: &str =
    "use reqwest::Client; pub struct Lookup { client: Client }";

#[given("an inbound module that imports the outbound layer")]
fn inbound_imports_outbound(world: &Mutex<LintWorld>) {
    add_source(world, "inbound/cli/mod.rs", INBOUND_USES_OUTBOUND);
}

#[given("an outbound module that imports the inbound layer")]
fn outbound_imports_inbound(world: &Mutex<LintWorld>) {
    add_source(
        world,
        "outbound/records/transport.rs",
        "use crate::inbound::cli::Command; fn describe(_: &Command) {}",
    );
}

#[given("a domain module that imports reqwest")]
fn domain_imports_reqwest(world: &Mutex<LintWorld>) {
    add_source(world, "domain/address_resolver.rs", DOMAIN_USES_REQWEST);
}

#[given("valid domain, inbound, and outbound modules")]
fn valid_modules(world: &Mutex<LintWorld>) {
    add_valid_modules(world);
}

#[given("valid modules mixed with multiple boundary violations")]
fn valid_modules_with_multiple_violations(world: &Mutex<LintWorld>) {
    add_valid_modules(world);
    add_source(world, "inbound/cli/bad_cross_boundary.rs", INBOUND_USES_OUTBOUND);
    add_source(world, "domain/bad.rs", DOMAIN_USES_REQWEST);
}

fn add_valid_modules(world: &Mutex<LintWorld>) {
    add_source(
        world,
        "domain/organization.rs",
        "#[derive(Clone, Copy)] pub struct OrganizationId(pub u64);",
    );
    add_source(
        world,
        "inbound/cli/mod.rs",
        "use crate::domain::organization::OrganizationId; fn run() { let _id = OrganizationId(5); }",
    );
    add_source(
        world,
        "outbound/records/http_organizations.rs",
        "use crate::domain::organization::OrganizationId; use reqwest::Client; \
         pub struct Records { client: Client } \
         impl Records { pub fn find(&self, _id: OrganizationId) {} }",
    );
}

#[when("the architecture lint runs")]
fn run_architecture_lint(world: &Mutex<LintWorld>) {
    let sources = {
        let world = world.lock().expect("world lock");
        world.sources.clone()
    };

    let temp_dir = TempDir::new().expect("tempdir");
    let client_dir = temp_dir.path().join("client");
    let src_dir = client_dir.join("src");
    for source in &sources {
        let path = src_dir.join(&source.file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directories");
        }
        fs::write(&path, &source.contents).expect("write source file");
    }
    fs::write(src_dir.join("main.rs"), "fn main() {}").expect("write binary root");

    let result = architecture_lint::lint_client_sources(&client_dir);
    let mut world = world.lock().expect("world lock");
    world.result = Some(result);
}

#[then("the lint succeeds")]
fn lint_succeeds(world: &Mutex<LintWorld>) {
    let world = world.lock().expect("world lock");
    let outcome = world.result.as_ref().expect("lint must have run");
    assert!(outcome.is_ok(), "expected success, got: {outcome:?}");
}

fn assert_violation_in_file_contains(
    world: &Mutex<LintWorld>,
    expected_file: &str,
    expected_substring: &str,
) {
    let expected_file = PathBuf::from(expected_file);
    let violations = violations(world);
    assert!(
        violations.iter().any(|violation| {
            violation.file == expected_file && violation.message.contains(expected_substring)
        }),
        "expected violation in '{expected_file:?}' containing '{expected_substring}', got: {violations:?}"
    );
}

fn violations(world: &Mutex<LintWorld>) -> Vec<Violation> {
    let world = world.lock().expect("world lock");
    let outcome = world.result.as_ref().expect("lint must have run");
    match outcome {
        Ok(()) => panic!("expected violations, the lint passed"),
        Err(ArchitectureLintError::Violations(violations)) => violations.clone(),
        Err(other) => panic!("expected violations error, got: {other:?}"),
    }
}

#[then("the lint fails due to outbound access from inbound")]
fn lint_fails_due_to_outbound_access(world: &Mutex<LintWorld>) {
    assert_violation_in_file_contains(world, "inbound/cli/mod.rs", "crate::outbound");
}

#[then("the lint fails due to inbound access from outbound")]
fn lint_fails_due_to_inbound_access(world: &Mutex<LintWorld>) {
    assert_violation_in_file_contains(world, "outbound/records/transport.rs", "crate::inbound");
}

#[then("the lint fails due to HTTP client usage in the domain")]
fn lint_fails_due_to_http_client(world: &Mutex<LintWorld>) {
    assert_violation_in_file_contains(
        world,
        "domain/address_resolver.rs",
        "external crate `reqwest`",
    );
}

#[then("the lint fails")]
fn lint_fails(world: &Mutex<LintWorld>) {
    let world = world.lock().expect("world lock");
    let outcome = world.result.as_ref().expect("lint must have run");
    assert!(outcome.is_err(), "expected failure, got: {outcome:?}");
}

#[then("all boundary violations are reported")]
fn all_boundary_violations_are_reported(world: &Mutex<LintWorld>) {
    let violations = violations(world);
    assert_eq!(violations.len(), 2, "got: {violations:?}");
    assert_violation_in_file_contains(world, "inbound/cli/bad_cross_boundary.rs", "crate::outbound");
    assert_violation_in_file_contains(world, "domain/bad.rs", "external crate `reqwest`");
}

#[scenario(
    path = "tests/features/architecture_guardrails.feature",
    name = "Clean layers pass the lint"
)]
fn clean_layers(world: Mutex<LintWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/architecture_guardrails.feature",
    name = "The command surface reaches for an HTTP adapter"
)]
fn inbound_reaches_outbound(world: Mutex<LintWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/architecture_guardrails.feature",
    name = "A record adapter reaches for the command surface"
)]
fn outbound_reaches_inbound(world: Mutex<LintWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/architecture_guardrails.feature",
    name = "The domain talks HTTP directly"
)]
fn domain_talks_http(world: Mutex<LintWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/architecture_guardrails.feature",
    name = "Every crossing is reported"
)]
fn every_crossing_reported(world: Mutex<LintWorld>) {
    drop(world);
}
