//! Command-line adapter over the client context.
//!
//! Every command prints one JSON report holding its result (or error) and the
//! notices it posted, so scripted callers see the same feedback a screen
//! would show.

mod output;

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use thiserror::Error as ThisError;
use tracing::info;

use self::output::{
    AddressView, AssociationView, CommandReport, CounterpartyView, DeletedView, OrganizationView,
};
use crate::context::ClientContext;
use crate::domain::{
    CounterpartyFilter, CounterpartyId, Error, OrganizationId, PersonType, QueryPipelineHandle,
};
use pagination::Page;

/// `registry-client` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "registry-client",
    about = "Manage organizations, counterparties and their associations",
    version
)]
pub struct Cli {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported operations.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Resolve a postal code into an address.
    Resolve {
        /// Postal code, with or without punctuation.
        postal_code: String,
    },
    /// List organizations matching a search term.
    Organizations {
        /// Free-text search; empty lists everything.
        #[arg(long, default_value = "")]
        search: String,
        /// Zero-based page index.
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    /// List counterparties matching name and tax id fragments.
    Counterparties {
        /// Name fragment.
        #[arg(long, default_value = "")]
        name: String,
        /// CPF or CNPJ fragment.
        #[arg(long = "tax-id", default_value = "")]
        tax_id: String,
        /// Zero-based page index.
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    /// Show an organization and the counterparties that can be linked to it.
    Open {
        /// Organization id.
        organization: u64,
    },
    /// Link a counterparty to an organization.
    Link {
        /// Organization id.
        organization: u64,
        /// Counterparty id.
        counterparty: u64,
    },
    /// Remove the link between a counterparty and an organization.
    Unlink {
        /// Organization id.
        organization: u64,
        /// Counterparty id.
        counterparty: u64,
    },
    /// Create an organization, or edit one when `--id` is given.
    SaveOrganization(OrganizationFields),
    /// Create a counterparty, or edit one when `--id` is given.
    SaveCounterparty(CounterpartyFields),
    /// Delete an organization.
    DeleteOrganization {
        /// Organization id.
        id: u64,
    },
    /// Delete a counterparty.
    DeleteCounterparty {
        /// Counterparty id.
        id: u64,
    },
}

/// Organization form input. Omitted fields keep their loaded value.
#[derive(Debug, Clone, Default, Args)]
pub struct OrganizationFields {
    /// Existing organization to edit.
    #[arg(long)]
    pub id: Option<u64>,
    /// CNPJ.
    #[arg(long = "tax-id")]
    pub tax_id: Option<String>,
    /// Trade name.
    #[arg(long)]
    pub name: Option<String>,
    /// Postal code; resolved before saving.
    #[arg(long = "postal-code")]
    pub postal_code: Option<String>,
}

/// Counterparty form input. Omitted fields keep their loaded value.
#[derive(Debug, Clone, Default, Args)]
pub struct CounterpartyFields {
    /// Existing counterparty to edit.
    #[arg(long)]
    pub id: Option<u64>,
    /// Individual or legal entity.
    #[arg(long = "person-type", value_enum)]
    pub person_type: Option<PersonKind>,
    /// CPF or CNPJ.
    #[arg(long = "tax-id")]
    pub tax_id: Option<String>,
    /// Name.
    #[arg(long)]
    pub name: Option<String>,
    /// Contact e-mail.
    #[arg(long)]
    pub email: Option<String>,
    /// Postal code; resolved before saving.
    #[arg(long = "postal-code")]
    pub postal_code: Option<String>,
    /// RG, individuals only.
    #[arg(long = "national-id")]
    pub national_id: Option<String>,
    /// Birth date as `YYYY-MM-DD`, individuals only.
    #[arg(long = "birth-date")]
    pub birth_date: Option<NaiveDate>,
}

/// Person type accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PersonKind {
    /// Natural person with a CPF.
    Individual,
    /// Legal entity with a CNPJ.
    LegalEntity,
}

impl From<PersonKind> for PersonType {
    fn from(value: PersonKind) -> Self {
        match value {
            PersonKind::Individual => Self::Individual,
            PersonKind::LegalEntity => Self::LegalEntity,
        }
    }
}

/// Failure of a command run.
#[derive(Debug, ThisError)]
pub enum CliError {
    /// The operation itself failed; its report was already printed.
    #[error("{0}")]
    Command(Error),
    /// The report could not be encoded.
    #[error("failed to encode command report: {0}")]
    Encode(#[from] serde_json::Error),
    /// The report could not be written.
    #[error("failed to write command report: {0}")]
    Write(#[from] io::Error),
}

/// Run `command` against `context`, printing the JSON report to `out`.
///
/// # Errors
///
/// Returns [`CliError::Command`] after printing the report when the operation
/// failed, and the encode or write error when printing failed.
pub async fn run<W: Write>(
    command: Command,
    context: &ClientContext,
    out: W,
) -> Result<(), CliError> {
    info!(?command, "running command");
    match command {
        Command::Resolve { postal_code } => {
            let address = context.resolver().resolve(&postal_code).await;
            report(out, context, Ok(AddressView::from(&address)))
        }
        Command::Organizations { search, page } => {
            let listing = context.organization_listing(search);
            let outcome = list_page(&listing, page)
                .await
                .map(|rows| rows.map(OrganizationView::from));
            report(out, context, outcome)
        }
        Command::Counterparties {
            name,
            tax_id,
            page,
        } => {
            let listing = context.counterparty_listing(CounterpartyFilter { name, tax_id });
            let outcome = list_page(&listing, page)
                .await
                .map(|rows| rows.map(CounterpartyView::from));
            report(out, context, outcome)
        }
        Command::Open { organization } => {
            let manager = context.association_manager(Arc::new(context.organization_listing("")));
            let outcome = manager
                .open(OrganizationId(organization))
                .await
                .map(AssociationView::from);
            report(out, context, outcome)
        }
        Command::Link {
            organization,
            counterparty,
        } => {
            let outcome = change_link(context, organization, counterparty, Change::Link).await;
            report(out, context, outcome)
        }
        Command::Unlink {
            organization,
            counterparty,
        } => {
            let outcome = change_link(context, organization, counterparty, Change::Unlink).await;
            report(out, context, outcome)
        }
        Command::SaveOrganization(fields) => {
            let outcome = save_organization(context, fields).await;
            report(out, context, outcome)
        }
        Command::SaveCounterparty(fields) => {
            let outcome = save_counterparty(context, fields).await;
            report(out, context, outcome)
        }
        Command::DeleteOrganization { id } => {
            let removal = context.organization_removal(Arc::new(context.organization_listing("")));
            let outcome = removal
                .delete(OrganizationId(id))
                .await
                .map(|()| DeletedView::new(id));
            report(out, context, outcome)
        }
        Command::DeleteCounterparty { id } => {
            let listing = context.counterparty_listing(CounterpartyFilter::unfiltered());
            let removal = context.counterparty_removal(Arc::new(listing));
            let outcome = removal
                .delete(CounterpartyId(id))
                .await
                .map(|()| DeletedView::new(id));
            report(out, context, outcome)
        }
    }
}

async fn save_organization(
    context: &ClientContext,
    fields: OrganizationFields,
) -> Result<OrganizationView, Error> {
    let mut form = context.organization_form();
    if let Some(id) = fields.id {
        form.load(OrganizationId(id)).await?;
    }
    if let Some(tax_id) = fields.tax_id {
        form.set_tax_id(tax_id);
    }
    if let Some(name) = fields.name {
        form.set_display_name(name);
    }
    if let Some(postal_code) = fields.postal_code {
        form.set_postal_code(postal_code);
    }
    if !form.address().is_validated() {
        form.check_postal_code().await;
    }
    form.submit().await.map(OrganizationView::from)
}

async fn save_counterparty(
    context: &ClientContext,
    fields: CounterpartyFields,
) -> Result<CounterpartyView, Error> {
    let mut form = context.counterparty_form();
    if let Some(id) = fields.id {
        form.load(CounterpartyId(id)).await?;
    }
    // Switching type clears the tax id, so it goes before the other fields.
    if let Some(kind) = fields.person_type {
        let person_type = PersonType::from(kind);
        if form.draft().person_type != person_type {
            form.set_person_type(person_type);
        }
    }
    if let Some(tax_id) = fields.tax_id {
        form.set_tax_id(tax_id);
    }
    if let Some(name) = fields.name {
        form.set_name(name);
    }
    if let Some(email) = fields.email {
        form.set_email(email);
    }
    if let Some(national_id) = fields.national_id {
        form.set_national_id(national_id);
    }
    if let Some(birth_date) = fields.birth_date {
        form.set_birth_date(birth_date);
    }
    if let Some(postal_code) = fields.postal_code {
        form.set_postal_code(postal_code);
    }
    if !form.address().is_validated() {
        form.check_postal_code().await;
    }
    form.submit().await.map(CounterpartyView::from)
}

#[derive(Debug, Clone, Copy)]
enum Change {
    Link,
    Unlink,
}

async fn change_link(
    context: &ClientContext,
    organization: u64,
    counterparty: u64,
    change: Change,
) -> Result<AssociationView, Error> {
    let organization = OrganizationId(organization);
    let counterparty = CounterpartyId(counterparty);
    let manager = context.association_manager(Arc::new(context.organization_listing("")));
    manager.open(organization).await?;
    match change {
        Change::Link => manager.link(organization, counterparty).await?,
        Change::Unlink => manager.unlink(organization, counterparty).await?,
    };
    manager
        .snapshot()
        .map(AssociationView::from)
        .ok_or_else(|| Error::internal("association closed while changing it"))
}

/// Page shown once the pipeline settles, or the failure of the last query.
async fn list_page<Q, T>(listing: &QueryPipelineHandle<Q, T>, page: u32) -> Result<Page<T>, Error>
where
    Q: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    if page > 0 {
        listing.go_to_page(page)?;
    }
    let view = listing.settled().await?;
    if let Some(failure) = view.last_failure {
        return Err(failure);
    }
    view.page
        .map(Arc::unwrap_or_clone)
        .ok_or_else(|| Error::internal("listing settled without a page"))
}

fn report<T: Serialize, W: Write>(
    mut out: W,
    context: &ClientContext,
    outcome: Result<T, Error>,
) -> Result<(), CliError> {
    let failure = outcome.as_ref().err().cloned();
    let report = CommandReport::new(outcome, context.notices().snapshot());
    serde_json::to_writer_pretty(&mut out, &report)?;
    writeln!(out)?;
    match failure {
        Some(error) => Err(CliError::Command(error)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    //! Argument parsing and report printing.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::resolve(&["registry-client", "resolve", "01310-100"])]
    #[case::organizations(&["registry-client", "organizations", "--search", "acme", "--page", "2"])]
    #[case::counterparties(&["registry-client", "counterparties", "--tax-id", "123"])]
    #[case::link(&["registry-client", "link", "5", "9"])]
    #[case::delete_organization(&["registry-client", "delete-organization", "5"])]
    #[case::delete_counterparty(&["registry-client", "delete-counterparty", "9"])]
    #[case::create_organization(&[
        "registry-client", "save-organization", "--tax-id", "11222333000181",
        "--name", "Acme", "--postal-code", "01310-100",
    ])]
    fn parses_supported_commands(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_ok(), "{args:?}");
    }

    #[test]
    fn link_requires_both_ids() {
        assert!(Cli::try_parse_from(["registry-client", "link", "5"]).is_err());
    }

    #[test]
    fn delete_requires_an_id() {
        assert!(Cli::try_parse_from(["registry-client", "delete-organization"]).is_err());
    }

    #[test]
    fn counterparty_fields_parse_type_and_birth_date() {
        let cli = Cli::try_parse_from([
            "registry-client",
            "save-counterparty",
            "--id",
            "9",
            "--person-type",
            "individual",
            "--birth-date",
            "1990-04-12",
        ])
        .expect("parses");
        let Command::SaveCounterparty(fields) = cli.command else {
            panic!("expected save-counterparty");
        };
        assert_eq!(fields.id, Some(9));
        assert_eq!(fields.person_type, Some(PersonKind::Individual));
        assert_eq!(fields.birth_date, NaiveDate::from_ymd_opt(1990, 4, 12));
        assert!(fields.tax_id.is_none());
    }

    #[test]
    fn unknown_person_type_is_rejected() {
        let args = ["registry-client", "save-counterparty", "--person-type", "robot"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn organizations_defaults_to_the_first_page() {
        let cli = Cli::try_parse_from(["registry-client", "organizations"]).expect("parses");
        let Command::Organizations { search, page } = cli.command else {
            panic!("expected organizations");
        };
        assert!(search.is_empty());
        assert_eq!(page, 0);
    }
}
