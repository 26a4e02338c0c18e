//! Organization create/edit form.

use std::sync::Arc;

use tracing::info;

use super::{AddressCheck, FormMode, gate_submission, stored_address};
use crate::domain::ports::OrganizationRecords;
use crate::domain::{
    AddressResolver, Error, NoticeQueue, Organization, OrganizationDraft, OrganizationId,
    PostalAddress,
};

/// Form state for creating or editing one organization.
pub struct OrganizationForm {
    resolver: AddressResolver,
    records: Arc<dyn OrganizationRecords>,
    notices: NoticeQueue,
    draft: OrganizationDraft,
    mode: FormMode<OrganizationId>,
    address: AddressCheck,
}

impl OrganizationForm {
    /// Empty form in create mode.
    pub fn new(
        resolver: AddressResolver,
        records: Arc<dyn OrganizationRecords>,
        notices: NoticeQueue,
    ) -> Self {
        Self {
            resolver,
            records,
            notices,
            draft: OrganizationDraft::default(),
            mode: FormMode::Create,
            address: AddressCheck::default(),
        }
    }

    /// Current draft.
    pub fn draft(&self) -> &OrganizationDraft {
        &self.draft
    }

    /// Create or edit.
    pub fn mode(&self) -> FormMode<OrganizationId> {
        self.mode
    }

    /// Postal code validation state.
    pub fn address(&self) -> &AddressCheck {
        &self.address
    }

    /// Set the CNPJ.
    pub fn set_tax_id(&mut self, tax_id: impl Into<String>) {
        self.draft.tax_id = tax_id.into();
    }

    /// Set the trade name.
    pub fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.draft.display_name = display_name.into();
    }

    /// Set the postal code; the address must be checked again.
    pub fn set_postal_code(&mut self, postal_code: impl Into<String>) {
        self.draft.postal_code = postal_code.into();
        self.address.invalidate();
    }

    /// Resolve the draft's postal code.
    pub async fn check_postal_code(&mut self) -> &PostalAddress {
        self.address
            .check(&self.resolver, &self.draft.postal_code)
            .await
    }

    /// Switch to edit mode for `id`, filling the draft from the service.
    ///
    /// # Errors
    ///
    /// Returns the mapped record-service error and posts an error notice
    /// when the organization cannot be loaded. The form is unchanged then.
    pub async fn load(&mut self, id: OrganizationId) -> Result<(), Error> {
        let organization = self.records.find(id).await.map_err(|error| {
            let error = error.to_domain("failed to load organization");
            self.notices.error(error.message());
            error
        })?;
        self.draft = OrganizationDraft::from_record(&organization);
        self.mode = FormMode::Edit(id);
        self.address.invalidate();
        if let Some(stored) = stored_address(organization.address, &organization.postal_code) {
            self.address.accept(stored);
        }
        Ok(())
    }

    /// Create or update the organization.
    ///
    /// # Errors
    ///
    /// Returns an invalid-request error without any network call when the
    /// postal code is unvalidated or a field rule fails, and the mapped
    /// record-service error when the call fails. The draft is kept.
    pub async fn submit(&mut self) -> Result<Organization, Error> {
        let postal_code = gate_submission(&self.notices, &self.address, self.draft.validate())?;
        let submission = OrganizationDraft {
            postal_code,
            ..self.draft.clone()
        };

        let (result, success) = match self.mode {
            FormMode::Create => (
                self.records.create(&submission).await,
                "organization created",
            ),
            FormMode::Edit(id) => (
                self.records.update(id, &submission).await,
                "organization updated",
            ),
        };
        let saved = result.map_err(|error| {
            let error = error.to_domain("failed to save organization");
            self.notices.error(error.message());
            error
        })?;

        info!(id = ?saved.id, "{success}");
        self.notices.success(success);
        if let Some(id) = saved.id {
            self.mode = FormMode::Edit(id);
        }
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    //! Submission gating and record-service outcomes.

    use super::*;
    use crate::domain::AddressParts;
    use crate::domain::ports::{
        MockOrganizationRecords, MockPostalLookupSource, RecordServiceError,
    };
    use rstest::rstest;

    fn resolver() -> AddressResolver {
        let mut primary = MockPostalLookupSource::new();
        primary.expect_lookup().returning(|_| {
            Ok(AddressParts {
                state_code: "SP".to_owned(),
                city: "São Paulo".to_owned(),
                neighborhood: "Bela Vista".to_owned(),
                street: "Av Paulista".to_owned(),
            })
        });
        let mut fallback = MockPostalLookupSource::new();
        fallback.expect_lookup().never();
        AddressResolver::new(Arc::new(primary), Arc::new(fallback))
    }

    fn saved(id: u64, draft: &OrganizationDraft) -> Organization {
        Organization {
            id: Some(OrganizationId(id)),
            tax_id: draft.tax_id.clone(),
            display_name: draft.display_name.clone(),
            postal_code: draft.postal_code.clone(),
            address: None,
            counterparties: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    fn filled(records: MockOrganizationRecords, notices: &NoticeQueue) -> OrganizationForm {
        let mut form = OrganizationForm::new(resolver(), Arc::new(records), notices.clone());
        form.set_tax_id("11222333000181");
        form.set_display_name("Acme");
        form.set_postal_code("01310-100");
        form
    }

    fn texts(notices: &NoticeQueue) -> Vec<String> {
        notices.snapshot().into_iter().map(|notice| notice.text).collect()
    }

    #[tokio::test]
    async fn refuses_to_submit_unvalidated_address() {
        let notices = NoticeQueue::default();
        let mut records = MockOrganizationRecords::new();
        records.expect_create().never();
        let mut form = filled(records, &notices);

        let error = form.submit().await.expect_err("address not validated");

        assert_eq!(error.message(), "validate the postal code before saving");
        assert_eq!(texts(&notices), ["validate the postal code before saving"]);
    }

    #[tokio::test]
    async fn editing_postal_code_clears_validation() {
        let notices = NoticeQueue::default();
        let mut form = filled(MockOrganizationRecords::new(), &notices);
        assert!(form.check_postal_code().await.is_valid());
        assert!(form.address().is_validated());

        form.set_postal_code("80010-000");

        assert!(!form.address().is_validated());
    }

    #[rstest]
    #[case::short_cnpj("1122233300018", "Acme", "CNPJ must contain 14 digits")]
    #[case::blank_name("11222333000181", " ", "trade name is required")]
    #[tokio::test]
    async fn field_rules_block_the_network(
        #[case] tax_id: &str,
        #[case] display_name: &str,
        #[case] message: &str,
    ) {
        let notices = NoticeQueue::default();
        let mut records = MockOrganizationRecords::new();
        records.expect_create().never();
        let mut form = filled(records, &notices);
        form.check_postal_code().await;
        form.set_tax_id(tax_id);
        form.set_display_name(display_name);

        let error = form.submit().await.expect_err("rule violated");

        assert_eq!(error.message(), message);
        assert_eq!(texts(&notices), [message]);
    }

    #[tokio::test]
    async fn creates_with_normalized_postal_code() {
        let notices = NoticeQueue::default();
        let mut records = MockOrganizationRecords::new();
        records
            .expect_create()
            .withf(|draft| draft.postal_code == "01310100")
            .times(1)
            .returning(|draft| Ok(saved(12, draft)));
        let mut form = filled(records, &notices);
        form.check_postal_code().await;

        let organization = form.submit().await.expect("created");

        assert_eq!(organization.id, Some(OrganizationId(12)));
        assert_eq!(form.mode(), FormMode::Edit(OrganizationId(12)));
        assert_eq!(texts(&notices), ["organization created"]);
    }

    #[tokio::test]
    async fn failed_update_keeps_the_draft() {
        let notices = NoticeQueue::default();
        let mut records = MockOrganizationRecords::new();
        records.expect_find().returning(|id| {
            let mut organization = saved(id.0, &OrganizationDraft {
                tax_id: "11222333000181".to_owned(),
                display_name: "Acme".to_owned(),
                postal_code: "01310100".to_owned(),
            });
            organization.address = Some(AddressParts {
                state_code: "SP".to_owned(),
                ..AddressParts::default()
            });
            Ok(organization)
        });
        records
            .expect_update()
            .returning(|_, _| Err(RecordServiceError::conflict("CNPJ já cadastrado")));
        let mut form = OrganizationForm::new(resolver(), Arc::new(records), notices.clone());
        form.load(OrganizationId(4)).await.expect("loaded");
        assert!(form.address().is_validated());
        form.set_display_name("Acme Renamed");

        let error = form.submit().await.expect_err("conflict");

        assert_eq!(error.message(), "CNPJ já cadastrado");
        assert_eq!(form.draft().display_name, "Acme Renamed");
        assert_eq!(texts(&notices), ["CNPJ já cadastrado"]);
    }
}
