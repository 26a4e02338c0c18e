//! Counterparty create/edit form.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use super::{AddressCheck, FormMode, gate_submission, stored_address};
use crate::domain::ports::CounterpartyRecords;
use crate::domain::{
    AddressResolver, Counterparty, CounterpartyDraft, CounterpartyId, Error, NoticeQueue,
    PersonType, PostalAddress,
};

/// Form state for creating or editing one counterparty.
pub struct CounterpartyForm {
    resolver: AddressResolver,
    records: Arc<dyn CounterpartyRecords>,
    notices: NoticeQueue,
    draft: CounterpartyDraft,
    mode: FormMode<CounterpartyId>,
    address: AddressCheck,
}

impl CounterpartyForm {
    /// Empty form in create mode, defaulting to a legal entity.
    pub fn new(
        resolver: AddressResolver,
        records: Arc<dyn CounterpartyRecords>,
        notices: NoticeQueue,
    ) -> Self {
        Self {
            resolver,
            records,
            notices,
            draft: CounterpartyDraft::default(),
            mode: FormMode::Create,
            address: AddressCheck::default(),
        }
    }

    /// Current draft.
    pub fn draft(&self) -> &CounterpartyDraft {
        &self.draft
    }

    /// Create or edit.
    pub fn mode(&self) -> FormMode<CounterpartyId> {
        self.mode
    }

    /// Postal code validation state.
    pub fn address(&self) -> &AddressCheck {
        &self.address
    }

    /// Switch between individual and legal entity.
    ///
    /// Clears the tax id; leaving [`PersonType::Individual`] also clears the
    /// RG and birth date.
    pub fn set_person_type(&mut self, person_type: PersonType) {
        self.draft.set_person_type(person_type);
    }

    /// Set the CPF or CNPJ.
    pub fn set_tax_id(&mut self, tax_id: impl Into<String>) {
        self.draft.tax_id = tax_id.into();
    }

    /// Set the name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    /// Set the contact e-mail.
    pub fn set_email(&mut self, email: impl Into<String>) {
        self.draft.email = email.into();
    }

    /// Set the RG.
    pub fn set_national_id(&mut self, national_id: impl Into<String>) {
        self.draft.national_id = Some(national_id.into());
    }

    /// Set the birth date.
    pub fn set_birth_date(&mut self, birth_date: NaiveDate) {
        self.draft.birth_date = Some(birth_date);
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
    /// when the counterparty cannot be loaded. The form is unchanged then.
    pub async fn load(&mut self, id: CounterpartyId) -> Result<(), Error> {
        let counterparty = self.records.find(id).await.map_err(|error| {
            let error = error.to_domain("failed to load counterparty");
            self.notices.error(error.message());
            error
        })?;
        self.draft = CounterpartyDraft::from_record(&counterparty);
        self.mode = FormMode::Edit(id);
        self.address.invalidate();
        if let Some(stored) = stored_address(counterparty.address, &counterparty.postal_code) {
            self.address.accept(stored);
        }
        Ok(())
    }

    /// Create or update the counterparty.
    ///
    /// Legal entities are submitted without RG and birth date even when the
    /// draft still holds them.
    ///
    /// # Errors
    ///
    /// Returns an invalid-request error without any network call when the
    /// postal code is unvalidated or a field rule fails, and the mapped
    /// record-service error when the call fails. The draft is kept.
    pub async fn submit(&mut self) -> Result<Counterparty, Error> {
        let postal_code = gate_submission(&self.notices, &self.address, self.draft.validate())?;
        let mut submission = CounterpartyDraft {
            postal_code,
            ..self.draft.clone()
        };
        if submission.person_type == PersonType::LegalEntity {
            submission.national_id = None;
            submission.birth_date = None;
        }

        let (result, success) = match self.mode {
            FormMode::Create => (
                self.records.create(&submission).await,
                "counterparty created",
            ),
            FormMode::Edit(id) => (
                self.records.update(id, &submission).await,
                "counterparty updated",
            ),
        };
        let saved = result.map_err(|error| {
            let error = error.to_domain("failed to save counterparty");
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
