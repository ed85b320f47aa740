use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use super::{FormPhase, InFlight, SubmissionError, SubmissionStatus};
use crate::gateway::ClinicGateway;
use crate::models::{LeadRecord, LeadRequest, LeadSource};

pub const LEAD_SENT: &str = "Thank you for contacting us! We will get back to you soon.";
pub const LEAD_FAILED: &str = "Failed to send message. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadFields {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub message: String,
}

impl LeadFields {
    /// All four contact fields are required.
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.phone_number, &self.message]
            .iter()
            .all(|v| !v.trim().is_empty())
    }

    fn slot(&mut self, field: LeadField) -> &mut String {
        match field {
            LeadField::Name => &mut self.name,
            LeadField::Email => &mut self.email,
            LeadField::PhoneNumber => &mut self.phone_number,
            LeadField::Message => &mut self.message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadField {
    Name,
    Email,
    PhoneNumber,
    Message,
}

impl LeadField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::PhoneNumber => "phoneNumber",
            Self::Message => "message",
        }
    }
}

impl FromStr for LeadField {
    type Err = SubmissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "phoneNumber" => Ok(Self::PhoneNumber),
            "message" => Ok(Self::Message),
            _ => Err(SubmissionError::UnknownField(s.to_string())),
        }
    }
}

/// Controller for the contact (lead) form.
pub struct LeadForm<G> {
    gateway: Arc<G>,
    fields: LeadFields,
    phase: FormPhase,
    status: SubmissionStatus,
}

impl<G: ClinicGateway> LeadForm<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            fields: LeadFields::default(),
            phase: FormPhase::Idle,
            status: SubmissionStatus::none(),
        }
    }

    pub fn fields(&self) -> &LeadFields {
        &self.fields
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn can_submit(&self) -> bool {
        self.phase != FormPhase::Submitting
    }

    pub fn set_field(&mut self, field: LeadField, value: impl Into<String>) {
        *self.fields.slot(field) = value.into();
        self.phase = self.phase.after_edit();
    }

    pub fn set_named_field(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), SubmissionError> {
        let field: LeadField = name.parse()?;
        self.set_field(field, value);
        Ok(())
    }

    pub fn build_request(&self) -> LeadRequest {
        LeadRequest {
            name: self.fields.name.clone(),
            email: self.fields.email.clone(),
            phone_number: self.fields.phone_number.clone(),
            message: self.fields.message.clone(),
            source: LeadSource::Website,
        }
    }

    /// Submit the form once; see `AppointmentForm::submit` for the contract.
    pub async fn submit(&mut self) -> Option<LeadRecord> {
        if !self.can_submit() {
            tracing::debug!("Lead submit ignored: already submitting");
            return None;
        }

        self.status = SubmissionStatus::none();
        let request = self.build_request();
        let in_flight = InFlight::begin(&mut self.phase);

        match self.gateway.create_lead(request).await {
            Ok(record) => {
                tracing::info!(lead_id = record.id, "Lead submitted");
                in_flight.settle(FormPhase::Success);
                self.fields = LeadFields::default();
                self.status = SubmissionStatus::success(LEAD_SENT);
                Some(record)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Lead submission failed");
                in_flight.settle(FormPhase::Failed);
                let e = SubmissionError::from(e);
                self.status = SubmissionStatus::error(e.user_message(LEAD_FAILED));
                None
            }
        }
    }
}
