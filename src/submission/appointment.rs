use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use super::{to_canonical_timestamp, FormPhase, InFlight, SubmissionError, SubmissionStatus};
use crate::config::ClinicTimeZone;
use crate::gateway::ClinicGateway;
use crate::models::{AppointmentRecord, AppointmentRequest};

pub const APPOINTMENT_BOOKED: &str =
    "Appointment booked successfully! You will receive a WhatsApp confirmation shortly.";
pub const APPOINTMENT_FAILED: &str = "Failed to book appointment. Please try again.";

/// Editable fields of the booking form, as typed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentFields {
    pub patient_name: String,
    pub phone_number: String,
    pub email: String,
    /// Wall-clock input such as `2024-06-01T10:00`.
    pub appointment_date_time: String,
    pub reason: String,
    pub notes: String,
}

impl AppointmentFields {
    /// Whether every required field has content. For the input surface to
    /// gate its submit affordance; `submit` does not re-check.
    pub fn is_complete(&self) -> bool {
        [
            &self.patient_name,
            &self.phone_number,
            &self.email,
            &self.appointment_date_time,
        ]
        .iter()
        .all(|v| !v.trim().is_empty())
    }

    fn slot(&mut self, field: AppointmentField) -> &mut String {
        match field {
            AppointmentField::PatientName => &mut self.patient_name,
            AppointmentField::PhoneNumber => &mut self.phone_number,
            AppointmentField::Email => &mut self.email,
            AppointmentField::AppointmentDateTime => &mut self.appointment_date_time,
            AppointmentField::Reason => &mut self.reason,
            AppointmentField::Notes => &mut self.notes,
        }
    }
}

/// Field names of the booking form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentField {
    PatientName,
    PhoneNumber,
    Email,
    AppointmentDateTime,
    Reason,
    Notes,
}

impl AppointmentField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PatientName => "patientName",
            Self::PhoneNumber => "phoneNumber",
            Self::Email => "email",
            Self::AppointmentDateTime => "appointmentDateTime",
            Self::Reason => "reason",
            Self::Notes => "notes",
        }
    }
}

impl FromStr for AppointmentField {
    type Err = SubmissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patientName" => Ok(Self::PatientName),
            "phoneNumber" => Ok(Self::PhoneNumber),
            "email" => Ok(Self::Email),
            "appointmentDateTime" => Ok(Self::AppointmentDateTime),
            "reason" => Ok(Self::Reason),
            "notes" => Ok(Self::Notes),
            _ => Err(SubmissionError::UnknownField(s.to_string())),
        }
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| value.to_string())
}

/// Controller for the appointment booking form.
pub struct AppointmentForm<G> {
    gateway: Arc<G>,
    zone: ClinicTimeZone,
    fields: AppointmentFields,
    phase: FormPhase,
    status: SubmissionStatus,
}

impl<G: ClinicGateway> AppointmentForm<G> {
    pub fn new(gateway: Arc<G>, zone: ClinicTimeZone) -> Self {
        Self {
            gateway,
            zone,
            fields: AppointmentFields::default(),
            phase: FormPhase::Idle,
            status: SubmissionStatus::none(),
        }
    }

    pub fn fields(&self) -> &AppointmentFields {
        &self.fields
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    /// False while a submission is in flight.
    pub fn can_submit(&self) -> bool {
        self.phase != FormPhase::Submitting
    }

    /// Update exactly one field, leaving the rest untouched.
    pub fn set_field(&mut self, field: AppointmentField, value: impl Into<String>) {
        *self.fields.slot(field) = value.into();
        self.phase = self.phase.after_edit();
    }

    /// `set_field` addressed by the form's field name (`"patientName"`, ...).
    pub fn set_named_field(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), SubmissionError> {
        let field: AppointmentField = name.parse()?;
        self.set_field(field, value);
        Ok(())
    }

    /// Snapshot current fields into a wire request, converting the date-time.
    pub fn build_request(&self) -> Result<AppointmentRequest, SubmissionError> {
        let appointment_date_time =
            to_canonical_timestamp(&self.fields.appointment_date_time, self.zone)?;

        Ok(AppointmentRequest {
            patient_name: self.fields.patient_name.clone(),
            phone_number: self.fields.phone_number.clone(),
            email: self.fields.email.clone(),
            appointment_date_time,
            reason: optional(&self.fields.reason),
            notes: optional(&self.fields.notes),
        })
    }

    /// Submit the form once.
    ///
    /// Returns the created record on success. On any failure the status slot
    /// holds the error text and the fields are left as typed. Ignored (returns
    /// `None`, state untouched) while another submission is in flight. If the
    /// returned future is dropped mid-request the form goes back to `Idle`.
    pub async fn submit(&mut self) -> Option<AppointmentRecord> {
        if !self.can_submit() {
            tracing::debug!("Appointment submit ignored: already submitting");
            return None;
        }

        self.status = SubmissionStatus::none();
        let request = self.build_request();
        let in_flight = InFlight::begin(&mut self.phase);

        let outcome = match request {
            Ok(request) => self
                .gateway
                .create_appointment(request)
                .await
                .map_err(SubmissionError::from),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(record) => {
                tracing::info!(appointment_id = record.id, "Appointment booked");
                in_flight.settle(FormPhase::Success);
                self.fields = AppointmentFields::default();
                self.status = SubmissionStatus::success(APPOINTMENT_BOOKED);
                Some(record)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Appointment booking failed");
                in_flight.settle(FormPhase::Failed);
                self.status = SubmissionStatus::error(e.user_message(APPOINTMENT_FAILED));
                None
            }
        }
    }
}
