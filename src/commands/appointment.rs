//! Appointment commands.
//!
//! - `book_appointment`: fill and submit the booking form
//! - `list_appointments`: all appointments, or those in one status
//! - `get_appointment`: one appointment by id
//! - `set_appointment_status`: move an appointment to a new status

use crate::contact::{ContactPage, FormMode};
use crate::gateway::ClinicGateway;
use crate::models::{AppointmentRecord, AppointmentStatus};
use crate::submission::{AppointmentField, SubmissionStatus};

use super::{parse_status, require_all};

/// Values typed into the booking form.
#[derive(Debug, Clone, Default)]
pub struct BookingInput {
    pub patient_name: String,
    pub phone_number: String,
    pub email: String,
    pub appointment_date_time: String,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

/// Fill the booking form field by field and submit it once.
///
/// Blank required inputs are rejected before the form is touched; anything
/// after that is reported through the returned form status.
pub async fn book_appointment<G: ClinicGateway>(
    page: &mut ContactPage<G>,
    input: BookingInput,
) -> Result<SubmissionStatus, String> {
    require_all(&[
        ("name", input.patient_name.as_str()),
        ("phone", input.phone_number.as_str()),
        ("email", input.email.as_str()),
        ("datetime", input.appointment_date_time.as_str()),
    ])?;

    page.switch_mode(FormMode::Appointment);
    let form = page.appointment_mut();
    form.set_field(AppointmentField::PatientName, input.patient_name);
    form.set_field(AppointmentField::PhoneNumber, input.phone_number);
    form.set_field(AppointmentField::Email, input.email);
    form.set_field(AppointmentField::AppointmentDateTime, input.appointment_date_time);
    form.set_field(AppointmentField::Reason, input.reason.unwrap_or_default());
    form.set_field(AppointmentField::Notes, input.notes.unwrap_or_default());

    form.submit().await;
    Ok(form.status().clone())
}

/// Lists appointments, optionally only those in `status`.
pub async fn list_appointments<G: ClinicGateway>(
    gateway: &G,
    status: Option<&str>,
) -> Result<Vec<AppointmentRecord>, String> {
    match status {
        Some(raw) => {
            let status: AppointmentStatus = parse_status(raw)?;
            gateway
                .list_appointments_by_status(status)
                .await
                .map_err(|e| e.to_string())
        }
        None => gateway.list_appointments().await.map_err(|e| e.to_string()),
    }
}

pub async fn get_appointment<G: ClinicGateway>(
    gateway: &G,
    id: i64,
) -> Result<AppointmentRecord, String> {
    gateway.get_appointment(id).await.map_err(|e| e.to_string())
}

pub async fn set_appointment_status<G: ClinicGateway>(
    gateway: &G,
    id: i64,
    status: &str,
) -> Result<AppointmentRecord, String> {
    let status: AppointmentStatus = parse_status(status)?;
    let record = gateway
        .update_appointment_status(id, status)
        .await
        .map_err(|e| e.to_string())?;
    tracing::info!(
        appointment_id = id,
        status = status.as_str(),
        "Appointment status updated"
    );
    Ok(record)
}
