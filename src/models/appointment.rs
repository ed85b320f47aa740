use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;

/// Booking payload sent to `POST /appointments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    pub patient_name: String,
    pub phone_number: String,
    pub email: String,
    #[serde(with = "super::timestamp")]
    pub appointment_date_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Appointment as stored by the clinic API.
///
/// The server keeps `appointment_date_time` as a zone-less UTC wall time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    pub id: i64,
    pub patient_name: String,
    pub phone_number: String,
    pub email: String,
    pub appointment_date_time: NaiveDateTime,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub whatsapp_message_id: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl AppointmentRecord {
    /// Record the API would return for a freshly created appointment.
    pub fn from_request(id: i64, request: AppointmentRequest) -> Self {
        Self {
            id,
            patient_name: request.patient_name,
            phone_number: request.phone_number,
            email: request.email,
            appointment_date_time: request.appointment_date_time.naive_utc(),
            reason: request.reason,
            notes: request.notes,
            status: AppointmentStatus::Pending,
            whatsapp_message_id: None,
            created_at: Some(Utc::now().naive_utc()),
        }
    }
}
