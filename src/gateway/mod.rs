//! Request gateway: typed access to the clinic API.
//!
//! `HttpGateway` talks to the real backend over reqwest. `MockGateway` is an
//! in-memory stand-in that records every call, for driving the submission
//! controllers without a network.

pub mod http;
pub mod mock;

pub use http::*;
pub use mock::*;

use thiserror::Error;

use crate::models::{
    AppointmentRecord, AppointmentRequest, AppointmentStatus, LeadRecord, LeadRequest,
    LeadStatus,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Clinic API is not reachable at {0}")]
    Connection(String),

    #[error("Clinic API returned error (status {status}){}", message_suffix(.message))]
    Api { status: u16, message: Option<String> },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

fn message_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl GatewayError {
    /// Message supplied by the server, if the failure carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of an application-level failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Operations exposed by the clinic API.
///
/// Every call issues exactly one request and never retries. Calls share
/// no mutable state, so independent calls may be in flight together.
#[allow(async_fn_in_trait)]
pub trait ClinicGateway {
    async fn create_appointment(
        &self,
        request: AppointmentRequest,
    ) -> Result<AppointmentRecord, GatewayError>;

    async fn list_appointments(&self) -> Result<Vec<AppointmentRecord>, GatewayError>;

    async fn get_appointment(&self, id: i64) -> Result<AppointmentRecord, GatewayError>;

    async fn update_appointment_status(
        &self,
        id: i64,
        status: AppointmentStatus,
    ) -> Result<AppointmentRecord, GatewayError>;

    async fn list_appointments_by_status(
        &self,
        status: AppointmentStatus,
    ) -> Result<Vec<AppointmentRecord>, GatewayError>;

    async fn create_lead(&self, request: LeadRequest) -> Result<LeadRecord, GatewayError>;

    async fn list_leads(&self) -> Result<Vec<LeadRecord>, GatewayError>;

    async fn get_lead(&self, id: i64) -> Result<LeadRecord, GatewayError>;

    async fn update_lead_status(
        &self,
        id: i64,
        status: LeadStatus,
    ) -> Result<LeadRecord, GatewayError>;

    /// Spreadsheet of all leads, returned as an opaque blob.
    async fn export_leads(&self) -> Result<Vec<u8>, GatewayError>;
}
