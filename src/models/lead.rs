use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{LeadSource, LeadStatus};

/// Contact-form payload sent to `POST /leads`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRequest {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub message: String,
    pub source: LeadSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub message: Option<String>,
    pub source: Option<String>,
    pub status: LeadStatus,
    pub created_at: Option<NaiveDateTime>,
}

impl LeadRecord {
    /// Record the API would return for a freshly created lead.
    pub fn from_request(id: i64, request: LeadRequest) -> Self {
        Self {
            id,
            name: request.name,
            email: request.email,
            phone_number: request.phone_number,
            message: Some(request.message),
            source: Some(request.source.as_str().to_string()),
            status: LeadStatus::New,
            created_at: Some(Utc::now().naive_utc()),
        }
    }
}
