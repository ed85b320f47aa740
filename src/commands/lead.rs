//! Lead commands.
//!
//! - `send_contact_message`: fill and submit the contact form
//! - `list_leads`, `get_lead`, `set_lead_status`
//! - `export_leads`: download the lead spreadsheet to a file

use std::path::{Path, PathBuf};

use crate::contact::{ContactPage, FormMode};
use crate::gateway::ClinicGateway;
use crate::models::{LeadRecord, LeadStatus};
use crate::submission::{LeadField, SubmissionStatus};

use super::{parse_status, require_all};

/// Values typed into the contact form.
#[derive(Debug, Clone, Default)]
pub struct ContactInput {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub message: String,
}

pub async fn send_contact_message<G: ClinicGateway>(
    page: &mut ContactPage<G>,
    input: ContactInput,
) -> Result<SubmissionStatus, String> {
    require_all(&[
        ("name", input.name.as_str()),
        ("email", input.email.as_str()),
        ("phone", input.phone_number.as_str()),
        ("message", input.message.as_str()),
    ])?;

    page.switch_mode(FormMode::Contact);
    let form = page.lead_mut();
    form.set_field(LeadField::Name, input.name);
    form.set_field(LeadField::Email, input.email);
    form.set_field(LeadField::PhoneNumber, input.phone_number);
    form.set_field(LeadField::Message, input.message);

    form.submit().await;
    Ok(form.status().clone())
}

pub async fn list_leads<G: ClinicGateway>(gateway: &G) -> Result<Vec<LeadRecord>, String> {
    gateway.list_leads().await.map_err(|e| e.to_string())
}

pub async fn get_lead<G: ClinicGateway>(gateway: &G, id: i64) -> Result<LeadRecord, String> {
    gateway.get_lead(id).await.map_err(|e| e.to_string())
}

pub async fn set_lead_status<G: ClinicGateway>(
    gateway: &G,
    id: i64,
    status: &str,
) -> Result<LeadRecord, String> {
    let status: LeadStatus = parse_status(status)?;
    let record = gateway
        .update_lead_status(id, status)
        .await
        .map_err(|e| e.to_string())?;
    tracing::info!(lead_id = id, status = status.as_str(), "Lead status updated");
    Ok(record)
}

/// Downloads the lead spreadsheet and writes it to `out` unchanged.
/// Returns the written path.
pub async fn export_leads<G: ClinicGateway>(gateway: &G, out: &Path) -> Result<PathBuf, String> {
    let blob = gateway.export_leads().await.map_err(|e| e.to_string())?;

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("Cannot create {}: {e}", parent.display()))?;
    }
    tokio::fs::write(out, &blob)
        .await
        .map_err(|e| format!("Cannot write {}: {e}", out.display()))?;

    tracing::info!(bytes = blob.len(), path = %out.display(), "Lead export written");
    Ok(out.to_path_buf())
}
