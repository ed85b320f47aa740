use std::sync::{Mutex, MutexGuard};

use super::{ClinicGateway, GatewayError};
use crate::models::{
    AppointmentRecord, AppointmentRequest, AppointmentStatus, LeadRecord, LeadRequest,
    LeadStatus,
};

/// One call observed by `MockGateway`, with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    CreateAppointment(AppointmentRequest),
    ListAppointments,
    GetAppointment(i64),
    UpdateAppointmentStatus(i64, AppointmentStatus),
    ListAppointmentsByStatus(AppointmentStatus),
    CreateLead(LeadRequest),
    ListLeads,
    GetLead(i64),
    UpdateLeadStatus(i64, LeadStatus),
    ExportLeads,
}

#[derive(Default)]
struct MockState {
    calls: Vec<GatewayCall>,
    appointments: Vec<AppointmentRecord>,
    leads: Vec<LeadRecord>,
    next_id: i64,
    failure: Option<GatewayError>,
    stall_next_create: bool,
}

/// In-memory gateway that records every call.
///
/// Behaves like a tiny backend: created records are kept and served back by
/// the list/get/update operations. `failing_with` makes every call fail.
pub struct MockGateway {
    state: Mutex<MockState>,
    export_payload: Vec<u8>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_id: 1,
                ..MockState::default()
            }),
            export_payload: Vec::new(),
        }
    }

    /// Every subsequent call fails with `error`.
    pub fn failing_with(self, error: GatewayError) -> Self {
        self.set_failure(Some(error));
        self
    }

    /// Blob returned by `export_leads`.
    pub fn with_export_payload(mut self, payload: Vec<u8>) -> Self {
        self.export_payload = payload;
        self
    }

    /// Replace (or clear) the failure injected into every call.
    pub fn set_failure(&self, error: Option<GatewayError>) {
        self.lock().failure = error;
    }

    /// The next create call is recorded and then never completes.
    pub fn stall_next_create(&self) {
        self.lock().stall_next_create = true;
    }

    /// Calls observed so far, oldest first.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the call, then fail if a failure is injected.
    fn begin(&self, call: GatewayCall) -> Result<MutexGuard<'_, MockState>, GatewayError> {
        let mut state = self.lock();
        state.calls.push(call);
        if let Some(error) = state.failure.clone() {
            return Err(error);
        }
        Ok(state)
    }

    /// Record a create call and park forever if a stall was requested.
    async fn begin_create(
        &self,
        call: GatewayCall,
    ) -> Result<MutexGuard<'_, MockState>, GatewayError> {
        let stall = std::mem::take(&mut self.begin(call)?.stall_next_create);
        if stall {
            std::future::pending::<()>().await;
        }
        Ok(self.lock())
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(kind: &str, id: i64) -> GatewayError {
    GatewayError::Api {
        status: 404,
        message: Some(format!("{kind} not found with id: {id}")),
    }
}

impl ClinicGateway for MockGateway {
    async fn create_appointment(
        &self,
        request: AppointmentRequest,
    ) -> Result<AppointmentRecord, GatewayError> {
        let mut state = self
            .begin_create(GatewayCall::CreateAppointment(request.clone()))
            .await?;
        let id = state.next_id;
        state.next_id += 1;
        let record = AppointmentRecord::from_request(id, request);
        state.appointments.push(record.clone());
        Ok(record)
    }

    async fn list_appointments(&self) -> Result<Vec<AppointmentRecord>, GatewayError> {
        let state = self.begin(GatewayCall::ListAppointments)?;
        Ok(state.appointments.clone())
    }

    async fn get_appointment(&self, id: i64) -> Result<AppointmentRecord, GatewayError> {
        let state = self.begin(GatewayCall::GetAppointment(id))?;
        state
            .appointments
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| not_found("Appointment", id))
    }

    async fn update_appointment_status(
        &self,
        id: i64,
        status: AppointmentStatus,
    ) -> Result<AppointmentRecord, GatewayError> {
        let mut state = self.begin(GatewayCall::UpdateAppointmentStatus(id, status))?;
        let record = state
            .appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| not_found("Appointment", id))?;
        record.status = status;
        Ok(record.clone())
    }

    async fn list_appointments_by_status(
        &self,
        status: AppointmentStatus,
    ) -> Result<Vec<AppointmentRecord>, GatewayError> {
        let state = self.begin(GatewayCall::ListAppointmentsByStatus(status))?;
        Ok(state
            .appointments
            .iter()
            .filter(|a| a.status == status)
            .cloned()
            .collect())
    }

    async fn create_lead(&self, request: LeadRequest) -> Result<LeadRecord, GatewayError> {
        let mut state = self
            .begin_create(GatewayCall::CreateLead(request.clone()))
            .await?;
        let id = state.next_id;
        state.next_id += 1;
        let record = LeadRecord::from_request(id, request);
        state.leads.push(record.clone());
        Ok(record)
    }

    async fn list_leads(&self) -> Result<Vec<LeadRecord>, GatewayError> {
        let state = self.begin(GatewayCall::ListLeads)?;
        Ok(state.leads.clone())
    }

    async fn get_lead(&self, id: i64) -> Result<LeadRecord, GatewayError> {
        let state = self.begin(GatewayCall::GetLead(id))?;
        state
            .leads
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| not_found("Lead", id))
    }

    async fn update_lead_status(
        &self,
        id: i64,
        status: LeadStatus,
    ) -> Result<LeadRecord, GatewayError> {
        let mut state = self.begin(GatewayCall::UpdateLeadStatus(id, status))?;
        let record = state
            .leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| not_found("Lead", id))?;
        record.status = status;
        Ok(record.clone())
    }

    async fn export_leads(&self) -> Result<Vec<u8>, GatewayError> {
        let _state = self.begin(GatewayCall::ExportLeads)?;
        Ok(self.export_payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeadSource;

    fn lead() -> LeadRequest {
        LeadRequest {
            name: "John".into(),
            email: "john@x.com".into(),
            phone_number: "+1987654321".into(),
            message: "Hello".into(),
            source: LeadSource::Website,
        }
    }

    #[tokio::test]
    async fn records_calls_in_order() {
        let gateway = MockGateway::new();
        gateway.create_lead(lead()).await.unwrap();
        gateway.list_leads().await.unwrap();
        gateway.export_leads().await.unwrap();

        assert_eq!(
            gateway.calls(),
            vec![
                GatewayCall::CreateLead(lead()),
                GatewayCall::ListLeads,
                GatewayCall::ExportLeads,
            ]
        );
    }

    #[tokio::test]
    async fn created_leads_can_be_fetched_and_updated() {
        let gateway = MockGateway::new();
        let created = gateway.create_lead(lead()).await.unwrap();
        assert_eq!(created.status, LeadStatus::New);

        let updated = gateway
            .update_lead_status(created.id, LeadStatus::Converted)
            .await
            .unwrap();
        assert_eq!(updated.status, LeadStatus::Converted);
        assert_eq!(
            gateway.get_lead(created.id).await.unwrap().status,
            LeadStatus::Converted
        );
    }

    #[tokio::test]
    async fn missing_record_is_404_with_message() {
        let gateway = MockGateway::new();
        let err = gateway.get_appointment(99).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.server_message(), Some("Appointment not found with id: 99"));
    }

    #[tokio::test]
    async fn injected_failure_still_records_the_call() {
        let gateway = MockGateway::new().failing_with(GatewayError::Connection(
            "http://localhost:8080/api".into(),
        ));
        assert!(gateway.list_appointments().await.is_err());
        assert_eq!(gateway.calls(), vec![GatewayCall::ListAppointments]);

        gateway.set_failure(None);
        assert!(gateway.list_appointments().await.is_ok());
    }

    #[tokio::test]
    async fn stalled_create_hangs_once() {
        let gateway = MockGateway::new();
        gateway.stall_next_create();

        let stalled = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            gateway.create_lead(lead()),
        )
        .await;
        assert!(stalled.is_err());
        assert!(gateway.create_lead(lead()).await.is_ok());
        assert_eq!(gateway.calls().len(), 2);
    }

    #[tokio::test]
    async fn export_returns_configured_payload() {
        let gateway = MockGateway::new().with_export_payload(vec![1, 2, 3]);
        assert_eq!(gateway.export_leads().await.unwrap(), vec![1, 2, 3]);
    }
}
