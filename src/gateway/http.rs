use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::{ClinicGateway, GatewayError};
use crate::config;
use crate::models::{
    AppointmentRecord, AppointmentRequest, AppointmentStatus, LeadRecord, LeadRequest,
    LeadStatus,
};

/// HTTP client for the clinic API, bound to one base address.
///
/// Cloning is cheap: clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGateway {
    /// Create a gateway rooted at `base_url` (e.g. `http://localhost:8080/api`).
    ///
    /// No request timeout is configured; transport defaults apply.
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, */*"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| GatewayError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Gateway for the base address configured in `CLINIC_API_URL`.
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::new(&config::api_base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send one request and turn transport failures and non-2xx statuses
    /// into `GatewayError`.
    async fn send(&self, request: RequestBuilder) -> Result<Response, GatewayError> {
        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                GatewayError::Connection(self.base_url.clone())
            } else {
                GatewayError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_server_message(&body);
            tracing::warn!(
                status = status.as_u16(),
                has_message = message.is_some(),
                "Clinic API request failed"
            );
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::ResponseParsing(e.to_string()))
    }
}

/// Pull a human-readable `message` out of an error body.
///
/// Bodies that are not JSON objects, or whose `message` is absent, blank or
/// not a string, yield `None`.
pub fn extract_server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

impl ClinicGateway for HttpGateway {
    async fn create_appointment(
        &self,
        request: AppointmentRequest,
    ) -> Result<AppointmentRecord, GatewayError> {
        tracing::debug!("POST /appointments");
        self.fetch_json(self.client.post(self.url("/appointments")).json(&request))
            .await
    }

    async fn list_appointments(&self) -> Result<Vec<AppointmentRecord>, GatewayError> {
        tracing::debug!("GET /appointments");
        self.fetch_json(self.client.get(self.url("/appointments")))
            .await
    }

    async fn get_appointment(&self, id: i64) -> Result<AppointmentRecord, GatewayError> {
        tracing::debug!(id, "GET /appointments/{{id}}");
        self.fetch_json(self.client.get(self.url(&format!("/appointments/{id}"))))
            .await
    }

    async fn update_appointment_status(
        &self,
        id: i64,
        status: AppointmentStatus,
    ) -> Result<AppointmentRecord, GatewayError> {
        tracing::debug!(id, status = status.as_str(), "PUT /appointments/{{id}}/status");
        let request = self
            .client
            .put(self.url(&format!("/appointments/{id}/status")))
            .query(&[("status", status.as_str())]);
        self.fetch_json(request).await
    }

    async fn list_appointments_by_status(
        &self,
        status: AppointmentStatus,
    ) -> Result<Vec<AppointmentRecord>, GatewayError> {
        tracing::debug!(status = status.as_str(), "GET /appointments/status/{{status}}");
        let url = self.url(&format!("/appointments/status/{}", status.as_str()));
        self.fetch_json(self.client.get(url)).await
    }

    async fn create_lead(&self, request: LeadRequest) -> Result<LeadRecord, GatewayError> {
        tracing::debug!("POST /leads");
        self.fetch_json(self.client.post(self.url("/leads")).json(&request))
            .await
    }

    async fn list_leads(&self) -> Result<Vec<LeadRecord>, GatewayError> {
        tracing::debug!("GET /leads");
        self.fetch_json(self.client.get(self.url("/leads"))).await
    }

    async fn get_lead(&self, id: i64) -> Result<LeadRecord, GatewayError> {
        tracing::debug!(id, "GET /leads/{{id}}");
        self.fetch_json(self.client.get(self.url(&format!("/leads/{id}"))))
            .await
    }

    async fn update_lead_status(
        &self,
        id: i64,
        status: LeadStatus,
    ) -> Result<LeadRecord, GatewayError> {
        tracing::debug!(id, status = status.as_str(), "PUT /leads/{{id}}/status");
        let request = self
            .client
            .put(self.url(&format!("/leads/{id}/status")))
            .query(&[("status", status.as_str())]);
        self.fetch_json(request).await
    }

    async fn export_leads(&self) -> Result<Vec<u8>, GatewayError> {
        tracing::debug!("GET /leads/export/excel");
        let response = self
            .send(self.client.get(self.url("/leads/export/excel")))
            .await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GatewayError::HttpClient(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, Query, State};
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::{get, put};
    use axum::{Json, Router};
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    use crate::models::LeadSource;

    /// What the fake backend saw, in arrival order.
    #[derive(Default)]
    struct Seen {
        requests: Mutex<Vec<String>>,
        bodies: Mutex<Vec<Value>>,
        content_types: Mutex<Vec<String>>,
    }

    impl Seen {
        fn record(&self, line: String) {
            self.requests.lock().unwrap().push(line);
        }
    }

    fn appointment_json(id: i64, status: &str) -> Value {
        json!({
            "id": id,
            "patientName": "Jane Doe",
            "phoneNumber": "+1234567890",
            "email": "jane@x.com",
            "appointmentDateTime": "2024-06-01T10:00:00",
            "reason": "Checkup",
            "notes": null,
            "status": status,
            "whatsappMessageId": null,
            "createdAt": "2024-05-01T09:00:00"
        })
    }

    fn lead_json(id: i64, status: &str) -> Value {
        json!({
            "id": id,
            "name": "John",
            "email": "john@x.com",
            "phoneNumber": "+1987654321",
            "message": "Hello",
            "source": "WEBSITE",
            "status": status,
            "createdAt": "2024-05-01T09:00:00"
        })
    }

    async fn create_appointment_handler(
        State(seen): State<Arc<Seen>>,
        headers: AxumHeaders,
        Json(body): Json<Value>,
    ) -> impl IntoResponse {
        seen.record("POST /appointments".into());
        if let Some(ct) = headers.get("content-type").and_then(|v| v.to_str().ok()) {
            seen.content_types.lock().unwrap().push(ct.to_string());
        }
        seen.bodies.lock().unwrap().push(body);
        (StatusCode::CREATED, Json(appointment_json(1, "PENDING")))
    }

    async fn list_appointments_handler(State(seen): State<Arc<Seen>>) -> Json<Value> {
        seen.record("GET /appointments".into());
        Json(json!([appointment_json(1, "PENDING"), appointment_json(2, "CONFIRMED")]))
    }

    async fn get_appointment_handler(
        State(seen): State<Arc<Seen>>,
        Path(id): Path<i64>,
    ) -> impl IntoResponse {
        seen.record(format!("GET /appointments/{id}"));
        if id == 404 {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "status": 404,
                    "error": "Not Found",
                    "message": "Appointment not found with id: 404",
                    "path": "/api/appointments/404"
                })),
            );
        }
        (StatusCode::OK, Json(appointment_json(id, "PENDING")))
    }

    async fn update_appointment_status_handler(
        State(seen): State<Arc<Seen>>,
        Path(id): Path<i64>,
        Query(query): Query<std::collections::HashMap<String, String>>,
    ) -> Json<Value> {
        let status = query.get("status").cloned().unwrap_or_default();
        seen.record(format!("PUT /appointments/{id}/status?status={status}"));
        Json(appointment_json(id, &status))
    }

    async fn appointments_by_status_handler(
        State(seen): State<Arc<Seen>>,
        Path(status): Path<String>,
    ) -> Json<Value> {
        seen.record(format!("GET /appointments/status/{status}"));
        Json(json!([appointment_json(5, &status)]))
    }

    async fn create_lead_handler(
        State(seen): State<Arc<Seen>>,
        Json(body): Json<Value>,
    ) -> impl IntoResponse {
        seen.record("POST /leads".into());
        seen.bodies.lock().unwrap().push(body);
        (StatusCode::CREATED, Json(lead_json(9, "NEW")))
    }

    async fn list_leads_handler(State(seen): State<Arc<Seen>>) -> Json<Value> {
        seen.record("GET /leads".into());
        Json(json!([lead_json(9, "NEW")]))
    }

    async fn get_lead_handler(
        State(seen): State<Arc<Seen>>,
        Path(id): Path<i64>,
    ) -> Json<Value> {
        seen.record(format!("GET /leads/{id}"));
        Json(lead_json(id, "NEW"))
    }

    async fn update_lead_status_handler(
        State(seen): State<Arc<Seen>>,
        Path(id): Path<i64>,
        Query(query): Query<std::collections::HashMap<String, String>>,
    ) -> Json<Value> {
        let status = query.get("status").cloned().unwrap_or_default();
        seen.record(format!("PUT /leads/{id}/status?status={status}"));
        Json(lead_json(id, &status))
    }

    async fn export_leads_handler(State(seen): State<Arc<Seen>>) -> impl IntoResponse {
        seen.record("GET /leads/export/excel".into());
        (
            [(
                "content-type",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            )],
            vec![0x50u8, 0x4b, 0x03, 0x04, 0xff],
        )
    }

    /// Start a fake clinic backend on an ephemeral loopback port.
    async fn spawn_backend() -> (String, Arc<Seen>) {
        let seen = Arc::new(Seen::default());
        let api = Router::new()
            .route(
                "/appointments",
                get(list_appointments_handler).post(create_appointment_handler),
            )
            .route("/appointments/:id", get(get_appointment_handler))
            .route(
                "/appointments/:id/status",
                put(update_appointment_status_handler),
            )
            .route(
                "/appointments/status/:status",
                get(appointments_by_status_handler),
            )
            .route("/leads", get(list_leads_handler).post(create_lead_handler))
            .route("/leads/:id", get(get_lead_handler))
            .route("/leads/:id/status", put(update_lead_status_handler))
            .route("/leads/export/excel", get(export_leads_handler))
            .with_state(seen.clone());
        let app = Router::new().nest("/api", api);

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}/api"), seen)
    }

    fn booking() -> AppointmentRequest {
        AppointmentRequest {
            patient_name: "Jane Doe".into(),
            phone_number: "+1234567890".into(),
            email: "jane@x.com".into(),
            appointment_date_time: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
            reason: Some("Checkup".into()),
            notes: None,
        }
    }

    #[test]
    fn constructor_trims_trailing_slash() {
        let gateway = HttpGateway::new("http://localhost:8080/api/").unwrap();
        assert_eq!(gateway.base_url(), "http://localhost:8080/api");
        assert_eq!(gateway.url("/leads"), "http://localhost:8080/api/leads");
    }

    #[test]
    fn extracts_message_from_spring_error_body() {
        let body = r#"{"timestamp":"2024-06-01T10:00:00","status":400,"error":"Bad Request","message":"Invalid email format","path":"/api/leads"}"#;
        assert_eq!(
            extract_server_message(body).as_deref(),
            Some("Invalid email format")
        );
    }

    #[test]
    fn ignores_missing_blank_or_non_string_messages() {
        assert_eq!(extract_server_message(""), None);
        assert_eq!(extract_server_message("<html>502</html>"), None);
        assert_eq!(extract_server_message(r#"{"error":"x"}"#), None);
        assert_eq!(extract_server_message(r#"{"message":"   "}"#), None);
        assert_eq!(extract_server_message(r#"{"message":42}"#), None);
        assert_eq!(extract_server_message(r#"["message"]"#), None);
    }

    #[tokio::test]
    async fn create_appointment_posts_camel_case_json() {
        let (base, seen) = spawn_backend().await;
        let gateway = HttpGateway::new(&base).unwrap();

        let record = gateway.create_appointment(booking()).await.unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.status, AppointmentStatus::Pending);

        let bodies = seen.bodies.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["patientName"], "Jane Doe");
        assert_eq!(bodies[0]["appointmentDateTime"], "2024-06-01T10:00:00.000Z");
        assert_eq!(bodies[0]["reason"], "Checkup");

        let content_types = seen.content_types.lock().unwrap();
        assert!(content_types[0].starts_with("application/json"));
    }

    #[tokio::test]
    async fn appointment_reads_and_status_updates_hit_expected_paths() {
        let (base, seen) = spawn_backend().await;
        let gateway = HttpGateway::new(&base).unwrap();

        assert_eq!(gateway.list_appointments().await.unwrap().len(), 2);
        assert_eq!(gateway.get_appointment(7).await.unwrap().id, 7);

        let updated = gateway
            .update_appointment_status(7, AppointmentStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(updated.status, AppointmentStatus::Confirmed);

        let cancelled = gateway
            .list_appointments_by_status(AppointmentStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled[0].status, AppointmentStatus::Cancelled);

        assert_eq!(
            *seen.requests.lock().unwrap(),
            vec![
                "GET /appointments".to_string(),
                "GET /appointments/7".to_string(),
                "PUT /appointments/7/status?status=CONFIRMED".to_string(),
                "GET /appointments/status/CANCELLED".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn lead_operations_hit_expected_paths() {
        let (base, seen) = spawn_backend().await;
        let gateway = HttpGateway::new(&base).unwrap();

        let created = gateway
            .create_lead(LeadRequest {
                name: "John".into(),
                email: "john@x.com".into(),
                phone_number: "+1987654321".into(),
                message: "Hello".into(),
                source: LeadSource::Website,
            })
            .await
            .unwrap();
        assert_eq!(created.id, 9);
        assert_eq!(seen.bodies.lock().unwrap()[0]["source"], "WEBSITE");

        assert_eq!(gateway.list_leads().await.unwrap().len(), 1);
        assert_eq!(gateway.get_lead(9).await.unwrap().id, 9);
        let updated = gateway
            .update_lead_status(9, LeadStatus::Contacted)
            .await
            .unwrap();
        assert_eq!(updated.status, LeadStatus::Contacted);

        assert_eq!(
            *seen.requests.lock().unwrap(),
            vec![
                "POST /leads".to_string(),
                "GET /leads".to_string(),
                "GET /leads/9".to_string(),
                "PUT /leads/9/status?status=CONTACTED".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn export_returns_raw_bytes() {
        let (base, _seen) = spawn_backend().await;
        let gateway = HttpGateway::new(&base).unwrap();

        let blob = gateway.export_leads().await.unwrap();
        assert_eq!(blob, vec![0x50, 0x4b, 0x03, 0x04, 0xff]);
    }

    #[tokio::test]
    async fn non_success_carries_server_message() {
        let (base, _seen) = spawn_backend().await;
        let gateway = HttpGateway::new(&base).unwrap();

        let err = gateway.get_appointment(404).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.server_message(),
            Some("Appointment not found with id: 404")
        );
    }

    #[tokio::test]
    async fn unknown_route_is_api_error_without_message() {
        let (base, _seen) = spawn_backend().await;
        let gateway = HttpGateway::new(&format!("{base}/missing")).unwrap();

        let err = gateway.list_leads().await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::Api {
                status: 404,
                message: None
            }
        );
    }

    #[tokio::test]
    async fn refused_connection_maps_to_connection_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base = format!("http://{addr}/api");
        let gateway = HttpGateway::new(&base).unwrap();
        let err = gateway.list_appointments().await.unwrap_err();
        assert_eq!(err, GatewayError::Connection(base));
    }
}
