//! Department REST API client.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{AppError, Result};
use crate::models::{DepartmentDetail, DepartmentRequest, DepartmentSummary, EmployeeRequest, EmployeeSummary};

/// Operations the console needs from the department backend.
#[async_trait]
pub trait DepartmentApi: Send + Sync {
    /// List all departments in server order.
    async fn list_departments(&self) -> Result<Vec<DepartmentSummary>>;

    /// Fetch one department with its roster.
    async fn get_department(&self, id: i64) -> Result<DepartmentDetail>;

    async fn create_department(&self, request: &DepartmentRequest) -> Result<DepartmentDetail>;

    async fn update_department(&self, id: i64, request: &DepartmentRequest) -> Result<DepartmentDetail>;

    async fn add_employee(&self, department_id: i64, request: &EmployeeRequest) -> Result<EmployeeSummary>;

    async fn remove_employee(&self, department_id: i64, employee_id: i64) -> Result<()>;
}

/// HTTP client for the department API.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client from the API settings.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.normalized_base_url().to_string(),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{base}{path}", base = self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("GET {path}");
        let response = self.client.get(self.url(path)).send().await?;
        parse_json(response).await
    }

    async fn send_json<T, B>(&self, method: reqwest::Method, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        debug!("{method} {path}");
        let response = self.client.request(method, self.url(path)).json(body).send().await?;
        parse_json(response).await
    }
}

#[async_trait]
impl DepartmentApi for ApiClient {
    async fn list_departments(&self) -> Result<Vec<DepartmentSummary>> {
        self.get_json("/api/departments").await
    }

    async fn get_department(&self, id: i64) -> Result<DepartmentDetail> {
        self.get_json(&format!("/api/departments/{id}")).await
    }

    async fn create_department(&self, request: &DepartmentRequest) -> Result<DepartmentDetail> {
        self.send_json(reqwest::Method::POST, "/api/departments", request).await
    }

    async fn update_department(&self, id: i64, request: &DepartmentRequest) -> Result<DepartmentDetail> {
        self.send_json(reqwest::Method::PUT, &format!("/api/departments/{id}"), request)
            .await
    }

    async fn add_employee(&self, department_id: i64, request: &EmployeeRequest) -> Result<EmployeeSummary> {
        let path = format!("/api/departments/{department_id}/employees");
        self.send_json(reqwest::Method::POST, &path, request).await
    }

    async fn remove_employee(&self, department_id: i64, employee_id: i64) -> Result<()> {
        let path = format!("/api/departments/{department_id}/employees/{employee_id}");
        debug!("DELETE {path}");
        let response = self.client.delete(self.url(&path)).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await?;
        Err(error_from_body(status, &body))
    }
}

/// Decode a success body or turn a failure into an API error.
async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.bytes().await?;
    if status.is_success() {
        serde_json::from_slice(&body).map_err(|e| AppError::Decode(e.to_string()))
    } else {
        Err(error_from_body(status, &body))
    }
}

/// Build an API error from a failure status and its (possibly non-JSON) body.
///
/// The message is the first non-empty of `message`, `error`, the status
/// reason phrase, or the numeric status. Each field is read on its own, so an
/// odd `errors` shape never hides a usable message.
pub fn error_from_body(status: StatusCode, body: &[u8]) -> AppError {
    let parsed: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

    let message = ["message", "error"]
        .into_iter()
        .filter_map(|key| parsed.get(key).and_then(Value::as_str))
        .find(|m| !m.trim().is_empty())
        .map(str::to_string)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| status.as_u16().to_string());

    AppError::Api {
        status: status.as_u16(),
        message,
        field_errors: parsed.get("errors").map(field_errors).unwrap_or_default(),
    }
}

/// Collect field messages from either a `{field: message}` map or a list of
/// `{field, defaultMessage}` objects. Entries without a text message are skipped.
fn field_errors(errors: &Value) -> BTreeMap<String, String> {
    match errors {
        Value::Object(map) => map
            .iter()
            .filter_map(|(field, reason)| Some((field.clone(), reason.as_str()?.to_string())))
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let field = item.get("field")?.as_str()?;
                let reason = item
                    .get("defaultMessage")
                    .or_else(|| item.get("message"))?
                    .as_str()?;
                Some((field.to_string(), reason.to_string()))
            })
            .collect(),
        _ => BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: &AppError) -> String {
        err.to_string()
    }

    #[test]
    fn test_message_field_wins() {
        let body = br#"{"status":404,"error":"Not Found","message":"Department not found: 9"}"#;
        let err = error_from_body(StatusCode::NOT_FOUND, body);
        assert_eq!(message(&err), "Department not found: 9");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_error_field_used_without_message() {
        let body = br#"{"status":400,"error":"Bad Request","errors":{"name":"Department name is required"}}"#;
        let err = error_from_body(StatusCode::BAD_REQUEST, body);
        assert_eq!(message(&err), "Bad Request");
        let fields = err.field_errors().unwrap();
        assert_eq!(fields["name"], "Department name is required");
    }

    #[test]
    fn test_empty_message_falls_through_to_error_field() {
        let body = br#"{"message":"","error":"Conflict"}"#;
        let err = error_from_body(StatusCode::CONFLICT, body);
        assert_eq!(message(&err), "Conflict");
    }

    #[test]
    fn test_null_errors_keeps_message() {
        let body = br#"{"message":"Department not found: 9","errors":null}"#;
        let err = error_from_body(StatusCode::NOT_FOUND, body);
        assert_eq!(message(&err), "Department not found: 9");
        assert!(err.field_errors().is_none());
    }

    #[test]
    fn test_error_list_is_read_per_field() {
        let body = br#"{"message":"Validation failed","errors":[
            {"field":"code","defaultMessage":"must not be blank"},
            {"objectName":"departmentRequest","defaultMessage":"invalid"}
        ]}"#;
        let err = error_from_body(StatusCode::BAD_REQUEST, body);
        assert_eq!(message(&err), "Validation failed");
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["code"], "must not be blank");
    }

    #[test]
    fn test_null_field_message_is_skipped() {
        let body = br#"{"errors":{"name":null,"code":"Code is required"}}"#;
        let err = error_from_body(StatusCode::BAD_REQUEST, body);
        assert_eq!(message(&err), "Bad Request");
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["code"], "Code is required");
    }

    #[test]
    fn test_non_json_body_uses_reason_phrase() {
        let err = error_from_body(StatusCode::BAD_GATEWAY, b"<html>upstream down</html>");
        assert_eq!(message(&err), "Bad Gateway");

        let err = error_from_body(StatusCode::INTERNAL_SERVER_ERROR, b"");
        assert_eq!(message(&err), "Internal Server Error");
    }

    #[test]
    fn test_unknown_status_uses_code() {
        let status = StatusCode::from_u16(599).unwrap();
        let err = error_from_body(status, b"{}");
        assert_eq!(message(&err), "599");
    }

    #[test]
    fn test_client_normalizes_base_url() {
        let config = ApiConfig {
            base_url: "http://localhost:8080/".to_string(),
            timeout_secs: Some(5),
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.url("/api/departments"), "http://localhost:8080/api/departments");
    }

    #[test]
    fn test_unreachable_backend_is_classified() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        // Port 9 (discard) on loopback is closed on test machines.
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: Some(5),
        };
        let client = ApiClient::new(&config).unwrap();
        let err = rt.block_on(client.list_departments()).unwrap_err();
        assert!(err.is_unreachable(), "expected unreachable, got {err:?}");
    }
}
