//! HTTP/JSON backend client.

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, warn};
use url::Url;

use super::BackendClient;
use super::model::{ErrorResponse, RegisterRequest, SendCodeRequest, SendCodeResponse};
use crate::conversation::ConversationHistory;
use crate::{Error, Result};

/// Backend client speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http_client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Creates a client for the backend at `base_url`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            http_client: Client::new(),
            base_url,
        }
    }

    /// Creates a client from a base URL string.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse.
    pub fn from_base_url(base_url: &str) -> Result<Self> {
        Ok(Self::new(Url::parse(base_url)?))
    }

    /// The backend base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Config(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Turn a non-success response into a backend error.
async fn check_status(response: Response, fallback: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .and_then(|e| e.error)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string());

    warn!("Backend returned {status}: {message}");
    Err(Error::backend(status.as_u16(), message))
}

#[async_trait]
impl BackendClient for HttpBackend {
    async fn send_code(&self, phone_number: &str, code: &str) -> Result<SendCodeResponse> {
        let url = self.endpoint(&["sendWhatsappMsg"])?;
        debug!("Requesting passcode delivery to {phone_number}");

        let response = self
            .http_client
            .post(url)
            .json(&SendCodeRequest {
                phone_number,
                otp: code,
            })
            .send()
            .await?;
        let response = check_status(response, "Failed to send OTP").await?;

        Ok(response.json().await?)
    }

    async fn register(&self, phone_number: &str, name: &str) -> Result<()> {
        let url = self.endpoint(&["registerUser"])?;
        debug!("Registering {phone_number}");

        let response = self
            .http_client
            .post(url)
            .json(&RegisterRequest { phone_number, name })
            .send()
            .await?;
        check_status(response, "Failed to register user").await?;

        Ok(())
    }

    async fn conversations(&self, user_id: &str) -> Result<ConversationHistory> {
        let url = self.endpoint(&["allConversations", user_id])?;

        let response = self.http_client.get(url).send().await?;
        let response = check_status(response, "Failed to fetch conversations").await?;

        let history: ConversationHistory = response.json().await?;
        debug!("Fetched {} conversations", history.len());
        Ok(history)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;

    async fn send_code(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if body["otp"].as_str().map(str::len) != Some(6) {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Invalid OTP"})),
            );
        }
        match body["phoneNumber"].as_str() {
            Some("9876543210") => (
                StatusCode::OK,
                Json(json!({
                    "isExistingUser": true,
                    "userDetails": {"name": "Asha", "phoneNumber": "9876543210"}
                })),
            ),
            Some(_) => (StatusCode::OK, Json(json!({"isExistingUser": false}))),
            None => (StatusCode::BAD_REQUEST, Json(json!({}))),
        }
    }

    async fn register(Json(body): Json<Value>) -> StatusCode {
        if body["name"].as_str().is_some_and(|n| !n.is_empty()) {
            StatusCode::CREATED
        } else {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }

    async fn conversations(Path(user_id): Path<String>) -> (StatusCode, Json<Value>) {
        if user_id != "9876543210" {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "User not found"})),
            );
        }
        (
            StatusCode::OK,
            Json(json!({
                "9123456780_a": {
                    "summary": {"timestamp": "2024-03-01T10:15:00Z", "summary": "Courier"},
                    "conversation": [{"user": "parcel", "bot": "noted"}]
                },
                "9000000000_b": {
                    "summary": {"timestamp": "2024-03-02T10:15:00Z"},
                    "conversation": []
                }
            })),
        )
    }

    /// Start a stub backend on an ephemeral port.
    async fn stub_backend() -> HttpBackend {
        let app = Router::new()
            .route("/api/sendWhatsappMsg", post(send_code))
            .route("/api/registerUser", post(register))
            .route("/api/allConversations/{user_id}", get(conversations));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        HttpBackend::from_base_url(&format!("http://{addr}/api/")).unwrap()
    }

    #[tokio::test]
    async fn send_code_reports_existing_user() {
        let backend = stub_backend().await;

        let response = backend.send_code("9876543210", "123456").await.unwrap();
        assert_eq!(response.existing_user().unwrap().name, "Asha");

        let response = backend.send_code("9123456780", "123456").await.unwrap();
        assert!(response.existing_user().is_none());
    }

    #[tokio::test]
    async fn error_field_becomes_the_message() {
        let backend = stub_backend().await;

        let err = backend.send_code("9876543210", "12").await.unwrap_err();
        match err {
            Error::Backend { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid OTP");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_error_field_uses_fallback() {
        let backend = stub_backend().await;

        let err = backend.register("9876543210", "").await.unwrap_err();
        match err {
            Error::Backend { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Failed to register user");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_accepts_any_success_status() {
        let backend = stub_backend().await;
        backend.register("9876543210", "Asha").await.unwrap();
    }

    #[tokio::test]
    async fn conversations_are_newest_first() {
        let backend = stub_backend().await;

        let history = backend.conversations("9876543210").await.unwrap();
        let keys: Vec<&str> = history.records().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["9000000000_b", "9123456780_a"]);
    }

    #[tokio::test]
    async fn unknown_user_is_a_backend_error() {
        let backend = stub_backend().await;

        let err = backend.conversations("0000000000").await.unwrap_err();
        assert!(matches!(err, Error::Backend { status: 404, .. }));
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = HttpBackend::from_base_url(&format!("http://{addr}")).unwrap();
        let err = backend.register("9876543210", "Asha").await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }

    #[test]
    fn endpoint_joins_segments() {
        let backend = HttpBackend::from_base_url("https://api.example.com/v1").unwrap();
        assert_eq!(
            backend.endpoint(&["allConversations", "9876543210"]).unwrap().as_str(),
            "https://api.example.com/v1/allConversations/9876543210"
        );

        let backend = HttpBackend::from_base_url("https://api.example.com/").unwrap();
        assert_eq!(
            backend.endpoint(&["registerUser"]).unwrap().as_str(),
            "https://api.example.com/registerUser"
        );
    }

    #[test]
    fn non_hierarchical_base_is_rejected() {
        let backend = HttpBackend::from_base_url("mailto:ops@example.com").unwrap();
        assert!(matches!(
            backend.endpoint(&["registerUser"]),
            Err(Error::Config(_))
        ));
    }
}
