//! API client for communicating with the Uliza Q&A REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Identity;

use super::{ApiError, QaService};

/// HTTP request timeout in seconds.
/// Answers can take a while to generate; 30s fails fast enough for good UX
/// while leaving headroom for slow completions.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Successful `/token` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Absent tokens are possible in principle and rejected by the auth flow.
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// JSON payload for `/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    username: String,
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    answer: String,
}

/// API client for the Uliza service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if response is successful, returning a normalized error if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl QaService for ApiClient {
    async fn verify_token(&self, token: &str) -> Result<Identity, ApiError> {
        let response = self
            .client
            .post(self.url("/token/verify"))
            .bearer_auth(token)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let verified: VerifyResponse = Self::parse_json(response).await?;
        debug!(username = %verified.username, "Token verified");
        Ok(Identity::new(verified.username))
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let response = self
            .client
            .post(self.url("/token"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::parse_json(response).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/register"))
            .json(request)
            .send()
            .await?;

        // Response body shape is service-defined; only the status matters here
        Self::check_response(response).await?;
        debug!(username = %request.username, "Registration accepted");
        Ok(())
    }

    async fn ask(&self, token: &str, question: &str) -> Result<String, ApiError> {
        let body = serde_json::json!({ "question": question });

        let response = self
            .client
            .post(self.url("/ask"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let parsed: AskResponse = Self::parse_json(response).await?;
        Ok(parsed.answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = ApiClient::new("http://localhost:8000/").expect("client should build");
        assert_eq!(client.url("/ask"), "http://localhost:8000/ask");

        let client = ApiClient::new("http://localhost:8000").expect("client should build");
        assert_eq!(client.url("/token/verify"), "http://localhost:8000/token/verify");
    }

    #[test]
    fn test_parse_login_response() {
        let json = r#"{"access_token": "eyJhbGciOi.fake.token", "token_type": "bearer"}"#;
        let parsed: LoginResponse = serde_json::from_str(json).expect("should parse");
        assert_eq!(parsed.access_token.as_deref(), Some("eyJhbGciOi.fake.token"));
        assert_eq!(parsed.token_type.as_deref(), Some("bearer"));
    }

    #[test]
    fn test_parse_login_response_without_token() {
        // A success response missing the token still parses; the auth flow
        // turns the absence into an error.
        let json = r#"{"access_token": null}"#;
        let parsed: LoginResponse = serde_json::from_str(json).expect("should parse");
        assert!(parsed.access_token.is_none());
    }

    #[test]
    fn test_register_request_wire_shape() {
        let request = RegisterRequest {
            username: "alice".to_string(),
            password: "hunter22".to_string(),
            email: "alice@example.com".to_string(),
            full_name: "Alice Example".to_string(),
        };
        let json = serde_json::to_value(&request).expect("should serialize");
        assert_eq!(json["username"], "alice");
        assert_eq!(json["full_name"], "Alice Example");
    }

    #[test]
    fn test_parse_verify_response() {
        let json = r#"{"username": "alice"}"#;
        let parsed: VerifyResponse = serde_json::from_str(json).expect("should parse");
        assert_eq!(parsed.username, "alice");
    }
}
