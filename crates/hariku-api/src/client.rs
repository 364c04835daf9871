//! Bearer-authenticated REST client.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use hariku_core::{ApiError, ChatConfig, ChatMessage, UserId};

use crate::types::UserProfile;

/// REST client for the chat-adjacent backend endpoints.
///
/// Holds the bearer token for the signed-in user; one instance per
/// authenticated session.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// Build a client for the given backend and bearer token.
    pub fn new(config: &ChatConfig, token: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::new("/", "failed to build HTTP client").with_source(e))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            token: token.into(),
        })
    }

    /// Fetch one page of the conversation with `other_user_id`.
    ///
    /// Messages are returned oldest-first, the way the backend orders them.
    pub async fn get_messages(
        &self,
        other_user_id: UserId,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, ApiError> {
        let path = format!("/chat/messages/{other_user_id}");
        let query = [("skip", skip.to_string()), ("limit", limit.to_string())];
        self.get_json(&path, &query).await
    }

    /// The signed-in patient's assigned therapist, if any.
    ///
    /// The backend answers `200 null` for a patient without an assignment.
    pub async fn get_therapist(&self) -> Result<Option<UserProfile>, ApiError> {
        self.get_json("/therapist", &[]).await
    }

    /// The signed-in therapist's patient roster.
    pub async fn get_patients(&self) -> Result<Vec<UserProfile>, ApiError> {
        self.get_json("/patients", &[]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        debug!(path, "api request");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::new(path, "request failed").with_source(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(path, status = status.as_u16(), body, "api error response");
            return Err(
                ApiError::new(path, format!("HTTP {}", status.as_u16()))
                    .with_status(status.as_u16()),
            );
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::new(path, "invalid response body").with_source(e))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserRole;
    use assert_matches::assert_matches;

    fn client_for(uri: &str) -> ApiClient {
        let config = ChatConfig::with_base_url(uri);
        ApiClient::new(&config, "test-token").unwrap()
    }

    #[tokio::test]
    async fn get_messages_parses_history() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/chat/messages/3"))
            .and(wiremock::matchers::query_param("skip", "0"))
            .and(wiremock::matchers::query_param("limit", "100"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(
                serde_json::json!([
                    {"id": 1, "content": "hello", "sender_id": 7, "recipient_id": 3,
                     "timestamp": "2025-03-14T09:26:53.589793"},
                    {"id": 2, "content": "hi", "sender_id": 3, "recipient_id": 7,
                     "timestamp": "2025-03-14T09:27:02.112034"}
                ]),
            ))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let messages = client
            .get_messages(UserId::new(3), 0, 100)
            .await
            .unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[1].sender_id, UserId::new(3));
    }

    #[tokio::test]
    async fn get_messages_sends_bearer_token() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/chat/messages/9"))
            .and(wiremock::matchers::header(
                "authorization",
                "Bearer test-token",
            ))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!([])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let messages = client.get_messages(UserId::new(9), 0, 50).await.unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn get_therapist_some() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/therapist"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(
                serde_json::json!({
                    "id": 3, "name": "Dr. Sari", "email": "sari@hariku.app",
                    "role": "therapist", "image": null
                }),
            ))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let therapist = client.get_therapist().await.unwrap();
        let therapist = therapist.unwrap();
        assert_eq!(therapist.id, UserId::new(3));
        assert_eq!(therapist.role, UserRole::Therapist);
    }

    #[tokio::test]
    async fn get_therapist_unassigned_is_none() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/therapist"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_json(serde_json::Value::Null),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let therapist = client.get_therapist().await.unwrap();
        assert!(therapist.is_none());
    }

    #[tokio::test]
    async fn get_patients_roster() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/patients"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(
                serde_json::json!([
                    {"id": 7, "name": "Ana", "email": "ana@x.y", "role": "patient"},
                    {"id": 8, "name": "Budi", "email": "budi@x.y", "role": "patient"}
                ]),
            ))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let patients = client.get_patients().await.unwrap();
        assert_eq!(patients.len(), 2);
        assert_eq!(patients[1].name, "Budi");
    }

    #[tokio::test]
    async fn http_error_carries_status() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/patients"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client.get_patients().await.unwrap_err();
        assert_eq!(err.status, Some(500));
        assert_eq!(err.endpoint, "/patients");
    }

    #[tokio::test]
    async fn unauthorized_is_auth_failure() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/therapist"))
            .respond_with(wiremock::ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client.get_therapist().await.unwrap_err();
        assert!(err.is_auth_failure());
    }

    #[tokio::test]
    async fn unreachable_backend_has_no_status() {
        // Port 1 is never serving in the test environment
        let client = client_for("http://127.0.0.1:1");
        let err = client.get_patients().await.unwrap_err();
        assert_matches!(err.status, None);
    }

    #[tokio::test]
    async fn invalid_body_is_error() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/patients"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string("not json"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client.get_patients().await.unwrap_err();
        assert!(err.message.contains("invalid response body"));
    }
}
