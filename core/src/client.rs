//! Request executor for the REST API.
//!
//! # Design
//! `SdkClient` holds the resolved configuration and a transport, both behind
//! `Arc` and never mutated, so clones and concurrent calls share them freely.
//! Every call goes through the same three steps:
//!
//! 1. `build_request` merges configuration and call-site options into an
//!    `HttpRequest` without touching the network.
//! 2. `execute` runs it through the transport under the configured deadline
//!    and turns every failure into an `SdkError`.
//! 3. `request` decodes the JSON body of a successful response.
//!
//! The deadline timer lives inside the call's own future. It is dropped when
//! the call returns, whichever way it returns, so it can never fire for a
//! call that has already finished.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{ClientConfig, EffectiveConfig};
use crate::error::{ConfigError, SdkError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
use crate::transport::ReqwestTransport;
use crate::types::{NewUser, User, UserPatch};

const CONTENT_TYPE: &str = "Content-Type";
const AUTHORIZATION: &str = "Authorization";
const JSON: &str = "application/json";

/// Per-call overrides.
///
/// `headers` are applied last and win every collision, `Authorization`
/// included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOptions {
    pub method: HttpMethod,
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self::new(HttpMethod::Get)
    }
}

impl CallOptions {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get() -> Self {
        Self::new(HttpMethod::Get)
    }

    pub fn delete() -> Self {
        Self::new(HttpMethod::Delete)
    }

    pub fn post<B: Serialize + ?Sized>(body: &B) -> Result<Self, SdkError> {
        Self::new(HttpMethod::Post).json(body)
    }

    pub fn patch<B: Serialize + ?Sized>(body: &B) -> Result<Self, SdkError> {
        Self::new(HttpMethod::Patch).json(body)
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, SdkError> {
        let body = serde_json::to_string(body).map_err(|e| {
            warn!(error = %e, "request body could not be serialized");
            SdkError::unknown()
        })?;
        self.body = Some(body);
        Ok(self)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A decoded response together with its status and headers.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

/// Asynchronous client for the REST API.
#[derive(Clone)]
pub struct SdkClient {
    config: Arc<EffectiveConfig>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for SdkClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkClient")
            .field("base_url", &self.config.base_url())
            .field("timeout_ms", &self.config.timeout_ms())
            .finish_non_exhaustive()
    }
}

impl SdkClient {
    /// Build a client that talks HTTP through `reqwest`.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Self::with_transport(config, Arc::new(ReqwestTransport::default()))
    }

    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            config: Arc::new(EffectiveConfig::resolve(config)?),
            transport,
        })
    }

    /// A copy of the effective configuration.
    pub fn config(&self) -> EffectiveConfig {
        EffectiveConfig::clone(&self.config)
    }

    /// Merge configuration and `options` into a request for `endpoint`.
    ///
    /// `endpoint` is appended to the base URL as-is and should start with `/`.
    pub fn build_request(&self, endpoint: &str, options: &CallOptions) -> HttpRequest {
        let mut headers = Vec::new();
        set_header(&mut headers, CONTENT_TYPE, JSON);
        for (name, value) in self.config.headers() {
            set_header(&mut headers, name, value);
        }
        set_header(
            &mut headers,
            AUTHORIZATION,
            &format!("Bearer {}", self.config.api_key()),
        );
        for (name, value) in &options.headers {
            set_header(&mut headers, name, value);
        }

        HttpRequest {
            method: options.method,
            url: format!("{}{endpoint}", self.config.base_url()),
            headers,
            body: options.body.clone(),
        }
    }

    /// Send a request and return the raw response if its status is 2xx.
    #[tracing::instrument(skip(self, options), fields(method = options.method.as_str()))]
    pub async fn execute(
        &self,
        endpoint: &str,
        options: CallOptions,
    ) -> Result<HttpResponse, SdkError> {
        let request = self.build_request(endpoint, &options);
        debug!(url = %request.url, "dispatching request");

        let cancel = CancellationToken::new();
        let deadline = tokio::time::sleep(self.config.timeout());
        tokio::pin!(deadline);

        let outcome = tokio::select! {
            biased;
            result = self.transport.send(request, cancel.clone()) => result,
            () = &mut deadline => {
                cancel.cancel();
                Err(TransportError::Cancelled)
            }
        };

        let response = outcome.map_err(|err| self.classify(err))?;
        debug!(status = response.status, "response received");

        if !response.is_success() {
            warn!(status = response.status, reason = %response.status_text, "API request failed");
            return Err(SdkError::api(response.status, &response.status_text));
        }
        Ok(response)
    }

    /// Send a request and decode the JSON body of the response.
    ///
    /// An empty body decodes as JSON `null`, so `T = ()` or `Option<_>`
    /// accepts it.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: CallOptions,
    ) -> Result<ApiResponse<T>, SdkError> {
        let response = self.execute(endpoint, options).await?;
        let data = decode(&response.body)?;
        Ok(ApiResponse {
            data,
            status: response.status,
            headers: response.headers,
        })
    }

    /// Typed access to the collection at `/{name}`.
    pub fn resource<T>(&self, name: &str) -> Resource<'_, T> {
        Resource {
            client: self,
            path: format!("/{}", name.trim_matches('/')),
            _marker: PhantomData,
        }
    }

    pub async fn get_user(&self, id: u64) -> Result<User, SdkError> {
        self.users().get(id).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, SdkError> {
        self.users().list().await
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User, SdkError> {
        self.users().create(user).await
    }

    pub async fn update_user(&self, id: u64, patch: &UserPatch) -> Result<User, SdkError> {
        self.users().update(id, patch).await
    }

    pub async fn delete_user(&self, id: u64) -> Result<(), SdkError> {
        self.users().remove(id).await
    }

    fn users(&self) -> Resource<'_, User> {
        self.resource("users")
    }

    fn classify(&self, err: TransportError) -> SdkError {
        match err {
            TransportError::Cancelled => {
                warn!(timeout_ms = self.config.timeout_ms(), "request timed out");
                SdkError::timeout(self.config.timeout_ms())
            }
            TransportError::Network(message) => {
                debug!(%message, "transport failed");
                SdkError::network(message)
            }
            TransportError::Other(message) => {
                debug!(%message, "unclassified transport failure");
                SdkError::unknown()
            }
        }
    }
}

/// The five REST verbs over one collection, decoding items as `T`.
#[derive(Debug)]
pub struct Resource<'a, T> {
    client: &'a SdkClient,
    path: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Resource<'_, T> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub async fn get(&self, id: impl fmt::Display) -> Result<T, SdkError> {
        let endpoint = format!("{}/{id}", self.path);
        Ok(self.client.request(&endpoint, CallOptions::get()).await?.data)
    }

    pub async fn list(&self) -> Result<Vec<T>, SdkError> {
        Ok(self.client.request(&self.path, CallOptions::get()).await?.data)
    }

    pub async fn create<B: Serialize + ?Sized>(&self, payload: &B) -> Result<T, SdkError> {
        let options = CallOptions::post(payload)?;
        Ok(self.client.request(&self.path, options).await?.data)
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: impl fmt::Display,
        patch: &B,
    ) -> Result<T, SdkError> {
        let endpoint = format!("{}/{id}", self.path);
        let options = CallOptions::patch(patch)?;
        Ok(self.client.request(&endpoint, options).await?.data)
    }

    /// Delete an item. Whatever body the server sends back is ignored.
    pub async fn remove(&self, id: impl fmt::Display) -> Result<(), SdkError> {
        let endpoint = format!("{}/{id}", self.path);
        self.client.execute(&endpoint, CallOptions::delete()).await?;
        Ok(())
    }
}

/// Insert or replace a header, matching names case-insensitively.
fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    match headers
        .iter_mut()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
    {
        Some(entry) => *entry = (name.to_string(), value.to_string()),
        None => headers.push((name.to_string(), value.to_string())),
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, SdkError> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| SdkError::network(e.to_string()))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn send(
            &self,
            _request: HttpRequest,
            _cancel: CancellationToken,
        ) -> Result<HttpResponse, TransportError> {
            Err(TransportError::Network("unreachable".to_string()))
        }
    }

    fn client_with(config: ClientConfig) -> SdkClient {
        SdkClient::with_transport(config, Arc::new(Unreachable)).unwrap()
    }

    fn client() -> SdkClient {
        client_with(ClientConfig::new("test-key").base_url("http://localhost:3000"))
    }

    #[test]
    fn build_get_produces_correct_request() {
        let req = client().build_request("/users/1", &CallOptions::get());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/users/1");
        assert!(req.body.is_none());
        assert_eq!(
            req.headers,
            vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), "Bearer test-key".to_string()),
            ]
        );
    }

    #[test]
    fn build_post_carries_serialized_body() {
        let input = NewUser {
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            username: None,
        };
        let req = client().build_request("/users", &CallOptions::post(&input).unwrap());
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/users");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"name":"Jane","email":"jane@example.com"}));
    }

    #[test]
    fn build_delete_has_no_body() {
        let req = client().build_request("/users/1", &CallOptions::delete());
        assert_eq!(req.method, HttpMethod::Delete);
        assert!(req.body.is_none());
    }

    #[test]
    fn default_headers_are_sent() {
        let client = client_with(ClientConfig::new("k").header("X-Custom-Header", "custom-value"));
        let req = client.build_request("/users", &CallOptions::get());
        assert_eq!(req.header("X-Custom-Header"), Some("custom-value"));
        assert_eq!(req.header("Authorization"), Some("Bearer k"));
    }

    #[test]
    fn authorization_overrides_default_headers() {
        let client = client_with(ClientConfig::new("k").header("authorization", "Basic abc"));
        let req = client.build_request("/users", &CallOptions::get());
        assert_eq!(req.header("Authorization"), Some("Bearer k"));
        assert_eq!(
            req.headers
                .iter()
                .filter(|(name, _)| name.eq_ignore_ascii_case("authorization"))
                .count(),
            1
        );
    }

    #[test]
    fn call_site_headers_win_every_collision() {
        let client = client_with(ClientConfig::new("k").header("X-Trace", "config"));
        let options = CallOptions::get()
            .header("authorization", "Bearer other")
            .header("x-trace", "call")
            .header("Content-Type", "text/plain");
        let req = client.build_request("/users", &options);
        assert_eq!(req.header("Authorization"), Some("Bearer other"));
        assert_eq!(req.header("X-Trace"), Some("call"));
        assert_eq!(req.header("Content-Type"), Some("text/plain"));
        assert_eq!(req.headers.len(), 3);
    }

    #[test]
    fn resource_path_is_normalized() {
        let client = client();
        assert_eq!(client.resource::<User>("users").path(), "/users");
        assert_eq!(client.resource::<User>("/posts/").path(), "/posts");
    }

    #[test]
    fn config_returns_a_copy() {
        let client = client();
        let config = client.config();
        drop(config);
        assert_eq!(client.config().base_url(), "http://localhost:3000");
        assert_eq!(client.config().api_key(), "test-key");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let rendered = format!("{:?}", client());
        assert!(!rendered.contains("test-key"));
        assert!(rendered.contains("localhost:3000"));
    }

    #[test]
    fn construction_rejects_empty_api_key() {
        let err = SdkClient::with_transport(ClientConfig::new(""), Arc::new(Unreachable)).unwrap_err();
        assert_eq!(err, ConfigError::MissingApiKey);
    }

    #[test]
    fn empty_body_decodes_as_null() {
        assert!(decode::<()>("").is_ok());
        let missing: Option<User> = decode("  ").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn malformed_body_is_a_network_error() {
        let err = decode::<User>("not json").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NetworkError);
    }
}
