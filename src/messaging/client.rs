use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::provider::TokenProvider;
use crate::cache::build_store;
use crate::cache::store::TokenStore;
use crate::config::settings::{EndpointsConfig, HttpConfig, ServiceConfig};
use crate::credentials::service_account::ServiceAccountCredential;
use crate::errors::{FcmError, FcmResult};
use crate::messaging::batch::BatchSendEngine;
use crate::messaging::error::ApiError;
use crate::messaging::message::{OutboundItem, Target};
use crate::messaging::result::BatchResult;
use crate::utils::constants::ACCESS_TOKEN_AUTH_HEADER;

/// Response of an Instance ID relationship call.
///
/// The batch endpoints answer 200 even when individual tokens fail; the
/// per-token outcome is only in `body` (`{"results": [{}, {"error": ...}]}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationResponse {
    pub http_status: u16,
    pub body: Value,
}

impl RelationResponse {
    pub fn is_success(&self) -> bool {
        self.http_status == 200
    }
}

#[derive(Debug)]
struct RawResponse {
    status: u16,
    body: String,
}

/// Firebase Cloud Messaging client.
///
/// Single calls (`send_to_topic`, `get_info`, topic relationships) do not
/// retry on an expired token; call again, or call [`Messaging::get_token`]
/// with `force_refresh` first.
#[derive(Debug, Clone)]
pub struct Messaging {
    provider: TokenProvider,
    engine: BatchSendEngine,
    client: Client,
    iid_url: String,
}

impl Messaging {
    /// Create a client from a token store and the path of a service-account
    /// key file.
    pub fn new(
        cache: Arc<dyn TokenStore>,
        credential_path: impl AsRef<Path>,
        endpoints: &EndpointsConfig,
        http: &HttpConfig,
    ) -> FcmResult<Self> {
        let credential = ServiceAccountCredential::from_file(credential_path.as_ref())?;
        Self::with_credential(cache, credential, endpoints, http)
    }

    pub fn with_credential(
        cache: Arc<dyn TokenStore>,
        credential: ServiceAccountCredential,
        endpoints: &EndpointsConfig,
        http: &HttpConfig,
    ) -> FcmResult<Self> {
        let client = Client::builder()
            .user_agent(format!("fcm-courier/{}", env!("CARGO_PKG_VERSION")))
            .timeout(http.timeout())
            .build()
            .map_err(|e| FcmError::Transport(format!("failed to build HTTP client: {}", e)))?;

        let provider = TokenProvider::new(credential, cache, client.clone(), endpoints.token_url.clone());
        let engine = BatchSendEngine::new(provider.clone(), client.clone(), &endpoints.fcm_url);
        debug!(project_id = %provider.project_id(), "messaging client ready");

        Ok(Self {
            provider,
            engine,
            client,
            iid_url: endpoints.iid_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(cfg: &ServiceConfig) -> FcmResult<Self> {
        Self::new(build_store(&cfg.cache), &cfg.credentials_path, &cfg.endpoints, &cfg.http)
    }

    pub fn token_provider(&self) -> &TokenProvider {
        &self.provider
    }

    pub fn project_id(&self) -> &str {
        self.provider.project_id()
    }

    pub async fn get_token(&self, force_refresh: bool) -> FcmResult<String> {
        self.provider.get_token(force_refresh).await
    }

    /// See [`BatchSendEngine::send_batch`].
    pub async fn send_batch(&self, items: &[OutboundItem], validate_only: bool) -> FcmResult<BatchResult> {
        self.engine.send_batch(items, validate_only).await
    }

    pub async fn send_all(&self, items: &[OutboundItem]) -> FcmResult<BatchResult> {
        self.send_batch(items, false).await
    }

    /// Dry-run a batch; `unregistered` then lists tokens that can be pruned
    /// without anything being delivered.
    pub async fn validate_all(&self, items: &[OutboundItem]) -> FcmResult<BatchResult> {
        self.send_batch(items, true).await
    }

    /// Send one message to a topic. Returns whether the API answered 200.
    pub async fn send_to_topic(&self, item: &OutboundItem) -> FcmResult<bool> {
        if !matches!(item.target, Target::Topic(_)) {
            return Err(FcmError::InvalidArgument(format!(
                "message '{}' does not target a topic",
                item.id
            )));
        }
        let body = serde_json::to_value(item.to_request(false))
            .map_err(|e| FcmError::InvalidArgument(e.to_string()))?;
        let response = self.call(Method::POST, self.engine.send_url(), Some(&body), false).await?;
        if response.status != 200 {
            warn!(topic = %item.recipient(), "topic send failed with status {}: {}", response.status, response.body);
        }
        Ok(response.status == 200)
    }

    /// Instance ID metadata of a registration token; with `with_details`
    /// the response includes the token's topic subscriptions.
    pub async fn get_info(&self, token: &str, with_details: bool) -> FcmResult<Value> {
        let mut url = format!("{}/iid/info/{}", self.iid_url, token);
        if with_details {
            url.push_str("?details=true");
        }
        let response = self.call(Method::GET, &url, None, true).await?;
        if response.status != 200 {
            return Err(FcmError::Api(ApiError::from_response(response.status, &response.body)));
        }
        serde_json::from_str(&response.body)
            .map_err(|e| FcmError::Transport(format!("invalid info response: {}", e)))
    }

    pub async fn subscribe_to_topic(&self, token: &str, topic: &str) -> FcmResult<bool> {
        let url = format!("{}/iid/v1/{}/rel/topics/{}", self.iid_url, token, topic);
        let response = self.call(Method::POST, &url, None, true).await?;
        Ok(response.status == 200)
    }

    pub async fn subscribe_many_to_topic(&self, tokens: &[String], topic: &str) -> FcmResult<RelationResponse> {
        self.relation_batch("batchAdd", tokens, topic).await
    }

    pub async fn unsubscribe_from_topic(&self, tokens: &[String], topic: &str) -> FcmResult<RelationResponse> {
        self.relation_batch("batchRemove", tokens, topic).await
    }

    async fn relation_batch(&self, action: &str, tokens: &[String], topic: &str) -> FcmResult<RelationResponse> {
        let url = format!("{}/iid/v1:{}", self.iid_url, action);
        let body = json!({
            "to": format!("/topics/{}", topic),
            "registration_tokens": tokens,
        });
        let response = self.call(Method::POST, &url, Some(&body), true).await?;
        let body = serde_json::from_str(&response.body).unwrap_or(Value::String(response.body));
        Ok(RelationResponse { http_status: response.status, body })
    }

    async fn call(&self, method: Method, url: &str, json: Option<&Value>, iid: bool) -> FcmResult<RawResponse> {
        let token = self.provider.get_token(false).await?;
        let mut request = self.client.request(method.clone(), url).bearer_auth(token);
        if iid {
            request = request.header(ACCESS_TOKEN_AUTH_HEADER, "true");
        }
        if let Some(json) = json {
            request = request.json(json);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("response for {} request to {} with status {}: {}", method, url, status, body);
        Ok(RawResponse { status, body })
    }
}
