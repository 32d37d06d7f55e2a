use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::cache::store::TokenStore;
use crate::cache::token_cache::TokenCache;
use crate::credentials::service_account::ServiceAccountCredential;
use crate::credentials::signer::sign_assertion;
use crate::errors::{FcmError, FcmResult};
use crate::helpers::time::now_i64;
use crate::messaging::error::ApiError;
use crate::observability::metrics::{get_metrics, ORIGIN_CACHE, ORIGIN_EXCHANGE};
use crate::utils::constants::{JWT_BEARER_GRANT_TYPE, SCOPE_FIREBASE_MESSAGING};

static AUTH_MSG: &str = "auth";
static TRANSPORT_MSG: &str = "transport";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Hands out bearer tokens: cached value first, signed-assertion exchange
/// when the cache is empty or a fresh token is forced.
#[derive(Debug, Clone)]
pub struct TokenProvider {
    credential: Arc<ServiceAccountCredential>,
    cache: TokenCache,
    client: Client,
    token_url: String,
    scope: String,
}

impl TokenProvider {
    pub fn new(
        credential: ServiceAccountCredential,
        store: Arc<dyn TokenStore>,
        client: Client,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            credential: Arc::new(credential),
            cache: TokenCache::new(store),
            client,
            token_url: token_url.into(),
            scope: SCOPE_FIREBASE_MESSAGING.to_string(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.credential.project_id
    }

    /// Return a bearer token. With `force_refresh` the cached token is dropped
    /// and the exchange endpoint is always called.
    pub async fn get_token(&self, force_refresh: bool) -> FcmResult<String> {
        let metrics = get_metrics().await;

        if force_refresh {
            if let Err(err) = self.cache.invalidate().await {
                warn!("token cache invalidation failed: {}", err);
            }
        } else {
            match self.cache.get_fresh().await {
                Ok(Some(token)) => {
                    metrics.token_fetches.with_label_values(&[ORIGIN_CACHE]).inc();
                    debug!("access token served from cache");
                    return Ok(token);
                }
                Ok(None) => debug!("no cached access token"),
                Err(err) => warn!("token cache read failed, requesting a new token: {}", err),
            }
        }

        info!(force_refresh, "requesting access token from {}", self.token_url);
        let response = self.exchange().await.inspect_err(|err| {
            let reason = match err {
                FcmError::Auth { .. } => AUTH_MSG,
                _ => TRANSPORT_MSG,
            };
            metrics.token_exchange_failures.with_label_values(&[reason]).inc();
        })?;
        metrics.token_fetches.with_label_values(&[ORIGIN_EXCHANGE]).inc();

        if let Err(err) = self.cache.store(&response.access_token, response.expires_in).await {
            warn!("token cache write failed: {}", err);
        }
        Ok(response.access_token)
    }

    async fn exchange(&self) -> FcmResult<TokenResponse> {
        let assertion = sign_assertion(&self.credential, &self.scope, &self.token_url, now_i64())?;
        let params = [
            ("grant_type", JWT_BEARER_GRANT_TYPE),
            ("assertion", assertion.as_str()),
        ];

        let response = self.client.post(&self.token_url).form(&params).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        let json: Value = serde_json::from_str(&body).map_err(|e| {
            FcmError::Transport(format!("token endpoint returned invalid JSON (status {}): {}", status, e))
        })?;

        // https://developers.google.com/identity/protocols/oauth2/service-account#error-codes
        if json.get("error").is_some() {
            error!("token endpoint rejected assertion: {}", body);
            return Err(FcmError::Auth {
                error: ApiError::from_response(status, &body),
                partial: None,
            });
        }

        serde_json::from_value(json).map_err(|e| {
            FcmError::Transport(format!("malformed token response (status {}): {}", status, e))
        })
    }
}
