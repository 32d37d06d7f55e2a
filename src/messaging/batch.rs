use reqwest::Client;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::auth::provider::TokenProvider;
use crate::errors::{FcmError, FcmResult};
use crate::helpers::time::get_instant;
use crate::messaging::error::ApiError;
use crate::messaging::message::OutboundItem;
use crate::messaging::result::BatchResult;
use crate::observability::metrics::{get_metrics, OUTCOME_ERROR, OUTCOME_SENT, OUTCOME_UNREGISTERED};

static SEND_ENDPOINT: &str = "messages:send";

/// Pass of a batch. A batch runs `First`, and at most one `ForcedRetry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    First,
    ForcedRetry,
}

impl Pass {
    fn force_refresh(self) -> bool {
        self == Pass::ForcedRetry
    }
}

enum PassOutcome {
    Completed,
    /// Access token expired at this position; it and every later item go
    /// into the next pass.
    Requeue(usize),
}

/// Classified response of a single send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Sent(String),
    Unregistered(ApiError),
    Unauthenticated(ApiError),
    Failed(ApiError),
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    name: Option<String>,
}

/// Raw response of one item request.
#[derive(Debug)]
struct ItemResponse {
    status: u16,
    body: String,
}

/// Map a `messages:send` response to its outcome.
pub fn classify(status: u16, body: &str) -> Classification {
    if status == 200 {
        let name = serde_json::from_str::<SendResponse>(body)
            .ok()
            .and_then(|response| response.name)
            .unwrap_or_else(|| {
                warn!("send succeeded without a message name: {}", body);
                String::new()
            });
        return Classification::Sent(name);
    }

    let error = ApiError::from_response(status, body);
    if error.is_unregistered() {
        Classification::Unregistered(error)
    } else if error.is_unauthenticated() {
        Classification::Unauthenticated(error)
    } else {
        Classification::Failed(error)
    }
}

/// Sends batches concurrently and classifies every item.
#[derive(Debug, Clone)]
pub struct BatchSendEngine {
    provider: TokenProvider,
    client: Client,
    send_url: String,
}

impl BatchSendEngine {
    pub fn new(provider: TokenProvider, client: Client, fcm_url: &str) -> Self {
        let send_url = format!(
            "{}/v1/projects/{}/messages:send",
            fcm_url.trim_end_matches('/'),
            provider.project_id()
        );
        Self { provider, client, send_url }
    }

    pub fn send_url(&self) -> &str {
        &self.send_url
    }

    /// Send every item and classify the outcome per item id.
    ///
    /// When the messaging API reports an expired access token, the item that
    /// saw it and every item after it are sent once more with a freshly
    /// exchanged token; items classified before stay as they are. A second
    /// expired-token response fails the batch with [`FcmError::Auth`]
    /// carrying everything classified so far; any other failure of the
    /// token refresh fails it with [`FcmError::Batch`].
    pub async fn send_batch(&self, items: &[OutboundItem], validate_only: bool) -> FcmResult<BatchResult> {
        let mut result = BatchResult::new();
        if items.is_empty() {
            return Ok(result);
        }
        let mut pending = items;
        let mut pass = Pass::First;

        loop {
            match self.run_pass(pending, validate_only, pass, &mut result).await? {
                PassOutcome::Completed => {
                    info!(
                        sent = result.sent().len(),
                        unregistered = result.unregistered().len(),
                        errors = result.errors().len(),
                        "batch of {} items completed",
                        items.len()
                    );
                    return Ok(result);
                }
                PassOutcome::Requeue(position) => {
                    assert_eq!(pass, Pass::First, "forced-refresh pass requested another retry");
                    pending = &pending[position..];
                    pass = Pass::ForcedRetry;
                    get_metrics().await.batch_retry_passes.inc();
                    info!("access token expired mid-batch, re-sending {} items with a fresh token", pending.len());
                }
            }
        }
    }

    async fn run_pass(
        &self,
        items: &[OutboundItem],
        validate_only: bool,
        pass: Pass,
        result: &mut BatchResult,
    ) -> FcmResult<PassOutcome> {
        let metrics = get_metrics().await;
        let token = self.provider
            .get_token(pass.force_refresh())
            .await
            .map_err(|err| attach_partial(err, pass, result))?;

        // dispatch everything first, then collect in submission order
        let mut handles: Vec<JoinHandle<Result<ItemResponse, reqwest::Error>>> = items
            .iter()
            .map(|item| self.dispatch(item, &token, validate_only))
            .collect();

        for position in 0..items.len() {
            let item = &items[position];
            let classification = match (&mut handles[position]).await {
                Ok(Ok(response)) => classify(response.status, &response.body),
                Ok(Err(err)) => Classification::Failed(ApiError::transport(err.to_string())),
                Err(err) => Classification::Failed(ApiError::transport(format!("request task failed: {}", err))),
            };

            match classification {
                Classification::Sent(name) => {
                    metrics.batch_items.with_label_values(&[OUTCOME_SENT]).inc();
                    result.add_to_sent(&item.id, name);
                }
                Classification::Unregistered(error) => {
                    metrics.batch_items.with_label_values(&[OUTCOME_UNREGISTERED]).inc();
                    debug!(item = %item.id, "recipient unregistered: {}", error);
                    result.add_to_unregistered(&item.id, error);
                }
                Classification::Unauthenticated(error) => {
                    abort_all(&handles[position + 1..]);
                    match pass {
                        Pass::First => {
                            warn!(item = %item.id, "access token rejected: {}", error);
                            return Ok(PassOutcome::Requeue(position));
                        }
                        Pass::ForcedRetry => {
                            metrics.batch_items.with_label_values(&[OUTCOME_ERROR]).inc();
                            result.add_to_errors(&item.id, error.clone());
                            return Err(FcmError::Auth {
                                error,
                                partial: Some(std::mem::take(result)),
                            });
                        }
                    }
                }
                Classification::Failed(error) => {
                    metrics.batch_items.with_label_values(&[OUTCOME_ERROR]).inc();
                    warn!(
                        item = %item.id,
                        recipient = %item.recipient(),
                        "send failed with status {}: {}",
                        error.http_status,
                        error.raw_body
                    );
                    result.add_to_errors(&item.id, error);
                }
            }
        }

        Ok(PassOutcome::Completed)
    }

    fn dispatch(
        &self,
        item: &OutboundItem,
        token: &str,
        validate_only: bool,
    ) -> JoinHandle<Result<ItemResponse, reqwest::Error>> {
        let request = self.client
            .post(&self.send_url)
            .bearer_auth(token)
            .json(&item.to_request(validate_only));
        let item_id = item.id.clone();

        tokio::spawn(async move {
            let start = get_instant();
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            get_metrics().await
                .item_request_duration
                .with_label_values(&[SEND_ENDPOINT])
                .observe(start.elapsed().as_secs_f64());
            debug!(item = %item_id, status, "send response: {}", body);
            Ok::<_, reqwest::Error>(ItemResponse { status, body })
        })
    }
}

/// Requests of an abandoned pass are not awaited.
fn abort_all(handles: &[JoinHandle<Result<ItemResponse, reqwest::Error>>]) {
    for handle in handles {
        handle.abort();
    }
}

/// A token failure keeps whatever earlier passes classified.
fn attach_partial(err: FcmError, pass: Pass, result: &mut BatchResult) -> FcmError {
    match (err, pass) {
        (FcmError::Auth { error, partial: None }, _) => FcmError::Auth {
            error,
            partial: Some(std::mem::take(result)),
        },
        (other, Pass::ForcedRetry) => FcmError::Batch {
            source: Box::new(other),
            partial: std::mem::take(result),
        },
        (other, Pass::First) => other,
    }
}
