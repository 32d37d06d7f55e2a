use thiserror::Error;

use crate::messaging::error::ApiError;
use crate::messaging::result::BatchResult;

/// FCM client error types
#[derive(Error, Debug)]
pub enum FcmError {
    /// The service-account key document could not be read or parsed.
    #[error("invalid service account credential: {0}")]
    Credential(String),

    /// The assertion could not be signed. Never retried.
    #[error("failed to sign assertion: {0}")]
    Signing(String),

    /// The token endpoint rejected the assertion, or the messaging API
    /// rejected a freshly minted token. `partial` carries whatever a batch
    /// classified before the failure.
    #[error("authentication failed: {error}")]
    Auth {
        error: ApiError,
        partial: Option<BatchResult>,
    },

    #[error("transport failure: {0}")]
    Transport(String),

    /// Error response of a single (non-batch) API call.
    #[error("FCM API error: {0}")]
    Api(ApiError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("token store failure: {0}")]
    Store(String),

    /// A batch stopped on a non-authentication failure (signing, transport)
    /// after some items were already classified.
    #[error("batch aborted: {source}")]
    Batch {
        source: Box<FcmError>,
        partial: BatchResult,
    },
}

impl FcmError {
    /// Partial batch result attached to a terminal batch failure.
    pub fn partial_result(&self) -> Option<&BatchResult> {
        match self {
            FcmError::Auth { partial, .. } => partial.as_ref(),
            FcmError::Batch { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FcmError {
    fn from(err: reqwest::Error) -> Self {
        FcmError::Transport(err.to_string())
    }
}

pub type FcmResult<T> = Result<T, FcmError>;
