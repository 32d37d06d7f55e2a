use serde::Deserialize;
use std::fmt;
use std::path::Path;

use crate::errors::{FcmError, FcmResult};

/// Google service-account key document.
///
/// Parsed once; the private key stays an opaque PEM string until it is used
/// for signing, so a broken key surfaces as a signing error on first use.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountCredential {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(rename = "private_key_id")]
    pub key_id: String,
}

impl ServiceAccountCredential {
    pub fn from_file(path: &Path) -> FcmResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            FcmError::Credential(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> FcmResult<Self> {
        let credential: ServiceAccountCredential =
            serde_json::from_str(raw).map_err(|e| FcmError::Credential(e.to_string()))?;
        if credential.project_id.is_empty() {
            return Err(FcmError::Credential("project_id is empty".to_string()));
        }
        if credential.client_email.is_empty() {
            return Err(FcmError::Credential("client_email is empty".to_string()));
        }
        Ok(credential)
    }
}

// keep the key material out of logs
impl fmt::Debug for ServiceAccountCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountCredential")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}
