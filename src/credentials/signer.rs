use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::credentials::service_account::ServiceAccountCredential;
use crate::errors::{FcmError, FcmResult};
use crate::utils::constants::{ASSERTION_BACKDATE_SECS, ASSERTION_LIFETIME_SECS};

/// Claim set of the assertion exchanged for an access token.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl AssertionClaims {
    pub fn new(credential: &ServiceAccountCredential, scope: &str, audience: &str, now: i64) -> Self {
        let iat = now - ASSERTION_BACKDATE_SECS;
        Self {
            iss: credential.client_email.clone(),
            scope: scope.to_string(),
            aud: audience.to_string(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }
}

/// Build and sign an RS256 assertion `header.claims.signature`.
///
/// `audience` is the token-exchange endpoint URL. A key that cannot be
/// parsed or used is a [`FcmError::Signing`]; nothing is sent in that case.
pub fn sign_assertion(
    credential: &ServiceAccountCredential,
    scope: &str,
    audience: &str,
    now: i64,
) -> FcmResult<String> {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(credential.key_id.clone());

    let encoding_key = EncodingKey::from_rsa_pem(credential.private_key.as_bytes())
        .map_err(|e| FcmError::Signing(format!("cannot parse private key: {}", e)))?;

    let claims = AssertionClaims::new(credential, scope, audience, now);
    encode(&header, &claims, &encoding_key)
        .map_err(|e| FcmError::Signing(format!("cannot sign assertion: {}", e)))
}
