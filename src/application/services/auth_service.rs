//! Admin API key authentication.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Domain-separation key for the digests; the compared values are the
/// configured admin key and the presented key.
const DIGEST_KEY: &[u8] = b"shortlink-admin-api-key";

/// Service for authenticating admin requests.
///
/// The configured key is kept only as an HMAC-SHA256 digest. Presented keys
/// are digested the same way and compared in constant time with
/// [`Mac::verify_slice`].
pub struct AuthService {
    expected_digest: Vec<u8>,
}

impl AuthService {
    /// Creates an authentication service for `admin_api_key`.
    pub fn new(admin_api_key: &str) -> Self {
        let mut mac = Self::mac();
        mac.update(admin_api_key.as_bytes());

        Self {
            expected_digest: mac.finalize().into_bytes().to_vec(),
        }
    }

    fn mac() -> HmacSha256 {
        HmacSha256::new_from_slice(DIGEST_KEY).expect("HMAC accepts any key length")
    }

    /// Checks a presented admin key.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the key does not match.
    pub fn authenticate(&self, presented_key: &str) -> Result<(), AppError> {
        let mut mac = Self::mac();
        mac.update(presented_key.as_bytes());

        mac.verify_slice(&self.expected_digest).map_err(|_| {
            AppError::unauthorized("Unauthorized", json!({ "reason": "Invalid admin API key" }))
        })
    }
}
