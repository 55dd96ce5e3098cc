//! Short code generation and alias validation.

use crate::error::AppError;
use base64::Engine as _;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

/// Random bytes per generated code; 6 bytes encode to exactly 8 base64 characters.
const CODE_LENGTH_BYTES: usize = 6;

/// Length of a generated short code.
pub const GENERATED_CODE_LENGTH: usize = 8;

/// Longest accepted custom alias.
pub const MAX_ALIAS_LENGTH: usize = 64;

/// Characters allowed in a custom alias (same alphabet as generated codes).
pub static ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("alias regex is valid"));

/// Aliases that would shadow service routes.
const RESERVED_ALIASES: &[&str] = &["api", "admin", "health", "static", "favicon.ico"];

/// Generates a random 8-character URL-safe short code.
///
/// Uses `getrandom` for entropy and URL-safe base64 without padding, so the
/// alphabet is `[A-Za-z0-9_-]` (48 bits per code).
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
pub fn generate_code() -> String {
    let mut buffer = [0u8; CODE_LENGTH_BYTES];

    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");

    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer)
}

/// Validates a user-provided alias.
///
/// # Rules
///
/// - Length: 1-64 characters
/// - Allowed characters: ASCII letters, digits, `_` and `-`
/// - Cannot be a reserved route name (case-insensitive)
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_alias(alias: &str) -> Result<(), AppError> {
    if alias.is_empty() || alias.len() > MAX_ALIAS_LENGTH {
        return Err(AppError::bad_request(
            format!("Alias must be 1-{} characters", MAX_ALIAS_LENGTH),
            json!({ "provided_length": alias.len() }),
        ));
    }

    if !ALIAS_REGEX.is_match(alias) {
        return Err(AppError::bad_request(
            "Alias can only contain letters, digits, underscores and hyphens",
            json!({ "alias": alias }),
        ));
    }

    if RESERVED_ALIASES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(alias))
    {
        return Err(AppError::bad_request(
            "This alias is reserved",
            json!({ "alias": alias }),
        ));
    }

    Ok(())
}
