//! Destination URL validation.

use url::Url;

/// Longest destination URL accepted.
pub const MAX_URL_LENGTH: usize = 2048;

/// Reasons a destination URL is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,

    #[error("URL exceeds {MAX_URL_LENGTH} characters")]
    TooLong,

    #[error("URL must not contain control characters")]
    ControlCharacter,
}

/// Checks that `input` is an absolute http(s) URL with a host.
///
/// The URL is stored exactly as given; this only rejects values the service
/// must never redirect to, such as `javascript:` or relative paths.
///
/// Control characters are rejected before parsing: the parser strips tabs and
/// newlines, but the stored value must be a valid `Location` header.
pub fn validate_url(input: &str) -> Result<(), UrlValidationError> {
    if input.len() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong);
    }

    if input.chars().any(char::is_control) {
        return Err(UrlValidationError::ControlCharacter);
    }

    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(UrlValidationError::MissingHost),
    }
}
