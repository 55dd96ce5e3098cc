//! DTOs for the link shortening endpoint.

use crate::utils::code_generator::ALIAS_REGEX;
use serde::Deserialize;
use validator::Validate;

/// Request body for `POST /api/shorten`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    /// The destination URL (absolute http/https).
    #[validate(url(message = "Invalid URL format"))]
    pub original_url: String,

    /// Optional alias used instead of a generated code.
    #[validate(length(min = 1, max = 64))]
    #[validate(regex(
        path = "*ALIAS_REGEX",
        message = "Alias can only contain letters, digits, underscores and hyphens"
    ))]
    pub custom_alias: Option<String>,

    /// Days until the link expires. Absent or 0 means permanent.
    #[validate(range(max = 3650))]
    pub expire_days: Option<u32>,
}
