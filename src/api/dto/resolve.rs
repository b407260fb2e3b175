//! DTOs for the resolution endpoint.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_with::{NoneAsEmptyString, serde_as};
use std::sync::LazyLock;
use validator::Validate;

/// A single path segment: no slashes, query or fragment delimiters, or whitespace.
static ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^/?#\s]+$").expect("valid regex"));

/// Query parameters for `GET /api/resolve`.
///
/// Geo values are optional hints; empty values and sentinels such as
/// `"Unknown"` or `"undefined"` are treated as absent.
#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ResolveQuery {
    #[validate(required(message = "domain is required"), length(min = 1, max = 253))]
    pub domain: Option<String>,

    #[validate(
        required(message = "alias is required"),
        length(min = 1, max = 128),
        regex(path = "*ALIAS_REGEX", message = "alias must be a single path segment")
    )]
    pub alias: Option<String>,

    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub ip: Option<String>,

    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub country: Option<String>,

    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub city: Option<String>,

    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub continent: Option<String>,
}

/// Where the caller should send the visitor.
///
/// `url` is either the final destination or an internal page path
/// (`/password/{alias}`, `/blocked?m=...`).
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub url: String,
    pub cloaking: bool,
}
