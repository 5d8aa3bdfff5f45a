//! HTTP helper functions for the Crux Core
//!
//! Every device request ends up as a [`TransportOutcome`] before any
//! handler looks at it, so handlers never touch `crux_http` types.

use crux_http::{HttpError, Response};

use crate::types::TransportOutcome;

/// Base URL for device API endpoints.
///
/// NOTE: This is a dummy prefix required because `crux_http` (v0.16.0-rc2) requires
/// absolute URLs and rejects relative paths (`RelativeUrlWithoutBase` error).
/// Shells strip this prefix and resolve the remaining path against the
/// device origin they are connected to.
pub const BASE_URL: &str = "https://relative";

/// Constructs the full address from a given endpoint.
///
/// # Arguments
/// * `endpoint` - The API endpoint path (e.g., "/api/config")
///
/// # Returns
/// A string containing the full URL with dummy prefix
///
/// # Example
/// ```
/// use pax_console_core::http_helpers::build_url;
/// let url = build_url("/api/config");
/// assert_eq!(url, "https://relative/api/config");
/// ```
pub fn build_url(endpoint: &str) -> String {
    format!("{BASE_URL}{endpoint}")
}

/// Strips [`BASE_URL`] again, leaving the path the device understands.
pub fn endpoint_of(url: &str) -> &str {
    url.strip_prefix(BASE_URL).unwrap_or(url)
}

/// Collapses a finished `crux_http` request into a [`TransportOutcome`].
///
/// `crux_http` hands 4xx/5xx answers back as [`HttpError::Http`]; those still
/// carry the device's status and body. Any other error (DNS, refused
/// connection, timeout, ...) is a `NetworkError`.
pub fn transport_outcome(result: crux_http::Result<Response<Vec<u8>>>) -> TransportOutcome {
    match result {
        Ok(mut response) => {
            let status: u16 = response.status().into();
            let body = response
                .take_body()
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .unwrap_or_default();
            TransportOutcome::from_status(status, body)
        }
        Err(HttpError::Http { code, body, .. }) => TransportOutcome::Failure {
            status: code.into(),
            body: String::from_utf8_lossy(&body.unwrap_or_default()).into_owned(),
        },
        Err(e) => TransportOutcome::NetworkError {
            message: e.to_string(),
        },
    }
}
