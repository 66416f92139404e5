use reqwest::header::{HeaderValue, InvalidHeaderValue};
use url::Url;

/// Header carrying the per-request correlation ID
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// `Authorization: Bearer <token>` value, marked sensitive
pub fn bearer_header(token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Append an absolute API path to the base URL, keeping any path prefix
/// the base URL already has (`https://host/api` + `/auth/token/`).
pub fn api_url(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    let base = base.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Url::parse(&format!("{}/{}", base, path))
}

/// Percent-encode a value for use as a single path segment
pub fn path_segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
