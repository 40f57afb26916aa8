//! Fetch target validation.

/// Error type for URL validation failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse a URL string into a fetchable target.
///
/// 1. Trim leading/trailing whitespace
/// 2. Require an explicit http or https scheme
/// 3. Remove fragment (#...), which is never sent to the server
pub fn parse_target(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlError::InvalidUrl("missing host".into()));
    }

    parsed.set_fragment(None);

    Ok(parsed)
}
