//! URL normalization for consistent cache keys.

/// Error type for URL normalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Normalize a URL string into the form used for cache keys.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Lowercase the host
/// 3. Remove fragment (#...)
/// 4. Keep query string intact (do not reorder)
///
/// Any scheme is accepted: non-http URLs still normalize so the interceptor
/// can look them up (and miss) before the policy bypasses them.
pub fn normalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    let lowered = parsed.host_str().map(|h| h.to_lowercase());
    if let Some(lowered) = lowered {
        parsed
            .set_host(Some(&lowered))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        let url = normalize("https://example.com").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_normalize_lowercase_host() {
        let url = normalize("https://EXAMPLE.COM/Path").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.path(), "/Path");
    }

    #[test]
    fn test_normalize_remove_fragment() {
        let url = normalize("https://example.com/page#section").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/page");
    }

    #[test]
    fn test_normalize_preserve_query() {
        let url = normalize("https://example.com?a=1&b=2").unwrap();
        assert_eq!(url.query(), Some("a=1&b=2"));
    }

    #[test]
    fn test_normalize_trim_whitespace() {
        let url = normalize("  https://example.com  ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_normalize_stable() {
        let first = normalize("https://Example.com/a?q=1#frag").unwrap();
        let second = normalize("https://example.com/a?q=1").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_normalize_non_http_scheme_accepted() {
        let url = normalize("chrome-extension://abcdef/popup.html").unwrap();
        assert_eq!(url.scheme(), "chrome-extension");
    }

    #[test]
    fn test_normalize_empty() {
        assert!(matches!(normalize(""), Err(UrlError::Empty)));
        assert!(matches!(normalize("   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_normalize_relative_rejected() {
        assert!(matches!(normalize("/app.js"), Err(UrlError::InvalidUrl(_))));
    }
}
