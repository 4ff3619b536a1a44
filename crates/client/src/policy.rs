//! Caching-eligibility policy.
//!
//! Decides, per URL, whether a fetched response may be written to the cache.
//! The filter is substring-based: an allow-list designates static media and
//! page assets, and a deny-list exempts endpoints that must stay live even
//! when an allow pattern matches.

/// URL substrings whose responses are eligible for caching.
pub const DEFAULT_ALLOW_SUBSTRINGS: &[&str] = &["/media/img/", "/media/page/", "https://i.ytimg.com/vi/"];

/// URL substrings that must never be cached, even when allowed above.
pub const DEFAULT_DENY_SUBSTRINGS: &[&str] = &["https://www.youtube.com/iframe_api"];

/// Marker identifying extension-internal origins.
const EXTENSION_MARKER: &str = "extension";

/// Why a response was fetched but not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassReason {
    /// Scheme is not http or https.
    NonHttpScheme,

    /// The URL points at (or mentions) an extension-internal origin.
    ExtensionOrigin,

    /// No allow pattern matched, or a deny pattern did.
    NotAllowed,
}

/// Outcome of the eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    /// Write a duplicate of the response to the active cache version.
    Store,

    /// Return the response without storing it.
    Bypass(BypassReason),
}

/// Substring allow/deny filter over normalized URLs.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    allow: Vec<String>,
    deny: Vec<String>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl CachePolicy {
    /// Build a policy from configured overrides.
    ///
    /// An empty override list means the built-in defaults apply.
    pub fn new(allow_overrides: Vec<String>, deny_overrides: Vec<String>) -> Self {
        let allow = if allow_overrides.is_empty() {
            DEFAULT_ALLOW_SUBSTRINGS.iter().map(|s| s.to_string()).collect()
        } else {
            allow_overrides
        };
        let deny = if deny_overrides.is_empty() {
            DEFAULT_DENY_SUBSTRINGS.iter().map(|s| s.to_string()).collect()
        } else {
            deny_overrides
        };
        Self { allow, deny }
    }

    /// Decide whether a response for `url` may be cached.
    ///
    /// `url` is the normalized URL string the entry would be keyed by.
    pub fn decide(&self, url: &str) -> CacheDecision {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            let reason = if url.starts_with("chrome-extension") {
                BypassReason::ExtensionOrigin
            } else {
                BypassReason::NonHttpScheme
            };
            return CacheDecision::Bypass(reason);
        }

        if url.contains(EXTENSION_MARKER) {
            return CacheDecision::Bypass(BypassReason::ExtensionOrigin);
        }

        let allowed = self.allow.iter().any(|pattern| url.contains(pattern));
        let denied = self.deny.iter().any(|pattern| url.contains(pattern));

        if allowed && !denied {
            CacheDecision::Store
        } else {
            CacheDecision::Bypass(BypassReason::NotAllowed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_media_img() {
        let policy = CachePolicy::default();
        assert_eq!(
            policy.decide("https://example.com/media/img/logo.png"),
            CacheDecision::Store
        );
    }

    #[test]
    fn test_decide_media_page() {
        let policy = CachePolicy::default();
        assert_eq!(
            policy.decide("https://example.com/media/page/about.html"),
            CacheDecision::Store
        );
    }

    #[test]
    fn test_decide_video_thumbnail_host() {
        let policy = CachePolicy::default();
        assert_eq!(
            policy.decide("https://i.ytimg.com/vi/X/thumb.jpg"),
            CacheDecision::Store
        );
    }

    #[test]
    fn test_decide_deny_wins_over_allow() {
        let policy = CachePolicy::new(
            vec!["youtube.com".to_string()],
            vec!["https://www.youtube.com/iframe_api".to_string()],
        );
        assert_eq!(
            policy.decide("https://www.youtube.com/iframe_api"),
            CacheDecision::Bypass(BypassReason::NotAllowed)
        );
    }

    #[test]
    fn test_decide_plain_page_not_allowed() {
        let policy = CachePolicy::default();
        assert_eq!(
            policy.decide("https://example.com/index.html"),
            CacheDecision::Bypass(BypassReason::NotAllowed)
        );
    }

    #[test]
    fn test_decide_chrome_extension() {
        let policy = CachePolicy::default();
        assert_eq!(
            policy.decide("chrome-extension://abcdef/popup.html"),
            CacheDecision::Bypass(BypassReason::ExtensionOrigin)
        );
    }

    #[test]
    fn test_decide_extension_marker_in_http_url() {
        let policy = CachePolicy::default();
        assert_eq!(
            policy.decide("https://example.com/media/img/extension/x.png"),
            CacheDecision::Bypass(BypassReason::ExtensionOrigin)
        );
    }

    #[test]
    fn test_decide_non_http_scheme() {
        let policy = CachePolicy::default();
        assert_eq!(
            policy.decide("data:text/plain,hello"),
            CacheDecision::Bypass(BypassReason::NonHttpScheme)
        );
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let policy = CachePolicy::new(vec!["/assets/".to_string()], Vec::new());
        assert_eq!(policy.decide("https://example.com/assets/app.js"), CacheDecision::Store);
        assert_eq!(
            policy.decide("https://example.com/media/img/logo.png"),
            CacheDecision::Bypass(BypassReason::NotAllowed)
        );
    }
}
