//! Media URL resolution.

use feedline_core::ports::MediaResolver;

/// Resolves media ids by joining them onto a CDN or storage base URL.
///
/// Ids that already are absolute URLs pass through unchanged.
#[derive(Debug, Clone)]
pub struct UrlPrefixMediaResolver {
    base_url: String,
}

impl UrlPrefixMediaResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }
}

impl MediaResolver for UrlPrefixMediaResolver {
    fn resolve(&self, media_id: &str) -> String {
        if media_id.starts_with("http://") || media_id.starts_with("https://") {
            return media_id.to_string();
        }
        format!("{}/{}", self.base_url, media_id.trim_start_matches('/'))
    }
}
