use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Post;

/// Priority bucket a feed item was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedTier {
    /// Unseen posts from followed authors.
    Followed,
    /// Unseen posts from everyone else.
    Others,
    /// Previously seen posts, used once the unseen pools run dry.
    Seen,
}

/// Bounds applied to incoming pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedLimits {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for FeedLimits {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

/// Raw pagination parameters as received from the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageRequest {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self { page, limit }
    }

    /// Clamp into a usable query. Malformed values are clamped, never rejected.
    pub fn resolve(self, limits: &FeedLimits) -> FeedQuery {
        let max_limit = limits.max_limit.max(1);
        let limit = match self.limit {
            Some(limit) => limit.clamp(1, max_limit as i64) as u64,
            None => limits.default_limit.clamp(1, max_limit),
        };
        let page = self.page.unwrap_or(1).max(1) as u64;

        FeedQuery { page, limit }
    }
}

/// Validated pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedQuery {
    pub page: u64,
    pub limit: u64,
}

/// Embedded author information on a feed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub is_following: bool,
}

/// A post decorated with viewer-relative flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub post: Post,
    pub tier: FeedTier,
    pub author: AuthorSummary,
    pub is_mine: bool,
    pub is_liked: bool,
    pub is_saved: bool,
    pub is_following: bool,
}

/// One assembled page of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub page: u64,
    pub limit: u64,
    /// Posts reachable by this viewer across all tiers.
    pub total: u64,
}

impl FeedPage {
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit)
    }

    pub fn post_ids(&self) -> Vec<Uuid> {
        self.items.iter().map(|item| item.post.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_clamped_to_bounds() {
        let limits = FeedLimits::default();

        assert_eq!(PageRequest::new(None, Some(0)).resolve(&limits).limit, 1);
        assert_eq!(PageRequest::new(None, Some(-5)).resolve(&limits).limit, 1);
        assert_eq!(PageRequest::new(None, Some(500)).resolve(&limits).limit, 100);
        assert_eq!(PageRequest::new(None, Some(42)).resolve(&limits).limit, 42);
    }

    #[test]
    fn test_missing_values_use_defaults() {
        let query = PageRequest::default().resolve(&FeedLimits::default());

        assert_eq!(query, FeedQuery { page: 1, limit: 20 });
    }

    #[test]
    fn test_page_is_floored_to_one() {
        let limits = FeedLimits::default();

        assert_eq!(PageRequest::new(Some(0), None).resolve(&limits).page, 1);
        assert_eq!(PageRequest::new(Some(-3), None).resolve(&limits).page, 1);
        assert_eq!(PageRequest::new(Some(7), None).resolve(&limits).page, 7);
    }

    #[test]
    fn test_default_limit_respects_max() {
        let limits = FeedLimits {
            default_limit: 50,
            max_limit: 10,
        };

        assert_eq!(PageRequest::default().resolve(&limits).limit, 10);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = FeedPage {
            items: Vec::new(),
            page: 1,
            limit: 3,
            total: 7,
        };

        assert_eq!(page.total_pages(), 3);
    }
}
