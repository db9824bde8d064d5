//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use feedline_core::domain::FeedLimits;
use feedline_infra::JwtConfig;
#[cfg(feature = "postgres")]
use feedline_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    pub feed: FeedLimits,
    pub jwt: JwtConfig,
    pub media_base_url: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        #[cfg(feature = "postgres")]
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let defaults = DatabaseConfig::new(url);
            DatabaseConfig {
                max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.max_connections),
                min_connections: parse_var("DB_MIN_CONNECTIONS", defaults.min_connections),
                ..defaults
            }
        });

        let default_limits = FeedLimits::default();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080),
            #[cfg(feature = "postgres")]
            database,
            feed: FeedLimits {
                default_limit: parse_var("FEED_DEFAULT_LIMIT", default_limits.default_limit),
                max_limit: parse_var("FEED_MAX_LIMIT", default_limits.max_limit),
            },
            jwt: JwtConfig::from_env(),
            media_base_url: env::var("MEDIA_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:9000/media".to_string()),
        }
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
