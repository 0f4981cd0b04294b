use std::env;

/// Time-to-live applied to every stored notification, in seconds.
pub const NOTIFICATION_TTL_SECS: i32 = 30 * 24 * 60 * 60;

/// Default page size for listings.
pub const DEFAULT_PAGE_SIZE: i32 = 12;

#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// TTL stamped on every insert, in seconds.
    pub ttl_secs: i32,
    /// Row limit used by listings when the caller does not pick one.
    pub default_limit: i32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            ttl_secs: NOTIFICATION_TTL_SECS,
            default_limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Self {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let ttl_secs = env::var("NOTIFICATION_TTL_SECS")
            .unwrap_or_else(|_| NOTIFICATION_TTL_SECS.to_string())
            .parse()
            .unwrap_or(NOTIFICATION_TTL_SECS);

        let default_limit = env::var("NOTIFICATION_PAGE_SIZE")
            .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string())
            .parse()
            .unwrap_or(DEFAULT_PAGE_SIZE);

        StoreConfig {
            ttl_secs,
            default_limit,
        }
    }
}
