//! Application state shared across all request handlers.

use std::sync::Arc;

use clickhouse::Client;
use moka::future::Cache;

use crate::config::Config;

/// A cached image blob with its stored content type.
#[derive(Clone, Debug)]
pub struct CachedImage {
    /// MIME content type recorded at upload time.
    pub content_type: String,
    /// Raw image bytes.
    pub data: Arc<Vec<u8>>,
}

/// Type alias for the image blob cache (image id -> blob).
pub type ImageCache = Cache<String, CachedImage>;

/// Image cache capacity (number of entries).
const IMAGE_CACHE_CAPACITY: u64 = 10_000;

/// Image cache TTL. Image rows are immutable after creation, so the expiry
/// only bounds memory, never staleness.
const IMAGE_CACHE_TTL: std::time::Duration = std::time::Duration::from_secs(3600);

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// ClickHouse client for all entity reads and writes.
    pub clickhouse: Client,

    /// Application configuration.
    pub config: Arc<Config>,

    /// In-memory read-through cache for image blobs.
    pub image_cache: ImageCache,
}

impl AppState {
    /// Create a new application state from configuration.
    pub fn new(config: Config) -> Self {
        let clickhouse = Client::default()
            .with_url(&config.clickhouse_url)
            .with_database(&config.clickhouse_database);

        let image_cache = Cache::builder()
            .max_capacity(IMAGE_CACHE_CAPACITY)
            .time_to_live(IMAGE_CACHE_TTL)
            .build();

        tracing::info!(
            image_cache_capacity = IMAGE_CACHE_CAPACITY,
            image_cache_ttl_secs = IMAGE_CACHE_TTL.as_secs(),
            "application state initialized"
        );

        Self {
            clickhouse,
            config: Arc::new(config),
            image_cache,
        }
    }
}
