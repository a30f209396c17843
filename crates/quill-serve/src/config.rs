//! Application configuration loaded from environment variables.

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080").
    pub bind_addr: String,

    /// ClickHouse connection URL.
    pub clickhouse_url: String,

    /// ClickHouse database name.
    pub clickhouse_database: String,

    /// Base URL for this site (used in RSS links).
    /// e.g., "https://blog.example.org"
    pub base_url: String,

    /// Site name shown in page titles and the feed.
    pub site_name: String,

    /// Base URL of the external identity provider used for login/logout
    /// redirects. The provider fronts this server and supplies the
    /// `x-auth-user-id` / `x-auth-user-name` headers on authenticated
    /// requests.
    pub auth_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional (all have defaults for local development):
    /// - `QUILL_BIND_ADDR`: Server bind address (default: "0.0.0.0:8080")
    /// - `CLICKHOUSE_URL`: ClickHouse URL (default: "http://localhost:8123")
    /// - `CLICKHOUSE_DATABASE`: Database name (default: "quill")
    /// - `QUILL_BASE_URL`: Base URL for feed links (default: "http://localhost:8080")
    /// - `QUILL_SITE_NAME`: Site name (default: "Quill")
    /// - `QUILL_AUTH_URL`: Identity provider base URL (default: "http://localhost:8080/auth")
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("QUILL_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let clickhouse_url =
            std::env::var("CLICKHOUSE_URL").unwrap_or_else(|_| "http://localhost:8123".to_string());

        let clickhouse_database =
            std::env::var("CLICKHOUSE_DATABASE").unwrap_or_else(|_| "quill".to_string());

        let base_url = std::env::var("QUILL_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();

        let site_name = std::env::var("QUILL_SITE_NAME").unwrap_or_else(|_| "Quill".to_string());

        let auth_url = std::env::var("QUILL_AUTH_URL")
            .unwrap_or_else(|_| format!("{base_url}/auth"))
            .trim_end_matches('/')
            .to_string();

        tracing::info!(
            bind_addr = %bind_addr,
            clickhouse_url = %clickhouse_url,
            clickhouse_database = %clickhouse_database,
            base_url = %base_url,
            site_name = %site_name,
            auth_url = %auth_url,
            "configuration loaded"
        );

        Ok(Self {
            bind_addr,
            clickhouse_url,
            clickhouse_database,
            base_url,
            site_name,
            auth_url,
        })
    }
}
