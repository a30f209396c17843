//! Quill Serve - HTTP server for the Quill blogging platform.
//!
//! Users create blogs, publish tagged posts with inline images, and readers
//! browse paginated listings, filter by tag, comment, and subscribe via RSS.
//!
//! # Architecture
//!
//! - **Query**: all reads/writes against ClickHouse (blogs, posts, tags,
//!   comments, images)
//! - **Render**: HTML pages generated with maud (compile-time templates,
//!   automatic escaping of interpolated values)
//! - **Auth**: current-user resolution from trusted identity-proxy headers,
//!   login/logout URL generation against the external provider
//! - **Cache**: in-process moka read-through cache for image blobs
//!
//! # Security
//!
//! Page chrome and form values are HTML-escaped by maud. Filtered post
//! content is inserted as trusted markup — an explicit acceptance of
//! author-trusted input, matching the platform's editorial model.

pub mod auth;
pub mod config;
pub mod error;
pub mod query;
pub mod render;
pub mod routes;
pub mod schema;
pub mod state;

pub use config::Config;
pub use error::SiteError;
pub use routes::router;
pub use state::AppState;
