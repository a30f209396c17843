//! Core domain logic for the Quill blogging platform.
//!
//! This crate is pure computation with no I/O:
//! - Content filtering (raw post text → trusted HTML markup)
//! - Pagination cursors (explicit, serializable continuation tokens)
//! - Tag-field tokenization
//! - Shared error types

mod content;
mod cursor;
mod error;
mod tags;

/// Page size for all paginated listings.
pub const PAGE_SIZE: usize = 10;

/// Maximum visible length of a link label before truncation.
pub const LINK_LABEL_LIMIT: usize = 40;

pub use content::{filter_content, image_placeholder};
pub use cursor::Cursor;
pub use error::{Error, Result};
pub use tags::split_tag_labels;
