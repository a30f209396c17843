//! Error types for the server.
//!
//! Errors are rendered as simple HTML error pages rather than JSON, since
//! this is a user-facing HTML service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use maud::{DOCTYPE, html};

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// The requested blog, post, tag, or image does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The current user is not the owner of the blog being modified.
    #[error("not the blog owner")]
    NotOwner {
        /// Path the viewer came from, offered as a way back.
        back: String,
    },

    /// A malformed request parameter (e.g., a bad pagination cursor).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// ClickHouse query error.
    #[error("database error: {0}")]
    Database(#[from] clickhouse::error::Error),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<quill_core::Error> for SiteError {
    fn from(err: quill_core::Error) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        let (status, title, message, back) = match &self {
            Self::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "Not Found",
                format!("The requested page was not found: {msg}"),
                "/".to_string(),
            ),
            Self::NotOwner { back } => (
                StatusCode::FORBIDDEN,
                "Not Allowed",
                "Only the blog owner can do that.".to_string(),
                back.clone(),
            ),
            Self::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "Bad Request",
                format!("The request could not be understood: {msg}"),
                "/".to_string(),
            ),
            Self::Database(err) => {
                tracing::error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Service Unavailable",
                    "The database is temporarily unavailable. Please try again later.".to_string(),
                    "/".to_string(),
                )
            }
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error",
                    "An internal error occurred. Please try again later.".to_string(),
                    "/".to_string(),
                )
            }
        };

        let markup = html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    title { (title) }
                    meta name="robots" content="noindex";
                    style { (maud::PreEscaped(crate::render::components::PAGE_CSS)) }
                }
                body {
                    main class="error-page" {
                        h1 { (title) }
                        p { (message) }
                        a href=(back) { "Go back" }
                    }
                }
            }
        };

        (status, markup).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_not_found() {
        let err = SiteError::NotFound("blog abc".to_string());
        assert_eq!(err.to_string(), "not found: blog abc");
    }

    #[test]
    fn error_display_bad_request_from_core() {
        let err: SiteError = "nope".parse::<quill_core::Cursor>().unwrap_err().into();
        assert!(err.to_string().starts_with("bad request:"));
    }

    #[test]
    fn error_into_response_not_found() {
        let err = SiteError::NotFound("post xyz".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn error_into_response_not_owner() {
        let err = SiteError::NotOwner {
            back: "/singleblog/1".to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn error_into_response_internal() {
        let err = SiteError::Internal(anyhow::anyhow!("boom"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
