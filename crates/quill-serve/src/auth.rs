//! Identity resolution and login/logout URL generation.
//!
//! Authentication is delegated to an external identity provider fronting
//! this server. On authenticated requests the provider supplies trusted
//! headers identifying the caller; unauthenticated requests carry none.
//! Owner-only handlers compare the resolved user id against the blog's
//! stored `owner_id`.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use crate::config::Config;

/// Header carrying the provider-assigned stable user id.
pub const USER_ID_HEADER: &str = "x-auth-user-id";

/// Header carrying the user's display name.
pub const USER_NAME_HEADER: &str = "x-auth-user-name";

/// The authenticated caller, as asserted by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// Stable identity string, matched against `Blog.owner_id`.
    pub id: String,
    /// Display name shown in page chrome and stored on created blogs.
    pub name: String,
}

/// Extractor resolving the current user from identity headers, if any.
#[derive(Debug, Clone)]
pub struct Identity(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(user_from_parts(parts)))
    }
}

fn user_from_parts(parts: &Parts) -> Option<CurrentUser> {
    let id = parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())?;

    let name = parts
        .headers
        .get(USER_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(id);

    Some(CurrentUser {
        id: id.to_string(),
        name: name.to_string(),
    })
}

/// URL of the identity provider's login flow, returning to `next` after
/// sign-in.
pub fn login_url(config: &Config, next: &str) -> String {
    format!(
        "{}/login?next={}",
        config.auth_url,
        utf8_percent_encode(next, NON_ALPHANUMERIC)
    )
}

/// URL of the identity provider's logout flow, returning to `next` after
/// sign-out.
pub fn logout_url(config: &Config, next: &str) -> String {
    format!(
        "{}/logout?next={}",
        config.auth_url,
        utf8_percent_encode(next, NON_ALPHANUMERIC)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn test_config() -> Config {
        Config {
            bind_addr: "0.0.0.0:8080".to_string(),
            clickhouse_url: "http://localhost:8123".to_string(),
            clickhouse_database: "quill".to_string(),
            base_url: "http://localhost:8080".to_string(),
            site_name: "Quill".to_string(),
            auth_url: "https://id.example.org".to_string(),
        }
    }

    fn parts_with_headers(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn no_headers_means_anonymous() {
        let parts = parts_with_headers(&[]);
        assert_eq!(user_from_parts(&parts), None);
    }

    #[test]
    fn id_and_name_headers_resolve_user() {
        let parts = parts_with_headers(&[(USER_ID_HEADER, "u-42"), (USER_NAME_HEADER, "Ada")]);
        let user = user_from_parts(&parts).unwrap();
        assert_eq!(user.id, "u-42");
        assert_eq!(user.name, "Ada");
    }

    #[test]
    fn missing_name_falls_back_to_id() {
        let parts = parts_with_headers(&[(USER_ID_HEADER, "u-42")]);
        let user = user_from_parts(&parts).unwrap();
        assert_eq!(user.name, "u-42");
    }

    #[test]
    fn blank_id_header_means_anonymous() {
        let parts = parts_with_headers(&[(USER_ID_HEADER, "   ")]);
        assert_eq!(user_from_parts(&parts), None);
    }

    #[test]
    fn login_url_percent_encodes_next() {
        let url = login_url(&test_config(), "/post/abc");
        assert_eq!(url, "https://id.example.org/login?next=%2Fpost%2Fabc");
    }

    #[test]
    fn logout_url_points_at_provider() {
        let url = logout_url(&test_config(), "/");
        assert_eq!(url, "https://id.example.org/logout?next=%2F");
    }
}
