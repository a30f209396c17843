//! Image serving with a read-through blob cache.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::error::SiteError;
use crate::query;
use crate::state::{AppState, CachedImage};

/// `GET /image/{image_id}`
///
/// Serves the stored blob with its recorded content type. On a cache miss
/// the row is fetched from ClickHouse and cached with a fixed TTL; image
/// rows are immutable after creation, so no invalidation is needed.
pub async fn serve_image(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<Response, SiteError> {
    if let Some(cached) = state.image_cache.get(&image_id).await {
        tracing::debug!(image_id = %image_id, "image cache hit");
        return Ok(image_response(&cached));
    }

    tracing::debug!(image_id = %image_id, "image cache miss");

    let row = query::fetch_image(&state.clickhouse, &image_id)
        .await?
        .ok_or_else(|| SiteError::NotFound(format!("image {image_id}")))?;

    let cached = CachedImage {
        content_type: row.content_type,
        data: Arc::new(row.data),
    };
    state.image_cache.insert(image_id, cached.clone()).await;

    Ok(image_response(&cached))
}

/// Build a byte response with the stored content type and cache headers.
fn image_response(image: &CachedImage) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&image.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    // Immutable blobs; let browsers hold them as long as the server does
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=3600"),
    );
    (StatusCode::OK, headers, image.data.as_ref().clone()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_carries_stored_content_type() {
        let image = CachedImage {
            content_type: "image/png".to_string(),
            data: Arc::new(vec![1, 2, 3]),
        };
        let response = image_response(&image);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
    }

    #[test]
    fn bogus_content_type_falls_back_to_octet_stream() {
        let image = CachedImage {
            content_type: "not\na\nheader".to_string(),
            data: Arc::new(vec![]),
        };
        let response = image_response(&image);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/octet-stream"
        );
    }
}
