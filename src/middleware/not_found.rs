use axum::http::Uri;

use crate::error::{ApiError, RouteNotFoundError};

/// Fallback for requests that match no route.
pub async fn not_found(uri: Uri) -> ApiError {
    tracing::warn!(%uri, "No route");

    RouteNotFoundError.into()
}
