use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    extractor::{path::ApiPath, validated::ValidatedJson},
    state::ApiState,
    traits::StateProvider,
    types::book::{Book, BookUpdate},
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateBookResponse {
    pub book: Book,
}

impl IntoResponse for UpdateBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Replace every field of a book except its isbn.
///
/// An isbn in the body is ignored, the path decides which book changes.
#[utoipa::path(
    put,
    path = "/books/{isbn}",
    tag = "books",
    params(("isbn" = String, Path, description = "ISBN of the book")),
    request_body = BookUpdate,
    responses(
        (status = 200, description = "The updated book", body = UpdateBookResponse),
        (status = 400, description = "Body violates the book schema", body = ApiErrorResponse),
        (status = 404, description = "No book has this isbn", body = ApiErrorResponse),
    )
)]
pub async fn update_book(
    State(state): State<ApiState>,
    ApiPath(isbn): ApiPath<String>,
    ValidatedJson(update): ValidatedJson<BookUpdate>,
) -> Result<UpdateBookResponse, ApiError> {
    let book = state
        .books()
        .update_book(&isbn, &update)
        .await
        .map_err(|err| ApiError::from_repository_error(state.error_verbosity(), err))?;

    Ok(UpdateBookResponse { book })
}
