use axum::Json;
use utoipa::OpenApi;

use crate::{
    error::{ApiErrorBody, ApiErrorResponse},
    route::books::{
        create_book::{self, CreateBookResponse},
        delete_book::{self, DeleteBookResponse},
        get_book::{self, GetBookResponse},
        list_books::{self, ListBooksResponse},
        update_book::{self, UpdateBookResponse},
    },
    types::book::{Book, BookUpdate, NewBook},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        list_books::list_books,
        get_book::get_book,
        create_book::create_book,
        update_book::update_book,
        delete_book::delete_book,
    ),
    components(schemas(
        Book,
        NewBook,
        BookUpdate,
        ListBooksResponse,
        GetBookResponse,
        CreateBookResponse,
        UpdateBookResponse,
        DeleteBookResponse,
        ApiErrorBody,
        ApiErrorResponse,
    )),
    tags((name = "books", description = "Book records keyed by isbn"))
)]
pub struct ApiDoc;

/// Serves the OpenAPI document of the book routes.
pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
