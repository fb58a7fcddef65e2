use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{
    error::ErrorVerbosity,
    repository::{BookRepository, DatabaseConfig},
    server::{app, ServerConfig},
    state::ApiState,
    types::book::{Book, NewBook},
};

#[tokio::test]
async fn example_config_is_valid() {
    ServerConfig::from_config_file("config.example.yaml")
        .await
        .expect("Example config is not parsable");
}

fn test_book() -> NewBook {
    NewBook {
        isbn: "0691161519".to_string(),
        amazon_url: "http://a.co/eobPtX3".to_string(),
        author: "Matthew Chanway".to_string(),
        language: "french".to_string(),
        pages: 50,
        publisher: "sprott shaw".to_string(),
        title: "best book ever".to_string(),
        year: 1990,
    }
}

/// A router over a fresh in-memory database holding [`test_book`].
async fn seeded_app() -> Router {
    let books = BookRepository::connect(&DatabaseConfig::in_memory())
        .await
        .expect("In-memory database must open");

    books
        .create_book(&test_book())
        .await
        .expect("Seed book must insert");

    app(ApiState::new(ErrorVerbosity::Full, books))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);

    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("Request must build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router is infallible");

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Body must be readable")
        .to_bytes();

    let body = serde_json::from_slice(&bytes).expect("Body must be JSON");

    (status, body)
}

fn test_book_json() -> Value {
    serde_json::to_value(Book::from(test_book())).unwrap()
}

#[tokio::test]
async fn get_all_books() {
    let app = seeded_app().await;

    let (status, body) = send(&app, Method::GET, "/books", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"books": [{"isbn": "0691161519", "amazon_url": "http://a.co/eobPtX3", "author": "Matthew Chanway",
        "language": "french", "pages": 50, "publisher": "sprott shaw", "title": "best book ever", "year": 1990}]})
    );
}

#[tokio::test]
async fn get_book_by_isbn() {
    let app = seeded_app().await;

    let (status, body) = send(&app, Method::GET, "/books/0691161519", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "book": test_book_json() }));
}

#[tokio::test]
async fn unknown_isbn_is_not_found() {
    let app = seeded_app().await;

    let (status, body) = send(&app, Method::GET, "/books/069116151", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"error": {"message": "There is no book with an isbn '069116151", "status": 404},
        "message": "There is no book with an isbn '069116151"})
    );
}

#[tokio::test]
async fn create_book_then_read_it_back() {
    let app = seeded_app().await;
    let new_book = json!({"isbn": "0691161518", "amazon_url": "http://a.co/eobPtX2", "author": "Matthew Peter",
        "language": "english", "pages": 55, "publisher": "kwantlen", "title": "worst book ever", "year": 1990});

    let (status, body) = send(&app, Method::POST, "/books", Some(new_book.clone())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "book": new_book }));

    let (status, body) = send(&app, Method::GET, "/books/0691161518", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "book": new_book }));
}

#[tokio::test]
async fn create_book_without_year_is_rejected() {
    let app = seeded_app().await;
    let new_book = json!({"isbn": "0691161518", "amazon_url": "http://a.co/eobPtX2", "author": "Matthew Peter",
        "language": "english", "pages": 55, "publisher": "kwantlen", "title": "worst book ever"});

    let (status, body) = send(&app, Method::POST, "/books", Some(new_book)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": {"message": ["instance requires property \"year\""], "status": 400},
        "message": ["instance requires property \"year\""]})
    );
}

#[tokio::test]
async fn create_book_reports_every_missing_property() {
    let app = seeded_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({"isbn": "1", "author": "Matthew Peter", "pages": 55})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!([
            "instance requires property \"amazon_url\"",
            "instance requires property \"language\"",
            "instance requires property \"publisher\"",
            "instance requires property \"title\"",
            "instance requires property \"year\"",
        ])
    );
    assert_eq!(body["error"]["message"], body["message"]);
}

#[tokio::test]
async fn create_book_reports_missing_isbn_first() {
    let app = seeded_app().await;

    let (status, body) = send(&app, Method::POST, "/books", Some(json!({"pages": 1}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": {"message": [
            "instance requires property \"isbn\"",
            "instance requires property \"amazon_url\"",
            "instance requires property \"author\"",
            "instance requires property \"language\"",
            "instance requires property \"publisher\"",
            "instance requires property \"title\"",
            "instance requires property \"year\"",
        ], "status": 400},
        "message": [
            "instance requires property \"isbn\"",
            "instance requires property \"amazon_url\"",
            "instance requires property \"author\"",
            "instance requires property \"language\"",
            "instance requires property \"publisher\"",
            "instance requires property \"title\"",
            "instance requires property \"year\"",
        ]})
    );
}

#[tokio::test]
async fn create_book_with_pages_beyond_i64_is_a_violation() {
    let app = seeded_app().await;
    let mut new_book = test_book_json();
    new_book["isbn"] = json!("0691161518");
    new_book["pages"] = json!(u64::MAX);

    let (status, body) = send(&app, Method::POST, "/books", Some(new_book)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!(["instance.pages does not conform to the \"int64\" format"])
    );
    assert_eq!(body["error"]["message"], body["message"]);
}

#[tokio::test]
async fn create_book_with_existing_isbn_conflicts() {
    let app = seeded_app().await;

    let (status, body) = send(&app, Method::POST, "/books", Some(test_book_json())).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["message"],
        json!("There is already a book with an isbn '0691161519'")
    );
}

#[tokio::test]
async fn create_book_with_non_object_body_is_rejected() {
    let app = seeded_app().await;

    let (status, body) = send(&app, Method::POST, "/books", Some(json!("a book"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!(["instance is not of a type(s) object"]));
}

#[tokio::test]
async fn create_book_with_malformed_json_is_rejected() {
    let app = seeded_app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/books")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"isbn\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_book_by_isbn() {
    let app = seeded_app().await;
    let update = json!({"amazon_url": "http://a.co/eobPtX3", "author": "Matthew Chanway",
        "language": "french", "pages": 50, "publisher": "sprott shaw", "title": "new title", "year": 1990});

    let (status, body) = send(&app, Method::PUT, "/books/0691161519", Some(update)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"book": {"isbn": "0691161519", "amazon_url": "http://a.co/eobPtX3", "author": "Matthew Chanway",
        "language": "french", "pages": 50, "publisher": "sprott shaw", "title": "new title", "year": 1990}})
    );
}

#[tokio::test]
async fn update_book_keeps_the_path_isbn() {
    let app = seeded_app().await;
    let mut update = test_book_json();
    update["isbn"] = json!("9999999999");
    update["title"] = json!("new title");

    let (status, body) = send(&app, Method::PUT, "/books/0691161519", Some(update)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["isbn"], json!("0691161519"));

    let (status, _) = send(&app, Method::GET, "/books/9999999999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_book_without_year_is_rejected() {
    let app = seeded_app().await;
    let update = json!({"amazon_url": "http://a.co/eobPtX3", "author": "Matthew Chanway",
        "language": "french", "pages": 50, "publisher": "sprott shaw", "title": "new title"});

    let (status, body) = send(&app, Method::PUT, "/books/0691161519", Some(update)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": {"message": ["instance requires property \"year\""], "status": 400},
        "message": ["instance requires property \"year\""]})
    );
}

#[tokio::test]
async fn update_of_unknown_isbn_is_not_found() {
    let app = seeded_app().await;

    let (status, body) = send(&app, Method::PUT, "/books/069116151", Some(test_book_json())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        json!("There is no book with an isbn '069116151")
    );
}

#[tokio::test]
async fn delete_book_by_isbn() {
    let app = seeded_app().await;

    let (status, body) = send(&app, Method::DELETE, "/books/0691161519", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Book deleted" }));

    let (status, body) = send(&app, Method::GET, "/books", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "books": [] }));
}

#[tokio::test]
async fn delete_of_unknown_isbn_is_not_found() {
    let app = seeded_app().await;

    let (status, body) = send(&app, Method::DELETE, "/books/069116151", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["status"], json!(404));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = seeded_app().await;

    let (status, body) = send(&app, Method::GET, "/authors", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"error": {"message": "Not Found", "status": 404}, "message": "Not Found"})
    );
}

#[tokio::test]
async fn wrong_method_is_not_allowed() {
    let app = seeded_app().await;

    let (status, body) = send(&app, Method::PATCH, "/books/0691161519", None).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["message"], json!("Method Not Allowed"));
}

#[tokio::test]
async fn openapi_document_lists_book_routes() {
    let app = seeded_app().await;

    let (status, body) = send(&app, Method::GET, "/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/books"].is_object());
    assert!(body["paths"]["/books/{isbn}"].is_object());
}
