use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bookshelf_http::error::AppError;
use serde::Deserialize;
use serde_json::json;

use super::catalog::{BookCatalog, CatalogError};
use super::models::{Book, BookInput, Violation};

/// Query string for `GET /books/`
#[derive(Debug, Deserialize)]
pub struct RatingQuery {
    pub book_rating: i64,
}

/// Query string for `GET /books/publish/`
#[derive(Debug, Deserialize)]
pub struct PublishedDateQuery {
    pub published_date: i64,
}

/// Book routes, bound to the given catalog
pub fn router(catalog: Arc<BookCatalog>) -> Router {
    Router::new()
        .route("/books", get(list_books))
        .route("/books/", get(list_books_by_rating))
        .route("/books/{id}", get(get_book))
        .route("/books/publish/", get(list_books_by_published_date))
        .route("/create-book", post(create_book))
        .with_state(catalog)
}

async fn list_books(State(catalog): State<Arc<BookCatalog>>) -> Json<Vec<Book>> {
    Json(catalog.list_all())
}

async fn get_book(
    State(catalog): State<Arc<BookCatalog>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    let Path(id) = id?;
    Ok(Json(catalog.get_by_id(id)?))
}

async fn list_books_by_rating(
    State(catalog): State<Arc<BookCatalog>>,
    query: Result<Query<RatingQuery>, QueryRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let Query(query) = query?;
    Ok(Json(catalog.list_by_rating(query.book_rating)))
}

async fn list_books_by_published_date(
    State(catalog): State<Arc<BookCatalog>>,
    query: Result<Query<PublishedDateQuery>, QueryRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let Query(query) = query?;
    Ok(Json(catalog.list_by_published_date(query.published_date)))
}

async fn create_book(
    State(catalog): State<Arc<BookCatalog>>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let Json(candidate) = payload?;
    let book = catalog.create(candidate)?;
    Ok((StatusCode::CREATED, Json(book)))
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { .. } => AppError::not_found(err.to_string()),
            CatalogError::ValidationFailed(violations) => AppError::validation(
                violations.iter().map(Violation::detail).collect(),
                "book failed validation",
            ),
            CatalogError::DuplicateId { id } => AppError::conflict(
                vec![json!({ "field": "id", "error": "duplicate", "value": id })],
                err.to_string(),
            ),
            CatalogError::IdSpaceExhausted => AppError::Internal(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_violation_becomes_an_error_detail() {
        let input = BookInput {
            title: "AB".to_string(),
            author: String::new(),
            description: "d".repeat(101),
            rating: 6,
            published_date: 1999,
        };
        let violations = input.validate().unwrap_err();
        let expected: Vec<_> = violations.iter().map(Violation::detail).collect();

        match AppError::from(CatalogError::ValidationFailed(violations)) {
            AppError::Validation { details, .. } => {
                assert_eq!(details.len(), 5);
                assert_eq!(details, expected);
                assert_eq!(details[2]["constraint"]["kind"], "max_length");
            }
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }
}
