//! HTTP handlers for `/books`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use bookshelf_http::{
    error::AppError,
    extract::{ApiJson, ApiQuery},
    response::ApiResponse,
};
use tokio::sync::RwLock;

use super::error::BookError;
use super::models::{BookDetail, BookFilter, BookList, BookPayload, CreatedBook};
use super::store::BookStore;

/// Store shared between the module and its handlers.
pub type SharedStore = Arc<RwLock<BookStore>>;

/// Routes relative to the module mount point.
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(store)
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Add,
    Update,
    Delete,
}

impl Action {
    fn verb(self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

/// Map a store failure to the client-facing message for `action`.
fn reject(action: Action, err: BookError) -> AppError {
    let verb = action.verb();
    match err {
        BookError::MissingName => {
            AppError::validation(format!("Failed to {verb} book. Please provide the book name"))
        }
        BookError::ReadPageExceedsPageCount { .. } => AppError::validation(format!(
            "Failed to {verb} book. readPage must not be greater than pageCount"
        )),
        BookError::NotFound { .. } => {
            AppError::not_found(format!("Failed to {verb} book. Id not found"))
        }
        err @ BookError::NotPersisted { .. } => {
            AppError::failure(format!("Failed to {verb} book"), err)
        }
    }
}

async fn create_book(
    State(store): State<SharedStore>,
    ApiJson(payload): ApiJson<BookPayload>,
) -> Result<(StatusCode, ApiResponse<CreatedBook>), AppError> {
    let book_id = store
        .write()
        .await
        .create(payload)
        .map_err(|err| reject(Action::Add, err))?;

    tracing::info!(book_id = %book_id, "book added");

    Ok((
        StatusCode::CREATED,
        ApiResponse::data(CreatedBook { book_id }).with_message("Book added successfully"),
    ))
}

async fn list_books(
    State(store): State<SharedStore>,
    ApiQuery(filter): ApiQuery<BookFilter>,
) -> ApiResponse<BookList> {
    let books = store.read().await.list(&filter);

    tracing::debug!(?filter, matched = books.len(), "books listed");

    ApiResponse::data(BookList { books })
}

async fn get_book(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<ApiResponse<BookDetail>, AppError> {
    let book = store
        .read()
        .await
        .get(&id)
        .cloned()
        .map_err(|_| AppError::not_found("Book not found"))?;

    tracing::debug!(book_id = %id, "book fetched");

    Ok(ApiResponse::data(BookDetail { book }))
}

async fn update_book(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<BookPayload>,
) -> Result<ApiResponse, AppError> {
    store
        .write()
        .await
        .update(&id, payload)
        .map_err(|err| reject(Action::Update, err))?;

    tracing::info!(book_id = %id, "book updated");

    Ok(ApiResponse::message("Book updated successfully"))
}

async fn delete_book(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<ApiResponse, AppError> {
    store
        .write()
        .await
        .delete(&id)
        .map_err(|err| reject(Action::Delete, err))?;

    tracing::info!(book_id = %id, "book deleted");

    Ok(ApiResponse::message("Book deleted successfully"))
}
