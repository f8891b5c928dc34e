//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use catalog_repo::ApiKeyStore;
use catalog_types::{
    AppError, AuthorId, AuthorRequest, AuthorResponse, BookId, BookRequest, CatalogRepository,
    ListBooksQuery, PriceQuery,
};
use utoipa::OpenApi;

use crate::CatalogService;
use crate::openapi::ApiDoc;

/// Application state shared across handlers.
pub struct AppState<R: CatalogRepository> {
    pub service: CatalogService<R>,
    pub api_keys: ApiKeyStore,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::RateUnavailable(e) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Turns a body rejection into a 400 with the decoder's message.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError(AppError::BadRequest(rejection.body_text())))
}

fn parse_book_id(id: &str) -> Result<BookId, ApiError> {
    id.parse()
        .map_err(|_| ApiError(AppError::BadRequest("Invalid book ID".into())))
}

fn parse_author_id(id: &str) -> Result<AuthorId, ApiError> {
    id.parse()
        .map_err(|_| ApiError(AppError::BadRequest("Invalid author ID".into())))
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Serves the OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ─────────────────────────────────────────────────────────────────────────────
// Books
// ─────────────────────────────────────────────────────────────────────────────

/// List books, one page at a time.
#[tracing::instrument(skip(state))]
pub async fn list_books<R: CatalogRepository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<ListBooksQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let request = query.page_request().map_err(AppError::from)?;
    let currencies = query.currencies().map_err(AppError::from)?;
    let page = state.service.list_books(request, currencies).await?;
    Ok(Json(page))
}

/// Get book by ID.
#[tracing::instrument(skip(state), fields(book_id = %id))]
pub async fn get_book<R: CatalogRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Query(query): Query<PriceQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let book_id = parse_book_id(&id)?;
    let currencies = query.currencies().map_err(AppError::from)?;
    let book = state.service.get_book(book_id, currencies).await?;
    Ok(Json(book))
}

/// Create a book.
#[tracing::instrument(skip(state, payload))]
pub async fn create_book<R: CatalogRepository>(
    State(state): State<Arc<AppState<R>>>,
    payload: Result<Json<BookRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(payload)?;
    let book = state.service.create_book(req).await?;
    tracing::info!(book_id = %book.id, "Book created");
    Ok((StatusCode::CREATED, Json(book)))
}

/// Replace a book.
#[tracing::instrument(skip(state, payload), fields(book_id = %id))]
pub async fn update_book<R: CatalogRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    payload: Result<Json<BookRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let book_id = parse_book_id(&id)?;
    let req = json_body(payload)?;
    let book = state.service.update_book(book_id, req).await?;
    Ok(Json(book))
}

/// Delete a book.
#[tracing::instrument(skip(state), fields(book_id = %id))]
pub async fn delete_book<R: CatalogRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let book_id = parse_book_id(&id)?;
    state.service.delete_book(book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Authors
// ─────────────────────────────────────────────────────────────────────────────

/// List all authors.
#[tracing::instrument(skip(state))]
pub async fn list_authors<R: CatalogRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let authors: Vec<AuthorResponse> = state
        .service
        .list_authors()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(authors))
}

/// Get author by ID.
#[tracing::instrument(skip(state), fields(author_id = %id))]
pub async fn get_author<R: CatalogRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let author_id = parse_author_id(&id)?;
    let author = state.service.get_author(author_id).await?;
    Ok(Json(AuthorResponse::from(author)))
}

/// Create an author.
#[tracing::instrument(skip(state, payload))]
pub async fn create_author<R: CatalogRepository>(
    State(state): State<Arc<AppState<R>>>,
    payload: Result<Json<AuthorRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(payload)?;
    let author = state.service.create_author(req).await?;
    tracing::info!(author_id = %author.id, "Author created");
    Ok((StatusCode::CREATED, Json(AuthorResponse::from(author))))
}

/// Replace an author.
#[tracing::instrument(skip(state, payload), fields(author_id = %id))]
pub async fn update_author<R: CatalogRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    payload: Result<Json<AuthorRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let author_id = parse_author_id(&id)?;
    let req = json_body(payload)?;
    let author = state.service.update_author(author_id, req).await?;
    Ok(Json(AuthorResponse::from(author)))
}

/// Delete an author.
#[tracing::instrument(skip(state), fields(author_id = %id))]
pub async fn delete_author<R: CatalogRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let author_id = parse_author_id(&id)?;
    state.service.delete_author(author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Rates
// ─────────────────────────────────────────────────────────────────────────────

/// Rates currently used for pricing.
#[tracing::instrument(skip(state))]
pub async fn get_rates<R: CatalogRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.service.current_rates().await?;
    Ok(Json(snapshot.as_ref().clone()))
}
