//! CRUD do catálogo de livros

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use common_db::models::{Book, Genre};
use common_db::store::books;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ResourceId, ValidatedJson};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub author: String,
    pub genre: Option<Genre>,
    pub custom_genre: Option<String>,
    #[validate(range(min = 0, max = 9999))]
    pub published_year: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub author: Option<String>,
    pub genre: Option<Genre>,
    pub custom_genre: Option<String>,
    #[validate(range(min = 0, max = 9999))]
    pub published_year: Option<i32>,
}

fn book_not_found(id: Uuid) -> ApiError {
    ApiError::not_found(format!("Livro {} não encontrado", id))
}

/// POST /books
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateBookRequest>,
) -> ApiResult<(StatusCode, Json<Book>)> {
    let now = Utc::now();
    let book = Book {
        id: Uuid::new_v4(),
        title: request.title.trim().to_string(),
        author: request.author.trim().to_string(),
        genre: request.genre,
        custom_genre: request.custom_genre,
        published_year: request.published_year,
        created_at: now,
        updated_at: now,
    };

    let mut conn = state.pool.acquire().await?;
    books::insert(&mut conn, &book).await?;
    info!("Livro {} cadastrado", book.id);

    Ok((StatusCode::CREATED, Json(book)))
}

/// GET /books
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Book>>> {
    let mut conn = state.pool.acquire().await?;
    Ok(Json(books::list(&mut conn).await?))
}

/// GET /books/:id
pub async fn get(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> ApiResult<Json<Book>> {
    let mut conn = state.pool.acquire().await?;
    books::find(&mut conn, id)
        .await?
        .map(Json)
        .ok_or_else(|| book_not_found(id))
}

/// PUT /books/:id
pub async fn update(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    ValidatedJson(request): ValidatedJson<UpdateBookRequest>,
) -> ApiResult<Json<Book>> {
    let mut conn = state.pool.acquire().await?;
    let mut book = books::find(&mut conn, id)
        .await?
        .ok_or_else(|| book_not_found(id))?;

    if let Some(title) = request.title {
        book.title = title.trim().to_string();
    }
    if let Some(author) = request.author {
        book.author = author.trim().to_string();
    }
    if request.genre.is_some() {
        book.genre = request.genre;
    }
    if request.custom_genre.is_some() {
        book.custom_genre = request.custom_genre;
    }
    if request.published_year.is_some() {
        book.published_year = request.published_year;
    }
    book.updated_at = Utc::now();

    if !books::update(&mut conn, &book).await? {
        return Err(book_not_found(id));
    }
    Ok(Json(book))
}

/// DELETE /books/:id
pub async fn delete(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> ApiResult<Json<Value>> {
    let mut conn = state.pool.acquire().await?;
    if !books::delete(&mut conn, id).await? {
        return Err(book_not_found(id));
    }

    info!("Livro {} removido", id);
    Ok(Json(json!({ "message": "Livro removido", "id": id })))
}
