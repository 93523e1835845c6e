use crate::application::book;
use crate::domain::{BookDraft, BookId};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use super::AppState;
use crate::api::{error::ApiError, extractor::AuthenticatedUser, types::BookResponse};

/// GET /books - 書籍一覧（認証不要）
pub async fn list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = book::list_books(&state.service_deps).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/:id - 書籍詳細（認証不要）
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = book::get_book(&state.service_deps, BookId::from_uuid(book_id)).await?;
    Ok(Json(book.into()))
}

/// POST /books - 書籍を登録（スタッフのみ）
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(draft): Json<BookDraft>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let book = book::create_book(&state.service_deps, user.caller(), draft).await?;
    Ok((StatusCode::CREATED, Json(book.into())))
}

/// PUT /books/:id - 書籍を更新（スタッフのみ）
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(book_id): Path<Uuid>,
    Json(draft): Json<BookDraft>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = book::update_book(
        &state.service_deps,
        user.caller(),
        BookId::from_uuid(book_id),
        draft,
    )
    .await?;
    Ok(Json(book.into()))
}

/// DELETE /books/:id - 書籍を削除（スタッフのみ）
///
/// 関連する貸出と支払いも削除される。
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(book_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    book::delete_book(&state.service_deps, user.caller(), BookId::from_uuid(book_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
