use crate::application::borrowing;
use crate::domain::{BorrowingId, UserId, commands::*};
use crate::ports::BorrowingFilter;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::AppState;
use crate::api::{
    error::ApiError,
    extractor::AuthenticatedUser,
    types::{
        BookReturnedResponse, BorrowingCreatedResponse, BorrowingDetailResponse,
        BorrowingListItem, CreateBorrowingRequest, ListBorrowingsQuery,
    },
};

/// GET /borrowings - 貸出一覧
///
/// クエリ:
/// - is_active: 未返却（true）／返却済み（false）で絞り込み
/// - user_id: 利用者で絞り込み（スタッフのみ有効）
pub async fn list_borrowings(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Query(query): Query<ListBorrowingsQuery>,
) -> Result<Json<Vec<BorrowingListItem>>, ApiError> {
    let filter = BorrowingFilter {
        is_active: query.is_active,
        user_id: query.user_id.map(UserId::from_uuid),
    };

    let borrowings = borrowing::list_borrowings(&state.service_deps, user.caller(), filter).await?;
    Ok(Json(borrowings.iter().map(BorrowingListItem::from).collect()))
}

/// GET /borrowings/:id - 貸出詳細
pub async fn get_borrowing(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(borrowing_id): Path<Uuid>,
) -> Result<Json<BorrowingDetailResponse>, ApiError> {
    let details = borrowing::get_borrowing(
        &state.service_deps,
        user.caller(),
        BorrowingId::from_uuid(borrowing_id),
    )
    .await?;
    Ok(Json(details.into()))
}

/// POST /borrowings - 書籍を借りる
///
/// 貸出日は当日。レンタル料金の決済セッションを作成し、そのURLを返す。
pub async fn create_borrowing(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(req): Json<CreateBorrowingRequest>,
) -> Result<(StatusCode, Json<BorrowingCreatedResponse>), ApiError> {
    let cmd = BorrowBook {
        user_id: user.0.user_id,
        book_title: req.book,
        borrow_date: Utc::now().date_naive(),
        expected_return_date: req.expected_return_date,
    };

    let outcome = borrowing::borrow_book(&state.service_deps, cmd).await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// POST /borrowings/:id/return - 書籍を返却する
///
/// 返却日は当日。延滞していれば延滞金の決済セッションを作成する。
pub async fn return_borrowing(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(borrowing_id): Path<Uuid>,
) -> Result<Json<BookReturnedResponse>, ApiError> {
    let cmd = ReturnBook {
        borrowing_id: BorrowingId::from_uuid(borrowing_id),
        caller: user.caller(),
        returned_on: Utc::now().date_naive(),
    };

    let outcome = borrowing::return_book(&state.service_deps, cmd).await?;
    Ok(Json(outcome.into()))
}
