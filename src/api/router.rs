use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_book, create_borrowing, delete_book, get_book, get_borrowing, get_me,
    get_payment, list_books, list_borrowings, list_payments, obtain_token, payment_cancel,
    payment_success, register, return_borrowing, update_book, update_me,
};

/// APIルーターを作成する
///
/// - /users: 登録・トークン発行・プロフィール
/// - /books: カタログ（更新系はスタッフのみ）
/// - /borrowings: 貸出・返却
/// - /payments: 支払いと決済プロバイダーからのリダイレクト
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Users
        .route("/users", post(register))
        .route("/users/token", post(obtain_token))
        .route("/users/me", get(get_me).patch(update_me))
        // Books
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        // Borrowings
        .route("/borrowings", get(list_borrowings).post(create_borrowing))
        .route("/borrowings/:id", get(get_borrowing))
        .route("/borrowings/:id/return", post(return_borrowing))
        // Payments（静的パスは:idより優先される）
        .route("/payments", get(list_payments))
        .route("/payments/success", get(payment_success))
        .route("/payments/cancel", get(payment_cancel))
        .route("/payments/:id", get(get_payment))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
