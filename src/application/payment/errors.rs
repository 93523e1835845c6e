use crate::ports::CheckoutError;
use thiserror::Error;

/// 支払いアプリケーション層のエラー
#[derive(Debug, Error)]
pub enum PaymentApplicationError {
    /// 支払いが存在しない（他の利用者の支払いも含む）
    #[error("Payment not found")]
    PaymentNotFound,

    /// 支払いに紐づく貸出が存在しない
    #[error("Borrowing for payment not found")]
    BorrowingNotFound,

    /// 支払いに決済セッションが記録されていない
    #[error("Payment has no checkout session.")]
    MissingSession,

    /// 決済プロバイダーが支払い完了を報告していない
    #[error("Payment has not been completed yet.")]
    PaymentNotCompleted,

    /// 決済プロバイダーのエラー
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// PaymentRepositoryなどのエラー
    #[error("Payment repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, PaymentApplicationError>;
