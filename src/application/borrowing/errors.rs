use crate::application::payment::PaymentApplicationError;
use crate::domain::{BorrowBookError, ReturnBookError};
use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum BorrowingApplicationError {
    /// 指定タイトルの書籍が存在しない
    #[error("Object with title={0} does not exist.")]
    BookNotFound(String),

    /// 貸出が存在しない（他の利用者の貸出も含む）
    #[error("Borrowing not found")]
    BorrowingNotFound,

    /// 貸出のビジネスルール違反
    #[error("{0}")]
    Borrow(#[from] BorrowBookError),

    /// 返却のビジネスルール違反
    #[error("{0}")]
    Return(#[from] ReturnBookError),

    /// 決済セッション作成のエラー
    #[error(transparent)]
    Payment(#[from] PaymentApplicationError),

    /// BorrowingRepositoryなどのエラー
    #[error("Borrowing repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, BorrowingApplicationError>;
