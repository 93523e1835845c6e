use crate::domain::BookValidationError;
use thiserror::Error;

/// カタログ管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum BookApplicationError {
    /// スタッフ以外による更新操作
    #[error("You do not have permission to perform this action.")]
    PermissionDenied,

    /// 書籍が存在しない
    #[error("Book not found")]
    BookNotFound,

    /// 同じタイトルの書籍が既にある
    #[error("book with this title already exists.")]
    DuplicateTitle,

    /// 入力値が不正
    #[error("{0}")]
    Validation(#[from] BookValidationError),

    /// BookRepositoryのエラー
    #[error("Book repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, BookApplicationError>;
