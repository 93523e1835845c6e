use crate::domain::UserValidationError;
use thiserror::Error;

/// ユーザー管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum UserApplicationError {
    /// 入力値が不正
    #[error("{0}")]
    Validation(#[from] UserValidationError),

    /// メールアドレスが既に使われている
    #[error("user with this email already exists.")]
    EmailTaken,

    /// メールアドレスまたはパスワードが違う
    #[error("Unable to log in with provided credentials.")]
    InvalidCredentials,

    /// トークンが不正、期限切れ、またはユーザーが存在しない
    #[error("Given token not valid for any token type")]
    InvalidToken,

    /// ユーザーが存在しない
    #[error("User not found")]
    UserNotFound,

    /// パスワードハッシュ化のエラー
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// トークン発行のエラー
    #[error("Token encoding failed")]
    TokenEncoding(#[source] jsonwebtoken::errors::Error),

    /// UserRepositoryのエラー
    #[error("User repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, UserApplicationError>;
