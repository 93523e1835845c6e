use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Caller, Email, UserId, UserValidationError};

/// パスワードの最小文字数
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// User集約
///
/// パスワードはハッシュ化済みの値のみ保持する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub email: Email,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,

    // 監査情報
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// 認可判定に使う呼び出し元情報
    pub fn as_caller(&self) -> Caller {
        Caller {
            user_id: self.user_id,
            is_staff: self.is_staff,
        }
    }
}

/// ハッシュ化前のパスワードを検証する
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooShort);
    }
    Ok(())
}

/// 純粋関数：一般ユーザーを登録する
///
/// 新規ユーザーはスタッフ権限を持たない。
pub fn register_user(
    email: &str,
    password_hash: String,
    now: DateTime<Utc>,
) -> Result<User, UserValidationError> {
    let email = Email::parse(email)?;

    Ok(User {
        user_id: UserId::new(),
        email,
        password_hash,
        is_staff: false,
        is_superuser: false,
        created_at: now,
        updated_at: now,
    })
}

/// 純粋関数：管理者ユーザーを登録する
pub fn register_superuser(
    email: &str,
    password_hash: String,
    now: DateTime<Utc>,
) -> Result<User, UserValidationError> {
    let user = register_user(email, password_hash, now)?;
    Ok(User {
        is_staff: true,
        is_superuser: true,
        ..user
    })
}

/// 純粋関数：プロフィールを更新する
///
/// 指定されたフィールドのみ変更する。権限フラグは変更できない。
pub fn update_profile(
    user: &User,
    email: Option<&str>,
    password_hash: Option<String>,
    now: DateTime<Utc>,
) -> Result<User, UserValidationError> {
    let email = match email {
        Some(raw) => Email::parse(raw)?,
        None => user.email.clone(),
    };

    Ok(User {
        email,
        password_hash: password_hash.unwrap_or_else(|| user.password_hash.clone()),
        updated_at: now,
        ..user.clone()
    })
}
