use crate::application::ServiceDependencies;
use crate::domain::{self, Email, User, UserId, commands::*};
use chrono::Utc;

use super::errors::{Result, UserApplicationError};
use super::password::{hash_password, verify_password};
use super::token::{decode_access_token, issue_access_token};

/// 発行したアクセストークン
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub access_token: String,
    /// 有効期間（秒）
    pub expires_in: i64,
}

/// ユーザーを登録する
///
/// ビジネスルール：
/// - パスワードは6文字以上
/// - メールアドレスは大文字小文字を区別せず一意
/// - 登録直後はスタッフ権限を持たない
pub async fn register_user(deps: &ServiceDependencies, cmd: RegisterUser) -> Result<User> {
    domain::validate_password(&cmd.password)?;
    let password_hash = hash_password(&cmd.password).await?;
    let user = domain::register_user(&cmd.email, password_hash, Utc::now())?;

    let inserted = deps
        .user_repository
        .insert(&user)
        .await
        .map_err(UserApplicationError::RepositoryError)?;

    if !inserted {
        return Err(UserApplicationError::EmailTaken);
    }

    tracing::info!(user_id = %user.user_id.value(), "User registered");
    Ok(user)
}

/// メールアドレスとパスワードでアクセストークンを発行する
pub async fn login(deps: &ServiceDependencies, email: &str, password: &str) -> Result<AccessToken> {
    let email = Email::parse(email).map_err(|_| UserApplicationError::InvalidCredentials)?;

    let user = deps
        .user_repository
        .get_by_email(&email)
        .await
        .map_err(UserApplicationError::RepositoryError)?
        .ok_or(UserApplicationError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash).await {
        return Err(UserApplicationError::InvalidCredentials);
    }

    let access_token = issue_access_token(&deps.settings, user.user_id, Utc::now())
        .map_err(UserApplicationError::TokenEncoding)?;

    Ok(AccessToken {
        access_token,
        expires_in: deps.settings.jwt_expiration_hours * 3600,
    })
}

/// アクセストークンからユーザーを解決する
pub async fn authenticate(deps: &ServiceDependencies, token: &str) -> Result<User> {
    let user_id = decode_access_token(&deps.settings.jwt_secret, token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected access token");
        UserApplicationError::InvalidToken
    })?;

    deps.user_repository
        .get_by_id(user_id)
        .await
        .map_err(UserApplicationError::RepositoryError)?
        .ok_or(UserApplicationError::InvalidToken)
}

/// 自分のプロフィールを取得する
pub async fn get_profile(deps: &ServiceDependencies, user_id: UserId) -> Result<User> {
    deps.user_repository
        .get_by_id(user_id)
        .await
        .map_err(UserApplicationError::RepositoryError)?
        .ok_or(UserApplicationError::UserNotFound)
}

/// 自分のプロフィールを更新する
///
/// メールアドレスとパスワードのみ変更できる。権限フラグは変更できない。
pub async fn update_profile(deps: &ServiceDependencies, cmd: UpdateProfile) -> Result<User> {
    let current = get_profile(deps, cmd.user_id).await?;

    let password_hash = match cmd.password.as_deref() {
        Some(password) => {
            domain::validate_password(password)?;
            Some(hash_password(password).await?)
        }
        None => None,
    };

    let user = domain::update_profile(&current, cmd.email.as_deref(), password_hash, Utc::now())?;

    let updated = deps
        .user_repository
        .update(&user)
        .await
        .map_err(UserApplicationError::RepositoryError)?;

    if !updated {
        return Err(UserApplicationError::EmailTaken);
    }

    Ok(user)
}

/// 起動時に管理者ユーザーを用意する
///
/// 同じメールアドレスのユーザーが既に存在する場合は何もしない。
/// 作成した場合は`true`を返す。
pub async fn ensure_superuser(
    deps: &ServiceDependencies,
    email: &str,
    password: &str,
) -> Result<bool> {
    let parsed = Email::parse(email).map_err(domain::UserValidationError::from)?;

    let existing = deps
        .user_repository
        .get_by_email(&parsed)
        .await
        .map_err(UserApplicationError::RepositoryError)?;

    if existing.is_some() {
        return Ok(false);
    }

    domain::validate_password(password)?;
    let password_hash = hash_password(password).await?;
    let user = domain::register_superuser(email, password_hash, Utc::now())?;

    let inserted = deps
        .user_repository
        .insert(&user)
        .await
        .map_err(UserApplicationError::RepositoryError)?;

    if inserted {
        tracing::info!(user_id = %user.user_id.value(), "Superuser created");
    }
    Ok(inserted)
}
