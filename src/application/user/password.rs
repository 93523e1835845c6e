use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use super::errors::{Result, UserApplicationError};

/// パスワードをargon2でハッシュ化する
///
/// ハッシュ化はCPUを占有するため、ブロッキング用スレッドで実行する。
pub(super) async fn hash_password(password: &str) -> Result<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_blocking(&password))
        .await
        .map_err(|e| UserApplicationError::PasswordHash(e.to_string()))?
}

/// パスワードがハッシュと一致するか
///
/// ハッシュの形式が不正な場合も不一致とする。
pub(super) async fn verify_password(password: &str, password_hash: &str) -> bool {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    match tokio::task::spawn_blocking(move || verify_blocking(&password, &password_hash)).await {
        Ok(matched) => matched,
        Err(e) => {
            tracing::error!(error = %e, "Password verification task failed");
            false
        }
    }
}

fn hash_blocking(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserApplicationError::PasswordHash(e.to_string()))
}

fn verify_blocking(password: &str, password_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(password_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
