use crate::domain::{Email, User, UserId};
use async_trait::async_trait;

use super::Result;

/// ユーザーリポジトリポート
///
/// メールアドレスは大文字小文字を区別せず一意。
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザーを登録する
    ///
    /// メールアドレスが重複する場合は`Ok(false)`。
    async fn insert(&self, user: &User) -> Result<bool>;

    async fn get_by_id(&self, user_id: UserId) -> Result<Option<User>>;

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>>;

    /// ユーザーを更新する
    ///
    /// 変更後のメールアドレスが他のユーザーと重複する場合は`Ok(false)`。
    async fn update(&self, user: &User) -> Result<bool>;
}
