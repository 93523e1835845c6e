use crate::domain::{Email, User, UserId};
use crate::ports::Result;
use crate::ports::user_repository::UserRepository as UserRepositoryTrait;
use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::{is_unique_violation, map_row_to_user};

/// UserRepositoryのPostgreSQL実装
///
/// メールアドレスの一意性はLOWER(email)の一意インデックスで保証する。
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// PostgreSQLコネクションプールから新しいUserRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn insert(&self, user: &User) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                email,
                password_hash,
                is_staff,
                is_superuser,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.user_id.value())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_by_id(&self, user_id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, email, password_hash, is_staff, is_superuser, created_at, updated_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_user).transpose()
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, email, password_hash, is_staff, is_superuser, created_at, updated_at
            FROM users
            WHERE LOWER(email) = $1
            "#,
        )
        .bind(email.canonical())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_user).transpose()
    }

    /// メールアドレスとパスワードハッシュを更新
    ///
    /// 権限フラグは更新しない。
    async fn update(&self, user: &User) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2,
                password_hash = $3,
                updated_at = $4
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.value())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
