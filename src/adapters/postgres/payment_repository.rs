use crate::domain::{BorrowingId, Payment, PaymentId, UserId};
use crate::ports::Result;
use crate::ports::payment_repository::PaymentRepository as PaymentRepositoryTrait;
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::rows::{invalid_data, map_row_to_payment};

/// PaymentRepositoryのPostgreSQL実装
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    /// PostgreSQLコネクションプールから新しいPaymentRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 支払いを挿入する
///
/// 貸出・返却の記録と同じトランザクションで呼び出す。
pub(super) async fn insert_payment(conn: &mut PgConnection, payment: &Payment) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO payments (
            payment_id,
            borrowing_id,
            status,
            payment_type,
            money_to_pay,
            session_id,
            session_url,
            created_at,
            updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(payment.payment_id.value())
    .bind(payment.borrowing_id.value())
    .bind(payment.status.as_str())
    .bind(payment.payment_type.as_str())
    .bind(payment.money_to_pay)
    .bind(payment.session.as_ref().map(|s| s.session_id.as_str()))
    .bind(payment.session.as_ref().map(|s| s.session_url.as_str()))
    .bind(payment.created_at)
    .bind(payment.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

#[async_trait]
impl PaymentRepositoryTrait for PaymentRepository {
    /// ステータスとセッション情報を保存
    async fn save(&self, payment: &Payment) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = $2,
                session_id = $3,
                session_url = $4,
                updated_at = $5
            WHERE payment_id = $1
            "#,
        )
        .bind(payment.payment_id.value())
        .bind(payment.status.as_str())
        .bind(payment.session.as_ref().map(|s| s.session_id.as_str()))
        .bind(payment.session.as_ref().map(|s| s.session_url.as_str()))
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(invalid_data(format!(
                "payment {} does not exist",
                payment.payment_id.value()
            )));
        }
        Ok(())
    }

    async fn get_by_id(&self, payment_id: PaymentId) -> Result<Option<Payment>> {
        let row = sqlx::query(
            r#"
            SELECT
                payment_id,
                borrowing_id,
                status,
                payment_type,
                money_to_pay,
                session_id,
                session_url,
                created_at,
                updated_at
            FROM payments
            WHERE payment_id = $1
            "#,
        )
        .bind(payment_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_payment).transpose()
    }

    /// 支払いを検索
    ///
    /// ownerを指定した場合はborrowingsと結合して利用者で絞り込む。
    async fn list(&self, owner: Option<UserId>) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT
                p.payment_id,
                p.borrowing_id,
                p.status,
                p.payment_type,
                p.money_to_pay,
                p.session_id,
                p.session_url,
                p.created_at,
                p.updated_at
            FROM payments p
            JOIN borrowings b ON b.borrowing_id = p.borrowing_id
            WHERE ($1::uuid IS NULL OR b.user_id = $1)
            ORDER BY p.created_at ASC
            "#,
        )
        .bind(owner.map(|id| id.value()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_payment).collect()
    }

    async fn list_for_borrowing(&self, borrowing_id: BorrowingId) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT
                payment_id,
                borrowing_id,
                status,
                payment_type,
                money_to_pay,
                session_id,
                session_url,
                created_at,
                updated_at
            FROM payments
            WHERE borrowing_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(borrowing_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_payment).collect()
    }
}
