use crate::domain::{ActiveBorrowing, Borrowing, BorrowingId, Payment, ReturnedBorrowing, UserId};
use crate::ports::borrowing_repository::{
    BorrowRecordOutcome, BorrowingFilter, BorrowingRepository as BorrowingRepositoryTrait,
};
use crate::ports::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::{BoxStream, StreamExt};
use sqlx::PgPool;

use super::payment_repository::insert_payment;
use super::rows::{is_unique_violation, map_row_to_active_borrowing, map_row_to_borrowing};

/// BorrowingRepositoryのPostgreSQL実装
///
/// 在庫の増減と貸出の状態変更を1つのトランザクションで実行する。
/// 利用者ごとの未返却の貸出は部分一意インデックスで1件に制限される。
pub struct BorrowingRepository {
    pool: PgPool,
}

impl BorrowingRepository {
    /// PostgreSQLコネクションプールから新しいBorrowingRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowingRepositoryTrait for BorrowingRepository {
    /// 在庫を減らし、貸出と支払いを記録（アトミック）
    ///
    /// 条件付きUPDATEで在庫0を検出し、部分一意インデックス違反で
    /// 未返却の貸出の重複を検出する。どちらの場合もロールバックする。
    async fn record_borrowing(
        &self,
        borrowing: &ActiveBorrowing,
        payment: Option<&Payment>,
    ) -> Result<BorrowRecordOutcome> {
        let mut tx = self.pool.begin().await?;

        let decremented = sqlx::query(
            r#"
            UPDATE books
            SET inventory = inventory - 1,
                updated_at = $2
            WHERE book_id = $1 AND inventory > 0
            "#,
        )
        .bind(borrowing.book_id.value())
        .bind(borrowing.created_at)
        .execute(&mut *tx)
        .await?;

        if decremented.rows_affected() == 0 {
            return Ok(BorrowRecordOutcome::OutOfStock);
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO borrowings (
                borrowing_id,
                book_id,
                user_id,
                borrow_date,
                expected_return_date,
                actual_return_date,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, NULL, $6, $7)
            "#,
        )
        .bind(borrowing.borrowing_id.value())
        .bind(borrowing.book_id.value())
        .bind(borrowing.user_id.value())
        .bind(borrowing.borrow_date)
        .bind(borrowing.expected_return_date)
        .bind(borrowing.created_at)
        .bind(borrowing.updated_at)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Ok(BorrowRecordOutcome::ActiveBorrowingExists);
            }
            Err(e) => return Err(e.into()),
        }

        if let Some(payment) = payment {
            insert_payment(&mut tx, payment).await?;
        }

        tx.commit().await?;
        Ok(BorrowRecordOutcome::Recorded)
    }

    /// 返却日を設定し、在庫を戻し、延滞料金を記録（アトミック）
    ///
    /// actual_return_dateがNULLの行のみ更新するため、二重返却は`Ok(false)`になる。
    async fn record_return(
        &self,
        borrowing: &ReturnedBorrowing,
        fine: Option<&Payment>,
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE borrowings
            SET actual_return_date = $2,
                updated_at = $3
            WHERE borrowing_id = $1 AND actual_return_date IS NULL
            "#,
        )
        .bind(borrowing.borrowing_id.value())
        .bind(borrowing.actual_return_date)
        .bind(borrowing.updated_at)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE books
            SET inventory = inventory + 1,
                updated_at = $2
            WHERE book_id = $1
            "#,
        )
        .bind(borrowing.book_id.value())
        .bind(borrowing.updated_at)
        .execute(&mut *tx)
        .await?;

        if let Some(fine) = fine {
            insert_payment(&mut tx, fine).await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn get_by_id(&self, borrowing_id: BorrowingId) -> Result<Option<Borrowing>> {
        let row = sqlx::query(
            r#"
            SELECT
                borrowing_id,
                book_id,
                user_id,
                borrow_date,
                expected_return_date,
                actual_return_date,
                created_at,
                updated_at
            FROM borrowings
            WHERE borrowing_id = $1
            "#,
        )
        .bind(borrowing_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_borrowing).transpose()
    }

    /// 未返却の貸出の有無（部分一意インデックスを使用）
    async fn has_active_for_user(&self, user_id: UserId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM borrowings
                WHERE user_id = $1 AND actual_return_date IS NULL
            )
            "#,
        )
        .bind(user_id.value())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// 貸出を検索
    ///
    /// NULLのパラメーターは絞り込みなしとして扱う。
    /// 返却日の昇順（未返却はNULLS LAST）で返す。
    async fn list(&self, filter: BorrowingFilter) -> Result<Vec<Borrowing>> {
        let rows = sqlx::query(
            r#"
            SELECT
                borrowing_id,
                book_id,
                user_id,
                borrow_date,
                expected_return_date,
                actual_return_date,
                created_at,
                updated_at
            FROM borrowings
            WHERE ($1::boolean IS NULL OR (actual_return_date IS NULL) = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
            ORDER BY actual_return_date ASC NULLS LAST, created_at ASC
            "#,
        )
        .bind(filter.is_active)
        .bind(filter.user_id.map(|id| id.value()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_borrowing).collect()
    }

    /// 延滞中の貸出をストリーム配信
    ///
    /// (expected_return_date)の部分インデックスを使用する。
    fn stream_overdue(&self, today: NaiveDate) -> BoxStream<'_, Result<ActiveBorrowing>> {
        let stream = sqlx::query(
            r#"
            SELECT
                borrowing_id,
                book_id,
                user_id,
                borrow_date,
                expected_return_date,
                actual_return_date,
                created_at,
                updated_at
            FROM borrowings
            WHERE actual_return_date IS NULL AND expected_return_date <= $1
            ORDER BY expected_return_date ASC
            "#,
        )
        .bind(today)
        .fetch(&self.pool)
        .map(|row_result| {
            let row = row_result?;
            map_row_to_active_borrowing(&row)
        });

        Box::pin(stream)
    }
}
