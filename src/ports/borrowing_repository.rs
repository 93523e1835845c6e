use crate::domain::{ActiveBorrowing, Borrowing, BorrowingId, Payment, ReturnedBorrowing, UserId};
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::BoxStream;

use super::Result;

/// 貸出の記録結果
///
/// 事前チェック後に並行リクエストが競合した場合、ストアがそれを報告する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowRecordOutcome {
    /// 在庫を減らし、貸出を記録した
    Recorded,
    /// 在庫が0だった（何も変更していない）
    OutOfStock,
    /// 利用者に未返却の貸出があった（何も変更していない）
    ActiveBorrowingExists,
}

/// 貸出一覧の絞り込み条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BorrowingFilter {
    /// `Some(true)`：未返却のみ、`Some(false)`：返却済みのみ
    pub is_active: Option<bool>,
    pub user_id: Option<UserId>,
}

/// 貸出リポジトリポート
///
/// 在庫の増減と貸出の状態変更は同一トランザクションで行う。
#[async_trait]
pub trait BorrowingRepository: Send + Sync {
    /// 在庫を1冊減らし、貸出とレンタル料金の支払いを記録する（アトミック）
    ///
    /// 在庫0または未返却の貸出がある場合は何も変更せず、その旨を返す。
    async fn record_borrowing(
        &self,
        borrowing: &ActiveBorrowing,
        payment: Option<&Payment>,
    ) -> Result<BorrowRecordOutcome>;

    /// 返却日を設定し、在庫を1冊戻し、延滞料金の支払いを記録する（アトミック）
    ///
    /// 既に返却済みだった場合は何も変更せず`Ok(false)`。
    async fn record_return(
        &self,
        borrowing: &ReturnedBorrowing,
        fine: Option<&Payment>,
    ) -> Result<bool>;

    async fn get_by_id(&self, borrowing_id: BorrowingId) -> Result<Option<Borrowing>>;

    /// 利用者に未返却の貸出があるか
    async fn has_active_for_user(&self, user_id: UserId) -> Result<bool>;

    /// 貸出を検索する
    ///
    /// 返却済みが先、未返却が後（返却日順）に並ぶ。
    async fn list(&self, filter: BorrowingFilter) -> Result<Vec<Borrowing>>;

    /// 延滞中の貸出をストリーム配信する
    ///
    /// 返却予定日が`today`以前、かつ未返却の貸出を返す。
    /// 延滞リマインダーのバッチに使用される。
    fn stream_overdue(&self, today: NaiveDate) -> BoxStream<'_, Result<ActiveBorrowing>>;
}
