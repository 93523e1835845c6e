use crate::domain::{BorrowingId, Payment, PaymentId, UserId};
use async_trait::async_trait;

use super::Result;

/// 支払いリポジトリポート
///
/// 支払いの作成は貸出・返却の記録と同時に`BorrowingRepository`が行う。
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// 支払いの現在状態を保存する
    ///
    /// ステータスとセッション情報を上書きする。
    async fn save(&self, payment: &Payment) -> Result<()>;

    async fn get_by_id(&self, payment_id: PaymentId) -> Result<Option<Payment>>;

    /// 支払いを検索する
    ///
    /// `owner`を指定した場合、その利用者の貸出に紐づく支払いのみを返す。
    async fn list(&self, owner: Option<UserId>) -> Result<Vec<Payment>>;

    /// 貸出に紐づく支払いを作成順で取得する
    async fn list_for_borrowing(&self, borrowing_id: BorrowingId) -> Result<Vec<Payment>>;
}
