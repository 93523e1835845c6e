use crate::ports::*;
use std::sync::Arc;

/// サービスの依存関係
///
/// 振る舞い（メソッド）は持たず、各コンテキストの関数に引数として渡す。
/// すべての依存が明示的になり、テストではインメモリ実装に差し替えられる。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub book_repository: Arc<dyn BookRepository>,
    pub borrowing_repository: Arc<dyn BorrowingRepository>,
    pub payment_repository: Arc<dyn PaymentRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub checkout_provider: Arc<dyn CheckoutProvider>,
    pub notification_service: Arc<dyn NotificationService>,
    pub settings: ServiceSettings,
}

/// アプリケーション層が参照する設定値
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// 決済後のリダイレクト先URLの基点（末尾スラッシュなし）
    pub public_base_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
}
