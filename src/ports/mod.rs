pub mod book_repository;
pub mod borrowing_repository;
pub mod checkout_provider;
pub mod notification_service;
pub mod payment_repository;
pub mod user_repository;

pub use book_repository::*;
pub use borrowing_repository::*;
pub use checkout_provider::*;
pub use notification_service::*;
pub use payment_repository::*;
pub use user_repository::*;

/// ポート共通の結果型
///
/// アダプター固有のエラーは型消去して返す。
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
