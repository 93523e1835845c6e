use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

/// 決済プロバイダーのエラー分類
///
/// どれもリトライしない。APIレイヤーでそれぞれ異なるステータスに対応づける。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Your card was declined: {0}")]
    CardDeclined(String),

    #[error("Too many requests to the payment provider")]
    RateLimited,

    #[error("Authentication with the payment provider failed")]
    Authentication,

    #[error("Network communication with the payment provider failed")]
    Connection,

    #[error("Payment provider error: {0}")]
    Provider(String),
}

/// 決済セッション作成リクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// 金額（USD、小数点以下2桁）
    pub amount: Decimal,
    /// 明細に表示する名称（書籍タイトル）
    pub description: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// 決済セッション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub session_id: String,
    pub url: Option<String>,
    /// 請求額（USD）
    pub amount_total: Option<Decimal>,
    pub currency: Option<String>,
    pub paid: bool,
}

/// 決済プロバイダーポート
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    /// 決済セッションを作成する
    async fn create_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError>;

    /// 決済セッションを取得する
    ///
    /// 支払い完了の確認に使用される。
    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, CheckoutError>;
}
