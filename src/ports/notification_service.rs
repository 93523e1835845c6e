use async_trait::async_trait;

use super::Result;

/// 通知サービスポート
///
/// 通知配信メカニズムを抽象化する。
/// 実装はチャットボット、メールなどが考えられる。
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// メッセージを送信する
    ///
    /// 呼び出し側は失敗をログに残すのみで、リクエストは失敗させない。
    async fn notify(&self, message: &str) -> Result<()>;
}
