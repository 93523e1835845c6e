use crate::ports::Result;
use crate::ports::notification_service::NotificationService as NotificationServiceTrait;
use async_trait::async_trait;
use std::sync::Mutex;

/// NotificationServiceのモック実装
///
/// 実際には送信せず、メッセージを記録する。
/// `set_failing`で送信を失敗させられる。
pub struct NotificationService {
    sent: Mutex<Vec<String>>,
    failing: Mutex<bool>,
}

impl NotificationService {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: Mutex::new(false),
        }
    }

    /// 送信済みメッセージを取得（テスト用）
    pub fn sent_messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// 以降の送信をすべて失敗させる（テスト用）
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationServiceTrait for NotificationService {
    async fn notify(&self, message: &str) -> Result<()> {
        if *self.failing.lock().unwrap() {
            return Err("notification channel unavailable".into());
        }
        tracing::debug!(message, "Mock notification");
        self.sent.lock().unwrap().push(message.to_string());
        Ok(())
    }
}
