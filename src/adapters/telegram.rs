use crate::ports::Result;
use crate::ports::notification_service::NotificationService as NotificationServiceTrait;
use async_trait::async_trait;
use serde::Serialize;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Telegram Bot APIによる通知サービス実装
///
/// 送信はバックグラウンドタスクで行い、呼び出し元は待たない。
/// 送信失敗はログに残すのみ。
#[derive(Clone)]
pub struct TelegramNotificationService {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotificationService {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self::with_api_base(TELEGRAM_API_BASE.to_string(), bot_token, chat_id)
    }

    /// 接続先を指定して作成する（テスト用のスタブサーバーなど）
    pub fn with_api_base(api_base: String, bot_token: String, chat_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            bot_token,
            chat_id,
        }
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }

    async fn send(&self, text: &str) -> std::result::Result<(), reqwest::Error> {
        self.http
            .post(self.send_message_url())
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text,
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl NotificationServiceTrait for TelegramNotificationService {
    async fn notify(&self, message: &str) -> Result<()> {
        let service = self.clone();
        let message = message.to_string();

        tokio::spawn(async move {
            if let Err(e) = service.send(&message).await {
                tracing::warn!(error = %e, "Failed to deliver Telegram notification");
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_url() {
        let service = TelegramNotificationService::new("123:abc".to_string(), "42".to_string());
        assert_eq!(
            service.send_message_url(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_payload_shape() {
        let payload = serde_json::to_value(SendMessage {
            chat_id: "42",
            text: "hello",
        })
        .unwrap();
        assert_eq!(payload, serde_json::json!({"chat_id": "42", "text": "hello"}));
    }
}
