use crate::ports::checkout_provider::{
    CheckoutError, CheckoutProvider as CheckoutProviderTrait, CheckoutRequest, CheckoutSession,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// CheckoutProviderのモック実装
///
/// セッションをメモリ上に保持する。IDは`cs_test_{連番}`。
/// `mark_paid`で支払い完了を、`fail_with`でプロバイダーのエラーを再現できる。
pub struct CheckoutProvider {
    sessions: Mutex<HashMap<String, CheckoutSession>>,
    requests: Mutex<Vec<CheckoutRequest>>,
    failure: Mutex<Option<CheckoutError>>,
}

impl CheckoutProvider {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    /// 受け付けたセッション作成リクエストを取得（テスト用）
    pub fn requests(&self) -> Vec<CheckoutRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// セッションを支払い済みにする（テスト用）
    pub fn mark_paid(&self, session_id: &str) {
        if let Some(session) = self.sessions.lock().unwrap().get_mut(session_id) {
            session.paid = true;
        }
    }

    /// 以降の呼び出しを指定したエラーで失敗させる（テスト用）
    ///
    /// `None`で解除する。
    pub fn fail_with(&self, error: Option<CheckoutError>) {
        *self.failure.lock().unwrap() = error;
    }

    fn check_failure(&self) -> Result<(), CheckoutError> {
        match self.failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for CheckoutProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CheckoutProviderTrait for CheckoutProvider {
    async fn create_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError> {
        self.check_failure()?;

        let mut sessions = self.sessions.lock().unwrap();
        let session_id = format!("cs_test_{}", sessions.len() + 1);
        let session = CheckoutSession {
            session_id: session_id.clone(),
            url: Some(format!("https://checkout.example.com/pay/{}", session_id)),
            amount_total: Some(request.amount),
            currency: Some("usd".to_string()),
            paid: false,
        };
        sessions.insert(session_id, session.clone());
        self.requests.lock().unwrap().push(request);

        Ok(session)
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, CheckoutError> {
        self.check_failure()?;

        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| CheckoutError::Provider(format!("No such checkout session: {}", session_id)))
    }
}
