use crate::ports::checkout_provider::{
    CheckoutError, CheckoutProvider as CheckoutProviderTrait, CheckoutRequest, CheckoutSession,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use stripe::{
    CheckoutSessionId, CheckoutSessionMode, CheckoutSessionPaymentStatus, Client,
    CreateCheckoutSession, CreateCheckoutSessionLineItems, CreateCheckoutSessionLineItemsPriceData,
    CreateCheckoutSessionLineItemsPriceDataProductData, CreateCheckoutSessionPaymentMethodTypes,
    Currency, ErrorType, StripeError,
};

/// 金額を最小通貨単位（セント）に変換する
fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::ONE_HUNDRED).round().to_i64()
}

/// 最小通貨単位（セント）から金額に変換する
fn from_minor_units(amount: i64) -> Decimal {
    Decimal::new(amount, 2)
}

/// Stripeのリクエストエラーを分類する
///
/// - カードエラーまたは402 → CardDeclined
/// - 429 → RateLimited
/// - 401 → Authentication
/// - それ以外 → Provider
fn classify_request_error(http_status: u16, card_error: bool, message: Option<String>) -> CheckoutError {
    let message = message.unwrap_or_else(|| format!("HTTP {}", http_status));
    match http_status {
        _ if card_error => CheckoutError::CardDeclined(message),
        402 => CheckoutError::CardDeclined(message),
        429 => CheckoutError::RateLimited,
        401 => CheckoutError::Authentication,
        _ => CheckoutError::Provider(message),
    }
}

fn map_stripe_error(err: StripeError) -> CheckoutError {
    match err {
        StripeError::Stripe(request_error) => classify_request_error(
            request_error.http_status,
            matches!(request_error.error_type, ErrorType::Card),
            request_error.message,
        ),
        StripeError::ClientError(_) | StripeError::Timeout => CheckoutError::Connection,
        other => CheckoutError::Provider(other.to_string()),
    }
}

fn into_session(session: stripe::CheckoutSession) -> CheckoutSession {
    CheckoutSession {
        session_id: session.id.to_string(),
        url: session.url,
        amount_total: session.amount_total.map(from_minor_units),
        currency: session.currency.map(|c| c.to_string()),
        paid: session.payment_status == CheckoutSessionPaymentStatus::Paid,
    }
}

/// Stripe Checkoutによる決済プロバイダー実装
///
/// USD建て、カード決済のみ。1回払い（mode=payment）のセッションを作成する。
pub struct StripeCheckoutProvider {
    client: Client,
}

impl StripeCheckoutProvider {
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: Client::new(secret_key),
        }
    }
}

#[async_trait]
impl CheckoutProviderTrait for StripeCheckoutProvider {
    async fn create_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError> {
        let unit_amount = to_minor_units(request.amount).ok_or_else(|| {
            CheckoutError::Provider(format!("Amount out of range: {}", request.amount))
        })?;

        let params = CreateCheckoutSession {
            payment_method_types: Some(vec![CreateCheckoutSessionPaymentMethodTypes::Card]),
            line_items: Some(vec![CreateCheckoutSessionLineItems {
                price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                    currency: Currency::USD,
                    product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                        name: request.description.clone(),
                        ..Default::default()
                    }),
                    unit_amount: Some(unit_amount),
                    ..Default::default()
                }),
                quantity: Some(1),
                ..Default::default()
            }]),
            mode: Some(CheckoutSessionMode::Payment),
            success_url: Some(request.success_url.as_str()),
            cancel_url: Some(request.cancel_url.as_str()),
            ..Default::default()
        };

        let session = stripe::CheckoutSession::create(&self.client, params)
            .await
            .map_err(map_stripe_error)?;

        tracing::debug!(session_id = %session.id, "Stripe checkout session created");
        Ok(into_session(session))
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, CheckoutError> {
        let id = session_id.parse::<CheckoutSessionId>().map_err(|e| {
            CheckoutError::Provider(format!(
                "Failed to parse checkout session id: {}. {}",
                session_id, e
            ))
        })?;

        let session = stripe::CheckoutSession::retrieve(&self.client, &id, &[])
            .await
            .map_err(map_stripe_error)?;

        Ok(into_session(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_minor_units() {
        assert_eq!(to_minor_units(Decimal::new(6000, 2)), Some(6000));
        assert_eq!(to_minor_units(Decimal::new(350, 2)), Some(350));
        assert_eq!(to_minor_units(Decimal::new(7, 0)), Some(700));
    }

    #[test]
    fn test_from_minor_units() {
        assert_eq!(from_minor_units(6000), Decimal::new(60, 0));
    }

    #[test]
    fn test_classify_card_declined() {
        assert_eq!(
            classify_request_error(402, true, Some("Your card was declined.".to_string())),
            CheckoutError::CardDeclined("Your card was declined.".to_string())
        );
        assert!(matches!(
            classify_request_error(400, true, None),
            CheckoutError::CardDeclined(_)
        ));
    }

    #[test]
    fn test_classify_rate_limit_and_auth() {
        assert_eq!(classify_request_error(429, false, None), CheckoutError::RateLimited);
        assert_eq!(classify_request_error(401, false, None), CheckoutError::Authentication);
    }

    #[test]
    fn test_classify_other_errors_as_provider() {
        assert_eq!(
            classify_request_error(400, false, Some("No such price".to_string())),
            CheckoutError::Provider("No such price".to_string())
        );
        assert_eq!(
            classify_request_error(500, false, None),
            CheckoutError::Provider("HTTP 500".to_string())
        );
    }

    #[test]
    fn test_transport_errors_are_connection_errors() {
        assert_eq!(map_stripe_error(StripeError::Timeout), CheckoutError::Connection);
        assert_eq!(
            map_stripe_error(StripeError::ClientError("connection reset".to_string())),
            CheckoutError::Connection
        );
    }
}
