use crate::application::payment;
use crate::domain::PaymentId;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use super::AppState;
use crate::api::{
    error::ApiError,
    extractor::AuthenticatedUser,
    types::{
        PaymentCallbackQuery, PaymentCancelledResponse, PaymentResponse, PaymentSuccessResponse,
    },
};

/// リダイレクトのクエリから支払いIDを取り出す
fn callback_payment_id(query: PaymentCallbackQuery) -> Result<PaymentId, ApiError> {
    let raw = query
        .payment_id
        .ok_or_else(|| ApiError::BadRequest("payment_id is required".to_string()))?;
    let uuid = Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::BadRequest(format!("Invalid payment_id: {raw}")))?;
    Ok(PaymentId::from_uuid(uuid))
}

/// GET /payments - 支払い一覧
///
/// スタッフはすべて、それ以外は自分の貸出の支払いのみ。
pub async fn list_payments(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let payments = payment::list_payments(&state.service_deps, user.caller()).await?;
    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}

/// GET /payments/:id - 支払い詳細
pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let details = payment::get_payment(
        &state.service_deps,
        user.caller(),
        PaymentId::from_uuid(payment_id),
    )
    .await?;
    Ok(Json(details.into()))
}

/// GET /payments/success?payment_id= - 決済成功時のリダイレクト先
pub async fn payment_success(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaymentCallbackQuery>,
) -> Result<Json<PaymentSuccessResponse>, ApiError> {
    let payment_id = callback_payment_id(query)?;
    let receipt = payment::confirm_payment(&state.service_deps, payment_id).await?;
    Ok(Json(receipt.into()))
}

/// GET /payments/cancel?payment_id= - 決済キャンセル時のリダイレクト先
///
/// 後から支払えるよう決済URLを返す。ステータスコードは400。
pub async fn payment_cancel(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaymentCallbackQuery>,
) -> Result<(StatusCode, Json<PaymentCancelledResponse>), ApiError> {
    let payment_id = callback_payment_id(query)?;
    let cancellation = payment::cancel_payment(&state.service_deps, payment_id).await?;
    Ok((StatusCode::BAD_REQUEST, Json(cancellation.into())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_payment_id_requires_valid_uuid() {
        let missing = PaymentCallbackQuery { payment_id: None };
        assert!(matches!(
            callback_payment_id(missing),
            Err(ApiError::BadRequest(_))
        ));

        let invalid = PaymentCallbackQuery {
            payment_id: Some("42".to_string()),
        };
        assert!(matches!(
            callback_payment_id(invalid),
            Err(ApiError::BadRequest(_))
        ));

        let id = Uuid::new_v4();
        let valid = PaymentCallbackQuery {
            payment_id: Some(id.to_string()),
        };
        assert_eq!(
            callback_payment_id(valid).unwrap(),
            PaymentId::from_uuid(id)
        );
    }
}
