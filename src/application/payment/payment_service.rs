use crate::application::ServiceDependencies;
use crate::application::borrowing::BorrowingDetails;
use crate::domain::{
    self, Book, Borrowing, Caller, CheckoutSessionRef, Payment, PaymentId,
};
use crate::ports::{CheckoutError, CheckoutRequest};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::errors::{PaymentApplicationError, Result};

/// 請求通貨（USDのみ）
const DEFAULT_CURRENCY: &str = "usd";

/// 支払いと、それが紐づく貸出の詳細
#[derive(Debug, Clone)]
pub struct PaymentDetails {
    pub payment: Payment,
    pub borrowing: BorrowingDetails,
}

/// 支払い完了時の応答内容
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    pub payment: Payment,
    pub amount_paid: Decimal,
    pub currency: String,
}

/// 支払いキャンセル時の応答内容
///
/// 利用者が後から支払えるよう、セッションURLを返す。
#[derive(Debug, Clone)]
pub struct PaymentCancellation {
    pub payment: Payment,
    pub pay_url: Option<String>,
    pub amount: Decimal,
    pub currency: String,
}

/// 決済後のリダイレクト先URL
fn callback_url(deps: &ServiceDependencies, outcome: &str, payment_id: PaymentId) -> String {
    format!(
        "{}/payments/{}?payment_id={}",
        deps.settings.public_base_url,
        outcome,
        payment_id.value()
    )
}

/// 支払いを取得するヘルパー関数
async fn load_payment(deps: &ServiceDependencies, payment_id: PaymentId) -> Result<Payment> {
    deps.payment_repository
        .get_by_id(payment_id)
        .await
        .map_err(PaymentApplicationError::RepositoryError)?
        .ok_or(PaymentApplicationError::PaymentNotFound)
}

/// 料金を計算し、決済セッション付きの支払いを用意する
///
/// 処理フロー：
/// 1. 料金計算（請求なしなら何もしない）
/// 2. 決済プロバイダーにセッションを作成
/// 3. セッションIDとURLを支払いに設定
///
/// 支払いは保存しない。呼び出し側が貸出・返却の記録と同じ
/// トランザクションで保存するため、セッション作成に失敗した場合は
/// 何も変更されない。請求が発生しない場合は`Ok(None)`。
pub async fn prepare_payment(
    deps: &ServiceDependencies,
    borrowing: &Borrowing,
    book: &Book,
    now: DateTime<Utc>,
) -> Result<Option<Payment>> {
    let charge = borrowing.charge(book.daily_fee);

    let Some(payment) = domain::open_payment(borrowing.core().borrowing_id, charge, now) else {
        return Ok(None);
    };

    let request = CheckoutRequest {
        amount: payment.money_to_pay,
        description: book.title.clone(),
        success_url: callback_url(deps, "success", payment.payment_id),
        cancel_url: callback_url(deps, "cancel", payment.payment_id),
    };

    let session = match deps.checkout_provider.create_session(request).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(
                borrowing_id = %borrowing.core().borrowing_id.value(),
                error = %e,
                "Failed to create checkout session"
            );
            return Err(e.into());
        }
    };

    let session_url = session.url.ok_or_else(|| {
        CheckoutError::Provider("Checkout session has no URL".to_string())
    })?;

    let payment = domain::attach_session(
        payment,
        CheckoutSessionRef {
            session_id: session.session_id,
            session_url,
        },
        now,
    );

    tracing::info!(
        payment_id = %payment.payment_id.value(),
        payment_type = payment.payment_type.as_str(),
        amount = %payment.money_to_pay,
        "Checkout session opened"
    );

    Ok(Some(payment))
}

/// 支払い完了を確定する（決済成功時のリダイレクト）
///
/// ビジネスルール：
/// - 決済プロバイダーが支払い済みと報告した場合のみPAIDにする
/// - 既にPAIDなら何もしない（冪等）
pub async fn confirm_payment(
    deps: &ServiceDependencies,
    payment_id: PaymentId,
) -> Result<PaymentReceipt> {
    let payment = load_payment(deps, payment_id).await?;
    let session_id = payment
        .session
        .as_ref()
        .map(|s| s.session_id.clone())
        .ok_or(PaymentApplicationError::MissingSession)?;

    let session = deps.checkout_provider.retrieve_session(&session_id).await?;

    if !session.paid {
        return Err(PaymentApplicationError::PaymentNotCompleted);
    }

    let paid = domain::mark_paid(payment.clone(), Utc::now());
    if paid != payment {
        deps.payment_repository
            .save(&paid)
            .await
            .map_err(PaymentApplicationError::RepositoryError)?;
        tracing::info!(payment_id = %payment_id.value(), "Payment confirmed");
    }

    Ok(PaymentReceipt {
        amount_paid: session.amount_total.unwrap_or(paid.money_to_pay),
        currency: session
            .currency
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        payment: paid,
    })
}

/// 支払いを保留に戻す（決済キャンセル時のリダイレクト）
pub async fn cancel_payment(
    deps: &ServiceDependencies,
    payment_id: PaymentId,
) -> Result<PaymentCancellation> {
    let payment = load_payment(deps, payment_id).await?;
    let session_id = payment
        .session
        .as_ref()
        .map(|s| s.session_id.clone())
        .ok_or(PaymentApplicationError::MissingSession)?;

    let session = deps.checkout_provider.retrieve_session(&session_id).await?;

    let pending = domain::mark_pending(payment.clone(), Utc::now());
    if pending != payment {
        deps.payment_repository
            .save(&pending)
            .await
            .map_err(PaymentApplicationError::RepositoryError)?;
    }

    Ok(PaymentCancellation {
        pay_url: session
            .url
            .or_else(|| pending.session.as_ref().map(|s| s.session_url.clone())),
        amount: session.amount_total.unwrap_or(pending.money_to_pay),
        currency: session
            .currency
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        payment: pending,
    })
}

/// 支払いに紐づく貸出の詳細を読み込む
async fn load_details(deps: &ServiceDependencies, payment: Payment) -> Result<PaymentDetails> {
    let borrowing = deps
        .borrowing_repository
        .get_by_id(payment.borrowing_id)
        .await
        .map_err(PaymentApplicationError::RepositoryError)?
        .ok_or(PaymentApplicationError::BorrowingNotFound)?;

    let book = deps
        .book_repository
        .get_by_id(borrowing.core().book_id)
        .await
        .map_err(PaymentApplicationError::RepositoryError)?
        .ok_or(PaymentApplicationError::BorrowingNotFound)?;

    let payments = deps
        .payment_repository
        .list_for_borrowing(payment.borrowing_id)
        .await
        .map_err(PaymentApplicationError::RepositoryError)?;

    Ok(PaymentDetails {
        payment,
        borrowing: BorrowingDetails {
            borrowing,
            book,
            payments,
        },
    })
}

/// 支払い一覧を取得する
///
/// スタッフはすべての支払い、それ以外は自分の貸出に紐づく支払いのみ。
pub async fn list_payments(
    deps: &ServiceDependencies,
    caller: Caller,
) -> Result<Vec<PaymentDetails>> {
    let owner = (!caller.is_staff).then_some(caller.user_id);

    let payments = deps
        .payment_repository
        .list(owner)
        .await
        .map_err(PaymentApplicationError::RepositoryError)?;

    let mut details = Vec::with_capacity(payments.len());
    for payment in payments {
        details.push(load_details(deps, payment).await?);
    }
    Ok(details)
}

/// 支払いを取得する
///
/// 他の利用者の支払いは存在しないものとして扱う。
pub async fn get_payment(
    deps: &ServiceDependencies,
    caller: Caller,
    payment_id: PaymentId,
) -> Result<PaymentDetails> {
    let payment = load_payment(deps, payment_id).await?;
    let details = load_details(deps, payment).await?;

    if !caller.can_access(details.borrowing.borrowing.core().user_id) {
        return Err(PaymentApplicationError::PaymentNotFound);
    }

    Ok(details)
}
