use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::borrowing::{BorrowOutcome, BorrowingDetails, ReturnOutcome};
use crate::application::payment::{PaymentCancellation, PaymentDetails, PaymentReceipt};
use crate::application::user::AccessToken;
use crate::domain::{Book, Borrowing, CoverType, Payment, User};

// ============================================================================
// Users
// ============================================================================

/// ユーザー登録リクエスト（POST /users）
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
}

/// トークン発行リクエスト（POST /users/token）
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

/// プロフィール更新リクエスト（PATCH /users/me）
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// ユーザーレスポンス（パスワードは含めない）
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub is_staff: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.user_id.value(),
            email: user.email.to_string(),
            is_staff: user.is_staff,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access: String,
    pub expires_in: i64,
}

impl From<AccessToken> for TokenResponse {
    fn from(token: AccessToken) -> Self {
        Self {
            access: token.access_token,
            expires_in: token.expires_in,
        }
    }
}

// ============================================================================
// Books
// ============================================================================

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub cover: CoverType,
    pub inventory: u32,
    pub daily_fee: Decimal,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.book_id.value(),
            title: book.title,
            author: book.author,
            cover: book.cover,
            inventory: book.inventory,
            daily_fee: book.daily_fee.value(),
        }
    }
}

// ============================================================================
// Borrowings
// ============================================================================

/// 貸出一覧取得のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct ListBorrowingsQuery {
    /// 未返却のみ（true）／返却済みのみ（false）
    pub is_active: Option<bool>,
    /// 利用者IDでフィルタリング（スタッフのみ有効）
    pub user_id: Option<Uuid>,
}

/// 貸出作成リクエスト（書籍はタイトルで指定）
#[derive(Debug, Deserialize)]
pub struct CreateBorrowingRequest {
    pub book: String,
    pub expected_return_date: NaiveDate,
}

/// 貸出に埋め込む支払いの要約
#[derive(Debug, Serialize)]
pub struct PaymentSummary {
    pub id: Uuid,
    pub status: String,
    #[serde(rename = "type")]
    pub payment_type: String,
    pub money_to_pay: Decimal,
}

impl From<&Payment> for PaymentSummary {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.payment_id.value(),
            status: payment.status.as_str().to_string(),
            payment_type: payment.payment_type.as_str().to_string(),
            money_to_pay: payment.money_to_pay,
        }
    }
}

/// 貸出一覧の要素
///
/// 書籍はタイトルのみ。未返却の間は`actual_return_date`を出力しない。
#[derive(Debug, Serialize)]
pub struct BorrowingListItem {
    pub id: Uuid,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_return_date: Option<NaiveDate>,
    pub book: String,
    pub payments: Vec<PaymentSummary>,
}

impl From<&BorrowingDetails> for BorrowingListItem {
    fn from(details: &BorrowingDetails) -> Self {
        let core = details.borrowing.core();
        Self {
            id: core.borrowing_id.value(),
            borrow_date: core.borrow_date,
            expected_return_date: core.expected_return_date,
            actual_return_date: details.borrowing.actual_return_date(),
            book: details.book.title.clone(),
            payments: details.payments.iter().map(PaymentSummary::from).collect(),
        }
    }
}

/// 貸出詳細（書籍をネストして返す）
#[derive(Debug, Serialize)]
pub struct BorrowingDetailResponse {
    pub id: Uuid,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_return_date: Option<NaiveDate>,
    pub book: BookResponse,
    pub payments: Vec<PaymentSummary>,
}

impl BorrowingDetailResponse {
    fn build(borrowing: &Borrowing, book: Book, payments: &[Payment]) -> Self {
        let core = borrowing.core();
        Self {
            id: core.borrowing_id.value(),
            borrow_date: core.borrow_date,
            expected_return_date: core.expected_return_date,
            actual_return_date: borrowing.actual_return_date(),
            book: book.into(),
            payments: payments.iter().map(PaymentSummary::from).collect(),
        }
    }
}

impl From<BorrowingDetails> for BorrowingDetailResponse {
    fn from(details: BorrowingDetails) -> Self {
        Self::build(&details.borrowing, details.book, &details.payments)
    }
}

/// 貸出作成レスポンス
///
/// 決済セッションが作成された場合は支払いURLを含む。
#[derive(Debug, Serialize)]
pub struct BorrowingCreatedResponse {
    #[serde(flatten)]
    pub borrowing: BorrowingDetailResponse,
    pub session_url: Option<String>,
}

impl From<BorrowOutcome> for BorrowingCreatedResponse {
    fn from(outcome: BorrowOutcome) -> Self {
        let session_url = outcome
            .payment
            .as_ref()
            .and_then(|p| p.session.as_ref())
            .map(|s| s.session_url.clone());
        let payments: Vec<Payment> = outcome.payment.into_iter().collect();
        Self {
            borrowing: BorrowingDetailResponse::build(
                &Borrowing::from(outcome.borrowing),
                outcome.book,
                &payments,
            ),
            session_url,
        }
    }
}

/// 返却レスポンス
///
/// 延滞していた場合は延滞金の支払いと支払いURLを含む。
#[derive(Debug, Serialize)]
pub struct BookReturnedResponse {
    pub message: String,
    pub id: Uuid,
    pub book: String,
    pub actual_return_date: NaiveDate,
    pub fine: Option<PaymentSummary>,
    pub session_url: Option<String>,
}

impl From<ReturnOutcome> for BookReturnedResponse {
    fn from(outcome: ReturnOutcome) -> Self {
        Self {
            message: "Book returned successfully.".to_string(),
            id: outcome.borrowing.borrowing_id.value(),
            book: outcome.book.title,
            actual_return_date: outcome.borrowing.actual_return_date,
            fine: outcome.fine.as_ref().map(PaymentSummary::from),
            session_url: outcome
                .fine
                .as_ref()
                .and_then(|p| p.session.as_ref())
                .map(|s| s.session_url.clone()),
        }
    }
}

// ============================================================================
// Payments
// ============================================================================

/// 決済プロバイダーからのリダイレクトのクエリパラメータ
///
/// 欠落・不正な値を400として扱うため、文字列のまま受け取る。
#[derive(Debug, Default, Deserialize)]
pub struct PaymentCallbackQuery {
    pub payment_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub status: String,
    #[serde(rename = "type")]
    pub payment_type: String,
    pub borrowing: BorrowingListItem,
    pub session_url: Option<String>,
    pub session_id: Option<String>,
    pub money_to_pay: Decimal,
}

impl From<PaymentDetails> for PaymentResponse {
    fn from(details: PaymentDetails) -> Self {
        let payment = details.payment;
        Self {
            id: payment.payment_id.value(),
            status: payment.status.as_str().to_string(),
            payment_type: payment.payment_type.as_str().to_string(),
            borrowing: BorrowingListItem::from(&details.borrowing),
            session_url: payment.session.as_ref().map(|s| s.session_url.clone()),
            session_id: payment.session.map(|s| s.session_id),
            money_to_pay: payment.money_to_pay,
        }
    }
}

/// 決済成功時のレスポンス
#[derive(Debug, Serialize)]
pub struct PaymentSuccessResponse {
    pub message: String,
    pub amount_paid: Decimal,
    pub currency: String,
}

impl From<PaymentReceipt> for PaymentSuccessResponse {
    fn from(receipt: PaymentReceipt) -> Self {
        Self {
            message: "Payment successful".to_string(),
            amount_paid: receipt.amount_paid,
            currency: receipt.currency,
        }
    }
}

/// 決済キャンセル時のレスポンス
#[derive(Debug, Serialize)]
pub struct PaymentCancelledResponse {
    pub message: String,
    pub pay: Option<String>,
    pub amount_paid: Decimal,
    pub currency: String,
}

impl From<PaymentCancellation> for PaymentCancelledResponse {
    fn from(cancellation: PaymentCancellation) -> Self {
        Self {
            message: "Payment was cancelled.You can pay the rent within 24 hours".to_string(),
            pay: cancellation.pay_url,
            amount_paid: cancellation.amount,
            currency: cancellation.currency,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
