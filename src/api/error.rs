use crate::application::book::BookApplicationError;
use crate::application::borrowing::BorrowingApplicationError;
use crate::application::payment::PaymentApplicationError;
use crate::application::user::UserApplicationError;
use crate::domain::{BorrowBookError, ReturnBookError};
use crate::ports::CheckoutError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    Book(BookApplicationError),
    Borrowing(BorrowingApplicationError),
    Payment(PaymentApplicationError),
    User(UserApplicationError),
    /// 認証情報がない
    Unauthenticated,
    /// リクエストの形式が不正（クエリパラメーターなど）
    BadRequest(String),
}

impl From<BookApplicationError> for ApiError {
    fn from(err: BookApplicationError) -> Self {
        ApiError::Book(err)
    }
}

impl From<BorrowingApplicationError> for ApiError {
    fn from(err: BorrowingApplicationError) -> Self {
        ApiError::Borrowing(err)
    }
}

impl From<PaymentApplicationError> for ApiError {
    fn from(err: PaymentApplicationError) -> Self {
        ApiError::Payment(err)
    }
}

impl From<UserApplicationError> for ApiError {
    fn from(err: UserApplicationError) -> Self {
        ApiError::User(err)
    }
}

type ErrorParts = (StatusCode, &'static str, String);

/// 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
fn internal(error_type: &'static str, err: &dyn std::error::Error) -> ErrorParts {
    tracing::error!(error_type, error = %err, source = ?err.source(), "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        error_type,
        "Internal server error".to_string(),
    )
}

fn book_error(err: &BookApplicationError) -> ErrorParts {
    match err {
        BookApplicationError::PermissionDenied => {
            (StatusCode::FORBIDDEN, "PERMISSION_DENIED", err.to_string())
        }
        BookApplicationError::BookNotFound => {
            (StatusCode::NOT_FOUND, "BOOK_NOT_FOUND", err.to_string())
        }
        BookApplicationError::DuplicateTitle => {
            (StatusCode::BAD_REQUEST, "DUPLICATE_TITLE", err.to_string())
        }
        BookApplicationError::Validation(_) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
        }
        BookApplicationError::RepositoryError(_) => internal("REPOSITORY_ERROR", err),
    }
}

fn borrowing_error(err: &BorrowingApplicationError) -> ErrorParts {
    match err {
        BorrowingApplicationError::BookNotFound(_) => {
            (StatusCode::BAD_REQUEST, "BOOK_NOT_FOUND", err.to_string())
        }
        BorrowingApplicationError::BorrowingNotFound => {
            (StatusCode::NOT_FOUND, "BORROWING_NOT_FOUND", err.to_string())
        }
        BorrowingApplicationError::Borrow(e) => {
            let error_type = match e {
                BorrowBookError::OutOfStock => "OUT_OF_STOCK",
                BorrowBookError::ActiveBorrowingExists => "ACTIVE_BORROWING_EXISTS",
                BorrowBookError::ReturnDateBeforeBorrowDate => "INVALID_RETURN_DATE",
                BorrowBookError::RentalPeriodTooLong => "RENTAL_PERIOD_TOO_LONG",
            };
            (StatusCode::BAD_REQUEST, error_type, err.to_string())
        }
        BorrowingApplicationError::Return(ReturnBookError::AlreadyReturned) => {
            (StatusCode::BAD_REQUEST, "ALREADY_RETURNED", err.to_string())
        }
        BorrowingApplicationError::Payment(e) => payment_error(e),
        BorrowingApplicationError::RepositoryError(_) => internal("REPOSITORY_ERROR", err),
    }
}

fn checkout_error(err: &CheckoutError) -> ErrorParts {
    match err {
        CheckoutError::CardDeclined(_) => {
            (StatusCode::PAYMENT_REQUIRED, "CARD_DECLINED", err.to_string())
        }
        CheckoutError::RateLimited => (
            StatusCode::TOO_MANY_REQUESTS,
            "PAYMENT_RATE_LIMITED",
            err.to_string(),
        ),
        CheckoutError::Authentication => {
            tracing::error!("Checkout provider rejected our credentials");
            (
                StatusCode::BAD_GATEWAY,
                "PAYMENT_PROVIDER_AUTH_FAILED",
                err.to_string(),
            )
        }
        CheckoutError::Connection => (
            StatusCode::SERVICE_UNAVAILABLE,
            "PAYMENT_PROVIDER_UNAVAILABLE",
            err.to_string(),
        ),
        CheckoutError::Provider(_) => (
            StatusCode::BAD_REQUEST,
            "PAYMENT_PROVIDER_ERROR",
            err.to_string(),
        ),
    }
}

fn payment_error(err: &PaymentApplicationError) -> ErrorParts {
    match err {
        PaymentApplicationError::PaymentNotFound => {
            (StatusCode::NOT_FOUND, "PAYMENT_NOT_FOUND", err.to_string())
        }
        PaymentApplicationError::BorrowingNotFound => {
            (StatusCode::NOT_FOUND, "BORROWING_NOT_FOUND", err.to_string())
        }
        PaymentApplicationError::MissingSession => (
            StatusCode::BAD_REQUEST,
            "PAYMENT_SESSION_MISSING",
            err.to_string(),
        ),
        PaymentApplicationError::PaymentNotCompleted => (
            StatusCode::BAD_REQUEST,
            "PAYMENT_NOT_COMPLETED",
            err.to_string(),
        ),
        PaymentApplicationError::Checkout(e) => checkout_error(e),
        PaymentApplicationError::RepositoryError(_) => internal("REPOSITORY_ERROR", err),
    }
}

fn user_error(err: &UserApplicationError) -> ErrorParts {
    match err {
        UserApplicationError::Validation(_) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
        }
        UserApplicationError::EmailTaken => {
            (StatusCode::BAD_REQUEST, "EMAIL_TAKEN", err.to_string())
        }
        UserApplicationError::InvalidCredentials => {
            (StatusCode::BAD_REQUEST, "INVALID_CREDENTIALS", err.to_string())
        }
        UserApplicationError::InvalidToken => {
            (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", err.to_string())
        }
        UserApplicationError::UserNotFound => {
            (StatusCode::NOT_FOUND, "USER_NOT_FOUND", err.to_string())
        }
        UserApplicationError::PasswordHash(_) => internal("PASSWORD_HASH_ERROR", err),
        UserApplicationError::TokenEncoding(_) => internal("TOKEN_ERROR", err),
        UserApplicationError::RepositoryError(_) => internal("REPOSITORY_ERROR", err),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::Book(e) => book_error(e),
            ApiError::Borrowing(e) => borrowing_error(e),
            ApiError::Payment(e) => payment_error(e),
            ApiError::User(e) => user_error(e),
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "NOT_AUTHENTICATED",
                "Authentication credentials were not provided.".to_string(),
            ),
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", message.clone())
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_business_rule_violations_are_client_errors() {
        assert_eq!(
            status_of(BorrowingApplicationError::Borrow(BorrowBookError::OutOfStock).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(
                BorrowingApplicationError::Return(ReturnBookError::AlreadyReturned).into()
            ),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(BorrowingApplicationError::BorrowingNotFound.into()),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_checkout_errors_have_distinct_statuses() {
        let status = |e: CheckoutError| status_of(PaymentApplicationError::Checkout(e).into());

        assert_eq!(
            status(CheckoutError::CardDeclined("declined".to_string())),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(status(CheckoutError::RateLimited), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(status(CheckoutError::Authentication), StatusCode::BAD_GATEWAY);
        assert_eq!(status(CheckoutError::Connection), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            status(CheckoutError::Provider("boom".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_checkout_error_inside_borrowing_uses_payment_mapping() {
        let err = BorrowingApplicationError::Payment(PaymentApplicationError::Checkout(
            CheckoutError::RateLimited,
        ));
        assert_eq!(status_of(err.into()), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_repository_errors_are_internal() {
        let err = BookApplicationError::RepositoryError("db down".into());
        assert_eq!(status_of(err.into()), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_permission_and_auth_errors() {
        assert_eq!(
            status_of(BookApplicationError::PermissionDenied.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_of(ApiError::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(UserApplicationError::InvalidToken.into()),
            StatusCode::UNAUTHORIZED
        );
    }
}
