use crate::domain::{
    ActiveBorrowing, Book, BookId, Borrowing, BorrowingCore, BorrowingId, CheckoutSessionRef,
    CoverType, DailyFee, Email, Payment, PaymentId, PaymentStatus, PaymentType, ReturnedBorrowing,
    User, UserId,
};
use crate::ports::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Row, postgres::PgRow};
use std::str::FromStr;

/// 不正な行データのエラーを作成する
pub(super) fn invalid_data(message: impl Into<String>) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message.into(),
    ))
}

/// 一意制約違反かどうか
pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// PostgreSQLの行データをBookに変換する
///
/// inventoryのi64からu32への変換、coverの文字列からの変換、
/// daily_feeの不変条件の検証でエラーハンドリングを行う。
pub(super) fn map_row_to_book(row: &PgRow) -> Result<Book> {
    let inventory_i64: i64 = row.get("inventory");
    let inventory = u32::try_from(inventory_i64)
        .map_err(|_| invalid_data(format!("inventory out of range: {}", inventory_i64)))?;

    let cover_str: &str = row.get("cover");
    let cover = CoverType::from_str(cover_str).map_err(invalid_data)?;

    let daily_fee_raw: Decimal = row.get("daily_fee");
    let daily_fee = DailyFee::try_from(daily_fee_raw)
        .map_err(|e| invalid_data(format!("daily_fee {}: {}", daily_fee_raw, e)))?;

    Ok(Book {
        book_id: BookId::from_uuid(row.get("book_id")),
        title: row.get("title"),
        author: row.get("author"),
        cover,
        inventory,
        daily_fee,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// PostgreSQLの行データをBorrowingに変換する
///
/// actual_return_dateの有無で状態を判定する。
pub(super) fn map_row_to_borrowing(row: &PgRow) -> Result<Borrowing> {
    let core = BorrowingCore {
        borrowing_id: BorrowingId::from_uuid(row.get("borrowing_id")),
        book_id: BookId::from_uuid(row.get("book_id")),
        user_id: UserId::from_uuid(row.get("user_id")),
        borrow_date: row.get("borrow_date"),
        expected_return_date: row.get("expected_return_date"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    };

    let actual_return_date: Option<NaiveDate> = row.get("actual_return_date");

    Ok(match actual_return_date {
        None => Borrowing::Active(ActiveBorrowing { core }),
        Some(actual_return_date) => Borrowing::Returned(ReturnedBorrowing {
            core,
            actual_return_date,
        }),
    })
}

/// PostgreSQLの行データをActiveBorrowingに変換する
pub(super) fn map_row_to_active_borrowing(row: &PgRow) -> Result<ActiveBorrowing> {
    match map_row_to_borrowing(row)? {
        Borrowing::Active(active) => Ok(active),
        Borrowing::Returned(returned) => Err(invalid_data(format!(
            "borrowing {} is already returned",
            returned.borrowing_id.value()
        ))),
    }
}

/// PostgreSQLの行データをPaymentに変換する
pub(super) fn map_row_to_payment(row: &PgRow) -> Result<Payment> {
    let status_str: &str = row.get("status");
    let status = PaymentStatus::from_str(status_str).map_err(invalid_data)?;

    let type_str: &str = row.get("payment_type");
    let payment_type = PaymentType::from_str(type_str).map_err(invalid_data)?;

    let session_id: Option<String> = row.get("session_id");
    let session_url: Option<String> = row.get("session_url");
    let session = match (session_id, session_url) {
        (Some(session_id), Some(session_url)) => Some(CheckoutSessionRef {
            session_id,
            session_url,
        }),
        _ => None,
    };

    Ok(Payment {
        payment_id: PaymentId::from_uuid(row.get("payment_id")),
        borrowing_id: BorrowingId::from_uuid(row.get("borrowing_id")),
        status,
        payment_type,
        money_to_pay: row.get("money_to_pay"),
        session,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// PostgreSQLの行データをUserに変換する
pub(super) fn map_row_to_user(row: &PgRow) -> Result<User> {
    let email_str: &str = row.get("email");
    let email = Email::parse(email_str)
        .map_err(|e| invalid_data(format!("invalid email {:?}: {:?}", email_str, e)))?;

    Ok(User {
        user_id: UserId::from_uuid(row.get("user_id")),
        email,
        password_hash: row.get("password_hash"),
        is_staff: row.get("is_staff"),
        is_superuser: row.get("is_superuser"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
