use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{
    Book, BookBorrowed, BookId, BookReturned, BorrowBookError, BorrowingId, Charge, DailyFee,
    ReturnBookError, UserId, calculate_charge,
};

// ============================================================================
// 型安全な状態パターン
// ============================================================================

/// Borrowing集約の共通フィールド
///
/// 貸出中・返却済みの両状態で共有されるコアデータ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowingCore {
    // 識別子
    pub borrowing_id: BorrowingId,

    // 他の集約への参照（IDのみ）
    pub book_id: BookId,
    pub user_id: UserId,

    // 貸出管理の責務
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,

    // 監査情報
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 貸出中状態
///
/// ビジネスルール：
/// - actual_return_dateを持たない（型で保証）
/// - 返却のみ可能
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBorrowing {
    #[serde(flatten)]
    pub core: BorrowingCore,
}

impl std::ops::Deref for ActiveBorrowing {
    type Target = BorrowingCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// 返却済み状態
///
/// ビジネスルール：
/// - actual_return_dateが必須（型で保証）
/// - 一度設定された返却日は変更不可
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnedBorrowing {
    #[serde(flatten)]
    pub core: BorrowingCore,
    pub actual_return_date: NaiveDate,
}

impl std::ops::Deref for ReturnedBorrowing {
    type Target = BorrowingCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// Borrowing集約の統合型
///
/// 状態遷移は Active → Returned の一方向のみ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum Borrowing {
    Active(ActiveBorrowing),
    Returned(ReturnedBorrowing),
}

impl Borrowing {
    pub fn core(&self) -> &BorrowingCore {
        match self {
            Borrowing::Active(active) => &active.core,
            Borrowing::Returned(returned) => &returned.core,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Borrowing::Active(_))
    }

    pub fn actual_return_date(&self) -> Option<NaiveDate> {
        match self {
            Borrowing::Active(_) => None,
            Borrowing::Returned(returned) => Some(returned.actual_return_date),
        }
    }

    /// 現在の状態に対する料金を計算する
    pub fn charge(&self, daily_fee: DailyFee) -> Charge {
        let core = self.core();
        calculate_charge(
            core.borrow_date,
            core.expected_return_date,
            self.actual_return_date(),
            daily_fee,
        )
    }
}

impl From<ActiveBorrowing> for Borrowing {
    fn from(active: ActiveBorrowing) -> Self {
        Borrowing::Active(active)
    }
}

impl From<ReturnedBorrowing> for Borrowing {
    fn from(returned: ReturnedBorrowing) -> Self {
        Borrowing::Returned(returned)
    }
}

/// 貸出期間の上限（日）
///
/// 日額料金の上限と合わせて、1回の請求額を決済プロバイダーと
/// `payments.money_to_pay`の上限内に収める。
pub const MAX_RENTAL_DAYS: i64 = 365;

// ============================================================================
// 純粋関数
// ============================================================================

/// 純粋関数：書籍を貸し出す
///
/// ビジネスルール：
/// - 在庫0の書籍は他の状態にかかわらず貸出不可（最初に判定）
/// - 未返却の貸出を持つ利用者は貸出不可
/// - 返却予定日は貸出日以降、貸出日から`MAX_RENTAL_DAYS`日以内
///
/// 副作用なし。在庫を1冊減らしたBook、新しいActiveBorrowing、イベントを返す。
pub fn borrow_book(
    book: &Book,
    user_id: UserId,
    has_active_borrowing: bool,
    borrow_date: NaiveDate,
    expected_return_date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<(Book, ActiveBorrowing, BookBorrowed), BorrowBookError> {
    // バリデーション：在庫
    let updated_book = book.lend_copy(now).ok_or(BorrowBookError::OutOfStock)?;

    // バリデーション：未返却の貸出
    if has_active_borrowing {
        return Err(BorrowBookError::ActiveBorrowingExists);
    }

    // バリデーション：返却予定日
    if expected_return_date < borrow_date {
        return Err(BorrowBookError::ReturnDateBeforeBorrowDate);
    }
    if (expected_return_date - borrow_date).num_days() > MAX_RENTAL_DAYS {
        return Err(BorrowBookError::RentalPeriodTooLong);
    }

    let borrowing = ActiveBorrowing {
        core: BorrowingCore {
            borrowing_id: BorrowingId::new(),
            book_id: book.book_id,
            user_id,
            borrow_date,
            expected_return_date,
            created_at: now,
            updated_at: now,
        },
    };

    let event = BookBorrowed {
        borrowing_id: borrowing.borrowing_id,
        book_id: book.book_id,
        user_id,
        book_title: book.title.clone(),
        borrow_date,
        expected_return_date,
    };

    Ok((updated_book, borrowing, event))
}

/// 純粋関数：書籍を返却する
///
/// ビジネスルール：
/// - 返却済みの貸出は何度呼んでも同じエラーになる
/// - 延滞していても返却は受け付ける（延滞料金は料金計算で扱う）
///
/// 副作用なし。在庫を1冊戻したBook、ReturnedBorrowing、イベントを返す。
pub fn return_book(
    borrowing: Borrowing,
    book: &Book,
    returned_on: NaiveDate,
    now: DateTime<Utc>,
) -> Result<(Book, ReturnedBorrowing, BookReturned), ReturnBookError> {
    let active = match borrowing {
        Borrowing::Active(active) => active,
        Borrowing::Returned(_) => return Err(ReturnBookError::AlreadyReturned),
    };

    let overdue_days = (returned_on - active.expected_return_date)
        .num_days()
        .max(0);

    let event = BookReturned {
        borrowing_id: active.borrowing_id,
        book_id: active.book_id,
        user_id: active.user_id,
        book_title: book.title.clone(),
        actual_return_date: returned_on,
        overdue_days,
    };

    let returned = ReturnedBorrowing {
        core: BorrowingCore {
            updated_at: now,
            ..active.core
        },
        actual_return_date: returned_on,
    };

    Ok((book.restock_copy(now), returned, event))
}
