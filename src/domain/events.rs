use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BookId, BorrowingId, UserId};

/// イベント：書籍が貸し出された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookBorrowed {
    pub borrowing_id: BorrowingId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub book_title: String,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
}

/// イベント：書籍が返却された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookReturned {
    pub borrowing_id: BorrowingId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub book_title: String,
    pub actual_return_date: NaiveDate,
    /// 返却予定日を過ぎた日数（期限内なら0）
    pub overdue_days: i64,
}

impl BookReturned {
    pub fn was_overdue(&self) -> bool {
        self.overdue_days > 0
    }
}

/// イベント：未返却のまま返却予定日を迎えた
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowingOverdue {
    pub borrowing_id: BorrowingId,
    pub user_email: String,
    pub book_title: String,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub overdue_days: i64,
}
