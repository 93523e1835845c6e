use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BorrowingId, Caller, UserId};

/// コマンド：書籍を借りる
///
/// 書籍はタイトルで指定する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowBook {
    pub user_id: UserId,
    pub book_title: String,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnBook {
    pub borrowing_id: BorrowingId,
    pub caller: Caller,
    pub returned_on: NaiveDate,
}

/// コマンド：ユーザーを登録する
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterUser {
    pub email: String,
    pub password: String,
}

/// コマンド：自分のプロフィールを更新する
///
/// 指定されたフィールドのみ変更する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProfile {
    pub user_id: UserId,
    pub email: Option<String>,
    pub password: Option<String>,
}
