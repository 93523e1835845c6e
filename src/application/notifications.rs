use crate::application::ServiceDependencies;
use crate::domain::{BookBorrowed, BookReturned, BorrowingOverdue};
use chrono::NaiveDate;
use futures::StreamExt;

/// 貸出作成時の通知メッセージ
pub fn borrowing_created_message(event: &BookBorrowed) -> String {
    format!(
        "New borrowing for book: {}, Expected return date: {}",
        event.book_title, event.expected_return_date
    )
}

/// 返却時の通知メッセージ
pub fn book_returned_message(event: &BookReturned) -> String {
    if event.was_overdue() {
        format!(
            "Book returned: {}, Returned on: {} ({} days overdue)",
            event.book_title, event.actual_return_date, event.overdue_days
        )
    } else {
        format!(
            "Book returned: {}, Returned on: {}",
            event.book_title, event.actual_return_date
        )
    }
}

/// 延滞リマインダーのメッセージ
pub fn overdue_reminder_message(event: &BorrowingOverdue) -> String {
    format!(
        "📚 Borrowing Overdue Reminder ‼️\n\
         User: {}\n\
         Book: {}\n\
         Borrow Date: {}\n\
         Expected Return Date: {}\n\
         Overdue by: {} days\n",
        event.user_email,
        event.book_title,
        event.borrow_date,
        event.expected_return_date,
        event.overdue_days
    )
}

/// 通知を送信する
///
/// 送信失敗はログに残すのみで、呼び出し元には返さない。
pub async fn dispatch(deps: &ServiceDependencies, message: String) -> bool {
    match deps.notification_service.notify(&message).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to send notification");
            false
        }
    }
}

/// 延滞リマインダーバッチ
///
/// 定期的に実行され、返却予定日が`today`以前の未返却の貸出ごとに1通送信する。
///
/// 処理フロー：
/// 1. 延滞中の貸出をストリームで取得
/// 2. 各貸出について利用者と書籍を取得し、メッセージを送信
/// 3. 送信件数を返す
///
/// 利用者・書籍が見つからない貸出はスキップする。
///
/// # エラー
/// ポート層のI/Oエラー（BorrowingRepository, UserRepository, BookRepository）
pub async fn send_overdue_reminders(
    deps: &ServiceDependencies,
    today: NaiveDate,
) -> std::result::Result<usize, Box<dyn std::error::Error + Send + Sync>> {
    let mut sent = 0;
    let mut overdue = deps.borrowing_repository.stream_overdue(today);

    while let Some(borrowing) = overdue.next().await {
        let borrowing = borrowing?;

        let Some(user) = deps.user_repository.get_by_id(borrowing.user_id).await? else {
            continue;
        };
        let Some(book) = deps.book_repository.get_by_id(borrowing.book_id).await? else {
            continue;
        };

        let event = BorrowingOverdue {
            borrowing_id: borrowing.borrowing_id,
            user_email: user.email.to_string(),
            book_title: book.title,
            borrow_date: borrowing.borrow_date,
            expected_return_date: borrowing.expected_return_date,
            overdue_days: (today - borrowing.expected_return_date).num_days(),
        };

        if dispatch(deps, overdue_reminder_message(&event)).await {
            sent += 1;
        }
    }

    tracing::info!(sent, "Overdue reminders dispatched");
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookId, BorrowingId, UserId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_borrowing_created_message() {
        let event = BookBorrowed {
            borrowing_id: BorrowingId::new(),
            book_id: BookId::new(),
            user_id: UserId::new(),
            book_title: "Dune".to_string(),
            borrow_date: date(2024, 5, 1),
            expected_return_date: date(2024, 5, 8),
        };
        assert_eq!(
            borrowing_created_message(&event),
            "New borrowing for book: Dune, Expected return date: 2024-05-08"
        );
    }

    #[test]
    fn test_book_returned_message_mentions_overdue_days() {
        let mut event = BookReturned {
            borrowing_id: BorrowingId::new(),
            book_id: BookId::new(),
            user_id: UserId::new(),
            book_title: "Dune".to_string(),
            actual_return_date: date(2024, 5, 10),
            overdue_days: 2,
        };
        assert!(book_returned_message(&event).contains("2 days overdue"));

        event.overdue_days = 0;
        assert!(!book_returned_message(&event).contains("overdue"));
    }

    #[test]
    fn test_overdue_reminder_message() {
        let event = BorrowingOverdue {
            borrowing_id: BorrowingId::new(),
            user_email: "reader@example.com".to_string(),
            book_title: "Dune".to_string(),
            borrow_date: date(2024, 5, 1),
            expected_return_date: date(2024, 5, 8),
            overdue_days: 3,
        };
        let message = overdue_reminder_message(&event);
        assert!(message.contains("User: reader@example.com"));
        assert!(message.contains("Book: Dune"));
        assert!(message.contains("Borrow Date: 2024-05-01"));
        assert!(message.contains("Expected Return Date: 2024-05-08"));
        assert!(message.contains("Overdue by: 3 days"));
    }
}
