use crate::application::{ServiceDependencies, notifications, payment};
use crate::domain::{
    self, ActiveBorrowing, Book, BorrowBookError, Borrowing, BorrowingId, Caller, Payment,
    ReturnBookError, ReturnedBorrowing, commands::*,
};
use crate::ports::{BorrowRecordOutcome, BorrowingFilter};
use chrono::Utc;

use super::errors::{BorrowingApplicationError, Result};

/// 貸出と、書籍・支払いをまとめたビュー
#[derive(Debug, Clone)]
pub struct BorrowingDetails {
    pub borrowing: Borrowing,
    pub book: Book,
    pub payments: Vec<Payment>,
}

/// 貸出の結果
#[derive(Debug, Clone)]
pub struct BorrowOutcome {
    pub borrowing: ActiveBorrowing,
    pub book: Book,
    /// レンタル料金の支払い（常に作成される）
    pub payment: Option<Payment>,
}

/// 返却の結果
#[derive(Debug, Clone)]
pub struct ReturnOutcome {
    pub borrowing: ReturnedBorrowing,
    pub book: Book,
    /// 延滞料金の支払い（延滞時のみ）
    pub fine: Option<Payment>,
}

/// 書籍を借りる
///
/// ビジネスルール：
/// - 在庫0の書籍は借りられない
/// - 未返却の貸出がある利用者は借りられない
/// - 返却予定日は貸出日以降、上限日数以内
///
/// レンタル料金の決済セッションを先に作成し、在庫の減算・貸出・支払いを
/// 同一トランザクションで記録する。セッション作成に失敗した場合は何も変更しない。
/// 事前チェック後に並行リクエストと競合した場合も、同じエラーを返す。
pub async fn borrow_book(deps: &ServiceDependencies, cmd: BorrowBook) -> Result<BorrowOutcome> {
    let now = Utc::now();

    // 1. 書籍をタイトルで取得
    let book = deps
        .book_repository
        .get_by_title(&cmd.book_title)
        .await
        .map_err(BorrowingApplicationError::RepositoryError)?
        .ok_or_else(|| BorrowingApplicationError::BookNotFound(cmd.book_title.clone()))?;

    // 2. 未返却の貸出の確認
    let has_active = deps
        .borrowing_repository
        .has_active_for_user(cmd.user_id)
        .await
        .map_err(BorrowingApplicationError::RepositoryError)?;

    // 3. ドメイン層の純粋関数を呼び出し
    let (lent_book, borrowing, event) = domain::borrow_book(
        &book,
        cmd.user_id,
        has_active,
        cmd.borrow_date,
        cmd.expected_return_date,
        now,
    )?;

    // 4. レンタル料金の決済セッションを作成
    let payment = payment::prepare_payment(
        deps,
        &Borrowing::Active(borrowing.clone()),
        &lent_book,
        now,
    )
    .await?;

    // 5. 在庫の減算と貸出・支払いの記録（アトミック）
    let outcome = deps
        .borrowing_repository
        .record_borrowing(&borrowing, payment.as_ref())
        .await
        .map_err(BorrowingApplicationError::RepositoryError)?;

    let rejection = match outcome {
        BorrowRecordOutcome::Recorded => None,
        BorrowRecordOutcome::OutOfStock => Some(BorrowBookError::OutOfStock),
        BorrowRecordOutcome::ActiveBorrowingExists => Some(BorrowBookError::ActiveBorrowingExists),
    };
    if let Some(rejection) = rejection {
        log_unused_session(payment.as_ref());
        return Err(rejection.into());
    }

    tracing::info!(
        borrowing_id = %borrowing.borrowing_id.value(),
        user_id = %cmd.user_id.value(),
        book_id = %book.book_id.value(),
        "Book borrowed"
    );

    // 6. 通知（失敗してもリクエストは失敗させない）
    notifications::dispatch(deps, notifications::borrowing_created_message(&event)).await;

    Ok(BorrowOutcome {
        borrowing,
        book: lent_book,
        payment,
    })
}

/// 記録されなかった支払いの決済セッション
///
/// プロバイダー側で期限切れになるまで残る。
fn log_unused_session(payment: Option<&Payment>) {
    if let Some(session) = payment.and_then(|p| p.session.as_ref()) {
        tracing::warn!(
            session_id = %session.session_id,
            "Checkout session left unused after a concurrent request won"
        );
    }
}

/// 貸出を取得するヘルパー関数
///
/// 所有者またはスタッフ以外には存在しないものとして扱う。
async fn load_borrowing(
    deps: &ServiceDependencies,
    caller: Caller,
    borrowing_id: BorrowingId,
) -> Result<Borrowing> {
    let borrowing = deps
        .borrowing_repository
        .get_by_id(borrowing_id)
        .await
        .map_err(BorrowingApplicationError::RepositoryError)?
        .ok_or(BorrowingApplicationError::BorrowingNotFound)?;

    if !caller.can_access(borrowing.core().user_id) {
        return Err(BorrowingApplicationError::BorrowingNotFound);
    }

    Ok(borrowing)
}

async fn load_book(deps: &ServiceDependencies, borrowing: &Borrowing) -> Result<Book> {
    deps.book_repository
        .get_by_id(borrowing.core().book_id)
        .await
        .map_err(BorrowingApplicationError::RepositoryError)?
        .ok_or(BorrowingApplicationError::BorrowingNotFound)
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - 返却済みの貸出は何度呼んでも同じエラーになる
/// - 返却予定日を過ぎていれば延滞料金の決済セッションを作成する
///
/// 延滞料金のセッション作成に失敗した場合、返却は記録しない。
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBook) -> Result<ReturnOutcome> {
    let now = Utc::now();

    // 1. 貸出と書籍を取得
    let borrowing = load_borrowing(deps, cmd.caller, cmd.borrowing_id).await?;
    let book = load_book(deps, &borrowing).await?;

    // 2. ドメイン層の純粋関数を呼び出し
    let (restocked_book, returned, event) =
        domain::return_book(borrowing, &book, cmd.returned_on, now)?;

    // 3. 延滞時のみ延滞料金の決済セッションを作成
    let fine = payment::prepare_payment(
        deps,
        &Borrowing::Returned(returned.clone()),
        &restocked_book,
        now,
    )
    .await?;

    // 4. 返却日の設定・在庫の加算・延滞料金の記録（アトミック）
    let recorded = deps
        .borrowing_repository
        .record_return(&returned, fine.as_ref())
        .await
        .map_err(BorrowingApplicationError::RepositoryError)?;

    if !recorded {
        log_unused_session(fine.as_ref());
        return Err(ReturnBookError::AlreadyReturned.into());
    }

    tracing::info!(
        borrowing_id = %returned.borrowing_id.value(),
        overdue_days = event.overdue_days,
        "Book returned"
    );

    // 5. 通知
    notifications::dispatch(deps, notifications::book_returned_message(&event)).await;

    Ok(ReturnOutcome {
        borrowing: returned,
        book: restocked_book,
        fine,
    })
}

async fn load_details(deps: &ServiceDependencies, borrowing: Borrowing) -> Result<BorrowingDetails> {
    let book = load_book(deps, &borrowing).await?;
    let payments = deps
        .payment_repository
        .list_for_borrowing(borrowing.core().borrowing_id)
        .await
        .map_err(BorrowingApplicationError::RepositoryError)?;

    Ok(BorrowingDetails {
        borrowing,
        book,
        payments,
    })
}

/// 貸出一覧を取得する
///
/// スタッフは`user_id`で任意の利用者に絞り込める。
/// それ以外の利用者には`user_id`を無視して自分の貸出のみを返す。
pub async fn list_borrowings(
    deps: &ServiceDependencies,
    caller: Caller,
    filter: BorrowingFilter,
) -> Result<Vec<BorrowingDetails>> {
    let filter = if caller.is_staff {
        filter
    } else {
        BorrowingFilter {
            user_id: Some(caller.user_id),
            ..filter
        }
    };

    let borrowings = deps
        .borrowing_repository
        .list(filter)
        .await
        .map_err(BorrowingApplicationError::RepositoryError)?;

    let mut details = Vec::with_capacity(borrowings.len());
    for borrowing in borrowings {
        details.push(load_details(deps, borrowing).await?);
    }
    Ok(details)
}

/// 貸出を取得する
pub async fn get_borrowing(
    deps: &ServiceDependencies,
    caller: Caller,
    borrowing_id: BorrowingId,
) -> Result<BorrowingDetails> {
    let borrowing = load_borrowing(deps, caller, borrowing_id).await?;
    load_details(deps, borrowing).await
}
