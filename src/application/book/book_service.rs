use crate::application::ServiceDependencies;
use crate::domain::{self, Book, BookDraft, BookId, Caller};
use chrono::Utc;

use super::errors::{BookApplicationError, Result};

/// 更新系の操作はスタッフのみ
fn ensure_staff(caller: Caller) -> Result<()> {
    if caller.is_staff {
        Ok(())
    } else {
        Err(BookApplicationError::PermissionDenied)
    }
}

/// 書籍一覧を取得する（認証不要）
pub async fn list_books(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    deps.book_repository
        .list()
        .await
        .map_err(BookApplicationError::RepositoryError)
}

/// 書籍を取得する（認証不要）
pub async fn get_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    deps.book_repository
        .get_by_id(book_id)
        .await
        .map_err(BookApplicationError::RepositoryError)?
        .ok_or(BookApplicationError::BookNotFound)
}

/// 書籍を登録する
///
/// ビジネスルール：
/// - スタッフのみ
/// - タイトルは一意
pub async fn create_book(
    deps: &ServiceDependencies,
    caller: Caller,
    draft: BookDraft,
) -> Result<Book> {
    ensure_staff(caller)?;

    let book = domain::create_book(draft, Utc::now())?;

    let inserted = deps
        .book_repository
        .insert(&book)
        .await
        .map_err(BookApplicationError::RepositoryError)?;

    if !inserted {
        return Err(BookApplicationError::DuplicateTitle);
    }

    tracing::info!(book_id = %book.book_id.value(), title = %book.title, "Book created");
    Ok(book)
}

/// 書籍を更新する（全項目置き換え）
pub async fn update_book(
    deps: &ServiceDependencies,
    caller: Caller,
    book_id: BookId,
    draft: BookDraft,
) -> Result<Book> {
    ensure_staff(caller)?;

    let current = get_book(deps, book_id).await?;
    let book = domain::update_book(&current, draft, Utc::now())?;

    let updated = deps
        .book_repository
        .update(&book)
        .await
        .map_err(BookApplicationError::RepositoryError)?;

    if !updated {
        return Err(BookApplicationError::DuplicateTitle);
    }

    Ok(book)
}

/// 書籍を削除する
///
/// 関連する貸出・支払いも削除される。
pub async fn delete_book(deps: &ServiceDependencies, caller: Caller, book_id: BookId) -> Result<()> {
    ensure_staff(caller)?;

    let deleted = deps
        .book_repository
        .delete(book_id)
        .await
        .map_err(BookApplicationError::RepositoryError)?;

    if !deleted {
        return Err(BookApplicationError::BookNotFound);
    }

    tracing::info!(book_id = %book_id.value(), "Book deleted");
    Ok(())
}
