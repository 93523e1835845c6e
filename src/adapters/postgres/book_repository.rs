use crate::domain::{Book, BookId};
use crate::ports::Result;
use crate::ports::book_repository::BookRepository as BookRepositoryTrait;
use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::{is_unique_violation, map_row_to_book};

const BOOK_COLUMNS: &str = r#"
    book_id,
    title,
    author,
    cover,
    inventory,
    daily_fee,
    created_at,
    updated_at
"#;

/// BookRepositoryのPostgreSQL実装
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    /// PostgreSQLコネクションプールから新しいBookRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    /// 書籍を登録
    ///
    /// titleの一意制約違反は`Ok(false)`として返す。
    async fn insert(&self, book: &Book) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO books (
                book_id,
                title,
                author,
                cover,
                inventory,
                daily_fee,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(book.book_id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.cover.as_str())
        .bind(i64::from(book.inventory))
        .bind(book.daily_fee.value())
        .bind(book.created_at)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// 書籍を更新（全項目置き換え）
    async fn update(&self, book: &Book) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $2,
                author = $3,
                cover = $4,
                inventory = $5,
                daily_fee = $6,
                updated_at = $7
            WHERE book_id = $1
            "#,
        )
        .bind(book.book_id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.cover.as_str())
        .bind(i64::from(book.inventory))
        .bind(book.daily_fee.value())
        .bind(book.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// 書籍を削除
    ///
    /// borrowings・paymentsはON DELETE CASCADEで削除される。
    async fn delete(&self, book_id: BookId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(book_id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM books WHERE book_id = $1",
            BOOK_COLUMNS
        ))
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn get_by_title(&self, title: &str) -> Result<Option<Book>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM books WHERE title = $1",
            BOOK_COLUMNS
        ))
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn list(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM books ORDER BY title ASC",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_book).collect()
    }
}
