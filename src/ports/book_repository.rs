use crate::domain::{Book, BookId};
use async_trait::async_trait;

use super::Result;

/// 書籍リポジトリポート
///
/// カタログの永続化を抽象化する。
/// タイトルは一意であり、重複時は`Ok(false)`を返す。
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// 書籍を登録する
    ///
    /// 同じタイトルの書籍が既に存在する場合は`Ok(false)`。
    async fn insert(&self, book: &Book) -> Result<bool>;

    /// 書籍を更新する
    ///
    /// 他の書籍とタイトルが衝突する場合は`Ok(false)`。
    async fn update(&self, book: &Book) -> Result<bool>;

    /// 書籍を削除する
    ///
    /// 関連する貸出・支払いも削除される。存在しない場合は`Ok(false)`。
    async fn delete(&self, book_id: BookId) -> Result<bool>;

    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>>;

    /// タイトルで書籍を取得する
    ///
    /// 貸出リクエストは書籍をタイトルで指定する。
    async fn get_by_title(&self, title: &str) -> Result<Option<Book>>;

    /// すべての書籍をタイトル順で取得する
    async fn list(&self) -> Result<Vec<Book>>;
}
