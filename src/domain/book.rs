use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BookId, BookValidationError, CoverType, DailyFee};

/// タイトル・著者名の最大文字数
pub const MAX_TEXT_LENGTH: usize = 63;

/// Book集約 - カタログ上の1タイトル
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub cover: CoverType,
    pub inventory: u32,
    pub daily_fee: DailyFee,

    // 監査情報
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// 在庫があるか
    pub fn is_available(&self) -> bool {
        self.inventory > 0
    }

    /// 在庫を1冊減らした新しいBookを返す
    ///
    /// 在庫が0の場合は`None`。在庫数が負になることはない。
    pub fn lend_copy(&self, at: DateTime<Utc>) -> Option<Book> {
        let inventory = self.inventory.checked_sub(1)?;
        Some(Book {
            inventory,
            updated_at: at,
            ..self.clone()
        })
    }

    /// 在庫を1冊戻した新しいBookを返す
    pub fn restock_copy(&self, at: DateTime<Utc>) -> Book {
        Book {
            inventory: self.inventory.saturating_add(1),
            updated_at: at,
            ..self.clone()
        }
    }
}

/// 書籍の入力値（作成・更新共通）
///
/// APIから受け取った未検証の値。在庫数は負値を検出するため符号付き。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub cover: CoverType,
    pub inventory: i64,
    pub daily_fee: Decimal,
}

struct ValidatedDraft {
    title: String,
    author: String,
    cover: CoverType,
    inventory: u32,
    daily_fee: DailyFee,
}

fn validate_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let length = trimmed.chars().count();
    (1..=MAX_TEXT_LENGTH)
        .contains(&length)
        .then(|| trimmed.to_string())
}

fn validate_draft(draft: BookDraft) -> Result<ValidatedDraft, BookValidationError> {
    let title = validate_text(&draft.title).ok_or(BookValidationError::InvalidTitle)?;
    let author = validate_text(&draft.author).ok_or(BookValidationError::InvalidAuthor)?;

    if draft.inventory < 0 {
        return Err(BookValidationError::NegativeInventory);
    }
    let inventory =
        u32::try_from(draft.inventory).map_err(|_| BookValidationError::InventoryTooLarge)?;

    let daily_fee = DailyFee::try_from(draft.daily_fee)?;

    Ok(ValidatedDraft {
        title,
        author,
        cover: draft.cover,
        inventory,
        daily_fee,
    })
}

/// 純粋関数：書籍を登録する
///
/// ビジネスルール：
/// - タイトル・著者名は1〜63文字
/// - 在庫数は0以上
/// - 日額料金は0より大きい
pub fn create_book(draft: BookDraft, now: DateTime<Utc>) -> Result<Book, BookValidationError> {
    let valid = validate_draft(draft)?;

    Ok(Book {
        book_id: BookId::new(),
        title: valid.title,
        author: valid.author,
        cover: valid.cover,
        inventory: valid.inventory,
        daily_fee: valid.daily_fee,
        created_at: now,
        updated_at: now,
    })
}

/// 純粋関数：書籍を更新する
///
/// IDと作成日時は保持される。
pub fn update_book(
    book: &Book,
    draft: BookDraft,
    now: DateTime<Utc>,
) -> Result<Book, BookValidationError> {
    let valid = validate_draft(draft)?;

    Ok(Book {
        title: valid.title,
        author: valid.author,
        cover: valid.cover,
        inventory: valid.inventory,
        daily_fee: valid.daily_fee,
        updated_at: now,
        ..book.clone()
    })
}
