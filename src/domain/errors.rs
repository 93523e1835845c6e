use super::{DailyFeeError, EmailError};

/// 貸出のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorrowBookError {
    /// 在庫がない
    OutOfStock,
    /// 未返却の貸出が既にある
    ActiveBorrowingExists,
    /// 返却予定日が貸出日より前
    ReturnDateBeforeBorrowDate,
    /// 貸出期間が上限を超えている
    RentalPeriodTooLong,
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnBookError {
    /// 既に返却済み
    AlreadyReturned,
}

/// 書籍入力のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    /// タイトルが空、または長すぎる
    InvalidTitle,
    /// 著者名が空、または長すぎる
    InvalidAuthor,
    /// 在庫数が負
    NegativeInventory,
    /// 在庫数が上限を超えている
    InventoryTooLarge,
    /// 日額料金が不正
    InvalidDailyFee(DailyFeeError),
}

impl From<DailyFeeError> for BookValidationError {
    fn from(err: DailyFeeError) -> Self {
        BookValidationError::InvalidDailyFee(err)
    }
}

impl std::fmt::Display for BookValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookValidationError::InvalidTitle => {
                write!(f, "Title must be between 1 and 63 characters.")
            }
            BookValidationError::InvalidAuthor => {
                write!(f, "Author must be between 1 and 63 characters.")
            }
            BookValidationError::NegativeInventory => write!(f, "Inventory cannot be negative."),
            BookValidationError::InventoryTooLarge => write!(f, "Inventory is too large."),
            BookValidationError::InvalidDailyFee(e) => write!(f, "{}", e),
        }
    }
}

/// ユーザー入力のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// メールアドレスが不正
    InvalidEmail(EmailError),
    /// パスワードが短すぎる
    PasswordTooShort,
}

impl From<EmailError> for UserValidationError {
    fn from(err: EmailError) -> Self {
        UserValidationError::InvalidEmail(err)
    }
}

impl std::fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserValidationError::InvalidEmail(EmailError::Empty) => {
                write!(f, "Users must have an email address.")
            }
            UserValidationError::InvalidEmail(EmailError::Malformed) => {
                write!(f, "Enter a valid email address.")
            }
            UserValidationError::PasswordTooShort => {
                write!(f, "Ensure the password has at least 6 characters.")
            }
        }
    }
}

impl std::fmt::Display for BorrowBookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BorrowBookError::OutOfStock => write!(f, "No copies available in inventory."),
            BorrowBookError::ActiveBorrowingExists => write!(
                f,
                "You already have an active borrowing. \
                 Please return the current book before borrowing another."
            ),
            BorrowBookError::ReturnDateBeforeBorrowDate => {
                write!(f, "Expected return date cannot be before the borrow date.")
            }
            BorrowBookError::RentalPeriodTooLong => write!(
                f,
                "Expected return date cannot be more than {} days after the borrow date.",
                super::MAX_RENTAL_DAYS
            ),
        }
    }
}

impl std::fmt::Display for ReturnBookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReturnBookError::AlreadyReturned => {
                write!(f, "This borrowing has already been returned.")
            }
        }
    }
}

impl std::error::Error for BorrowBookError {}
impl std::error::Error for ReturnBookError {}
impl std::error::Error for BookValidationError {}
impl std::error::Error for UserValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_borrow_errors_have_client_messages() {
        assert_eq!(
            BorrowBookError::OutOfStock.to_string(),
            "No copies available in inventory."
        );
        assert!(
            BorrowBookError::ActiveBorrowingExists
                .to_string()
                .starts_with("You already have an active borrowing.")
        );
    }

    #[test]
    fn test_validation_error_wraps_daily_fee_error() {
        let err: BookValidationError = DailyFeeError::NotPositive.into();
        assert_eq!(err.to_string(), "Daily fee must be greater than zero.");
    }

    #[test]
    fn test_user_validation_messages() {
        let err: UserValidationError = EmailError::Malformed.into();
        assert_eq!(err.to_string(), "Enter a valid email address.");
        assert_eq!(
            UserValidationError::PasswordTooShort.to_string(),
            "Ensure the password has at least 6 characters."
        );
    }
}
