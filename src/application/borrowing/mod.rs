mod borrowing_service;
mod errors;

pub use borrowing_service::{
    BorrowOutcome, BorrowingDetails, ReturnOutcome, borrow_book, get_borrowing, list_borrowings,
    return_book,
};
pub use errors::{BorrowingApplicationError, Result};
