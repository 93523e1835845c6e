mod books;
mod borrowings;
mod payments;
mod users;

use crate::application::ServiceDependencies;

pub use books::{create_book, delete_book, get_book, list_books, update_book};
pub use borrowings::{create_borrowing, get_borrowing, list_borrowings, return_borrowing};
pub use payments::{get_payment, list_payments, payment_cancel, payment_success};
pub use users::{get_me, obtain_token, register, update_me};

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}
