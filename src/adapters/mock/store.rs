use crate::domain::{
    ActiveBorrowing, Book, BookId, Borrowing, BorrowingId, Email, Payment, PaymentId,
    ReturnedBorrowing, User, UserId,
};
use crate::ports::{
    BookRepository, BorrowRecordOutcome, BorrowingFilter, BorrowingRepository, PaymentRepository,
    Result, UserRepository,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct State {
    books: HashMap<BookId, Book>,
    borrowings: HashMap<BorrowingId, Borrowing>,
    payments: HashMap<PaymentId, Payment>,
    users: HashMap<UserId, User>,
}

impl State {
    fn title_taken(&self, title: &str, except: Option<BookId>) -> bool {
        self.books
            .values()
            .any(|b| b.title == title && Some(b.book_id) != except)
    }

    fn email_taken(&self, email: &Email, except: Option<UserId>) -> bool {
        let key = email.canonical();
        self.users
            .values()
            .any(|u| u.email.canonical() == key && Some(u.user_id) != except)
    }

    fn has_active_for_user(&self, user_id: UserId) -> bool {
        self.borrowings
            .values()
            .any(|b| b.is_active() && b.core().user_id == user_id)
    }
}

/// 全リポジトリのインメモリ実装
///
/// 1つのMutexで全状態を保護するため、在庫の増減と貸出の状態変更は
/// PostgreSQL実装のトランザクションと同様にアトミックになる。
/// テストとローカル実行（DATABASE_URL未設定時）で使用する。
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// テスト用に書籍を直接登録する
    pub fn seed_book(&self, book: Book) {
        self.state.lock().unwrap().books.insert(book.book_id, book);
    }

    /// テスト用にユーザーを直接登録する
    pub fn seed_user(&self, user: User) {
        self.state.lock().unwrap().users.insert(user.user_id, user);
    }

    /// テスト用に貸出を直接登録する（在庫は変更しない）
    pub fn seed_borrowing(&self, borrowing: Borrowing) {
        self.state
            .lock()
            .unwrap()
            .borrowings
            .insert(borrowing.core().borrowing_id, borrowing);
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookRepository for InMemoryStore {
    async fn insert(&self, book: &Book) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        if state.title_taken(&book.title, None) {
            return Ok(false);
        }
        state.books.insert(book.book_id, book.clone());
        Ok(true)
    }

    async fn update(&self, book: &Book) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        if state.title_taken(&book.title, Some(book.book_id)) {
            return Ok(false);
        }
        state.books.insert(book.book_id, book.clone());
        Ok(true)
    }

    /// 書籍と、関連する貸出・支払いを削除する
    async fn delete(&self, book_id: BookId) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        if state.books.remove(&book_id).is_none() {
            return Ok(false);
        }

        let removed: Vec<BorrowingId> = state
            .borrowings
            .values()
            .filter(|b| b.core().book_id == book_id)
            .map(|b| b.core().borrowing_id)
            .collect();

        for borrowing_id in &removed {
            state.borrowings.remove(borrowing_id);
        }
        state
            .payments
            .retain(|_, p| !removed.contains(&p.borrowing_id));

        Ok(true)
    }

    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        Ok(self.state.lock().unwrap().books.get(&book_id).cloned())
    }

    async fn get_by_title(&self, title: &str) -> Result<Option<Book>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .books
            .values()
            .find(|b| b.title == title)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Book>> {
        let mut books: Vec<Book> = self.state.lock().unwrap().books.values().cloned().collect();
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books)
    }
}

#[async_trait]
impl BorrowingRepository for InMemoryStore {
    async fn record_borrowing(
        &self,
        borrowing: &ActiveBorrowing,
        payment: Option<&Payment>,
    ) -> Result<BorrowRecordOutcome> {
        let mut state = self.state.lock().unwrap();

        let inventory = match state.books.get(&borrowing.book_id) {
            Some(book) => book.inventory,
            None => {
                return Err(format!("book {} does not exist", borrowing.book_id.value()).into());
            }
        };
        if inventory == 0 {
            return Ok(BorrowRecordOutcome::OutOfStock);
        }
        if state.has_active_for_user(borrowing.user_id) {
            return Ok(BorrowRecordOutcome::ActiveBorrowingExists);
        }

        if let Some(book) = state.books.get_mut(&borrowing.book_id) {
            book.inventory -= 1;
        }
        state.borrowings.insert(
            borrowing.borrowing_id,
            Borrowing::Active(borrowing.clone()),
        );
        if let Some(payment) = payment {
            state.payments.insert(payment.payment_id, payment.clone());
        }
        Ok(BorrowRecordOutcome::Recorded)
    }

    async fn record_return(
        &self,
        borrowing: &ReturnedBorrowing,
        fine: Option<&Payment>,
    ) -> Result<bool> {
        let mut state = self.state.lock().unwrap();

        match state.borrowings.get(&borrowing.borrowing_id) {
            Some(Borrowing::Active(_)) => {}
            Some(Borrowing::Returned(_)) => return Ok(false),
            None => {
                return Err(
                    format!("borrowing {} does not exist", borrowing.borrowing_id.value()).into(),
                );
            }
        }

        state.borrowings.insert(
            borrowing.borrowing_id,
            Borrowing::Returned(borrowing.clone()),
        );
        if let Some(book) = state.books.get_mut(&borrowing.book_id) {
            book.inventory = book.inventory.saturating_add(1);
        }
        if let Some(fine) = fine {
            state.payments.insert(fine.payment_id, fine.clone());
        }
        Ok(true)
    }

    async fn get_by_id(&self, borrowing_id: BorrowingId) -> Result<Option<Borrowing>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .borrowings
            .get(&borrowing_id)
            .cloned())
    }

    async fn has_active_for_user(&self, user_id: UserId) -> Result<bool> {
        Ok(self.state.lock().unwrap().has_active_for_user(user_id))
    }

    async fn list(&self, filter: BorrowingFilter) -> Result<Vec<Borrowing>> {
        let mut borrowings: Vec<Borrowing> = self
            .state
            .lock()
            .unwrap()
            .borrowings
            .values()
            .filter(|b| filter.is_active.is_none_or(|active| b.is_active() == active))
            .filter(|b| filter.user_id.is_none_or(|user_id| b.core().user_id == user_id))
            .cloned()
            .collect();

        // 返却日の昇順（未返却は最後）
        borrowings.sort_by_key(|b| {
            (
                b.actual_return_date().is_none(),
                b.actual_return_date(),
                b.core().created_at,
            )
        });
        Ok(borrowings)
    }

    fn stream_overdue(&self, today: NaiveDate) -> BoxStream<'_, Result<ActiveBorrowing>> {
        let mut overdue: Vec<ActiveBorrowing> = self
            .state
            .lock()
            .unwrap()
            .borrowings
            .values()
            .filter_map(|b| match b {
                Borrowing::Active(active) if active.expected_return_date <= today => {
                    Some(active.clone())
                }
                _ => None,
            })
            .collect();
        overdue.sort_by_key(|b| b.expected_return_date);

        stream::iter(overdue.into_iter().map(Ok)).boxed()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryStore {
    async fn save(&self, payment: &Payment) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.payments.get_mut(&payment.payment_id) {
            Some(stored) => {
                *stored = payment.clone();
                Ok(())
            }
            None => Err(format!("payment {} does not exist", payment.payment_id.value()).into()),
        }
    }

    async fn get_by_id(&self, payment_id: PaymentId) -> Result<Option<Payment>> {
        Ok(self.state.lock().unwrap().payments.get(&payment_id).cloned())
    }

    async fn list(&self, owner: Option<UserId>) -> Result<Vec<Payment>> {
        let state = self.state.lock().unwrap();
        let mut payments: Vec<Payment> = state
            .payments
            .values()
            .filter(|p| match owner {
                Some(user_id) => state
                    .borrowings
                    .get(&p.borrowing_id)
                    .is_some_and(|b| b.core().user_id == user_id),
                None => true,
            })
            .cloned()
            .collect();
        payments.sort_by_key(|p| p.created_at);
        Ok(payments)
    }

    async fn list_for_borrowing(&self, borrowing_id: BorrowingId) -> Result<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .state
            .lock()
            .unwrap()
            .payments
            .values()
            .filter(|p| p.borrowing_id == borrowing_id)
            .cloned()
            .collect();
        payments.sort_by_key(|p| p.created_at);
        Ok(payments)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &User) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        if state.email_taken(&user.email, None) {
            return Ok(false);
        }
        state.users.insert(user.user_id, user.clone());
        Ok(true)
    }

    async fn get_by_id(&self, user_id: UserId) -> Result<Option<User>> {
        Ok(self.state.lock().unwrap().users.get(&user_id).cloned())
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>> {
        let key = email.canonical();
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.email.canonical() == key)
            .cloned())
    }

    async fn update(&self, user: &User) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        if state.email_taken(&user.email, Some(user.user_id)) {
            return Ok(false);
        }
        state.users.insert(user.user_id, user.clone());
        Ok(true)
    }
}
