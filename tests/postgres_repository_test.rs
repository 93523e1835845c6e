//! PostgreSQLアダプターのテスト
//!
//! データベースが必要なため`#[ignore]`。実行するには:
//! `DATABASE_URL=postgres://... cargo test -- --ignored`

use chrono::{Duration, Utc};
use futures::StreamExt;
use rusty_library_rental::adapters::postgres::{
    PostgresBookRepository, PostgresBorrowingRepository, PostgresPaymentRepository,
    PostgresUserRepository,
};
use rusty_library_rental::domain::{self, Borrowing, Charge, Email, PaymentStatus};
use rusty_library_rental::ports::*;
use serial_test::serial;
use sqlx::PgPool;

mod common;

use common::{book_draft, date, fee};

struct Repositories {
    books: PostgresBookRepository,
    borrowings: PostgresBorrowingRepository,
    payments: PostgresPaymentRepository,
    users: PostgresUserRepository,
}

async fn setup() -> (PgPool, Repositories) {
    let pool = common::create_test_pool().await;
    common::cleanup_database(&pool).await;

    let repos = Repositories {
        books: PostgresBookRepository::new(pool.clone()),
        borrowings: PostgresBorrowingRepository::new(pool.clone()),
        payments: PostgresPaymentRepository::new(pool.clone()),
        users: PostgresUserRepository::new(pool.clone()),
    };
    (pool, repos)
}

async fn insert_user(repos: &Repositories, email: &str) -> domain::User {
    let user = domain::register_user(email, "hash".to_string(), Utc::now()).unwrap();
    assert!(UserRepository::insert(&repos.users, &user).await.unwrap());
    user
}

async fn insert_book(repos: &Repositories, title: &str, inventory: i64) -> domain::Book {
    let book = domain::create_book(book_draft(title, inventory, fee("2.50")), Utc::now()).unwrap();
    assert!(BookRepository::insert(&repos.books, &book).await.unwrap());
    book
}

fn active_borrowing(
    user: &domain::User,
    book: &domain::Book,
    borrow_date: chrono::NaiveDate,
    days: i64,
) -> domain::ActiveBorrowing {
    let (_, borrowing, _) = domain::borrow_book(
        book,
        user.user_id,
        false,
        borrow_date,
        borrow_date + Duration::days(days),
        Utc::now(),
    )
    .unwrap();
    borrowing
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_book_title_is_unique() {
    let (_pool, repos) = setup().await;
    let book = insert_book(&repos, "Dune", 1).await;

    let duplicate =
        domain::create_book(book_draft("Dune", 3, fee("1.00")), Utc::now()).unwrap();
    assert!(!BookRepository::insert(&repos.books, &duplicate).await.unwrap());

    let loaded = BookRepository::get_by_title(&repos.books, "Dune")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.book_id, book.book_id);
    assert_eq!(loaded.daily_fee, book.daily_fee);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_record_borrowing_decrements_inventory_and_detects_conflicts() {
    let (_pool, repos) = setup().await;
    let user = insert_user(&repos, "reader@example.com").await;
    let book = insert_book(&repos, "Dune", 2).await;
    let empty = insert_book(&repos, "Emma", 0).await;

    // 在庫0
    let outcome = repos
        .borrowings
        .record_borrowing(&active_borrowing(&user, &empty, date(2024, 5, 1), 3), None)
        .await
        .unwrap();
    assert_eq!(outcome, BorrowRecordOutcome::OutOfStock);

    // 成功
    let first = active_borrowing(&user, &book, date(2024, 5, 1), 3);
    let outcome = repos.borrowings.record_borrowing(&first, None).await.unwrap();
    assert_eq!(outcome, BorrowRecordOutcome::Recorded);
    let loaded = BookRepository::get_by_id(&repos.books, book.book_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.inventory, 1);

    // 未返却の貸出の重複（在庫と支払いはロールバックされる）
    let second = active_borrowing(&user, &book, date(2024, 5, 2), 3);
    let payment = domain::open_payment(
        second.borrowing_id,
        Borrowing::from(second.clone()).charge(book.daily_fee),
        Utc::now(),
    )
    .unwrap();
    let outcome = repos
        .borrowings
        .record_borrowing(&second, Some(&payment))
        .await
        .unwrap();
    assert_eq!(outcome, BorrowRecordOutcome::ActiveBorrowingExists);
    assert!(
        PaymentRepository::get_by_id(&repos.payments, payment.payment_id)
            .await
            .unwrap()
            .is_none()
    );
    let loaded = BookRepository::get_by_id(&repos.books, book.book_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.inventory, 1);
    assert!(repos.borrowings.has_active_for_user(user.user_id).await.unwrap());
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_record_return_is_applied_once() {
    let (_pool, repos) = setup().await;
    let user = insert_user(&repos, "reader@example.com").await;
    let book = insert_book(&repos, "Dune", 1).await;
    let active = active_borrowing(&user, &book, date(2024, 5, 1), 3);
    repos.borrowings.record_borrowing(&active, None).await.unwrap();

    // 1日延滞：1日 × 2.50 × 2
    let (_, returned, _) =
        domain::return_book(active.clone().into(), &book, date(2024, 5, 5), Utc::now()).unwrap();
    let charge = Borrowing::from(returned.clone()).charge(book.daily_fee);
    assert_eq!(charge, Charge::Fine(fee("5.00")));
    let fine = domain::open_payment(active.borrowing_id, charge, Utc::now()).unwrap();

    assert!(
        repos
            .borrowings
            .record_return(&returned, Some(&fine))
            .await
            .unwrap()
    );
    // 二重返却では延滞料金も追加されない
    assert!(
        !repos
            .borrowings
            .record_return(&returned, Some(&fine))
            .await
            .unwrap()
    );
    let fines = repos
        .payments
        .list_for_borrowing(active.borrowing_id)
        .await
        .unwrap();
    assert_eq!(fines.len(), 1);
    assert_eq!(fines[0].money_to_pay, fee("5.00"));

    let loaded = BookRepository::get_by_id(&repos.books, book.book_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.inventory, 1);

    let stored = BorrowingRepository::get_by_id(&repos.borrowings, active.borrowing_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.actual_return_date(), Some(date(2024, 5, 5)));

    let returned_only = BorrowingRepository::list(
        &repos.borrowings,
        BorrowingFilter {
            is_active: Some(false),
            user_id: Some(user.user_id),
        },
    )
    .await
    .unwrap();
    assert_eq!(returned_only.len(), 1);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_stream_overdue_returns_unreturned_past_due() {
    let (_pool, repos) = setup().await;
    let alice = insert_user(&repos, "alice@example.com").await;
    let bob = insert_user(&repos, "bob@example.com").await;
    let book = insert_book(&repos, "Dune", 5).await;

    let overdue = active_borrowing(&alice, &book, date(2024, 5, 1), 3);
    let on_time = active_borrowing(&bob, &book, date(2024, 5, 1), 30);
    repos.borrowings.record_borrowing(&overdue, None).await.unwrap();
    repos.borrowings.record_borrowing(&on_time, None).await.unwrap();

    let found: Vec<_> = repos
        .borrowings
        .stream_overdue(date(2024, 5, 10))
        .collect()
        .await;

    assert_eq!(found.len(), 1);
    assert_eq!(
        found[0].as_ref().unwrap().borrowing_id,
        overdue.borrowing_id
    );
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_payment_round_trip_and_owner_filter() {
    let (_pool, repos) = setup().await;
    let alice = insert_user(&repos, "alice@example.com").await;
    let bob = insert_user(&repos, "bob@example.com").await;
    let book = insert_book(&repos, "Dune", 1).await;
    let active = active_borrowing(&alice, &book, date(2024, 5, 1), 4);

    let charge = Borrowing::from(active.clone()).charge(book.daily_fee);
    assert_eq!(charge, Charge::Payment(fee("10.00")));
    let payment = domain::open_payment(active.borrowing_id, charge, Utc::now()).unwrap();
    let outcome = repos
        .borrowings
        .record_borrowing(&active, Some(&payment))
        .await
        .unwrap();
    assert_eq!(outcome, BorrowRecordOutcome::Recorded);

    let paid = domain::mark_paid(payment.clone(), Utc::now());
    repos.payments.save(&paid).await.unwrap();

    let loaded = PaymentRepository::get_by_id(&repos.payments, payment.payment_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.status, PaymentStatus::Paid);
    assert_eq!(loaded.money_to_pay, fee("10.00"));

    assert_eq!(
        PaymentRepository::list(&repos.payments, Some(alice.user_id))
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(
        PaymentRepository::list(&repos.payments, Some(bob.user_id))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_user_email_lookup_is_case_insensitive() {
    let (_pool, repos) = setup().await;
    let user = insert_user(&repos, "Reader@Example.com").await;

    let email = Email::parse("READER@example.com").unwrap();
    let found = repos.users.get_by_email(&email).await.unwrap().unwrap();
    assert_eq!(found.user_id, user.user_id);

    let duplicate =
        domain::register_user("reader@EXAMPLE.com", "hash".to_string(), Utc::now()).unwrap();
    assert!(!UserRepository::insert(&repos.users, &duplicate).await.unwrap());
}
