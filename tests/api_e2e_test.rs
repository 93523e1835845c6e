use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use rusty_library_rental::api::{AppState, create_router};
use rusty_library_rental::application::user;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

mod common;

use common::{TestContext, fee};

// ============================================================================
// E2Eテスト用のヘルパー関数
// ============================================================================

fn setup_app(ctx: &TestContext) -> Router {
    let app_state = Arc::new(AppState {
        service_deps: ctx.deps.clone(),
    });
    create_router(app_state)
}

/// リクエストを送信し、ステータスとJSONボディを返す
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// ユーザーを登録してトークンを取得する
async fn register_and_login(app: &Router, email: &str) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/users",
        None,
        Some(json!({ "email": email, "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        "POST",
        "/users/token",
        None,
        Some(json!({ "email": email, "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["access"].as_str().unwrap().to_string()
}

async fn staff_token(ctx: &TestContext, app: &Router) -> String {
    user::ensure_superuser(&ctx.deps, "admin@example.com", "admin-pass")
        .await
        .unwrap();
    let (status, body) = send(
        app,
        "POST",
        "/users/token",
        None,
        Some(json!({ "email": "admin@example.com", "password": "admin-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["access"].as_str().unwrap().to_string()
}

// ============================================================================
// E2Eテスト: 正常系フロー
// ============================================================================

#[tokio::test]
async fn test_e2e_full_rental_flow() {
    // Arrange
    let ctx = TestContext::new();
    let app = setup_app(&ctx);
    let admin = staff_token(&ctx, &app).await;
    let reader = register_and_login(&app, "reader@example.com").await;

    // Step 1: スタッフが書籍を登録（POST /books）
    let (status, book) = send(
        &app,
        "POST",
        "/books",
        Some(&admin),
        Some(json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "cover": "HARD",
            "inventory": 2,
            "daily_fee": "1.50"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["inventory"], 2);

    // Step 2: 書籍一覧は認証不要（GET /books）
    let (status, books) = send(&app, "GET", "/books", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(books.as_array().unwrap().len(), 1);

    // Step 3: 貸出（POST /borrowings）
    let expected = (chrono::Utc::now().date_naive() + chrono::Duration::days(2)).to_string();
    let (status, created) = send(
        &app,
        "POST",
        "/borrowings",
        Some(&reader),
        Some(json!({ "book": "Dune", "expected_return_date": expected })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["book"]["inventory"], 1);
    assert!(created.get("actual_return_date").is_none());
    assert!(
        created["session_url"]
            .as_str()
            .unwrap()
            .starts_with("https://checkout.example.com/pay/")
    );
    let borrowing_id = created["id"].as_str().unwrap().to_string();
    let payment_id = created["payments"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(created["payments"][0]["type"], "PAYMENT");
    assert_eq!(created["payments"][0]["money_to_pay"], "3.00");

    // Step 4: 貸出一覧は書籍タイトルと支払いを含む（GET /borrowings）
    let (status, list) = send(&app, "GET", "/borrowings?is_active=true", Some(&reader), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["book"], "Dune");
    assert_eq!(list[0]["payments"][0]["status"], "PENDING");

    // Step 5: 決済成功のリダイレクト（GET /payments/success）
    ctx.checkout.mark_paid("cs_test_1");
    let (status, receipt) = send(
        &app,
        "GET",
        &format!("/payments/success?payment_id={}", payment_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["message"], "Payment successful");
    assert_eq!(receipt["amount_paid"], "3.00");
    assert_eq!(receipt["currency"], "usd");

    // Step 6: 支払い詳細（GET /payments/:id）
    let (status, payment) = send(
        &app,
        "GET",
        &format!("/payments/{}", payment_id),
        Some(&reader),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payment["status"], "PAID");
    assert_eq!(payment["borrowing"]["book"], "Dune");

    // Step 7: 返却（POST /borrowings/:id/return）
    let (status, returned) = send(
        &app,
        "POST",
        &format!("/borrowings/{}/return", borrowing_id),
        Some(&reader),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(returned["fine"].is_null());

    // Step 8: 二重返却は400
    let (status, error) = send(
        &app,
        "POST",
        &format!("/borrowings/{}/return", borrowing_id),
        Some(&reader),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "ALREADY_RETURNED");
    assert_eq!(error["message"], "This borrowing has already been returned.");

    // Step 9: 返却後の詳細には返却日が含まれる
    let (status, detail) = send(
        &app,
        "GET",
        &format!("/borrowings/{}", borrowing_id),
        Some(&reader),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(detail["actual_return_date"].is_string());
    assert_eq!(detail["book"]["inventory"], 2);
}

// ============================================================================
// E2Eテスト: 異常系
// ============================================================================

#[tokio::test]
async fn test_e2e_authentication_is_required() {
    let ctx = TestContext::new();
    let app = setup_app(&ctx);

    let (status, body) = send(&app, "GET", "/borrowings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentication credentials were not provided.");

    let (status, _) = send(&app, "GET", "/users/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_e2e_regular_user_cannot_create_books() {
    let ctx = TestContext::new();
    let app = setup_app(&ctx);
    let reader = register_and_login(&app, "reader@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/books",
        Some(&reader),
        Some(json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "inventory": 1,
            "daily_fee": "1.00"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "PERMISSION_DENIED");
}

#[tokio::test]
async fn test_e2e_borrow_out_of_stock() {
    let ctx = TestContext::new();
    ctx.add_book("Dune", 0, fee("1.00"));
    let app = setup_app(&ctx);
    let reader = register_and_login(&app, "reader@example.com").await;

    let expected = (chrono::Utc::now().date_naive() + chrono::Duration::days(2)).to_string();
    let (status, body) = send(
        &app,
        "POST",
        "/borrowings",
        Some(&reader),
        Some(json!({ "book": "Dune", "expected_return_date": expected })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "OUT_OF_STOCK");
    assert_eq!(body["message"], "No copies available in inventory.");
}

#[tokio::test]
async fn test_e2e_borrow_beyond_rental_window_is_rejected() {
    let ctx = TestContext::new();
    ctx.add_book("Dune", 1, fee("999.99"));
    let app = setup_app(&ctx);
    let reader = register_and_login(&app, "reader@example.com").await;

    let expected = (chrono::Utc::now().date_naive() + chrono::Duration::days(1000)).to_string();
    let (status, body) = send(
        &app,
        "POST",
        "/borrowings",
        Some(&reader),
        Some(json!({ "book": "Dune", "expected_return_date": expected })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "RENTAL_PERIOD_TOO_LONG");
    assert!(ctx.checkout.requests().is_empty());

    let (_, books) = send(&app, "GET", "/books", None, None).await;
    assert_eq!(books[0]["inventory"], 1);
}

#[tokio::test]
async fn test_e2e_payment_callbacks_validate_payment_id() {
    let ctx = TestContext::new();
    let app = setup_app(&ctx);

    let (status, _) = send(&app, "GET", "/payments/success", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/payments/success?payment_id=abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/payments/cancel?payment_id={}", uuid::Uuid::new_v4()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "PAYMENT_NOT_FOUND");
}

#[tokio::test]
async fn test_e2e_payment_cancel_returns_pay_link() {
    let ctx = TestContext::new();
    ctx.add_book("Dune", 1, fee("2.00"));
    let app = setup_app(&ctx);
    let reader = register_and_login(&app, "reader@example.com").await;

    let expected = (chrono::Utc::now().date_naive() + chrono::Duration::days(1)).to_string();
    let (_, created) = send(
        &app,
        "POST",
        "/borrowings",
        Some(&reader),
        Some(json!({ "book": "Dune", "expected_return_date": expected })),
    )
    .await;
    let payment_id = created["payments"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "GET",
        &format!("/payments/cancel?payment_id={}", payment_id),
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Payment was cancelled.You can pay the rent within 24 hours"
    );
    assert_eq!(body["pay"], created["session_url"]);
    assert_eq!(body["amount_paid"], "2.00");
}

#[tokio::test]
async fn test_e2e_profile_update() {
    let ctx = TestContext::new();
    let app = setup_app(&ctx);
    let reader = register_and_login(&app, "reader@example.com").await;

    let (status, me) = send(&app, "GET", "/users/me", Some(&reader), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "reader@example.com");
    assert_eq!(me["is_staff"], false);
    assert!(me.get("password").is_none());

    let (status, updated) = send(
        &app,
        "PATCH",
        "/users/me",
        Some(&reader),
        Some(json!({ "email": "renamed@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["email"], "renamed@example.com");
}

#[tokio::test]
async fn test_e2e_health_check() {
    let ctx = TestContext::new();
    let app = setup_app(&ctx);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
