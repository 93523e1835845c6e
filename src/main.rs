use rusty_library_rental::{
    adapters::{
        StripeCheckoutProvider, TelegramNotificationService,
        mock::{
            CheckoutProvider as MockCheckoutProvider,
            NotificationService as MockNotificationService, InMemoryStore,
        },
        postgres::{
            PostgresBookRepository, PostgresBorrowingRepository, PostgresPaymentRepository,
            PostgresUserRepository,
        },
    },
    api::{AppState, create_router},
    application::{ServiceDependencies, notifications, user},
    config::Config,
    ports::{CheckoutProvider, NotificationService},
};
use std::{sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_library_rental=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let service_deps = build_dependencies(&config).await?;

    if let Some(superuser) = &config.superuser {
        user::ensure_superuser(&service_deps, &superuser.email, &superuser.password).await?;
    }

    spawn_overdue_reminders(
        service_deps.clone(),
        Duration::from_secs(config.overdue_check_interval_secs.max(1)),
    );

    let app_state = Arc::new(AppState { service_deps });
    let app = create_router(app_state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// 設定に応じてアダプターを選択する
///
/// 外部サービスの設定がない場合はインメモリ実装・モック実装で起動する。
async fn build_dependencies(config: &Config) -> Result<ServiceDependencies, BoxError> {
    let checkout_provider: Arc<dyn CheckoutProvider> = match &config.stripe_secret_key {
        Some(key) => Arc::new(StripeCheckoutProvider::new(key)),
        None => {
            tracing::warn!("STRIPE_SECRET_KEY is not set, using the mock checkout provider");
            Arc::new(MockCheckoutProvider::new())
        }
    };

    let notification_service: Arc<dyn NotificationService> = match &config.telegram {
        Some(telegram) => Arc::new(TelegramNotificationService::new(
            telegram.bot_token.clone(),
            telegram.chat_id.clone(),
        )),
        None => {
            tracing::warn!("BOT_TOKEN or CHAT_ID is not set, notifications are not delivered");
            Arc::new(MockNotificationService::new())
        }
    };

    let settings = config.service_settings();

    match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Database migrations applied");

            Ok(ServiceDependencies {
                book_repository: Arc::new(PostgresBookRepository::new(pool.clone())),
                borrowing_repository: Arc::new(PostgresBorrowingRepository::new(pool.clone())),
                payment_repository: Arc::new(PostgresPaymentRepository::new(pool.clone())),
                user_repository: Arc::new(PostgresUserRepository::new(pool)),
                checkout_provider,
                notification_service,
                settings,
            })
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, data is kept in memory only");
            let store = Arc::new(InMemoryStore::new());
            Ok(ServiceDependencies {
                book_repository: store.clone(),
                borrowing_repository: store.clone(),
                payment_repository: store.clone(),
                user_repository: store,
                checkout_provider,
                notification_service,
                settings,
            })
        }
    }
}

/// 延滞リマインダーを定期実行する
fn spawn_overdue_reminders(deps: ServiceDependencies, period: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let today = chrono::Utc::now().date_naive();
            if let Err(e) = notifications::send_overdue_reminders(&deps, today).await {
                tracing::error!(error = %e, "Overdue reminder batch failed");
            }
        }
    });
}
