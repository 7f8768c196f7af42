use rusty_library_borrowing::{
    adapters::postgres::{
        PostgresAuditLog, PostgresCatalogService, PostgresLoanRepository, PostgresMembershipService,
    },
    api::{handlers::AppState, router::create_router},
    application::loan::ServiceDependencies,
    config::AppConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "rusty_library_borrowing=debug,tower_http=debug,axum=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    // Initialize adapters
    let service_deps = ServiceDependencies {
        loan_repository: Arc::new(PostgresLoanRepository::new(pool.clone())),
        catalog_service: Arc::new(PostgresCatalogService::new(pool.clone())),
        membership_service: Arc::new(PostgresMembershipService::new(pool.clone())),
        audit_log: Arc::new(PostgresAuditLog::new(pool)),
    };

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
