// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use campus_portal::config::Config;
use campus_portal::models::exam::CreateExamRequest;
use campus_portal::repo::{ExamStore, PgStore};
use campus_portal::routes;
use campus_portal::state::AppState;
use dotenvy::dotenv;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use validator::Validate;

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let state = match &config.database_url {
        Some(url) => {
            let pool = connect_with_retry(url).await;

            // Run Migrations Automatically
            tracing::info!("Running migrations...");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Migrations applied successfully.");

            let store = PgStore::new(pool);
            AppState::new(config.clone(), Arc::new(store.clone()), Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage (data is lost on restart)");
            AppState::in_memory(config.clone())
        }
    }
    .expect("Failed to initialise application state");

    if let Some(path) = &config.seed_exams {
        if let Err(e) = seed_exams(&state.exams, path).await {
            tracing::error!("Failed to seed exams from {}: {:?}", path, e);
        }
    }

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server
    axum::serve(listener, app).await.unwrap();
}

async fn connect_with_retry(database_url: &str) -> PgPool {
    let mut retry_count = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to connect to database after 5 retries: {}", e);
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");
    pool
}

/// Inserts the exams listed in `path` when the exam store is still empty.
async fn seed_exams(exams: &ExamStore, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !exams.list_exams().await?.is_empty() {
        return Ok(());
    }

    let raw = tokio::fs::read_to_string(path).await?;
    let seed: Vec<CreateExamRequest> = serde_json::from_str(&raw)?;

    for exam in seed {
        exam.validate()?;
        let created = exams.insert_exam(exam).await?;
        tracing::info!("Seeded exam {} ({})", created.id, created.name);
    }
    Ok(())
}
