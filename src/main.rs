use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use matchdeck::backend::{MatchBackend, RestBackend, SqliteBackend};
use matchdeck::config::{AppConfig, BackendKind};
use matchdeck::database::schema;
use matchdeck::web::{build_router, AppState};

#[tokio::main]
async fn main() {
    // Laad .env bestand
    dotenv().ok();

    // 1. Start logging
    tracing_subscriber::fmt::init();

    // 2. Configuratie uit de omgeving
    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ Configuratie fout: {}", e);
            std::process::exit(1);
        }
    };

    // 3. Verbind met de Database
    println!("Verbinden met database: {}", config.database_url);
    let pool = SqlitePoolOptions::new()
        .connect(&config.database_url)
        .await
        .expect("Kan niet verbinden met DB");
    schema::ensure_schema(&pool)
        .await
        .expect("Kan schema niet aanmaken");

    // 4. Kies de backend
    let backend: Arc<dyn MatchBackend> = match config.backend_kind {
        BackendKind::Sqlite => Arc::new(SqliteBackend::new(pool.clone())),
        BackendKind::Rest => Arc::new(RestBackend::new(&config.rest)),
    };
    info!(
        backend = ?config.backend_kind,
        build = env!("MATCHDECK_BUILD_ID"),
        "Backend gekozen"
    );

    let host = config.host.clone();
    let port = config.port;
    let app = build_router(AppState::new(pool, backend, config));

    // 5. Start de server (met fallback poort)
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Kan host/port niet parsen");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!(
                "⚠️  Kon niet binden op {}: {}. Probeer fallback {}:{}",
                addr,
                e,
                host,
                port + 1
            );
            let fallback: SocketAddr = format!("{}:{}", host, port + 1)
                .parse()
                .expect("Kan fallback niet parsen");
            tokio::net::TcpListener::bind(fallback)
                .await
                .expect("Kan niet binden op fallback poort")
        }
    };

    let bound_addr = listener
        .local_addr()
        .expect("Kan lokaal adres niet lezen");
    println!("🚀 Server draait op http://{}", bound_addr);

    axum::serve(listener, app).await.expect("Server gestopt met fout");
}
