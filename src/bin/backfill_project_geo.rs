use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use std::env;

use matchdeck::config::AppConfig;
use matchdeck::database::schema;
use matchdeck::services::project_geo_service;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            std::process::exit(1);
        }
    };
    let pool = SqlitePoolOptions::new()
        .connect(&config.database_url)
        .await
        .expect("Kan niet verbinden met DB");
    schema::ensure_schema(&pool)
        .await
        .expect("Kan schema niet aanmaken");

    let limit: i64 = env::var("BACKFILL_LIMIT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(500);

    match project_geo_service::backfill_project_geo(&pool, &config.location, limit).await {
        Ok(report) => {
            println!(
                "project geo backfill: candidates={}, updated={}, skipped={}, failed={}",
                report.candidates, report.updated, report.skipped, report.failed
            );
        }
        Err(e) => {
            eprintln!("project geo backfill failed: {}", e);
            std::process::exit(1);
        }
    }
}
