use sqlx::SqlitePool;
use std::collections::HashMap;
use std::future::Future;
use tracing::{info, warn};

use crate::config::LocationApiConfig;
use crate::database::project_repo;
use crate::error::BackendError;
use crate::models::ProjectGeoCandidateRow;
use crate::services::location_service;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProjectGeoBackfillReport {
    pub candidates: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub async fn backfill_project_geo(
    pool: &SqlitePool,
    config: &LocationApiConfig,
    limit: i64,
) -> sqlx::Result<ProjectGeoBackfillReport> {
    backfill_with(pool, limit, |query| async move {
        let cities = location_service::search_cities(config, &query, 3).await?;
        Ok(cities.first().map(|c| (c.latitude, c.longitude)))
    })
    .await
}

pub(crate) async fn backfill_with<F, Fut>(
    pool: &SqlitePool,
    limit: i64,
    mut lookup: F,
) -> sqlx::Result<ProjectGeoBackfillReport>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Option<(f64, f64)>, BackendError>>,
{
    let candidates = project_repo::list_projects_missing_geo(pool, limit).await?;
    let mut report = ProjectGeoBackfillReport {
        candidates: candidates.len(),
        ..Default::default()
    };

    // One lookup per distinct city.
    let mut cache: HashMap<String, Option<(f64, f64)>> = HashMap::new();

    for row in candidates {
        if row.latitude.is_some() && row.longitude.is_some() {
            report.skipped += 1;
            continue;
        }
        let Some(query) = build_query(&row) else {
            report.skipped += 1;
            continue;
        };

        let cache_key = query.to_lowercase();
        let coords = match cache.get(&cache_key) {
            Some(hit) => *hit,
            None => match lookup(query.clone()).await {
                Ok(found) => {
                    cache.insert(cache_key, found);
                    found
                }
                Err(e) => {
                    warn!("📍 Geocoding '{}' failed for project {}: {}", query, row.id, e);
                    report.failed += 1;
                    continue;
                }
            },
        };

        let Some((lat, lon)) = coords else {
            warn!(
                "📍 No coords found for project {} (title='{}', city='{}')",
                row.id, row.title, query
            );
            report.failed += 1;
            continue;
        };

        if project_repo::update_project_geo(pool, &row.id, lat, lon).await? > 0 {
            report.updated += 1;
        } else {
            report.failed += 1;
        }
    }

    info!(
        "📍 Project geo backfill done: candidates={}, updated={}, skipped={}, failed={}",
        report.candidates, report.updated, report.skipped, report.failed
    );

    Ok(report)
}

fn build_query(row: &ProjectGeoCandidateRow) -> Option<String> {
    row.city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::test_support::{insert_project, memory_pool};
    use axum::http::StatusCode;
    use std::cell::RefCell;

    async fn set_city(pool: &SqlitePool, id: &str, city: &str) {
        sqlx::query("UPDATE projects SET city = ?2 WHERE id = ?1")
            .bind(id)
            .bind(city)
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn fills_missing_coordinates_once_per_city() {
        let pool = memory_pool().await;
        insert_project(&pool, "p-1", "o-1", "One", None).await;
        insert_project(&pool, "p-2", "o-1", "Two", None).await;
        insert_project(&pool, "p-3", "o-1", "Three", None).await;
        insert_project(&pool, "p-4", "o-1", "Placed", Some((45.0, 4.0))).await;
        set_city(&pool, "p-3", "Atlantis").await;

        let lookups = RefCell::new(Vec::new());
        let report = backfill_with(&pool, 10, |query| {
            lookups.borrow_mut().push(query.clone());
            async move {
                Ok(match query.as_str() {
                    "Paris" => Some((48.8566, 2.3522)),
                    _ => None,
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(
            report,
            ProjectGeoBackfillReport {
                candidates: 3,
                updated: 2,
                skipped: 0,
                failed: 1,
            }
        );
        assert_eq!(lookups.borrow().len(), 2);

        let row = project_repo::load_project(&pool, "p-2").await.unwrap().unwrap();
        assert_eq!(row.latitude, Some(48.8566));
    }

    #[tokio::test]
    async fn lookup_errors_are_counted_not_fatal() {
        let pool = memory_pool().await;
        insert_project(&pool, "p-1", "o-1", "One", None).await;

        let report = backfill_with(&pool, 10, |_| async {
            Err(BackendError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: None,
            })
        })
        .await
        .unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.updated, 0);
    }
}
