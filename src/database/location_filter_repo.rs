use sqlx::SqlitePool;

use crate::models::location_filter::DEFAULT_RADIUS_KM;
use crate::models::{City, LocationFilterRow};

const SQL_LOAD_LOCATION_FILTER: &str = r#"
SELECT city_id, city_name, latitude, longitude, radius_km
FROM location_filters
WHERE user_id = ?1
"#;

// Each setter touches only its own columns; a new row starts at the default radius.
const SQL_UPSERT_CITY: &str = r#"
INSERT INTO location_filters (user_id, city_id, city_name, latitude, longitude, radius_km, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, datetime('now'))
ON CONFLICT (user_id) DO UPDATE SET
    city_id = excluded.city_id,
    city_name = excluded.city_name,
    latitude = excluded.latitude,
    longitude = excluded.longitude,
    updated_at = excluded.updated_at
"#;

const SQL_UPSERT_RADIUS: &str = r#"
INSERT INTO location_filters (user_id, radius_km, updated_at)
VALUES (?1, ?2, datetime('now'))
ON CONFLICT (user_id) DO UPDATE SET
    radius_km = excluded.radius_km,
    updated_at = excluded.updated_at
"#;

const SQL_DELETE_LOCATION_FILTER: &str = r#"
DELETE FROM location_filters
WHERE user_id = ?1
"#;

pub async fn load_location_filter(
    pool: &SqlitePool,
    user_id: &str,
) -> sqlx::Result<Option<LocationFilterRow>> {
    sqlx::query_as::<_, LocationFilterRow>(SQL_LOAD_LOCATION_FILTER)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn upsert_city(pool: &SqlitePool, user_id: &str, city: &City) -> sqlx::Result<()> {
    sqlx::query(SQL_UPSERT_CITY)
        .bind(user_id)
        .bind(&city.id)
        .bind(&city.name)
        .bind(city.latitude)
        .bind(city.longitude)
        .bind(i64::from(DEFAULT_RADIUS_KM))
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn upsert_radius(pool: &SqlitePool, user_id: &str, radius_km: u32) -> sqlx::Result<()> {
    sqlx::query(SQL_UPSERT_RADIUS)
        .bind(user_id)
        .bind(i64::from(radius_km))
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete_location_filter(pool: &SqlitePool, user_id: &str) -> sqlx::Result<()> {
    sqlx::query(SQL_DELETE_LOCATION_FILTER)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}
