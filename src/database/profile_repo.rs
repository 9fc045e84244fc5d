use sqlx::SqlitePool;

use crate::models::{CurrentUserRow, ProfileRow};

pub const SQL_PROFILES_IN_BBOX: &str = r#"
SELECT
    id, user_id, full_name, role, sector, skills, experience_level,
    availability, city, latitude, longitude, is_verified, bio
FROM profiles
WHERE latitude BETWEEN ?1 AND ?2
    AND longitude BETWEEN ?3 AND ?4
    AND (?5 IS NULL OR role = ?5)
LIMIT 500
"#;

pub const SQL_LOAD_PROFILE_ID_FOR_USER: &str = r#"
SELECT id
FROM profiles
WHERE user_id = ?1
LIMIT 1
"#;

pub const SQL_LOAD_DISPLAY_NAME: &str = r#"
SELECT full_name
FROM profiles
WHERE user_id = ?1
LIMIT 1
"#;

pub const SQL_LOAD_CURRENT_USER_ID: &str = r#"
SELECT user_id
FROM current_user
LIMIT 1
"#;

pub async fn load_profiles_in_bbox(
    pool: &SqlitePool,
    bbox: (f64, f64, f64, f64),
    role: Option<&str>,
) -> sqlx::Result<Vec<ProfileRow>> {
    let (min_lat, max_lat, min_lon, max_lon) = bbox;
    sqlx::query_as::<_, ProfileRow>(SQL_PROFILES_IN_BBOX)
        .bind(min_lat)
        .bind(max_lat)
        .bind(min_lon)
        .bind(max_lon)
        .bind(role)
        .fetch_all(pool)
        .await
}

pub async fn load_profile_id_for_user(
    pool: &SqlitePool,
    user_id: &str,
) -> sqlx::Result<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as(SQL_LOAD_PROFILE_ID_FOR_USER)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| r.0))
}

pub async fn load_display_name(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Option<String>> {
    let row: Option<(Option<String>,)> = sqlx::query_as(SQL_LOAD_DISPLAY_NAME)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.and_then(|r| r.0))
}

pub async fn load_current_user_id(pool: &SqlitePool) -> sqlx::Result<Option<String>> {
    let row = sqlx::query_as::<_, CurrentUserRow>(SQL_LOAD_CURRENT_USER_ID)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| r.user_id))
}
