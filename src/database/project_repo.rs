use sqlx::SqlitePool;

use crate::models::{ProjectGeoCandidateRow, ProjectRow};

const PROJECT_COLUMNS: &str = "id, owner_profile_id, title, description, category, required_skills, \
    experience_level, collaboration_type, duration, stage, city, latitude, longitude, is_verified";

pub const SQL_PROJECTS_IN_BBOX: &str = r#"
SELECT
    id, owner_profile_id, title, description, category, required_skills,
    experience_level, collaboration_type, duration, stage, city,
    latitude, longitude, is_verified
FROM projects
WHERE latitude BETWEEN ?1 AND ?2
    AND longitude BETWEEN ?3 AND ?4
LIMIT 500
"#;

pub const SQL_LIST_PROJECTS_MISSING_GEO: &str = r#"
SELECT id, title, city, latitude, longitude
FROM projects
WHERE (latitude IS NULL OR longitude IS NULL)
    AND city IS NOT NULL
    AND TRIM(city) != ''
ORDER BY created_at ASC
LIMIT ?1
"#;

pub const SQL_UPDATE_PROJECT_GEO: &str = r#"
UPDATE projects
SET latitude = ?2, longitude = ?3
WHERE id = ?1
"#;

pub async fn load_projects_in_bbox(
    pool: &SqlitePool,
    bbox: (f64, f64, f64, f64),
) -> sqlx::Result<Vec<ProjectRow>> {
    let (min_lat, max_lat, min_lon, max_lon) = bbox;
    sqlx::query_as::<_, ProjectRow>(SQL_PROJECTS_IN_BBOX)
        .bind(min_lat)
        .bind(max_lat)
        .bind(min_lon)
        .bind(max_lon)
        .fetch_all(pool)
        .await
}

pub async fn load_project(pool: &SqlitePool, project_id: &str) -> sqlx::Result<Option<ProjectRow>> {
    let sql = format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLUMNS);
    sqlx::query_as::<_, ProjectRow>(&sql)
        .bind(project_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_projects_missing_geo(
    pool: &SqlitePool,
    limit: i64,
) -> sqlx::Result<Vec<ProjectGeoCandidateRow>> {
    sqlx::query_as::<_, ProjectGeoCandidateRow>(SQL_LIST_PROJECTS_MISSING_GEO)
        .bind(limit)
        .fetch_all(pool)
        .await
}

pub async fn update_project_geo(
    pool: &SqlitePool,
    project_id: &str,
    lat: f64,
    lon: f64,
) -> sqlx::Result<u64> {
    let result = sqlx::query(SQL_UPDATE_PROJECT_GEO)
        .bind(project_id)
        .bind(lat)
        .bind(lon)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
