use sqlx::SqlitePool;

use crate::models::FavoriteRow;

const SQL_INSERT_FAVORITE: &str = r#"
INSERT INTO favorites (user_id, project_id)
VALUES (?1, ?2)
ON CONFLICT (user_id, project_id) DO NOTHING
"#;

const SQL_DELETE_FAVORITE: &str = r#"
DELETE FROM favorites
WHERE user_id = ?1 AND project_id = ?2
"#;

const SQL_LIST_FAVORITES: &str = r#"
SELECT f.project_id, p.title, f.created_at
FROM favorites f
LEFT JOIN projects p ON p.id = f.project_id
WHERE f.user_id = ?1
ORDER BY f.created_at DESC
"#;

pub async fn insert_favorite(pool: &SqlitePool, user_id: &str, project_id: &str) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_FAVORITE)
        .bind(user_id)
        .bind(project_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete_favorite(pool: &SqlitePool, user_id: &str, project_id: &str) -> sqlx::Result<u64> {
    let result = sqlx::query(SQL_DELETE_FAVORITE)
        .bind(user_id)
        .bind(project_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn list_favorites(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Vec<FavoriteRow>> {
    sqlx::query_as::<_, FavoriteRow>(SQL_LIST_FAVORITES)
        .bind(user_id)
        .fetch_all(pool)
        .await
}
