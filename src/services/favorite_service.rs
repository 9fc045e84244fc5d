use sqlx::SqlitePool;

use crate::database::{favorite_repo, project_repo};
use crate::error::AppError;
use crate::models::FavoriteRow;

pub async fn add_favorite(pool: &SqlitePool, user_id: &str, project_id: &str) -> Result<(), AppError> {
    if project_repo::load_project(pool, project_id).await?.is_none() {
        return Err(AppError::NotFound("project"));
    }
    favorite_repo::insert_favorite(pool, user_id, project_id).await?;
    Ok(())
}

pub async fn remove_favorite(
    pool: &SqlitePool,
    user_id: &str,
    project_id: &str,
) -> Result<(), AppError> {
    match favorite_repo::delete_favorite(pool, user_id, project_id).await? {
        0 => Err(AppError::NotFound("favorite")),
        _ => Ok(()),
    }
}

pub async fn list_favorites(pool: &SqlitePool, user_id: &str) -> Result<Vec<FavoriteRow>, AppError> {
    Ok(favorite_repo::list_favorites(pool, user_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::test_support::{insert_project, memory_pool};

    #[tokio::test]
    async fn favorites_are_per_user_and_idempotent() {
        let pool = memory_pool().await;
        insert_project(&pool, "proj-1", "owner-1", "Paris app", None).await;
        insert_project(&pool, "proj-2", "owner-1", "Lyon app", None).await;

        add_favorite(&pool, "u-1", "proj-1").await.unwrap();
        add_favorite(&pool, "u-1", "proj-1").await.unwrap();
        add_favorite(&pool, "u-1", "proj-2").await.unwrap();
        add_favorite(&pool, "u-2", "proj-2").await.unwrap();

        let mut ids: Vec<String> = list_favorites(&pool, "u-1")
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.project_id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["proj-1", "proj-2"]);

        remove_favorite(&pool, "u-1", "proj-1").await.unwrap();
        let left = list_favorites(&pool, "u-1").await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].title.as_deref(), Some("Lyon app"));
    }

    #[tokio::test]
    async fn unknown_project_or_favorite_is_not_found() {
        let pool = memory_pool().await;
        assert!(matches!(
            add_favorite(&pool, "u-1", "nope").await,
            Err(AppError::NotFound("project"))
        ));
        assert!(matches!(
            remove_favorite(&pool, "u-1", "nope").await,
            Err(AppError::NotFound("favorite"))
        ));
    }
}
