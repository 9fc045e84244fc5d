use sqlx::SqlitePool;

use crate::models::SwipeRecord;

const SQL_INSERT_SWIPE: &str = r#"
INSERT INTO swipes (
  id,
  actor_profile_id,
  target_id,
  target_kind,
  direction,
  created_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

const SQL_COUNT_SWIPES_FOR_ACTOR: &str = r#"
SELECT COUNT(*)
FROM swipes
WHERE actor_profile_id = ?1
"#;

pub async fn insert_swipe(pool: &SqlitePool, record: &SwipeRecord) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_SWIPE)
        .bind(&record.id)
        .bind(&record.actor_profile_id)
        .bind(&record.target_id)
        .bind(record.target_kind.as_str())
        .bind(record.direction.as_str())
        .bind(&record.created_at)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn count_swipes_for_actor(pool: &SqlitePool, actor_profile_id: &str) -> sqlx::Result<i64> {
    let (count,): (i64,) = sqlx::query_as(SQL_COUNT_SWIPES_FOR_ACTOR)
        .bind(actor_profile_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
