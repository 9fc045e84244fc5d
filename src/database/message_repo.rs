use sqlx::SqlitePool;

use crate::models::MessageRow;

pub struct NewMessage<'a> {
    pub id: &'a str,
    pub sender_profile_id: &'a str,
    pub recipient_profile_id: &'a str,
    pub content: &'a str,
    pub created_at: &'a str,
}

const SQL_INSERT_MESSAGE: &str = r#"
INSERT INTO messages (
  id,
  sender_profile_id,
  recipient_profile_id,
  content,
  created_at
) VALUES (?1, ?2, ?3, ?4, ?5)
"#;

const SQL_LIST_THREAD: &str = r#"
SELECT id, sender_profile_id, recipient_profile_id, content, created_at
FROM messages
WHERE (sender_profile_id = ?1 AND recipient_profile_id = ?2)
    OR (sender_profile_id = ?2 AND recipient_profile_id = ?1)
ORDER BY created_at ASC
LIMIT ?3
"#;

pub async fn insert_message(pool: &SqlitePool, msg: NewMessage<'_>) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_MESSAGE)
        .bind(msg.id)
        .bind(msg.sender_profile_id)
        .bind(msg.recipient_profile_id)
        .bind(msg.content)
        .bind(msg.created_at)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list_thread(
    pool: &SqlitePool,
    profile_a: &str,
    profile_b: &str,
    limit: i64,
) -> sqlx::Result<Vec<MessageRow>> {
    sqlx::query_as::<_, MessageRow>(SQL_LIST_THREAD)
        .bind(profile_a)
        .bind(profile_b)
        .bind(limit)
        .fetch_all(pool)
        .await
}
