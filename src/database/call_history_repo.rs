use sqlx::SqlitePool;

use crate::models::CallHistoryRow;

const SQL_INSERT_CALL: &str = r#"
INSERT INTO call_history (call_id, caller_user_id, participant_user_id, started_at)
VALUES (?1, ?2, ?3, ?4)
"#;

const SQL_MARK_ENDED: &str = r#"
UPDATE call_history
SET status = 'ended', ended_at = ?2
WHERE call_id = ?1
    AND status = 'started'
    AND (caller_user_id = ?3 OR participant_user_id = ?3)
"#;

const SQL_LOAD_CALL: &str = r#"
SELECT call_id, caller_user_id, participant_user_id, started_at, ended_at, status
FROM call_history
WHERE call_id = ?1
"#;

const SQL_LIST_FOR_USER: &str = r#"
SELECT call_id, caller_user_id, participant_user_id, started_at, ended_at, status
FROM call_history
WHERE caller_user_id = ?1 OR participant_user_id = ?1
ORDER BY started_at DESC
LIMIT ?2
"#;

pub async fn insert_call(
    pool: &SqlitePool,
    call_id: &str,
    caller_user_id: &str,
    participant_user_id: &str,
    started_at: &str,
) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_CALL)
        .bind(call_id)
        .bind(caller_user_id)
        .bind(participant_user_id)
        .bind(started_at)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn mark_ended(
    pool: &SqlitePool,
    call_id: &str,
    ended_at: &str,
    user_id: &str,
) -> sqlx::Result<u64> {
    let result = sqlx::query(SQL_MARK_ENDED)
        .bind(call_id)
        .bind(ended_at)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn load_call(pool: &SqlitePool, call_id: &str) -> sqlx::Result<Option<CallHistoryRow>> {
    sqlx::query_as::<_, CallHistoryRow>(SQL_LOAD_CALL)
        .bind(call_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
) -> sqlx::Result<Vec<CallHistoryRow>> {
    sqlx::query_as::<_, CallHistoryRow>(SQL_LIST_FOR_USER)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
}
