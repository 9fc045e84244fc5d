use sqlx::SqlitePool;

const SQL_ENSURE_QUOTA_ROW: &str = r#"
INSERT INTO daily_quota (user_id, day, kind, used)
VALUES (?1, ?2, ?3, 0)
ON CONFLICT (user_id, day, kind) DO NOTHING
"#;

// Conditional increment: the check and the write are one statement.
const SQL_RESERVE_QUOTA: &str = r#"
UPDATE daily_quota
SET used = used + 1
WHERE user_id = ?1 AND day = ?2 AND kind = ?3 AND used < ?4
"#;

const SQL_RELEASE_QUOTA: &str = r#"
UPDATE daily_quota
SET used = used - 1
WHERE user_id = ?1 AND day = ?2 AND kind = ?3 AND used > 0
"#;

const SQL_LOAD_USED: &str = r#"
SELECT used
FROM daily_quota
WHERE user_id = ?1 AND day = ?2 AND kind = ?3
"#;

pub async fn try_reserve(
    pool: &SqlitePool,
    user_id: &str,
    day: &str,
    kind: &str,
    limit: u32,
) -> sqlx::Result<bool> {
    sqlx::query(SQL_ENSURE_QUOTA_ROW)
        .bind(user_id)
        .bind(day)
        .bind(kind)
        .execute(pool)
        .await?;

    let result = sqlx::query(SQL_RESERVE_QUOTA)
        .bind(user_id)
        .bind(day)
        .bind(kind)
        .bind(i64::from(limit))
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn release(pool: &SqlitePool, user_id: &str, day: &str, kind: &str) -> sqlx::Result<()> {
    sqlx::query(SQL_RELEASE_QUOTA)
        .bind(user_id)
        .bind(day)
        .bind(kind)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn load_used(pool: &SqlitePool, user_id: &str, day: &str, kind: &str) -> sqlx::Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as(SQL_LOAD_USED)
        .bind(user_id)
        .bind(day)
        .bind(kind)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| r.0).unwrap_or(0))
}
