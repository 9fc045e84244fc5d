use sqlx::SqlitePool;

const SQL_LOAD_PLAN: &str = r#"
SELECT plan
FROM subscriptions
WHERE user_id = ?1
"#;

const SQL_UPSERT_PLAN: &str = r#"
INSERT INTO subscriptions (user_id, plan, updated_at)
VALUES (?1, ?2, datetime('now'))
ON CONFLICT (user_id) DO UPDATE SET
    plan = excluded.plan,
    updated_at = excluded.updated_at
"#;

pub async fn load_plan(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as(SQL_LOAD_PLAN)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| r.0))
}

pub async fn upsert_plan(pool: &SqlitePool, user_id: &str, plan: &str) -> sqlx::Result<()> {
    sqlx::query(SQL_UPSERT_PLAN)
        .bind(user_id)
        .bind(plan)
        .execute(pool)
        .await?;
    Ok(())
}
