use sqlx::SqlitePool;

pub const SQL_INIT_SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

pub async fn ensure_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::raw_sql(SQL_INIT_SCHEMA).execute(pool).await?;
    Ok(())
}

#[cfg(test)]
pub mod test_support {
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    use super::ensure_schema;

    // One connection, otherwise every connection gets its own in-memory database.
    pub async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        ensure_schema(&pool).await.expect("schema");
        pool
    }

    pub async fn insert_profile(
        pool: &SqlitePool,
        id: &str,
        user_id: &str,
        role: &str,
        full_name: &str,
        coords: Option<(f64, f64)>,
    ) {
        sqlx::query(
            "INSERT INTO profiles (id, user_id, full_name, role, skills, latitude, longitude)
             VALUES (?1, ?2, ?3, ?4, '[\"rust\",\"postgres\"]', ?5, ?6)",
        )
        .bind(id)
        .bind(user_id)
        .bind(full_name)
        .bind(role)
        .bind(coords.map(|c| c.0))
        .bind(coords.map(|c| c.1))
        .execute(pool)
        .await
        .expect("insert profile");
    }

    pub async fn insert_project(
        pool: &SqlitePool,
        id: &str,
        owner_profile_id: &str,
        title: &str,
        coords: Option<(f64, f64)>,
    ) {
        sqlx::query(
            "INSERT INTO projects (id, owner_profile_id, title, category, required_skills, city, latitude, longitude)
             VALUES (?1, ?2, ?3, 'fintech', '[\"Rust\",\"React\"]', 'Paris', ?4, ?5)",
        )
        .bind(id)
        .bind(owner_profile_id)
        .bind(title)
        .bind(coords.map(|c| c.0))
        .bind(coords.map(|c| c.1))
        .execute(pool)
        .await
        .expect("insert project");
    }
}
