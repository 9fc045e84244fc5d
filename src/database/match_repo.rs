use sqlx::SqlitePool;

use crate::models::{MatchRow, TargetKind};

pub struct NewPendingMatch<'a> {
    pub id: &'a str,
    pub actor_profile_id: &'a str,
    pub target_id: &'a str,
    pub target_kind: TargetKind,
    pub created_at: &'a str,
}

const SQL_INSERT_PENDING_MATCH: &str = r#"
INSERT INTO matches (
  id,
  actor_profile_id,
  target_id,
  target_kind,
  status,
  created_at
) VALUES (?1, ?2, ?3, ?4, 'pending', ?5)
ON CONFLICT (actor_profile_id, target_id) DO NOTHING
"#;

// The other party is the project owner for project targets, the profile itself otherwise.
// It reciprocates by liking the actor's profile or any project the actor owns.
const SQL_FIND_RECIPROCAL: &str = r#"
SELECT r.id
FROM matches r
WHERE r.actor_profile_id = (
        CASE WHEN ?3 = 'project'
             THEN (SELECT p.owner_profile_id FROM projects p WHERE p.id = ?2)
             ELSE ?2
        END
    )
    AND (
        (r.target_kind = 'profile' AND r.target_id = ?1)
        OR (r.target_kind = 'project'
            AND r.target_id IN (SELECT p.id FROM projects p WHERE p.owner_profile_id = ?1))
    )
LIMIT 1
"#;

const SQL_MARK_MATCHED: &str = r#"
UPDATE matches
SET status = 'matched'
WHERE (actor_profile_id = ?1 AND target_id = ?2)
    OR id = ?3
"#;

const SQL_MATCH_SELECT: &str = r#"
SELECT
    m.id, m.actor_profile_id, m.target_id, m.target_kind, m.status, m.created_at,
    CASE WHEN m.target_kind = 'project'
         THEN (SELECT p.owner_profile_id FROM projects p WHERE p.id = m.target_id)
         ELSE m.target_id
    END AS counterpart_profile_id
FROM matches m
"#;

pub async fn insert_pending_match(pool: &SqlitePool, m: NewPendingMatch<'_>) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_PENDING_MATCH)
        .bind(m.id)
        .bind(m.actor_profile_id)
        .bind(m.target_id)
        .bind(m.target_kind.as_str())
        .bind(m.created_at)
        .execute(pool)
        .await?;
    Ok(())
}

/// Promotes both halves to `matched` when the other side already showed interest.
pub async fn reconcile_match(
    pool: &SqlitePool,
    actor_profile_id: &str,
    target_id: &str,
    target_kind: TargetKind,
) -> sqlx::Result<bool> {
    let reciprocal: Option<(String,)> = sqlx::query_as(SQL_FIND_RECIPROCAL)
        .bind(actor_profile_id)
        .bind(target_id)
        .bind(target_kind.as_str())
        .fetch_optional(pool)
        .await?;

    let Some((reciprocal_id,)) = reciprocal else {
        return Ok(false);
    };

    sqlx::query(SQL_MARK_MATCHED)
        .bind(actor_profile_id)
        .bind(target_id)
        .bind(reciprocal_id)
        .execute(pool)
        .await?;
    Ok(true)
}

pub async fn load_match(pool: &SqlitePool, match_id: &str) -> sqlx::Result<Option<MatchRow>> {
    let sql = format!("{} WHERE m.id = ?1", SQL_MATCH_SELECT);
    sqlx::query_as::<_, MatchRow>(&sql)
        .bind(match_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_matches_for_profile(
    pool: &SqlitePool,
    profile_id: &str,
) -> sqlx::Result<Vec<MatchRow>> {
    let sql = format!(
        "{} WHERE m.actor_profile_id = ?1 AND m.status = 'matched' ORDER BY m.created_at DESC",
        SQL_MATCH_SELECT
    );
    sqlx::query_as::<_, MatchRow>(&sql)
        .bind(profile_id)
        .fetch_all(pool)
        .await
}
