use regex::Regex;
use sqlx::SqlitePool;
use std::sync::OnceLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::{match_repo, message_repo, profile_repo};
use crate::error::{AppError, BackendError};
use crate::models::{MatchRow, MessageRow, QuotaKind};
use crate::services::quota_service::{QuotaService, Reservation};

const MAX_MESSAGE_CHARS: usize = 2000;

const CONTACT_INFO_MESSAGE: &str =
    "For your safety, email addresses, phone numbers and links can't be shared in messages.";

fn contact_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"(?i)[a-z0-9._%+\-]+\s*(@|\(at\)|\[at\])\s*[a-z0-9.\-]+\.[a-z]{2,}")
                .expect("email pattern"),
            Regex::new(r"\+?\d(?:[\s.\-()]*\d){7,}").expect("phone pattern"),
            Regex::new(r"(?i)\b(?:https?://|www\.)\S+").expect("url pattern"),
        ]
    })
}

pub fn contains_contact_info(content: &str) -> bool {
    contact_patterns().iter().any(|re| re.is_match(content))
}

pub fn validate_message(content: &str) -> Result<&str, AppError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Message cannot be empty.".to_string()));
    }
    if content.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::Validation(format!(
            "Messages are limited to {} characters.",
            MAX_MESSAGE_CHARS
        )));
    }
    if contains_contact_info(content) {
        return Err(AppError::Validation(CONTACT_INFO_MESSAGE.to_string()));
    }
    Ok(content)
}

/// Loads the match as seen by `user_id`; anything the user is not the
/// actor of is reported as missing.
async fn load_own_match(
    pool: &SqlitePool,
    user_id: &str,
    match_id: &str,
) -> Result<(String, MatchRow), AppError> {
    let profile_id = profile_repo::load_profile_id_for_user(pool, user_id)
        .await?
        .ok_or(BackendError::ProfileMissing)?;
    let row = match_repo::load_match(pool, match_id)
        .await?
        .filter(|m| m.actor_profile_id == profile_id)
        .ok_or(AppError::NotFound("match"))?;
    Ok((profile_id, row))
}

pub async fn send_message(
    pool: &SqlitePool,
    quota: &QuotaService,
    user_id: &str,
    match_id: &str,
    content: &str,
) -> Result<MessageRow, AppError> {
    let content = validate_message(content)?;
    let (sender, row) = load_own_match(pool, user_id, match_id).await?;
    if !row.is_matched() {
        return Err(AppError::Validation(
            "You can message this person once you have matched.".to_string(),
        ));
    }
    let recipient = row
        .counterpart_profile_id
        .ok_or(AppError::NotFound("match participant"))?;

    let grant = match quota.reserve(user_id, QuotaKind::Message).await? {
        Reservation::Granted(grant) => grant,
        Reservation::Exhausted => return Err(AppError::QuotaExhausted(QuotaKind::Message)),
    };

    let message = MessageRow {
        id: Uuid::new_v4().to_string(),
        sender_profile_id: sender,
        recipient_profile_id: recipient,
        content: content.to_string(),
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    let inserted = message_repo::insert_message(
        pool,
        message_repo::NewMessage {
            id: &message.id,
            sender_profile_id: &message.sender_profile_id,
            recipient_profile_id: &message.recipient_profile_id,
            content: &message.content,
            created_at: &message.created_at,
        },
    )
    .await;
    if let Err(e) = inserted {
        if let Err(release_err) = quota.release(user_id, &grant).await {
            warn!(user = %user_id, error = %release_err, "message quota refund failed");
        }
        return Err(e.into());
    }

    info!(match_id = %match_id, sender = %message.sender_profile_id, "message_sent");
    Ok(message)
}

pub async fn list_messages(
    pool: &SqlitePool,
    user_id: &str,
    match_id: &str,
    limit: i64,
) -> Result<Vec<MessageRow>, AppError> {
    let (me, row) = load_own_match(pool, user_id, match_id).await?;
    let Some(other) = row.counterpart_profile_id else {
        return Ok(Vec::new());
    };
    Ok(message_repo::list_thread(pool, &me, &other, limit.clamp(1, 200)).await?)
}

pub async fn list_matches(pool: &SqlitePool, user_id: &str) -> Result<Vec<MatchRow>, AppError> {
    let Some(profile_id) = profile_repo::load_profile_id_for_user(pool, user_id).await? else {
        return Ok(Vec::new());
    };
    Ok(match_repo::list_matches_for_profile(pool, &profile_id).await?)
}
