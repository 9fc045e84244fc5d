use serde_json::json;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::database::call_history_repo;
use crate::error::AppError;
use crate::models::CallHistoryRow;
use crate::realtime::{call_channel, user_channel, Relay, SignalMessage, SignalType};

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub async fn start_call(
    pool: &SqlitePool,
    relay: &Relay,
    caller_user_id: &str,
    participant_user_id: &str,
) -> Result<CallHistoryRow, AppError> {
    let participant = participant_user_id.trim();
    if participant.is_empty() || participant == caller_user_id {
        return Err(AppError::BadRequest("invalid call participant".to_string()));
    }

    let row = CallHistoryRow {
        call_id: Uuid::new_v4().to_string(),
        caller_user_id: caller_user_id.to_string(),
        participant_user_id: participant.to_string(),
        started_at: now(),
        ended_at: None,
        status: "started".to_string(),
    };
    call_history_repo::insert_call(
        pool,
        &row.call_id,
        &row.caller_user_id,
        &row.participant_user_id,
        &row.started_at,
    )
    .await?;

    let delivered = relay.publish(
        &user_channel(participant),
        SignalMessage::new(
            &row.call_id,
            SignalType::IncomingCall,
            caller_user_id,
            json!({ "call_id": row.call_id }),
        ),
    );
    info!(call_id = %row.call_id, caller = %caller_user_id, delivered, "📞 Call started");
    Ok(row)
}

/// Either side may end a call; ending an ended call is a no-op.
pub async fn end_call(
    pool: &SqlitePool,
    relay: &Relay,
    call_id: &str,
    user_id: &str,
) -> Result<CallHistoryRow, AppError> {
    let updated = call_history_repo::mark_ended(pool, call_id, &now(), user_id).await?;
    let row = call_history_repo::load_call(pool, call_id)
        .await?
        .filter(|c| c.caller_user_id == user_id || c.participant_user_id == user_id)
        .ok_or(AppError::NotFound("call"))?;

    if updated > 0 {
        relay.publish(
            &call_channel(call_id),
            SignalMessage::new(call_id, SignalType::End, user_id, serde_json::Value::Null),
        );
        info!(call_id = %call_id, by = %user_id, "📞 Call ended");
    }
    Ok(row)
}

pub async fn list_history(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<CallHistoryRow>, AppError> {
    Ok(call_history_repo::list_for_user(pool, user_id, limit.clamp(1, 100)).await?)
}
