use sqlx::SqlitePool;
use tracing::info;

use crate::database::subscription_repo;
use crate::error::AppError;
use crate::models::Plan;

pub async fn load_plan(pool: &SqlitePool, user_id: &str) -> Result<Plan, AppError> {
    let plan = subscription_repo::load_plan(pool, user_id)
        .await?
        .and_then(|p| Plan::parse(&p))
        .unwrap_or_default();
    Ok(plan)
}

pub async fn change_plan(pool: &SqlitePool, user_id: &str, plan: &str) -> Result<Plan, AppError> {
    let plan = Plan::parse(plan)
        .ok_or_else(|| AppError::BadRequest(format!("unknown plan '{}'", plan.trim())))?;
    subscription_repo::upsert_plan(pool, user_id, plan.as_str()).await?;
    info!(user = %user_id, plan = plan.as_str(), "subscription_changed");
    Ok(plan)
}
