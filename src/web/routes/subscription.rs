use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{Plan, QuotaKind};
use crate::services::subscription_service;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::AppState;

#[derive(Debug, Serialize)]
pub struct SubscriptionView {
    plan: Plan,
    remaining_swipes: Option<u32>,
    remaining_messages: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePlanBody {
    plan: String,
}

async fn current(state: &AppState, user_id: &str) -> Result<SubscriptionView, AppError> {
    Ok(SubscriptionView {
        plan: subscription_service::load_plan(&state.pool, user_id).await?,
        remaining_swipes: state.quota.remaining(user_id, QuotaKind::Swipe).await?,
        remaining_messages: state.quota.remaining(user_id, QuotaKind::Message).await?,
    })
}

pub async fn get_subscription(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<SubscriptionView>, AppError> {
    Ok(Json(current(&state, &user.id).await?))
}

pub async fn change_plan(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<ChangePlanBody>,
) -> Result<Json<SubscriptionView>, AppError> {
    subscription_service::change_plan(&state.pool, &user.id, &body.plan).await?;
    Ok(Json(current(&state, &user.id).await?))
}
