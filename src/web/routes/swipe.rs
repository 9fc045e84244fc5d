use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::models::{Candidate, QuotaKind, Role, SwipeDirection};
use crate::services::swipe_deck::{build_deck, SwipeContext, SwipeDeck, SwipeStep};
use crate::services::swipe_filters::SwipeFilters;
use crate::services::swipe_service::logic_for_role;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::AppState;

#[derive(Debug, Serialize)]
pub struct DeckView {
    pub role: Role,
    pub current: Option<Candidate>,
    pub cards_left: usize,
    pub remaining_swipes: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SwipeBody {
    direction: SwipeDirection,
    #[serde(default)]
    item_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SwipeOutcome {
    #[serde(flatten)]
    step: SwipeStep,
    next: Option<Candidate>,
}

fn parse_role(raw: &str) -> Result<Role, AppError> {
    Role::parse(raw).ok_or_else(|| AppError::BadRequest(format!("unknown role '{}'", raw)))
}

async fn view(state: &AppState, user_id: &str, deck: &SwipeDeck) -> Result<DeckView, AppError> {
    Ok(DeckView {
        role: deck.role(),
        current: deck.current().cloned(),
        cards_left: deck.cards_left(),
        remaining_swipes: state.quota.remaining(user_id, QuotaKind::Swipe).await?,
    })
}

pub async fn create_deck(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(role): Path<String>,
    Json(filters): Json<SwipeFilters>,
) -> Result<Json<DeckView>, AppError> {
    let role = parse_role(&role)?;
    let location = state.location_filters.get(&user.id).await?;
    let logic = logic_for_role(role, state.backend_for(&user));

    let deck = build_deck(logic.as_ref(), &location, &filters).await;
    info!(user = %user.id, role = role.as_str(), cards = deck.cards_left(), "💞 Deck built");

    let shared = state.decks.replace(&user.id, deck);
    let deck = shared.lock().await;
    Ok(Json(view(&state, &user.id, &deck).await?))
}

pub async fn get_deck(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(role): Path<String>,
) -> Result<Json<DeckView>, AppError> {
    let role = parse_role(&role)?;
    let shared = state
        .decks
        .get(&user.id, role)
        .ok_or(AppError::NotFound("deck"))?;
    let deck = shared.lock().await;
    Ok(Json(view(&state, &user.id, &deck).await?))
}

pub async fn swipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(role): Path<String>,
    Json(body): Json<SwipeBody>,
) -> Result<Json<SwipeOutcome>, AppError> {
    let role = parse_role(&role)?;
    let shared = state
        .decks
        .get(&user.id, role)
        .ok_or(AppError::NotFound("deck"))?;
    let mut deck = shared.lock().await;

    // A stale client must not swipe a card it is no longer looking at.
    if let (Some(expected), Some(current)) = (body.item_id.as_deref(), deck.current()) {
        if expected != current.id() {
            return Err(AppError::BadRequest(format!(
                "card '{}' is not the current card",
                expected
            )));
        }
    }

    let logic = logic_for_role(role, state.backend_for(&user));
    let ctx = SwipeContext {
        logic: logic.as_ref(),
        quota: &state.quota,
        user_id: &user.id,
    };
    let step = deck.swipe(&ctx, body.direction).await?;
    Ok(Json(SwipeOutcome {
        step,
        next: deck.current().cloned(),
    }))
}
