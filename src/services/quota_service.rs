use serde::Serialize;
use sqlx::SqlitePool;

use crate::database::quota_repo;
use crate::error::AppError;
use crate::models::QuotaKind;
use crate::services::subscription_service;

/// One unit taken from a daily counter. `day` is the counter it came from,
/// `None` on an unlimited plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grant {
    pub kind: QuotaKind,
    pub day: Option<String>,
    pub remaining: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Reservation {
    Granted(Grant),
    Exhausted,
}

/// Daily per-plan counters. Reservation is a single conditional UPDATE, so
/// concurrent requests cannot push usage past the limit.
#[derive(Clone)]
pub struct QuotaService {
    pool: SqlitePool,
}

impl QuotaService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn today() -> String {
        chrono::Utc::now().date_naive().to_string()
    }

    pub async fn reserve(&self, user_id: &str, kind: QuotaKind) -> Result<Reservation, AppError> {
        self.reserve_on(user_id, kind, &Self::today()).await
    }

    pub(crate) async fn reserve_on(
        &self,
        user_id: &str,
        kind: QuotaKind,
        day: &str,
    ) -> Result<Reservation, AppError> {
        let plan = subscription_service::load_plan(&self.pool, user_id).await?;
        let Some(limit) = plan.daily_limit(kind) else {
            return Ok(Reservation::Granted(Grant {
                kind,
                day: None,
                remaining: None,
            }));
        };

        if !quota_repo::try_reserve(&self.pool, user_id, day, kind.as_str(), limit).await? {
            return Ok(Reservation::Exhausted);
        }
        let used = quota_repo::load_used(&self.pool, user_id, day, kind.as_str()).await?;
        Ok(Reservation::Granted(Grant {
            kind,
            day: Some(day.to_string()),
            remaining: Some(remaining(limit, used)),
        }))
    }

    pub async fn release(&self, user_id: &str, grant: &Grant) -> Result<(), AppError> {
        let Some(day) = grant.day.as_deref() else {
            return Ok(());
        };
        quota_repo::release(&self.pool, user_id, day, grant.kind.as_str()).await?;
        Ok(())
    }

    pub async fn remaining(&self, user_id: &str, kind: QuotaKind) -> Result<Option<u32>, AppError> {
        self.remaining_on(user_id, kind, &Self::today()).await
    }

    async fn remaining_on(
        &self,
        user_id: &str,
        kind: QuotaKind,
        day: &str,
    ) -> Result<Option<u32>, AppError> {
        let plan = subscription_service::load_plan(&self.pool, user_id).await?;
        let Some(limit) = plan.daily_limit(kind) else {
            return Ok(None);
        };
        let used = quota_repo::load_used(&self.pool, user_id, day, kind.as_str()).await?;
        Ok(Some(remaining(limit, used)))
    }
}

fn remaining(limit: u32, used: i64) -> u32 {
    u32::try_from(used)
        .map(|used| limit.saturating_sub(used))
        .unwrap_or(0)
}
