use anyhow::Context;
use time::Date;
use tracing::{debug, info};
use uuid::Uuid;

use super::{dto::LogMealRequest, repo, repo::Meal};
use crate::tracking::{self, apply_meal_log, TrackingState};

/// Result of a successful meal log.
#[derive(Debug)]
pub struct LoggedMeal {
    pub meal: Meal,
    pub tracking: TrackingState,
    /// Day the meal was booked on; see [`TrackingState::log_day`].
    pub day: Date,
}

/// Store a meal and advance the user's streak in one transaction.
///
/// If anything fails the transaction is dropped and neither the meal nor the
/// tracking update is persisted.
pub async fn log_meal(
    db: &sqlx::PgPool,
    user_id: Uuid,
    req: &LogMealRequest,
    today: Date,
) -> anyhow::Result<LoggedMeal> {
    let mut tx = db.begin().await.context("begin tx")?;

    let before = tracking::repo::lock_tx(&mut tx, user_id).await?;
    let day = before.log_day(today);
    if day != today {
        debug!(%user_id, client_day = %today, %day, "client date behind last log");
    }
    let after = apply_meal_log(before, day);
    tracking::repo::save_tx(&mut tx, user_id, &after).await?;

    let meal = repo::insert_tx(&mut tx, user_id, req, day).await?;
    tx.commit().await.context("commit tx")?;

    info!(
        %user_id,
        meal_id = %meal.id,
        meals_today = after.meals_logged_today,
        streak = after.streak,
        "meal logged"
    );
    if after.streak > before.streak {
        info!(%user_id, streak = after.streak, "streak credited");
    } else if after.streak < before.streak {
        info!(%user_id, previous = before.streak, "streak reset");
    }

    Ok(LoggedMeal {
        meal,
        tracking: after,
        day,
    })
}
