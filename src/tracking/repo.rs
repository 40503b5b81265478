use anyhow::Context;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::Date;
use uuid::Uuid;

use super::streak::TrackingState;

#[derive(Debug, FromRow)]
struct TrackingRow {
    last_tracking_date: Option<Date>,
    meals_logged_today: i32,
    streak: i32,
    last_streak_credit_date: Option<Date>,
}

impl From<TrackingRow> for TrackingState {
    fn from(r: TrackingRow) -> Self {
        Self {
            last_tracking_date: r.last_tracking_date,
            meals_logged_today: r.meals_logged_today.max(0) as u32,
            streak: r.streak.max(0) as u32,
            last_streak_credit_date: r.last_streak_credit_date,
        }
    }
}

/// Current state for a user; users who never logged a meal get the empty state.
pub async fn get(db: &PgPool, user_id: Uuid) -> anyhow::Result<TrackingState> {
    let row = sqlx::query_as::<_, TrackingRow>(
        r#"
        SELECT last_tracking_date, meals_logged_today, streak, last_streak_credit_date
          FROM user_tracking
         WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("select user_tracking")?;

    Ok(row.map(TrackingState::from).unwrap_or_default())
}

/// Read the state and hold its row lock until the transaction ends.
pub async fn lock_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> anyhow::Result<TrackingState> {
    sqlx::query(
        r#"
        INSERT INTO user_tracking (user_id)
        VALUES ($1)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .execute(&mut **tx)
    .await
    .context("ensure user_tracking row")?;

    let row = sqlx::query_as::<_, TrackingRow>(
        r#"
        SELECT last_tracking_date, meals_logged_today, streak, last_streak_credit_date
          FROM user_tracking
         WHERE user_id = $1
           FOR UPDATE
        "#,
    )
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await
    .context("lock user_tracking")?;

    Ok(row.into())
}

pub async fn save_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    state: &TrackingState,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE user_tracking
           SET last_tracking_date = $2,
               meals_logged_today = $3,
               streak = $4,
               last_streak_credit_date = $5,
               updated_at = now()
         WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(state.last_tracking_date)
    .bind(i32::try_from(state.meals_logged_today).unwrap_or(i32::MAX))
    .bind(i32::try_from(state.streak).unwrap_or(i32::MAX))
    .bind(state.last_streak_credit_date)
    .execute(&mut **tx)
    .await
    .context("update user_tracking")?;

    Ok(())
}
