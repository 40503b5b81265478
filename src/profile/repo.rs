use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::services::Onboarding;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Profile {
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub date_of_birth: Date,
    pub dietary_preferences: Vec<String>,
    pub daily_calorie_goal: Option<i32>,
    pub is_premium: bool,
    pub onboarded_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

pub async fn get(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
    sqlx::query_as::<_, Profile>(
        r#"
        SELECT user_id, date_of_birth, dietary_preferences, daily_calorie_goal,
               is_premium, onboarded_at, updated_at
          FROM profiles
         WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get profile")
}

/// Create or update the onboarding answers. `is_premium` is never touched here.
pub async fn upsert(db: &PgPool, user_id: Uuid, o: &Onboarding) -> anyhow::Result<Profile> {
    sqlx::query_as::<_, Profile>(
        r#"
        INSERT INTO profiles (user_id, date_of_birth, dietary_preferences, daily_calorie_goal)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id) DO UPDATE
           SET date_of_birth = EXCLUDED.date_of_birth,
               dietary_preferences = EXCLUDED.dietary_preferences,
               daily_calorie_goal = EXCLUDED.daily_calorie_goal,
               updated_at = now()
        RETURNING user_id, date_of_birth, dietary_preferences, daily_calorie_goal,
                  is_premium, onboarded_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(o.date_of_birth)
    .bind(&o.dietary_preferences)
    .bind(o.daily_calorie_goal)
    .fetch_one(db)
    .await
    .context("upsert profile")
}

/// Users without a profile are on the free tier.
pub async fn is_premium(db: &PgPool, user_id: Uuid) -> anyhow::Result<bool> {
    let premium =
        sqlx::query_scalar::<_, bool>("SELECT is_premium FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await
            .context("check premium")?;
    Ok(premium.unwrap_or(false))
}
