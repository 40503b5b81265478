use anyhow::Context;
use sqlx::{FromRow, PgPool};
use time::Date;
use uuid::Uuid;

use super::calendar::{MealSlot, PlanEntry, Window};
use super::dto::CreatePlanEntryRequest;

#[derive(Debug, FromRow)]
struct PlanEntryRow {
    id: Uuid,
    plan_date: Date,
    slot: String,
    title: String,
    calories: Option<i32>,
    notes: Option<String>,
}

impl TryFrom<PlanEntryRow> for PlanEntry {
    type Error = anyhow::Error;

    fn try_from(r: PlanEntryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            plan_date: r.plan_date,
            slot: r.slot.parse::<MealSlot>()?,
            title: r.title,
            calories: r.calories,
            notes: r.notes,
        })
    }
}

pub async fn list_window(
    db: &PgPool,
    user_id: Uuid,
    window: Window,
) -> anyhow::Result<Vec<PlanEntry>> {
    let rows = sqlx::query_as::<_, PlanEntryRow>(
        r#"
        SELECT id, plan_date, slot, title, calories, notes
          FROM meal_plan_entries
         WHERE user_id = $1 AND plan_date >= $2 AND plan_date < $3
         ORDER BY plan_date, created_at
        "#,
    )
    .bind(user_id)
    .bind(window.start)
    .bind(window.end_exclusive())
    .fetch_all(db)
    .await
    .context("list meal plan")?;

    rows.into_iter().map(PlanEntry::try_from).collect()
}

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    req: &CreatePlanEntryRequest,
) -> anyhow::Result<PlanEntry> {
    let row = sqlx::query_as::<_, PlanEntryRow>(
        r#"
        INSERT INTO meal_plan_entries (id, user_id, plan_date, slot, title, calories, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, plan_date, slot, title, calories, notes
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(req.plan_date)
    .bind(req.slot.as_str())
    .bind(req.title.trim())
    .bind(req.calories)
    .bind(req.notes.as_deref())
    .fetch_one(db)
    .await
    .context("insert meal plan entry")?;

    row.try_into()
}
