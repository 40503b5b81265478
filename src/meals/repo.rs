use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::dto::LogMealRequest;

/// A logged meal. Amounts the analysis couldn't read are NULL, not zero.
///
/// Nutrients go out under the same names the analysis endpoint uses.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Meal {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub food_name: String,
    pub calories: Option<f64>,
    #[serde(rename = "protein_grams")]
    pub protein_g: Option<f64>,
    #[serde(rename = "fat_grams")]
    pub fat_g: Option<f64>,
    #[serde(rename = "carb_grams")]
    pub carbs_g: Option<f64>,
    #[serde(rename = "sugar_grams")]
    pub sugar_g: Option<f64>,
    pub is_junk_food: bool,
    pub logged_on: Date,
    pub created_at: OffsetDateTime,
}

const MEAL_COLUMNS: &str = "id, user_id, food_name, calories, protein_g, fat_g, carbs_g, \
                            sugar_g, is_junk_food, logged_on, created_at";

pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    req: &LogMealRequest,
    logged_on: Date,
) -> anyhow::Result<Meal> {
    let sql = format!(
        r#"
        INSERT INTO meals (id, user_id, food_name, calories, protein_g, fat_g, carbs_g,
                           sugar_g, is_junk_food, logged_on)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {MEAL_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Meal>(&sql)
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(req.food_name.trim())
        .bind(req.calories)
        .bind(req.protein_grams)
        .bind(req.fat_grams)
        .bind(req.carb_grams)
        .bind(req.sugar_grams)
        .bind(req.is_junk_food)
        .bind(logged_on)
        .fetch_one(&mut **tx)
        .await
        .context("insert meal")
}

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Meal>> {
    let sql = format!(
        r#"
        SELECT {MEAL_COLUMNS}
          FROM meals
         WHERE user_id = $1
         ORDER BY created_at DESC
         LIMIT $2 OFFSET $3
        "#
    );
    sqlx::query_as::<_, Meal>(&sql)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
        .context("list meals")
}

pub async fn get(db: &PgPool, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<Option<Meal>> {
    let sql = format!("SELECT {MEAL_COLUMNS} FROM meals WHERE id = $1 AND user_id = $2");
    sqlx::query_as::<_, Meal>(&sql)
        .bind(meal_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("get meal")
}

/// `false` when no meal with that id belongs to the user.
pub async fn delete(db: &PgPool, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM meals WHERE id = $1 AND user_id = $2")
        .bind(meal_id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete meal")?;
    Ok(res.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::ExtractedNutrition;
    use time::macros::{date, datetime};

    #[test]
    fn meal_uses_analysis_field_names() {
        let meal = Meal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            food_name: "Oatmeal".into(),
            calories: Some(300.0),
            protein_g: Some(10.0),
            fat_g: Some(5.0),
            carbs_g: Some(54.0),
            sugar_g: None,
            is_junk_food: false,
            logged_on: date!(2024 - 03 - 10),
            created_at: datetime!(2024-03-10 08:00 UTC),
        };
        let meal = serde_json::to_value(&meal).unwrap();
        let analysis = serde_json::to_value(ExtractedNutrition::default()).unwrap();

        for key in analysis.as_object().unwrap().keys() {
            assert!(meal.get(key).is_some(), "meal is missing {key}");
        }
        assert_eq!(meal["carb_grams"], 54.0);
        assert!(meal["sugar_grams"].is_null());
        assert!(meal.get("user_id").is_none());
        assert_eq!(meal["logged_on"], "2024-03-10");
    }
}
