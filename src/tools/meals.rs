//! Meal MCP Tools
//!
//! Tools for logging, listing and deleting meals.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

use crate::db::Database;
use crate::models::{Confidence, Meal, MealCreate, MealTime};

/// Page size used when none is given
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Largest page `list_meals` returns
pub const MAX_LIST_LIMIT: i64 = 200;

/// A meal as received from a caller, before validation
#[derive(Debug, Clone, Default)]
pub struct MealInput {
    pub food_name: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub portion_size: Option<String>,
    pub confidence: Option<String>,
    pub meal_time: Option<String>,
    pub occurred_at: Option<String>,
    pub notes: Option<String>,
}

/// Response for list_meals
#[derive(Debug, Serialize)]
pub struct ListMealsResponse {
    pub meals: Vec<Meal>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for delete_meal
#[derive(Debug, Serialize)]
pub struct DeleteMealResponse {
    pub success: bool,
    pub message: String,
}

fn check_amount(field: &str, value: f64) -> Result<f64, String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{} must be a non-negative number, got {}", field, value));
    }
    Ok(value)
}

/// Parse an RFC 3339 timestamp, or a naive `YYYY-MM-DDTHH:MM[:SS]` read in `tz`
pub fn parse_timestamp(s: &str, tz: &FixedOffset) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .map_err(|_| format!("Invalid timestamp: '{}'. Use RFC 3339, e.g. 2025-01-09T12:30:00Z", s))?;

    tz.from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("Invalid local time: '{}'", s))
}

impl MealInput {
    /// Validate and fill in defaults
    pub fn into_create(self, tz: &FixedOffset) -> Result<MealCreate, String> {
        let food_name = self.food_name.trim().to_string();
        if food_name.is_empty() {
            return Err("food_name must not be empty".to_string());
        }

        let confidence = match self.confidence.as_deref() {
            Some(s) => s.parse::<Confidence>()?,
            None => Confidence::Medium,
        };
        let meal_time = match self.meal_time.as_deref() {
            Some(s) => s.parse::<MealTime>()?,
            None => MealTime::Lunch,
        };
        let occurred_at = match self.occurred_at.as_deref() {
            Some(s) => parse_timestamp(s, tz)?,
            None => Utc::now(),
        };

        Ok(MealCreate {
            food_name,
            calories: check_amount("calories", self.calories)?,
            protein_g: check_amount("protein_g", self.protein_g)?,
            carbs_g: check_amount("carbs_g", self.carbs_g)?,
            fat_g: check_amount("fat_g", self.fat_g)?,
            portion_size: self.portion_size.filter(|s| !s.trim().is_empty()),
            confidence,
            meal_time,
            occurred_at,
            notes: self.notes.filter(|s| !s.trim().is_empty()),
        })
    }
}

/// Log a meal
pub fn log_meal(db: &Database, input: MealInput, tz: &FixedOffset) -> Result<Meal, String> {
    let data = input.into_create(tz)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let meal = Meal::create(&conn, &data).map_err(|e| format!("Failed to log meal: {}", e))?;

    tracing::info!(
        meal_id = meal.id,
        calories = meal.calories,
        meal_time = meal.meal_time.as_str(),
        "meal logged"
    );

    Ok(meal)
}

/// Get a meal by ID
pub fn get_meal(db: &Database, id: i64) -> Result<Option<Meal>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Meal::get_by_id(&conn, id).map_err(|e| format!("Failed to get meal: {}", e))
}

/// List meals, most recent first
pub fn list_meals(db: &Database, limit: i64, offset: i64) -> Result<ListMealsResponse, String> {
    let limit = limit.clamp(1, MAX_LIST_LIMIT);
    let offset = offset.max(0);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let meals = Meal::list_recent(&conn, limit, offset)
        .map_err(|e| format!("Failed to list meals: {}", e))?;
    let total = Meal::count(&conn).map_err(|e| format!("Failed to count meals: {}", e))?;

    Ok(ListMealsResponse {
        meals,
        total,
        limit,
        offset,
    })
}

/// Delete a meal
pub fn delete_meal(db: &Database, id: i64) -> Result<DeleteMealResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let deleted = Meal::delete(&conn, id).map_err(|e| format!("Failed to delete meal: {}", e))?;

    if deleted {
        tracing::info!(meal_id = id, "meal deleted");
        Ok(DeleteMealResponse {
            success: true,
            message: format!("Meal {} deleted", id),
        })
    } else {
        Ok(DeleteMealResponse {
            success: false,
            message: format!("Meal {} not found", id),
        })
    }
}
