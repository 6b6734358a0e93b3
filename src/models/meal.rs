//! Meal model
//!
//! A logged meal with the nutrient estimate it was saved with.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::nutrition::MealRecord;

/// Storage format for `occurred_at`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// When in the day a meal was eaten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealTime {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealTime {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealTime::Breakfast => "breakfast",
            MealTime::Lunch => "lunch",
            MealTime::Dinner => "dinner",
            MealTime::Snack => "snack",
        }
    }
}

impl FromStr for MealTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealTime::Breakfast),
            "lunch" => Ok(MealTime::Lunch),
            "dinner" => Ok(MealTime::Dinner),
            "snack" => Ok(MealTime::Snack),
            _ => Err(format!("Unknown meal time: {}", s)),
        }
    }
}

/// How sure the estimator was about the nutrient values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

impl FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Confidence::High),
            "medium" => Ok(Confidence::Medium),
            "low" => Ok(Confidence::Low),
            _ => Err(format!("Unknown confidence: {}", s)),
        }
    }
}

sql_text_enum!(MealTime, Confidence);

/// A stored meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub food_name: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub portion_size: Option<String>,
    pub confidence: Confidence,
    pub meal_time: MealTime,
    pub occurred_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Data for logging a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealCreate {
    pub food_name: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub portion_size: Option<String>,
    pub confidence: Confidence,
    pub meal_time: MealTime,
    pub occurred_at: DateTime<Utc>,
    pub notes: Option<String>,
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

impl Meal {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let occurred_at: String = row.get("occurred_at")?;
        let occurred_at = DateTime::parse_from_rfc3339(&occurred_at)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
            })?
            .with_timezone(&Utc);

        Ok(Self {
            id: row.get("id")?,
            food_name: row.get("food_name")?,
            calories: row.get("calories")?,
            protein_g: row.get("protein_g")?,
            carbs_g: row.get("carbs_g")?,
            fat_g: row.get("fat_g")?,
            portion_size: row.get("portion_size")?,
            confidence: row.get("confidence")?,
            meal_time: row.get("meal_time")?,
            occurred_at,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
        })
    }

    /// The calculator's view of this meal
    pub fn to_record(&self) -> MealRecord {
        MealRecord::new(
            self.calories,
            self.protein_g,
            self.carbs_g,
            self.fat_g,
            self.occurred_at,
        )
    }

    /// Log a new meal
    pub fn create(conn: &Connection, data: &MealCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO meals (food_name, calories, protein_g, carbs_g, fat_g,
                               portion_size, confidence, meal_time, occurred_at, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                data.food_name,
                data.calories,
                data.protein_g,
                data.carbs_g,
                data.fat_g,
                data.portion_size,
                data.confidence,
                data.meal_time,
                format_timestamp(&data.occurred_at),
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a meal by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meals WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(meal) => Ok(Some(meal)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Most recent meals first
    pub fn list_recent(conn: &Connection, limit: i64, offset: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM meals ORDER BY occurred_at DESC, id DESC LIMIT ?1 OFFSET ?2",
        )?;

        let meals = stmt
            .query_map(params![limit, offset], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(meals)
    }

    /// Meals with `start <= occurred_at < end`, oldest first
    pub fn list_between(
        conn: &Connection,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM meals WHERE occurred_at >= ?1 AND occurred_at < ?2 ORDER BY occurred_at, id",
        )?;

        let meals = stmt
            .query_map(
                params![format_timestamp(start), format_timestamp(end)],
                Self::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(meals)
    }

    /// Count all meals
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM meals", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete a meal
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM meals WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use chrono::TimeZone;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn create(conn: &Connection, name: &str, calories: f64, occurred_at: DateTime<Utc>) -> Meal {
        Meal::create(
            conn,
            &MealCreate {
                food_name: name.to_string(),
                calories,
                protein_g: 20.0,
                carbs_g: 30.0,
                fat_g: 10.0,
                portion_size: Some("1 plate".to_string()),
                confidence: Confidence::High,
                meal_time: MealTime::Dinner,
                occurred_at,
                notes: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_create_and_get() {
        let conn = conn();
        let at = Utc.with_ymd_and_hms(2025, 1, 9, 18, 45, 0).unwrap();
        let meal = create(&conn, "Chicken curry", 650.0, at);

        let loaded = Meal::get_by_id(&conn, meal.id).unwrap().unwrap();
        assert_eq!(loaded.food_name, "Chicken curry");
        assert_eq!(loaded.calories, 650.0);
        assert_eq!(loaded.confidence, Confidence::High);
        assert_eq!(loaded.meal_time, MealTime::Dinner);
        assert_eq!(loaded.occurred_at, at);
        assert_eq!(loaded.portion_size.as_deref(), Some("1 plate"));

        assert!(Meal::get_by_id(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn test_list_between_is_half_open() {
        let conn = conn();
        create(&conn, "a", 100.0, Utc.with_ymd_and_hms(2025, 1, 8, 23, 59, 59).unwrap());
        create(&conn, "b", 200.0, Utc.with_ymd_and_hms(2025, 1, 9, 0, 0, 0).unwrap());
        create(&conn, "c", 300.0, Utc.with_ymd_and_hms(2025, 1, 9, 23, 59, 59).unwrap());
        create(&conn, "d", 400.0, Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap());

        let start = Utc.with_ymd_and_hms(2025, 1, 9, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
        let names: Vec<String> = Meal::list_between(&conn, &start, &end)
            .unwrap()
            .into_iter()
            .map(|m| m.food_name)
            .collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_list_recent_and_delete() {
        let conn = conn();
        let first = create(&conn, "first", 100.0, Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap());
        create(&conn, "second", 200.0, Utc.with_ymd_and_hms(2025, 1, 2, 8, 0, 0).unwrap());

        let recent = Meal::list_recent(&conn, 10, 0).unwrap();
        assert_eq!(recent[0].food_name, "second");
        assert_eq!(Meal::count(&conn).unwrap(), 2);

        assert!(Meal::delete(&conn, first.id).unwrap());
        assert!(!Meal::delete(&conn, first.id).unwrap());
        assert_eq!(Meal::count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_to_record() {
        let conn = conn();
        let at = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
        let record = create(&conn, "Salad", 320.0, at).to_record();
        assert_eq!(record.calories, 320.0);
        assert_eq!(record.protein_g, 20.0);
        assert_eq!(record.occurred_at, at);
    }

    #[test]
    fn test_parse_meal_time_and_confidence() {
        assert_eq!("Breakfast".parse::<MealTime>().unwrap(), MealTime::Breakfast);
        assert!("brunch".parse::<MealTime>().is_err());
        assert_eq!("LOW".parse::<Confidence>().unwrap(), Confidence::Low);
        assert!("certain".parse::<Confidence>().is_err());
    }
}
