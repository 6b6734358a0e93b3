//! Profile model
//!
//! Stores the user's body metrics in a single-row table.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::nutrition::{ActivityLevel, Goal, Profile, Sex};

sql_text_enum!(Sex, ActivityLevel, Goal);

/// The stored profile with its last computed calorie goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredProfile {
    #[serde(flatten)]
    pub profile: Profile,
    pub daily_calorie_goal: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl StoredProfile {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            profile: Profile {
                weight_kg: row.get("weight_kg")?,
                height_cm: row.get("height_cm")?,
                age_years: row.get("age_years")?,
                sex: row.get("sex")?,
                activity_level: row.get("activity_level")?,
                goal: row.get("goal")?,
            },
            daily_calorie_goal: row.get("daily_calorie_goal")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Get the profile, if one has been set
    pub fn get(conn: &Connection) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM profile WHERE id = 1")?;

        match stmt.query_row([], Self::from_row) {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set or replace the profile (upsert)
    pub fn set(conn: &Connection, profile: &Profile, daily_calorie_goal: i64) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO profile (id, weight_kg, height_cm, age_years, sex, activity_level, goal, daily_calorie_goal)
            VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                weight_kg = excluded.weight_kg,
                height_cm = excluded.height_cm,
                age_years = excluded.age_years,
                sex = excluded.sex,
                activity_level = excluded.activity_level,
                goal = excluded.goal,
                daily_calorie_goal = excluded.daily_calorie_goal,
                updated_at = datetime('now')
            "#,
            params![
                profile.weight_kg,
                profile.height_cm,
                profile.age_years,
                profile.sex,
                profile.activity_level,
                profile.goal,
                daily_calorie_goal,
            ],
        )?;

        Self::get(conn)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_get_without_profile() {
        assert!(StoredProfile::get(&conn()).unwrap().is_none());
    }

    #[test]
    fn test_set_then_update() {
        let conn = conn();
        let profile = Profile::parse(70.0, 175.0, 30, "male", "moderate", "lose").unwrap();
        let stored = StoredProfile::set(&conn, &profile, 2056).unwrap();
        assert_eq!(stored.profile, profile);
        assert_eq!(stored.daily_calorie_goal, 2056);

        let updated = Profile::parse(68.0, 175.0, 31, "male", "very_active", "gain").unwrap();
        StoredProfile::set(&conn, &updated, 3100).unwrap();

        let loaded = StoredProfile::get(&conn).unwrap().unwrap();
        assert_eq!(loaded.profile.activity_level, ActivityLevel::VeryActive);
        assert_eq!(loaded.profile.goal, Goal::Gain);
        assert_eq!(loaded.profile.age_years, 31);
        assert_eq!(loaded.daily_calorie_goal, 3100);

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM profile", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_serializes_flat() {
        let conn = conn();
        let profile = Profile::parse(60.0, 165.0, 25, "female", "light", "maintain").unwrap();
        let stored = StoredProfile::set(&conn, &profile, 1851).unwrap();
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["sex"], "female");
        assert_eq!(json["activity_level"], "light");
        assert_eq!(json["daily_calorie_goal"], 1851);
    }
}
