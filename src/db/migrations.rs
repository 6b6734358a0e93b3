//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        tracing::info!("applying schema migration v1");
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Migration v1: profile and meal log
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- PROFILE
        -- Single row (id = 1) holding the user's body metrics
        -- ============================================
        CREATE TABLE profile (
            id INTEGER PRIMARY KEY CHECK(id = 1),
            weight_kg REAL NOT NULL CHECK(weight_kg > 0),
            height_cm REAL NOT NULL CHECK(height_cm > 0),
            age_years INTEGER NOT NULL CHECK(age_years > 0),
            sex TEXT NOT NULL CHECK(sex IN ('male', 'female')),
            activity_level TEXT NOT NULL CHECK(activity_level IN
                ('sedentary', 'light', 'moderate', 'active', 'very_active')),
            goal TEXT NOT NULL CHECK(goal IN ('lose', 'maintain', 'gain')),

            -- Calorie goal computed when the profile was last written
            daily_calorie_goal INTEGER NOT NULL,

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- MEALS
        -- Logged meals with their estimated nutrients
        -- ============================================
        CREATE TABLE meals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            food_name TEXT NOT NULL,
            calories REAL NOT NULL DEFAULT 0 CHECK(calories >= 0),
            protein_g REAL NOT NULL DEFAULT 0 CHECK(protein_g >= 0),
            carbs_g REAL NOT NULL DEFAULT 0 CHECK(carbs_g >= 0),
            fat_g REAL NOT NULL DEFAULT 0 CHECK(fat_g >= 0),
            portion_size TEXT,
            confidence TEXT NOT NULL DEFAULT 'medium' CHECK(confidence IN ('high', 'medium', 'low')),
            meal_time TEXT NOT NULL DEFAULT 'lunch' CHECK(meal_time IN ('breakfast', 'lunch', 'dinner', 'snack')),

            -- UTC, "YYYY-MM-DDTHH:MM:SSZ" so text order is time order
            occurred_at TEXT NOT NULL,

            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_meals_occurred_at ON meals(occurred_at);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}
