//! CalorieSnap Status Tool
//!
//! Runtime status of the service, plus the usage guide handed to assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::Database;
use crate::models::{Meal, StoredProfile};

/// How to use the CalorieSnap tools, for AI assistants
pub const USAGE_INSTRUCTIONS: &str = r#"
# CalorieSnap Usage

CalorieSnap stores a body profile and a log of meals, and reports daily
intake against a calorie goal and macro targets.

## 1. Set the profile

**Tool:** `set_profile`
- `weight_kg`, `height_cm`: positive numbers
- `age_years`: whole years
- `sex`: male | female
- `activity_level`: sedentary | light | moderate | active | very_active
- `goal`: lose | maintain | gain

The response contains the computed targets:
- BMR (Mifflin-St Jeor) and TDEE (BMR x activity factor)
- calorie goal: TDEE - 500 (lose), TDEE (maintain), TDEE + 300 (gain)
- protein / carbs / fat grams from the goal's macro ratios

`calculate_targets` takes the same fields and stores nothing.

## 2. Log meals

**Tool:** `log_meal`
- `food_name` (required), `calories`, `protein_g`, `carbs_g`, `fat_g`
- `portion_size` (free text), `confidence`: high | medium | low
- `meal_time`: breakfast | lunch | dinner | snack
- `occurred_at`: RFC 3339 timestamp; defaults to now

Estimate nutrients from a photo or description before calling. If the
estimate is a guess, log it with `confidence: "low"`.

## 3. Review progress

- `get_day_summary` - totals for one date (YYYY-MM-DD), progress against
  the targets when a profile is set, and the meals of that day
- `get_range_summary` - one row per day between two dates plus averages
- `get_weekly_trend` - the trailing 7 days (or `days`) ending on a date
- `get_monthly_trend` - the trailing 30 days ending on a date
- `generate_nutrition_report` - PDF with a daily table and trend charts

Days are calendar days in the configured UTC offset. Pass
`utc_offset_minutes` to any date tool to override it (e.g. -300 for UTC-5).

## 4. Fix mistakes

`list_meals` shows the most recent meals with their IDs; `delete_meal`
removes one. Log a corrected entry afterwards.
"#;

/// Runtime status of the CalorieSnap service
#[derive(Debug, Clone, Serialize)]
pub struct CalorieSnapStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub meals_logged: Option<i64>,
    pub profile_set: bool,
    pub utc_offset: String,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Collects runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self, db: &Database, utc_offset: chrono::FixedOffset) -> CalorieSnapStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        // Best effort
        let (meals_logged, profile_set) = match db.get_conn() {
            Ok(conn) => (
                Meal::count(&conn).ok(),
                matches!(StoredProfile::get(&conn), Ok(Some(_))),
            ),
            Err(_) => (None, false),
        };

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        CalorieSnapStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            meals_logged,
            profile_set,
            utc_offset: utc_offset.to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::temp_database;
    use chrono::{FixedOffset, Offset, Utc};

    #[test]
    fn test_status_reports_database() {
        let (dir, db) = temp_database();
        let path = dir.path().join("caloriesnap.db");
        let tracker = StatusTracker::new(path.clone());

        let status = tracker.get_status(&db, Utc.fix());
        assert_eq!(status.database_path, path.display().to_string());
        assert!(status.database_size_bytes.is_some());
        assert_eq!(status.meals_logged, Some(0));
        assert!(!status.profile_set);
        assert_eq!(status.process_id, std::process::id());
    }

    #[test]
    fn test_status_shows_offset() {
        let (dir, db) = temp_database();
        let tracker = StatusTracker::new(dir.path().join("caloriesnap.db"));
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(tracker.get_status(&db, offset).utc_offset, "-05:00");
    }

    #[test]
    fn test_usage_instructions_cover_tools() {
        for tool in ["set_profile", "log_meal", "get_day_summary", "delete_meal"] {
            assert!(USAGE_INSTRUCTIONS.contains(tool), "missing {tool}");
        }
    }
}
