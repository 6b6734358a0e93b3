//! Progress MCP Tools
//!
//! Day, range and trend summaries over the meal log. Meals are fetched by
//! UTC bounds derived from local midnights, then bucketed by the calculator.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::Database;
use crate::models::Meal;
use crate::nutrition::{
    aggregate_meals, aggregate_range, goal_progress, summarize_range, trailing_days, DayTotals,
    GoalProgress, GoalTargets, MealRecord, NutrientTotals, RangeSummary, MONTH_DAYS, WEEK_DAYS,
};
use crate::tools::profile::load_profile;

/// Longest range a single request may cover
pub const MAX_RANGE_DAYS: i64 = 366;

/// Response for get_day_summary
#[derive(Debug, Serialize)]
pub struct DaySummaryResponse {
    pub date: NaiveDate,
    pub weekday: String,
    pub totals: NutrientTotals,
    pub targets: Option<GoalTargets>,
    pub progress: Option<GoalProgress>,
    pub meals: Vec<Meal>,
}

/// Response for get_range_summary and the trend tools
#[derive(Debug, Serialize)]
pub struct RangeSummaryResponse {
    pub days: Vec<DayTotals>,
    pub summary: RangeSummary,
    pub calorie_goal: Option<i64>,
    /// Days whose calories exceeded the goal
    pub days_over_goal: Option<usize>,
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date: '{}'. Use YYYY-MM-DD", s))
}

/// Today's date in `tz`
pub fn today(tz: &FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(tz).date_naive()
}

/// UTC instant of local midnight at the start of `day`
fn day_start(day: NaiveDate, tz: &FixedOffset) -> Result<DateTime<Utc>, String> {
    day.and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(*tz).single())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("No local midnight for {}", day))
}

/// Meal rows whose local date falls in `[start_day, end_day]`
pub(crate) fn meals_between(
    conn: &Connection,
    start_day: NaiveDate,
    end_day: NaiveDate,
    tz: &FixedOffset,
) -> Result<Vec<Meal>, String> {
    let after_end = end_day
        .succ_opt()
        .ok_or_else(|| format!("Date out of range: {}", end_day))?;
    let start = day_start(start_day, tz)?;
    let end = day_start(after_end, tz)?;

    Meal::list_between(conn, &start, &end).map_err(|e| format!("Failed to load meals: {}", e))
}

fn check_range(start_day: NaiveDate, end_day: NaiveDate) -> Result<(), String> {
    if end_day < start_day {
        return Err(format!(
            "Invalid range: end {} is before start {}",
            end_day, start_day
        ));
    }
    let span = (end_day - start_day).num_days() + 1;
    if span > MAX_RANGE_DAYS {
        return Err(format!(
            "Range of {} days is too long (max {})",
            span, MAX_RANGE_DAYS
        ));
    }
    Ok(())
}

fn records(meals: &[Meal]) -> Vec<MealRecord> {
    meals.iter().map(Meal::to_record).collect()
}

fn range_response(conn: &Connection, days: Vec<DayTotals>) -> Result<RangeSummaryResponse, String> {
    let calorie_goal = load_profile(conn)?.map(|p| p.targets.calorie_goal);
    let days_over_goal = calorie_goal.map(|goal| {
        days.iter()
            .filter(|d| d.totals.calories > goal as f64)
            .count()
    });

    Ok(RangeSummaryResponse {
        summary: summarize_range(&days),
        days,
        calorie_goal,
        days_over_goal,
    })
}

/// Day totals for every day in `[start_day, end_day]`
pub(crate) fn load_range(
    conn: &Connection,
    start_day: NaiveDate,
    end_day: NaiveDate,
    tz: &FixedOffset,
) -> Result<Vec<DayTotals>, String> {
    check_range(start_day, end_day)?;
    let meals = meals_between(conn, start_day, end_day, tz)?;
    aggregate_range(&records(&meals), start_day, end_day, tz).map_err(|e| e.to_string())
}

/// Totals, targets and progress for one calendar day
pub fn get_day_summary(
    db: &Database,
    date: &str,
    tz: &FixedOffset,
) -> Result<DaySummaryResponse, String> {
    let day = parse_date(date)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let meals = meals_between(&conn, day, day, tz)?;
    let totals = aggregate_meals(&records(&meals), day, tz);

    let targets = load_profile(&conn)?.map(|p| p.targets);
    let progress = targets.as_ref().map(|t| goal_progress(&totals, t));

    Ok(DaySummaryResponse {
        date: day,
        weekday: day.format("%A").to_string(),
        totals,
        targets,
        progress,
        meals,
    })
}

/// Per-day totals and a summary for an inclusive date range
pub fn get_range_summary(
    db: &Database,
    start_date: &str,
    end_date: &str,
    tz: &FixedOffset,
) -> Result<RangeSummaryResponse, String> {
    let start_day = parse_date(start_date)?;
    let end_day = parse_date(end_date)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let days = load_range(&conn, start_day, end_day, tz)?;
    range_response(&conn, days)
}

/// The trailing window of `days` days ending on `end_date` (default today)
pub fn get_weekly_trend(
    db: &Database,
    end_date: Option<&str>,
    days: Option<u32>,
    tz: &FixedOffset,
) -> Result<RangeSummaryResponse, String> {
    trailing_window(db, end_date, days.unwrap_or(WEEK_DAYS), tz)
}

/// The trailing 30 days ending on `end_date` (default today)
pub fn get_monthly_trend(
    db: &Database,
    end_date: Option<&str>,
    tz: &FixedOffset,
) -> Result<RangeSummaryResponse, String> {
    trailing_window(db, end_date, MONTH_DAYS, tz)
}

fn trailing_window(
    db: &Database,
    end_date: Option<&str>,
    days: u32,
    tz: &FixedOffset,
) -> Result<RangeSummaryResponse, String> {
    let end_day = match end_date {
        Some(s) => parse_date(s)?,
        None => today(tz),
    };
    if days == 0 {
        return Err("days must be at least 1".to_string());
    }
    let start_day = end_day
        .checked_sub_signed(Duration::days(i64::from(days) - 1))
        .ok_or_else(|| format!("Date out of range: {} days before {}", days, end_day))?;
    check_range(start_day, end_day)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let meals = meals_between(&conn, start_day, end_day, tz)?;
    let window = trailing_days(&records(&meals), end_day, days, tz).map_err(|e| e.to_string())?;

    range_response(&conn, window)
}
