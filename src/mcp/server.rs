//! CalorieSnap MCP Server Implementation
//!
//! Implements the MCP server with all CalorieSnap tools.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::FixedOffset;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::{utc_offset_from_minutes, Config};
use crate::db::Database;
use crate::tools::meals::{self, MealInput, DEFAULT_LIST_LIMIT};
use crate::tools::profile::{self, ProfileInput};
use crate::tools::progress;
use crate::tools::reports;
use crate::tools::status::StatusTracker;

/// CalorieSnap MCP Service
#[derive(Clone)]
pub struct CalorieSnapService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    database_path: PathBuf,
    /// Offset used when a tool call does not pass one
    utc_offset: FixedOffset,
    tool_router: ToolRouter<CalorieSnapService>,
}

impl CalorieSnapService {
    pub fn new(config: &Config, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(config.database_path.clone()))),
            database,
            database_path: config.database_path.clone(),
            utc_offset: config.utc_offset,
            tool_router: Self::tool_router(),
        }
    }

    fn offset(&self, minutes: Option<i32>) -> Result<FixedOffset, McpError> {
        match minutes {
            Some(m) => utc_offset_from_minutes(m).map_err(|e| McpError::invalid_params(e, None)),
            None => Ok(self.utc_offset),
        }
    }

    fn default_report_path(&self, start_date: &str, end_date: &str) -> PathBuf {
        let mut path = self
            .database_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        path.push("reports");
        path.push(format!("nutrition_{}_{}.pdf", start_date, end_date));
        path
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Profile Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ProfileParams {
    /// Body weight in kilograms
    pub weight_kg: f64,
    /// Height in centimetres
    pub height_cm: f64,
    /// Age in whole years
    pub age_years: u32,
    /// Sex: male or female
    pub sex: String,
    /// Activity level: sedentary, light, moderate, active, very_active
    pub activity_level: String,
    /// Goal: lose, maintain, gain
    pub goal: String,
}

impl ProfileParams {
    fn input(&self) -> ProfileInput<'_> {
        ProfileInput {
            weight_kg: self.weight_kg,
            height_cm: self.height_cm,
            age_years: self.age_years,
            sex: &self.sex,
            activity_level: &self.activity_level,
            goal: &self.goal,
        }
    }
}

// ============================================================================
// Meal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogMealParams {
    /// Name of the food or dish
    pub food_name: String,
    /// Energy in kcal
    pub calories: f64,
    /// Protein in grams
    #[serde(default)]
    pub protein_g: f64,
    /// Carbohydrates in grams
    #[serde(default)]
    pub carbs_g: f64,
    /// Fat in grams
    #[serde(default)]
    pub fat_g: f64,
    /// Free-text portion description (e.g. "1 bowl", "250 g")
    pub portion_size: Option<String>,
    /// Estimate confidence: high, medium, low (default medium)
    pub confidence: Option<String>,
    /// Meal time: breakfast, lunch, dinner, snack (default lunch)
    pub meal_time: Option<String>,
    /// When the meal was eaten, RFC 3339 (defaults to now)
    pub occurred_at: Option<String>,
    /// Optional notes
    pub notes: Option<String>,
    /// Offset used for timestamps without one, minutes east of UTC
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MealIdParams {
    /// Meal ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListMealsParams {
    /// Maximum results (default 50, max 200)
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    /// Offset for pagination
    #[serde(default)]
    pub offset: i64,
}

fn default_list_limit() -> i64 { DEFAULT_LIST_LIMIT }

// ============================================================================
// Progress Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DaySummaryParams {
    /// Date in ISO format: YYYY-MM-DD (defaults to today)
    pub date: Option<String>,
    /// Calendar offset in minutes east of UTC (defaults to server setting)
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RangeSummaryParams {
    /// Start date (inclusive): YYYY-MM-DD
    pub start_date: String,
    /// End date (inclusive): YYYY-MM-DD
    pub end_date: String,
    /// Calendar offset in minutes east of UTC (defaults to server setting)
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WeeklyTrendParams {
    /// Last day of the window: YYYY-MM-DD (defaults to today)
    pub end_date: Option<String>,
    /// Window length in days (default 7)
    pub days: Option<u32>,
    /// Calendar offset in minutes east of UTC (defaults to server setting)
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MonthlyTrendParams {
    /// Last day of the window: YYYY-MM-DD (defaults to today)
    pub end_date: Option<String>,
    /// Calendar offset in minutes east of UTC (defaults to server setting)
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateReportParams {
    /// Start date (inclusive): YYYY-MM-DD
    pub start_date: String,
    /// End date (inclusive): YYYY-MM-DD
    pub end_date: String,
    /// Output PDF path (defaults to reports/ next to the database)
    pub output_path: Option<String>,
    /// Calendar offset in minutes east of UTC (defaults to server setting)
    pub utc_offset_minutes: Option<i32>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl CalorieSnapService {
    // --- Status ---

    #[tool(description = "Get the current status of the CalorieSnap service including build info, database status, and process information")]
    async fn caloriesnap_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database, self.utc_offset);
        json_result(&status)
    }

    #[tool(description = "Get instructions for setting a profile, logging meals and reviewing progress. Call this when starting a session or when unsure how to use the tools.")]
    fn usage_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::USAGE_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(USAGE_INSTRUCTIONS)]))
    }

    // --- Profile ---

    #[tool(description = "Get the stored profile with its BMR, TDEE, calorie goal and macro targets")]
    fn get_profile(&self) -> Result<CallToolResult, McpError> {
        let result = profile::get_profile(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(profile) => json_result(&profile),
            None => Ok(CallToolResult::success(vec![Content::text(
                r#"{"error": "Profile not set. Call set_profile first."}"#,
            )])),
        }
    }

    #[tool(description = "Set or replace the profile (weight, height, age, sex, activity level, goal). Returns the computed targets.")]
    fn set_profile(&self, Parameters(p): Parameters<ProfileParams>) -> Result<CallToolResult, McpError> {
        let result = profile::set_profile(&self.database, &p.input()).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Compute BMR, TDEE, calorie goal and macro targets for the given body metrics without storing them")]
    fn calculate_targets(&self, Parameters(p): Parameters<ProfileParams>) -> Result<CallToolResult, McpError> {
        let result = profile::calculate_targets(&p.input()).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Meals ---

    #[tool(description = "Log a meal with its estimated calories and macros")]
    fn log_meal(&self, Parameters(p): Parameters<LogMealParams>) -> Result<CallToolResult, McpError> {
        let tz = self.offset(p.utc_offset_minutes)?;
        let input = MealInput {
            food_name: p.food_name,
            calories: p.calories,
            protein_g: p.protein_g,
            carbs_g: p.carbs_g,
            fat_g: p.fat_g,
            portion_size: p.portion_size,
            confidence: p.confidence,
            meal_time: p.meal_time,
            occurred_at: p.occurred_at,
            notes: p.notes,
        };
        let result = meals::log_meal(&self.database, input, &tz).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a logged meal by ID")]
    fn get_meal(&self, Parameters(p): Parameters<MealIdParams>) -> Result<CallToolResult, McpError> {
        let result = meals::get_meal(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(meal) => json_result(&meal),
            None => Ok(CallToolResult::success(vec![Content::text(format!(
                r#"{{"error": "Meal not found", "id": {}}}"#,
                p.id
            ))])),
        }
    }

    #[tool(description = "List logged meals, most recent first, with pagination")]
    fn list_meals(&self, Parameters(p): Parameters<ListMealsParams>) -> Result<CallToolResult, McpError> {
        let result = meals::list_meals(&self.database, p.limit, p.offset).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a logged meal")]
    fn delete_meal(&self, Parameters(p): Parameters<MealIdParams>) -> Result<CallToolResult, McpError> {
        let result = meals::delete_meal(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Progress ---

    #[tool(description = "Get totals for one calendar day, progress against the profile's targets, and that day's meals")]
    fn get_day_summary(&self, Parameters(p): Parameters<DaySummaryParams>) -> Result<CallToolResult, McpError> {
        let tz = self.offset(p.utc_offset_minutes)?;
        let date = p
            .date
            .unwrap_or_else(|| progress::today(&tz).format("%Y-%m-%d").to_string());
        let result = progress::get_day_summary(&self.database, &date, &tz).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get per-day totals and averages for an inclusive date range (empty days included)")]
    fn get_range_summary(&self, Parameters(p): Parameters<RangeSummaryParams>) -> Result<CallToolResult, McpError> {
        let tz = self.offset(p.utc_offset_minutes)?;
        let result = progress::get_range_summary(&self.database, &p.start_date, &p.end_date, &tz)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get the trailing 7-day (or custom length) trend ending on a date")]
    fn get_weekly_trend(&self, Parameters(p): Parameters<WeeklyTrendParams>) -> Result<CallToolResult, McpError> {
        let tz = self.offset(p.utc_offset_minutes)?;
        let result = progress::get_weekly_trend(&self.database, p.end_date.as_deref(), p.days, &tz)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get the trailing 30-day trend ending on a date")]
    fn get_monthly_trend(&self, Parameters(p): Parameters<MonthlyTrendParams>) -> Result<CallToolResult, McpError> {
        let tz = self.offset(p.utc_offset_minutes)?;
        let result = progress::get_monthly_trend(&self.database, p.end_date.as_deref(), &tz)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Reports ---

    #[tool(description = "Generate a PDF nutrition report for a date range with a daily table and calorie and macro trend charts")]
    fn generate_nutrition_report(&self, Parameters(p): Parameters<GenerateReportParams>) -> Result<CallToolResult, McpError> {
        let tz = self.offset(p.utc_offset_minutes)?;
        let output_path = match p.output_path {
            Some(path) => path,
            None => self
                .default_report_path(&p.start_date, &p.end_date)
                .display()
                .to_string(),
        };
        let result = reports::generate_nutrition_report(&self.database, &p.start_date, &p.end_date, &output_path, &tz)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

#[tool_handler]
impl ServerHandler for CalorieSnapService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "caloriesnap".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("CalorieSnap".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "CalorieSnap - Meal logging with calorie goals and macro targets. \
                 IMPORTANT: Call usage_instructions first. \
                 Profile: get_profile/set_profile, calculate_targets (no storage). \
                 Meals: log_meal/get_meal/list_meals/delete_meal. \
                 Progress: get_day_summary, get_range_summary, get_weekly_trend, get_monthly_trend. \
                 Reports: generate_nutrition_report (PDF). \
                 Dates are YYYY-MM-DD calendar days in the server's UTC offset unless utc_offset_minutes is given."
                    .into(),
            ),
        }
    }
}
