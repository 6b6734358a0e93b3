//! Nutrition calculator
//!
//! Pure calculation and aggregation over typed profiles and meal records.
//! Nothing in this module touches storage or the network.

pub mod aggregate;
pub mod calculator;
pub mod error;
pub mod profile;
pub mod totals;

pub use aggregate::{
    aggregate_meals, aggregate_range, goal_progress, local_date, summarize_range, trailing_days,
    DailyAverage, GoalProgress, ProgressItem, RangeSummary, MONTH_DAYS, WEEK_DAYS,
};
pub use calculator::{
    compute_bmr, compute_calorie_goal, compute_macro_split, compute_targets, compute_tdee,
    MacroRatios, GAIN_SURPLUS_KCAL, LOSE_DEFICIT_KCAL,
};
pub use error::{NutritionError, NutritionResult};
pub use profile::{ActivityLevel, Goal, Profile, Sex};
pub use totals::{DayTotals, GoalTargets, MacroSplit, MealRecord, NutrientTotals};
