//! Meal aggregation
//!
//! Buckets meal records into calendar days and sums their nutrients. The
//! calendar is whatever timezone the caller passes in; meals carry UTC
//! timestamps and are converted before their date is taken.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::error::{NutritionError, NutritionResult};
use super::totals::{DayTotals, GoalTargets, MealRecord, NutrientTotals};

/// Length of the weekly trend window
pub const WEEK_DAYS: u32 = 7;

/// Length of the monthly trend window
pub const MONTH_DAYS: u32 = 30;

/// Calendar day of a meal in the given timezone
pub fn local_date<Tz: TimeZone>(meal: &MealRecord, tz: &Tz) -> NaiveDate {
    meal.occurred_at.with_timezone(tz).date_naive()
}

/// Totals for every meal on `calendar_day`
///
/// An empty or non-matching input gives all-zero totals.
pub fn aggregate_meals<Tz: TimeZone>(
    meals: &[MealRecord],
    calendar_day: NaiveDate,
    tz: &Tz,
) -> NutrientTotals {
    meals
        .iter()
        .filter(|meal| local_date(meal, tz) == calendar_day)
        .sum()
}

/// One entry per day in `[start_day, end_day]`, oldest first, empty days included
pub fn aggregate_range<Tz: TimeZone>(
    meals: &[MealRecord],
    start_day: NaiveDate,
    end_day: NaiveDate,
    tz: &Tz,
) -> NutritionResult<Vec<DayTotals>> {
    if end_day < start_day {
        return Err(NutritionError::InvalidRange {
            start: start_day,
            end: end_day,
        });
    }

    let mut by_date: BTreeMap<NaiveDate, NutrientTotals> = BTreeMap::new();
    for meal in meals {
        let date = local_date(meal, tz);
        if date < start_day || date > end_day {
            continue;
        }
        let entry = by_date.entry(date).or_default();
        *entry = entry.add_meal(meal);
    }

    Ok(start_day
        .iter_days()
        .take_while(|date| *date <= end_day)
        .map(|date| DayTotals {
            date,
            totals: by_date.get(&date).copied().unwrap_or_default(),
        })
        .collect())
}

/// The `days`-long window ending on `end_day`
///
/// `days == 0` is an empty window and fails as an inverted range.
pub fn trailing_days<Tz: TimeZone>(
    meals: &[MealRecord],
    end_day: NaiveDate,
    days: u32,
    tz: &Tz,
) -> NutritionResult<Vec<DayTotals>> {
    let start_day = end_day
        .checked_sub_signed(Duration::days(i64::from(days) - 1))
        .ok_or(NutritionError::InvalidRange {
            start: NaiveDate::MIN,
            end: end_day,
        })?;
    aggregate_range(meals, start_day, end_day, tz)
}

/// Progress of one nutrient against its target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressItem {
    pub consumed: f64,
    pub target: f64,
    pub remaining: f64,
    /// Percent of target, capped at 100
    pub percent: f64,
}

impl ProgressItem {
    pub fn new(consumed: f64, target: f64) -> Self {
        let percent = if target > 0.0 {
            (consumed / target * 100.0).min(100.0)
        } else {
            0.0
        };

        Self {
            consumed,
            target,
            remaining: (target - consumed).max(0.0),
            percent,
        }
    }
}

/// Daily progress against a profile's targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub calories: ProgressItem,
    pub protein: ProgressItem,
    pub carbs: ProgressItem,
    pub fat: ProgressItem,
}

pub fn goal_progress(totals: &NutrientTotals, targets: &GoalTargets) -> GoalProgress {
    GoalProgress {
        calories: ProgressItem::new(totals.calories, targets.calorie_goal as f64),
        protein: ProgressItem::new(totals.protein_g, targets.protein_target_g as f64),
        carbs: ProgressItem::new(totals.carbs_g, targets.carbs_target_g as f64),
        fat: ProgressItem::new(totals.fat_g, targets.fat_target_g as f64),
    }
}

/// Per-day average over a range
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyAverage {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub meals: f64,
}

/// Summary over an aggregated range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSummary {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub days: usize,
    /// Days with at least one meal
    pub days_logged: usize,
    pub totals: NutrientTotals,
    /// Averages divide by every day in the range, not just logged ones
    pub daily_average: DailyAverage,
}

pub fn summarize_range(days: &[DayTotals]) -> RangeSummary {
    let totals: NutrientTotals = days.iter().map(|d| d.totals).sum();
    let days_logged = days.iter().filter(|d| !d.totals.is_empty()).count();

    let daily_average = if days.is_empty() {
        DailyAverage::default()
    } else {
        let n = days.len() as f64;
        DailyAverage {
            calories: totals.calories / n,
            protein_g: totals.protein_g / n,
            carbs_g: totals.carbs_g / n,
            fat_g: totals.fat_g / n,
            meals: totals.meal_count as f64 / n,
        }
    };

    RangeSummary {
        start_date: days.first().map(|d| d.date),
        end_date: days.last().map(|d| d.date),
        days: days.len(),
        days_logged,
        totals,
        daily_average,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn meal_at(calories: f64, y: i32, m: u32, d: u32, h: u32, min: u32) -> MealRecord {
        MealRecord::new(
            calories,
            calories / 20.0,
            calories / 10.0,
            calories / 40.0,
            Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap(),
        )
    }

    #[test]
    fn test_empty_meals_give_zero_totals() {
        let totals = aggregate_meals(&[], date(2025, 1, 1), &Utc);
        assert_eq!(totals, NutrientTotals::zero());
        assert_eq!(totals.meal_count, 0);
    }

    #[test]
    fn test_two_meals_same_day() {
        let meals = vec![
            meal_at(500.0, 2025, 1, 9, 8, 0),
            meal_at(700.0, 2025, 1, 9, 19, 30),
            meal_at(300.0, 2025, 1, 10, 12, 0),
        ];
        let totals = aggregate_meals(&meals, date(2025, 1, 9), &Utc);
        assert_eq!(totals.calories, 1200.0);
        assert_eq!(totals.meal_count, 2);
        assert_eq!(totals.protein_g, 60.0);
        assert_eq!(totals.carbs_g, 120.0);
        assert_eq!(totals.fat_g, 30.0);
    }

    #[test]
    fn test_bucketing_uses_caller_timezone() {
        // 23:30 UTC on the 9th is 01:30 on the 10th at +02:00
        let meals = vec![meal_at(400.0, 2025, 1, 9, 23, 30)];
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        assert_eq!(aggregate_meals(&meals, date(2025, 1, 9), &Utc).meal_count, 1);
        assert_eq!(aggregate_meals(&meals, date(2025, 1, 9), &plus_two).meal_count, 0);
        assert_eq!(aggregate_meals(&meals, date(2025, 1, 10), &plus_two).meal_count, 1);
    }

    #[test]
    fn test_range_includes_empty_days_in_order() {
        let meals = vec![
            meal_at(500.0, 2025, 1, 3, 12, 0),
            meal_at(250.0, 2025, 1, 1, 12, 0),
            meal_at(900.0, 2024, 12, 31, 12, 0),
        ];
        let days = aggregate_range(&meals, date(2025, 1, 1), date(2025, 1, 4), &Utc).unwrap();

        let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
        assert_eq!(
            dates,
            vec![date(2025, 1, 1), date(2025, 1, 2), date(2025, 1, 3), date(2025, 1, 4)]
        );
        assert_eq!(days[0].totals.calories, 250.0);
        assert_eq!(days[1].totals, NutrientTotals::zero());
        assert_eq!(days[2].totals.calories, 500.0);
        assert_eq!(days[3].totals.meal_count, 0);
    }

    #[test]
    fn test_single_day_range_matches_aggregate_meals() {
        let meals = vec![
            meal_at(500.0, 2025, 2, 1, 7, 0),
            meal_at(650.0, 2025, 2, 1, 21, 0),
            meal_at(100.0, 2025, 2, 2, 1, 0),
        ];
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let d = date(2025, 2, 1);

        let range = aggregate_range(&meals, d, d, &offset).unwrap();
        assert_eq!(
            range,
            vec![DayTotals {
                date: d,
                totals: aggregate_meals(&meals, d, &offset)
            }]
        );
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let err = aggregate_range(&[], date(2025, 1, 5), date(2025, 1, 4), &Utc).unwrap_err();
        assert_eq!(
            err,
            NutritionError::InvalidRange {
                start: date(2025, 1, 5),
                end: date(2025, 1, 4)
            }
        );
    }

    #[test]
    fn test_range_crosses_month_boundary() {
        let days = aggregate_range(&[], date(2024, 2, 27), date(2024, 3, 2), &Utc).unwrap();
        assert_eq!(days.len(), 5);
        assert_eq!(days[2].date, date(2024, 2, 29));
    }

    #[test]
    fn test_trailing_week() {
        let meals = vec![
            meal_at(400.0, 2025, 1, 1, 12, 0),
            meal_at(600.0, 2025, 1, 7, 12, 0),
            meal_at(800.0, 2025, 1, 8, 12, 0),
        ];
        let week = trailing_days(&meals, date(2025, 1, 7), WEEK_DAYS, &Utc).unwrap();
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, date(2025, 1, 1));
        assert_eq!(week[6].date, date(2025, 1, 7));
        assert_eq!(week[0].totals.calories, 400.0);
        assert_eq!(week[6].totals.calories, 600.0);
    }

    #[test]
    fn test_trailing_zero_days_fails() {
        assert!(matches!(
            trailing_days(&[], date(2025, 1, 7), 0, &Utc),
            Err(NutritionError::InvalidRange { .. })
        ));
        assert_eq!(trailing_days(&[], date(2025, 1, 7), 1, &Utc).unwrap().len(), 1);
    }

    #[test]
    fn test_progress_caps_at_100_percent() {
        let item = ProgressItem::new(2500.0, 2000.0);
        assert_eq!(item.percent, 100.0);
        assert_eq!(item.remaining, 0.0);

        let item = ProgressItem::new(500.0, 2000.0);
        assert_eq!(item.percent, 25.0);
        assert_eq!(item.remaining, 1500.0);

        let item = ProgressItem::new(500.0, 0.0);
        assert_eq!(item.percent, 0.0);
    }

    #[test]
    fn test_goal_progress_uses_all_targets() {
        let targets = GoalTargets {
            bmr: 1649.0,
            tdee: 2556.0,
            calorie_goal: 2000,
            protein_target_g: 150,
            carbs_target_g: 200,
            fat_target_g: 67,
        };
        let totals = NutrientTotals {
            calories: 1000.0,
            protein_g: 75.0,
            carbs_g: 50.0,
            fat_g: 67.0,
            meal_count: 2,
        };
        let progress = goal_progress(&totals, &targets);
        assert_eq!(progress.calories.percent, 50.0);
        assert_eq!(progress.protein.percent, 50.0);
        assert_eq!(progress.carbs.percent, 25.0);
        assert_eq!(progress.fat.percent, 100.0);
        assert_eq!(progress.calories.remaining, 1000.0);
    }

    #[test]
    fn test_summarize_range() {
        let meals = vec![
            meal_at(1000.0, 2025, 1, 1, 12, 0),
            meal_at(800.0, 2025, 1, 3, 12, 0),
            meal_at(400.0, 2025, 1, 3, 18, 0),
        ];
        let days = aggregate_range(&meals, date(2025, 1, 1), date(2025, 1, 4), &Utc).unwrap();
        let summary = summarize_range(&days);

        assert_eq!(summary.days, 4);
        assert_eq!(summary.days_logged, 2);
        assert_eq!(summary.totals.calories, 2200.0);
        assert_eq!(summary.totals.meal_count, 3);
        assert_eq!(summary.daily_average.calories, 550.0);
        assert_eq!(summary.daily_average.meals, 0.75);
        assert_eq!(summary.start_date, Some(date(2025, 1, 1)));
        assert_eq!(summary.end_date, Some(date(2025, 1, 4)));
    }

    #[test]
    fn test_summarize_empty_range() {
        let summary = summarize_range(&[]);
        assert_eq!(summary.days, 0);
        assert_eq!(summary.daily_average, DailyAverage::default());
        assert_eq!(summary.start_date, None);
    }
}
