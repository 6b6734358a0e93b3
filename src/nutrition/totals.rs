//! Shared nutrition data structures
//!
//! Meal input records and the derived totals/targets returned by the calculator.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A consumed meal as seen by the calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub occurred_at: DateTime<Utc>,
}

impl MealRecord {
    pub fn new(
        calories: f64,
        protein_g: f64,
        carbs_g: f64,
        fat_g: f64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            calories,
            protein_g,
            carbs_g,
            fat_g,
            occurred_at,
        }
    }
}

/// Summed nutrients over a set of meals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientTotals {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub meal_count: usize,
}

impl NutrientTotals {
    /// All-zero totals
    pub fn zero() -> Self {
        Self::default()
    }

    /// Totals with one more meal folded in
    pub fn add_meal(&self, meal: &MealRecord) -> Self {
        Self {
            calories: self.calories + meal.calories,
            protein_g: self.protein_g + meal.protein_g,
            carbs_g: self.carbs_g + meal.carbs_g,
            fat_g: self.fat_g + meal.fat_g,
            meal_count: self.meal_count + 1,
        }
    }

    /// Add another set of totals to this one
    pub fn add(&self, other: &NutrientTotals) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein_g: self.protein_g + other.protein_g,
            carbs_g: self.carbs_g + other.carbs_g,
            fat_g: self.fat_g + other.fat_g,
            meal_count: self.meal_count + other.meal_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.meal_count == 0
    }
}

impl std::ops::Add for NutrientTotals {
    type Output = NutrientTotals;

    fn add(self, other: NutrientTotals) -> NutrientTotals {
        NutrientTotals::add(&self, &other)
    }
}

impl std::iter::Sum for NutrientTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutrientTotals::zero(), |acc, n| acc + n)
    }
}

impl<'a> std::iter::Sum<&'a MealRecord> for NutrientTotals {
    fn sum<I: Iterator<Item = &'a MealRecord>>(iter: I) -> Self {
        iter.fold(NutrientTotals::zero(), |acc, meal| acc.add_meal(meal))
    }
}

/// Totals for one calendar day of a range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTotals {
    pub date: NaiveDate,
    pub totals: NutrientTotals,
}

/// Daily macronutrient targets in grams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroSplit {
    pub protein_g: i64,
    pub carbs_g: i64,
    pub fat_g: i64,
}

/// Derived daily targets for a profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalTargets {
    pub bmr: f64,
    pub tdee: f64,
    pub calorie_goal: i64,
    pub protein_target_g: i64,
    pub carbs_target_g: i64,
    pub fat_target_g: i64,
}
