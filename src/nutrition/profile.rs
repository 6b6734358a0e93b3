//! Profile types
//!
//! The closed enumerations and the validated profile consumed by the calculator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{NutritionError, NutritionResult};

/// Normalize enumerated text: trimmed, lowercase, `-` and spaces as `_`
fn normalize(s: &str) -> String {
    s.trim().to_lowercase().replace(['-', ' '], "_")
}

/// Biological sex, selects the Mifflin-St Jeor constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl FromStr for Sex {
    type Err = NutritionError;

    fn from_str(s: &str) -> NutritionResult<Self> {
        match normalize(s).as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            _ => Err(NutritionError::invalid_profile("sex", s)),
        }
    }
}

/// Activity level used to scale BMR into TDEE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    Light,
    /// Moderate exercise 3-5 days/week
    Moderate,
    /// Heavy exercise 6-7 days/week
    Active,
    /// Very heavy exercise or a physical job
    VeryActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }

    /// TDEE multiplier for this level
    pub fn factor(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = NutritionError;

    fn from_str(s: &str) -> NutritionResult<Self> {
        let normalized = normalize(s);
        ActivityLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == normalized)
            .ok_or_else(|| NutritionError::invalid_profile("activity_level", s))
    }
}

/// Weight goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Lose,
    Maintain,
    Gain,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Lose => "lose",
            Goal::Maintain => "maintain",
            Goal::Gain => "gain",
        }
    }
}

impl FromStr for Goal {
    type Err = NutritionError;

    fn from_str(s: &str) -> NutritionResult<Self> {
        match normalize(s).as_str() {
            "lose" => Ok(Goal::Lose),
            "maintain" => Ok(Goal::Maintain),
            "gain" => Ok(Goal::Gain),
            _ => Err(NutritionError::invalid_profile("goal", s)),
        }
    }
}

macro_rules! impl_display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display_as_str!(Sex, ActivityLevel, Goal);

/// A validated user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age_years: u32,
    pub sex: Sex,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
}

impl Profile {
    /// Build a profile, rejecting non-positive or non-finite measurements
    pub fn new(
        weight_kg: f64,
        height_cm: f64,
        age_years: u32,
        sex: Sex,
        activity_level: ActivityLevel,
        goal: Goal,
    ) -> NutritionResult<Self> {
        let profile = Self {
            weight_kg,
            height_cm,
            age_years,
            sex,
            activity_level,
            goal,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Build a profile from raw text enumerations, as received from callers
    pub fn parse(
        weight_kg: f64,
        height_cm: f64,
        age_years: u32,
        sex: &str,
        activity_level: &str,
        goal: &str,
    ) -> NutritionResult<Self> {
        Self::new(
            weight_kg,
            height_cm,
            age_years,
            sex.parse()?,
            activity_level.parse()?,
            goal.parse()?,
        )
    }

    pub fn validate(&self) -> NutritionResult<()> {
        validate_measurements(self.weight_kg, self.height_cm, self.age_years)
    }
}

/// Check the numeric profile fields
pub(crate) fn validate_measurements(
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
) -> NutritionResult<()> {
    ensure_positive("weight_kg", weight_kg)?;
    ensure_positive("height_cm", height_cm)?;
    if age_years == 0 {
        return Err(NutritionError::invalid_profile("age_years", age_years));
    }
    Ok(())
}

fn ensure_positive(field: &'static str, value: f64) -> NutritionResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(NutritionError::invalid_profile(field, value))
    }
}
