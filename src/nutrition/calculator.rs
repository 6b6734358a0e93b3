//! Metabolic calculations
//!
//! BMR via Mifflin-St Jeor, TDEE from activity level, the goal-adjusted
//! calorie target and the macronutrient gram split. Every value is rounded
//! to the nearest integer, ties to even.
//!
//! Energy values never go below zero: a profile small enough to push BMR or
//! the calorie goal negative gets 0 instead of an error.

use super::error::{NutritionError, NutritionResult};
use super::profile::{validate_measurements, ActivityLevel, Goal, Profile, Sex};
use super::totals::{GoalTargets, MacroSplit};

/// Daily deficit applied for the `lose` goal (~0.5 kg/week)
pub const LOSE_DEFICIT_KCAL: i64 = 500;

/// Daily surplus applied for the `gain` goal
pub const GAIN_SURPLUS_KCAL: i64 = 300;

pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
pub const KCAL_PER_GRAM_CARBS: f64 = 4.0;
pub const KCAL_PER_GRAM_FAT: f64 = 9.0;

// Mifflin-St Jeor coefficients
const MSJ_WEIGHT_COEF: f64 = 10.0;
const MSJ_HEIGHT_COEF: f64 = 6.25;
const MSJ_AGE_COEF: f64 = 5.0;
const MSJ_MALE_CONSTANT: f64 = 5.0;
const MSJ_FEMALE_CONSTANT: f64 = -161.0;

/// Share of the calorie goal assigned to each macronutrient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroRatios {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroRatios {
    pub fn for_goal(goal: Goal) -> Self {
        match goal {
            // High protein preserves muscle in a deficit
            Goal::Lose => Self {
                protein: 0.35,
                carbs: 0.40,
                fat: 0.25,
            },
            Goal::Gain => Self {
                protein: 0.30,
                carbs: 0.45,
                fat: 0.25,
            },
            Goal::Maintain => Self {
                protein: 0.30,
                carbs: 0.40,
                fat: 0.30,
            },
        }
    }
}

/// Energy inputs must be finite and not negative
fn ensure_energy(field: &'static str, value: f64) -> NutritionResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(NutritionError::invalid_profile(field, value))
    }
}

/// Basal Metabolic Rate (kcal/day), Mifflin-St Jeor (1990)
///
/// - male: `10w + 6.25h - 5a + 5`
/// - female: `10w + 6.25h - 5a - 161`
///
/// Floored at 0.
///
/// # Errors
///
/// `InvalidProfile` when weight, height or age is not positive.
pub fn compute_bmr(weight_kg: f64, height_cm: f64, age_years: u32, sex: Sex) -> NutritionResult<f64> {
    validate_measurements(weight_kg, height_cm, age_years)?;

    let sex_constant = match sex {
        Sex::Male => MSJ_MALE_CONSTANT,
        Sex::Female => MSJ_FEMALE_CONSTANT,
    };

    let bmr = MSJ_WEIGHT_COEF * weight_kg + MSJ_HEIGHT_COEF * height_cm
        - MSJ_AGE_COEF * f64::from(age_years)
        + sex_constant;

    Ok(bmr.round_ties_even().max(0.0))
}

/// Total Daily Energy Expenditure: BMR scaled by the activity factor
///
/// # Errors
///
/// `InvalidProfile` (field `bmr`) when `bmr` is negative or not finite.
pub fn compute_tdee(bmr: f64, activity_level: ActivityLevel) -> NutritionResult<f64> {
    ensure_energy("bmr", bmr)?;
    Ok((bmr * activity_level.factor()).round_ties_even())
}

/// Daily calorie target for a goal, floored at 0
///
/// # Errors
///
/// `InvalidProfile` (field `tdee`) when `tdee` is negative or not finite.
pub fn compute_calorie_goal(tdee: f64, goal: Goal) -> NutritionResult<i64> {
    ensure_energy("tdee", tdee)?;
    let tdee = tdee.round_ties_even() as i64;

    let calorie_goal = match goal {
        Goal::Lose => tdee - LOSE_DEFICIT_KCAL,
        Goal::Gain => tdee + GAIN_SURPLUS_KCAL,
        Goal::Maintain => tdee,
    };
    Ok(calorie_goal.max(0))
}

/// Macronutrient grams for a calorie goal
///
/// Each macro is rounded on its own, so the split need not add back up to
/// exactly `calorie_goal`. A negative goal is treated as 0.
pub fn compute_macro_split(calorie_goal: i64, goal: Goal) -> MacroSplit {
    let calories = calorie_goal.max(0) as f64;
    let ratios = MacroRatios::for_goal(goal);

    MacroSplit {
        protein_g: (calories * ratios.protein / KCAL_PER_GRAM_PROTEIN).round_ties_even() as i64,
        carbs_g: (calories * ratios.carbs / KCAL_PER_GRAM_CARBS).round_ties_even() as i64,
        fat_g: (calories * ratios.fat / KCAL_PER_GRAM_FAT).round_ties_even() as i64,
    }
}

/// Full target set for a profile
pub fn compute_targets(profile: &Profile) -> NutritionResult<GoalTargets> {
    let bmr = compute_bmr(profile.weight_kg, profile.height_cm, profile.age_years, profile.sex)?;
    let tdee = compute_tdee(bmr, profile.activity_level)?;
    let calorie_goal = compute_calorie_goal(tdee, profile.goal)?;
    let split = compute_macro_split(calorie_goal, profile.goal);

    Ok(GoalTargets {
        bmr,
        tdee,
        calorie_goal,
        protein_target_g: split.protein_g,
        carbs_target_g: split.carbs_g,
        fat_target_g: split.fat_g,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmr_male_golden() {
        // 700 + 1093.75 - 150 + 5 = 1648.75
        assert_eq!(compute_bmr(70.0, 175.0, 30, Sex::Male).unwrap(), 1649.0);
    }

    #[test]
    fn test_bmr_female() {
        // 600 + 1031.25 - 125 - 161 = 1345.25
        assert_eq!(compute_bmr(60.0, 165.0, 25, Sex::Female).unwrap(), 1345.0);
    }

    #[test]
    fn test_bmr_rejects_zero_weight() {
        let err = compute_bmr(0.0, 175.0, 30, Sex::Male).unwrap_err();
        assert_eq!(
            err,
            NutritionError::InvalidProfile {
                field: "weight_kg",
                value: "0".to_string()
            }
        );
    }

    #[test]
    fn test_bmr_rejects_bad_height_and_age() {
        assert!(compute_bmr(70.0, 0.0, 30, Sex::Female).is_err());
        assert!(compute_bmr(70.0, f64::INFINITY, 30, Sex::Female).is_err());
        assert!(compute_bmr(70.0, 175.0, 0, Sex::Female).is_err());
    }

    #[test]
    fn test_tdee_moderate_golden() {
        // 1649 * 1.55 = 2555.95
        assert_eq!(compute_tdee(1649.0, ActivityLevel::Moderate).unwrap(), 2556.0);
    }

    #[test]
    fn test_tdee_all_levels() {
        let expected = [
            (ActivityLevel::Sedentary, 1200.0),
            (ActivityLevel::Light, 1375.0),
            (ActivityLevel::Moderate, 1550.0),
            (ActivityLevel::Active, 1725.0),
            (ActivityLevel::VeryActive, 1900.0),
        ];
        for (level, tdee) in expected {
            assert_eq!(compute_tdee(1000.0, level).unwrap(), tdee, "{level}");
        }
    }

    #[test]
    fn test_tdee_rejects_non_positive_bmr() {
        let err = compute_tdee(-10.0, ActivityLevel::Light).unwrap_err();
        assert!(matches!(err, NutritionError::InvalidProfile { field: "bmr", .. }));
    }

    #[test]
    fn test_calorie_goal() {
        assert_eq!(compute_calorie_goal(2556.0, Goal::Lose).unwrap(), 2056);
        assert_eq!(compute_calorie_goal(2556.0, Goal::Gain).unwrap(), 2856);
        assert_eq!(compute_calorie_goal(2556.0, Goal::Maintain).unwrap(), 2556);
    }

    #[test]
    fn test_calorie_goal_rounds_instead_of_truncating() {
        assert_eq!(compute_calorie_goal(2000.6, Goal::Maintain).unwrap(), 2001);
        assert_eq!(compute_calorie_goal(2000.4, Goal::Lose).unwrap(), 1500);
    }

    #[test]
    fn test_macro_split_maintain_golden() {
        let split = compute_macro_split(2000, Goal::Maintain);
        assert_eq!(
            split,
            MacroSplit {
                protein_g: 150,
                carbs_g: 200,
                fat_g: 67
            }
        );
    }

    #[test]
    fn test_macro_split_lose_and_gain() {
        let lose = compute_macro_split(2000, Goal::Lose);
        assert_eq!((lose.protein_g, lose.carbs_g, lose.fat_g), (175, 200, 56));

        let gain = compute_macro_split(3000, Goal::Gain);
        assert_eq!((gain.protein_g, gain.carbs_g, gain.fat_g), (225, 338, 83));
    }

    #[test]
    fn test_macro_split_non_negative() {
        for calories in [0, 1, 7, 999, 2500, 10_000] {
            for goal in [Goal::Lose, Goal::Maintain, Goal::Gain] {
                let split = compute_macro_split(calories, goal);
                assert!(split.protein_g >= 0 && split.carbs_g >= 0 && split.fat_g >= 0);
            }
        }
        assert_eq!(
            compute_macro_split(-1, Goal::Maintain),
            compute_macro_split(0, Goal::Maintain)
        );
    }

    #[test]
    fn test_bmr_rounds_ties_to_even() {
        // 700 + 1087.5 - 150 + 5 = 1642.5
        assert_eq!(compute_bmr(70.0, 174.0, 30, Sex::Male).unwrap(), 1642.0);
        // 700 + 1112.5 - 150 + 5 = 1667.5
        assert_eq!(compute_bmr(70.0, 178.0, 30, Sex::Male).unwrap(), 1668.0);
    }

    #[test]
    fn test_macro_split_rounds_ties_to_even() {
        // 5 * 0.40 / 4 = 0.5
        assert_eq!(compute_macro_split(5, Goal::Maintain).carbs_g, 0);
        // 15 * 0.40 / 4 = 1.5
        assert_eq!(compute_macro_split(15, Goal::Maintain).carbs_g, 2);
    }

    #[test]
    fn test_tdee_rejects_non_finite_bmr() {
        assert!(compute_tdee(f64::NAN, ActivityLevel::Light).is_err());
        assert_eq!(compute_tdee(0.0, ActivityLevel::Light).unwrap(), 0.0);
    }

    #[test]
    fn test_tiny_profile_floors_at_zero() {
        // BMR 250 + 750 - 450 - 161 = 389, TDEE 467, goal 467 - 500 < 0
        let profile = Profile::parse(25.0, 120.0, 90, "female", "sedentary", "lose").unwrap();
        let targets = compute_targets(&profile).unwrap();
        assert_eq!(targets.tdee, 467.0);
        assert_eq!(targets.calorie_goal, 0);
        assert_eq!(
            (targets.protein_target_g, targets.carbs_target_g, targets.fat_target_g),
            (0, 0, 0)
        );

        // 10 + 6.25 - 500 - 161 < 0
        assert_eq!(compute_bmr(1.0, 1.0, 100, Sex::Female).unwrap(), 0.0);
        let profile = Profile::parse(1.0, 1.0, 100, "female", "active", "gain").unwrap();
        let targets = compute_targets(&profile).unwrap();
        assert_eq!(targets.tdee, 0.0);
        assert_eq!(targets.calorie_goal, GAIN_SURPLUS_KCAL);
    }

    #[test]
    fn test_ratios_sum_to_one() {
        for goal in [Goal::Lose, Goal::Maintain, Goal::Gain] {
            let r = MacroRatios::for_goal(goal);
            assert!((r.protein + r.carbs + r.fat - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_targets_chain() {
        let profile = Profile::parse(70.0, 175.0, 30, "male", "moderate", "lose").unwrap();
        let targets = compute_targets(&profile).unwrap();
        assert_eq!(targets.bmr, 1649.0);
        assert_eq!(targets.tdee, 2556.0);
        assert_eq!(targets.calorie_goal, 2056);
        // 2056 * 0.35 / 4 = 179.9, 2056 * 0.40 / 4 = 205.6, 2056 * 0.25 / 9 = 57.1
        assert_eq!(targets.protein_target_g, 180);
        assert_eq!(targets.carbs_target_g, 206);
        assert_eq!(targets.fat_target_g, 57);
    }

    #[test]
    fn test_targets_deterministic() {
        let profile = Profile::parse(82.5, 181.0, 41, "female", "active", "gain").unwrap();
        let first = compute_targets(&profile).unwrap();
        for _ in 0..10 {
            assert_eq!(compute_targets(&profile).unwrap(), first);
        }
    }
}
