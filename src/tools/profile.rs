//! Profile MCP Tools
//!
//! Reading and writing the profile, and computing goal targets from it.

use rusqlite::Connection;
use serde::Serialize;

use crate::db::Database;
use crate::models::StoredProfile;
use crate::nutrition::{compute_targets, GoalTargets, Profile};

/// Profile together with the targets derived from it
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: StoredProfile,
    pub targets: GoalTargets,
}

/// Raw profile fields as received from a caller
#[derive(Debug, Clone)]
pub struct ProfileInput<'a> {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age_years: u32,
    pub sex: &'a str,
    pub activity_level: &'a str,
    pub goal: &'a str,
}

impl ProfileInput<'_> {
    /// Validate into a typed profile
    pub fn parse(&self) -> Result<Profile, String> {
        Profile::parse(
            self.weight_kg,
            self.height_cm,
            self.age_years,
            self.sex,
            self.activity_level,
            self.goal,
        )
        .map_err(|e| e.to_string())
    }
}

/// Stored profile and its freshly computed targets, if a profile exists
pub(crate) fn load_profile(conn: &Connection) -> Result<Option<ProfileResponse>, String> {
    let stored = StoredProfile::get(conn).map_err(|e| format!("Failed to get profile: {}", e))?;

    match stored {
        Some(profile) => {
            let targets = compute_targets(&profile.profile)
                .map_err(|e| format!("Stored profile is invalid: {}", e))?;
            Ok(Some(ProfileResponse { profile, targets }))
        }
        None => Ok(None),
    }
}

/// Get the profile with its targets
pub fn get_profile(db: &Database) -> Result<Option<ProfileResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    load_profile(&conn)
}

/// Validate, compute targets and store the profile
pub fn set_profile(db: &Database, input: &ProfileInput<'_>) -> Result<ProfileResponse, String> {
    let profile = input.parse()?;
    let targets = compute_targets(&profile).map_err(|e| e.to_string())?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let stored = StoredProfile::set(&conn, &profile, targets.calorie_goal)
        .map_err(|e| format!("Failed to save profile: {}", e))?;

    tracing::info!(
        calorie_goal = targets.calorie_goal,
        goal = %profile.goal,
        "profile updated"
    );

    Ok(ProfileResponse {
        profile: stored,
        targets,
    })
}

/// Compute targets for a profile without storing anything
pub fn calculate_targets(input: &ProfileInput<'_>) -> Result<GoalTargets, String> {
    let profile = input.parse()?;
    compute_targets(&profile).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::temp_database;

    fn input<'a>(activity_level: &'a str, goal: &'a str) -> ProfileInput<'a> {
        ProfileInput {
            weight_kg: 70.0,
            height_cm: 175.0,
            age_years: 30,
            sex: "male",
            activity_level,
            goal,
        }
    }

    #[test]
    fn test_calculate_targets() {
        let targets = calculate_targets(&input("moderate", "lose")).unwrap();
        assert_eq!(targets.bmr, 1649.0);
        assert_eq!(targets.tdee, 2556.0);
        assert_eq!(targets.calorie_goal, 2056);
    }

    #[test]
    fn test_calculate_targets_rejects_unknown_activity() {
        let err = calculate_targets(&input("couch", "lose")).unwrap_err();
        assert!(err.contains("activity_level"), "{err}");
        assert!(err.contains("couch"), "{err}");
    }

    #[test]
    fn test_set_and_get_profile() {
        let (_dir, db) = temp_database();
        assert!(get_profile(&db).unwrap().is_none());

        let saved = set_profile(&db, &input("moderate", "maintain")).unwrap();
        assert_eq!(saved.profile.daily_calorie_goal, 2556);
        assert_eq!(saved.targets.calorie_goal, 2556);

        let loaded = get_profile(&db).unwrap().unwrap();
        assert_eq!(loaded.targets, saved.targets);
    }

    #[test]
    fn test_invalid_profile_is_not_stored() {
        let (_dir, db) = temp_database();
        let mut bad = input("moderate", "maintain");
        bad.weight_kg = 0.0;
        assert!(set_profile(&db, &bad).is_err());
        assert!(get_profile(&db).unwrap().is_none());
    }
}
