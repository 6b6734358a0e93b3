//! Utility to set the profile in the database
//!
//! Usage: set_profile <weight_kg> <height_cm> <age_years> <sex> <activity_level> <goal>

use caloriesnap::config;
use caloriesnap::db::Database;
use caloriesnap::models::StoredProfile;
use caloriesnap::nutrition::{compute_targets, Profile};

const USAGE: &str = "Usage: set_profile <weight_kg> <height_cm> <age_years> <sex> <activity_level> <goal>\n\
    sex: male | female\n\
    activity_level: sedentary | light | moderate | active | very_active\n\
    goal: lose | maintain | gain";

fn parse_args(args: &[String]) -> Result<Profile, String> {
    let [weight, height, age, sex, activity_level, goal] = args else {
        return Err(USAGE.to_string());
    };

    let weight_kg: f64 = weight
        .parse()
        .map_err(|_| format!("weight_kg must be a number, got '{}'", weight))?;
    let height_cm: f64 = height
        .parse()
        .map_err(|_| format!("height_cm must be a number, got '{}'", height))?;
    let age_years: u32 = age
        .parse()
        .map_err(|_| format!("age_years must be a whole number, got '{}'", age))?;

    Profile::parse(weight_kg, height_cm, age_years, sex, activity_level, goal).map_err(|e| e.to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let profile = match parse_args(&args) {
        Ok(profile) => profile,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };
    let targets = compute_targets(&profile)?;

    let db_path = config::database_path();
    println!("Database path: {}", db_path.display());
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::open_and_migrate(&db_path)?;

    database.with_conn(|conn| {
        let stored = StoredProfile::set(conn, &profile, targets.calorie_goal)?;
        println!("Profile set:");
        println!(
            "  {:.1} kg, {:.0} cm, {} years, {}",
            stored.profile.weight_kg, stored.profile.height_cm, stored.profile.age_years, stored.profile.sex
        );
        println!("  Activity: {}  Goal: {}", stored.profile.activity_level, stored.profile.goal);
        println!("  BMR: {:.0} kcal  TDEE: {:.0} kcal", targets.bmr, targets.tdee);
        println!("  Calorie goal: {} kcal/day", stored.daily_calorie_goal);
        println!(
            "  Macros: protein {} g, carbs {} g, fat {} g",
            targets.protein_target_g, targets.carbs_target_g, targets.fat_target_g
        );
        println!("  Updated: {}", stored.updated_at);
        Ok(())
    })?;

    Ok(())
}
