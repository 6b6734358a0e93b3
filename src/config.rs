//! Runtime configuration
//!
//! Read from the environment once at startup.

use std::path::PathBuf;

use chrono::{FixedOffset, Offset, Utc};

pub const DATABASE_PATH_VAR: &str = "CALORIESNAP_DATABASE_PATH";
pub const UTC_OFFSET_VAR: &str = "CALORIESNAP_UTC_OFFSET_MINUTES";

/// Largest offset chrono accepts, in minutes (just under 24h)
const MAX_OFFSET_MINUTES: u32 = 24 * 60 - 1;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    /// Offset used to turn UTC meal timestamps into calendar days
    pub utc_offset: FixedOffset,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let utc_offset = match std::env::var(UTC_OFFSET_VAR) {
            Ok(raw) => {
                let minutes: i32 = raw
                    .trim()
                    .parse()
                    .map_err(|_| format!("{} must be an integer, got '{}'", UTC_OFFSET_VAR, raw))?;
                utc_offset_from_minutes(minutes)?
            }
            Err(_) => Utc.fix(),
        };

        Ok(Self {
            database_path: database_path(),
            utc_offset,
        })
    }
}

/// Turn a minutes-east-of-UTC value into an offset
pub fn utc_offset_from_minutes(minutes: i32) -> Result<FixedOffset, String> {
    if minutes.unsigned_abs() > MAX_OFFSET_MINUTES {
        return Err(format!("UTC offset out of range: {} minutes", minutes));
    }
    FixedOffset::east_opt(minutes * 60)
        .ok_or_else(|| format!("UTC offset out of range: {} minutes", minutes))
}

/// Database path from the environment, or `data/caloriesnap.db` at the project root
pub fn database_path() -> PathBuf {
    std::env::var(DATABASE_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
                    path = grandparent.to_path_buf();
                }
            }

            path.push("data");
            path.push("caloriesnap.db");
            path
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utc_offset_from_minutes() {
        assert_eq!(utc_offset_from_minutes(0).unwrap().local_minus_utc(), 0);
        assert_eq!(utc_offset_from_minutes(120).unwrap().local_minus_utc(), 7200);
        assert_eq!(utc_offset_from_minutes(-330).unwrap().local_minus_utc(), -19800);
        assert!(utc_offset_from_minutes(24 * 60).is_err());
        assert!(utc_offset_from_minutes(-100_000).is_err());
    }

    #[test]
    fn test_default_database_path_ends_in_data_dir() {
        if std::env::var(DATABASE_PATH_VAR).is_err() {
            let path = database_path();
            assert!(path.ends_with("data/caloriesnap.db"));
        }
    }
}
