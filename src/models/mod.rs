//! Data models
//!
//! Stored profile and meal rows, plus the SQL text mapping for the
//! enumerations they carry.

/// Store an enum as its `as_str` text and parse it back with `FromStr`
macro_rules! sql_text_enum {
    ($($ty:ty),* $(,)?) => {
        $(
            impl rusqlite::types::ToSql for $ty {
                fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                    Ok(rusqlite::types::ToSqlOutput::from(self.as_str()))
                }
            }

            impl rusqlite::types::FromSql for $ty {
                fn column_result(
                    value: rusqlite::types::ValueRef<'_>,
                ) -> rusqlite::types::FromSqlResult<Self> {
                    value
                        .as_str()?
                        .parse::<$ty>()
                        .map_err(|e| rusqlite::types::FromSqlError::Other(e.into()))
                }
            }
        )*
    };
}

mod meal;
mod profile;

pub use meal::{Confidence, Meal, MealCreate, MealTime};
pub use profile::StoredProfile;
