//! MCP Tools
//!
//! Tool implementations for the CalorieSnap MCP server.

pub mod meals;
pub mod profile;
pub mod progress;
pub mod reports;
pub mod status;
