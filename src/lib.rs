//! CalorieSnap Library
//!
//! Calorie goals, macro targets and meal aggregation behind an MCP server.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
