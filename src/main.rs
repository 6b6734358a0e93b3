//! CalorieSnap
//!
//! An MCP server for meal logging against calorie and macro targets.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use caloriesnap::build_info;
use caloriesnap::config::Config;
use caloriesnap::db::Database;
use caloriesnap::mcp::CalorieSnapService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging goes to stderr; stdout carries the MCP protocol
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("caloriesnap=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = Config::from_env()?;
    eprintln!("Database path: {}", config.database_path.display());
    eprintln!("Calendar UTC offset: {}", config.utc_offset);

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    eprintln!("Initializing database...");
    let database = Database::open_and_migrate(&config.database_path)?;

    let service = CalorieSnapService::new(&config, database);

    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}
