mod cli;
mod dates;
mod db;
mod handlers;
mod models;

use anyhow::{Context, Result};
use clap::Parser;
use db::StudentsTable;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before clap reads DATABASE_URL
    dotenv::dotenv().ok();

    let cli = cli::Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose { "studentsdb=debug" } else { "studentsdb=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Connecting to database: {}", cli.database_url);
    let pool = db::connect(&cli.database_url)
        .await
        .context("Failed to connect to database")?;

    let table = StudentsTable::new(pool.clone());
    let result = handlers::handle_command(&table, cli.command).await;

    // The connection belongs to us, not to the table.
    pool.close().await;

    let output = result?;
    println!("{}", output);
    Ok(())
}
