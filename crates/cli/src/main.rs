//! Shop catalog CLI - database migrations and sample data.
//!
//! # Usage
//!
//! ```bash
//! # Apply the bundled migrations
//! catalog-cli migrate
//!
//! # Insert sample categories, shops and links
//! catalog-cli seed all
//!
//! # Insert one kind of sample data
//! catalog-cli seed categories
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Insert sample data

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(author, version, about = "Shop catalog CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert sample data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert "Category 1" through "Category 6"
    Categories,
    /// Insert "Shop 1" through "Shop 6"
    Shops,
    /// Link existing shops to existing categories, one each
    Links,
    /// Insert categories, shops and links
    All,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Categories => commands::seed::categories().await?,
            SeedTarget::Shops => commands::seed::shops().await?,
            SeedTarget::Links => commands::seed::links().await?,
            SeedTarget::All => commands::seed::all().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_seed_target() {
        let cli = Cli::try_parse_from(["catalog-cli", "seed", "links"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Seed {
                target: SeedTarget::Links
            })
        ));
    }
}
