//! Loomwear CLI - Session-store migrations and backend inspection tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the storefront session table
//! loomwear-cli migrate storefront
//!
//! # Create the admin session table
//! loomwear-cli migrate admin
//!
//! # Both
//! loomwear-cli migrate all
//!
//! # List the catalog, optionally by category
//! loomwear-cli catalog list --category hoodies
//!
//! # List orders, optionally by status
//! loomwear-cli orders list --status pending
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "loomwear-cli")]
#[command(author, version, about = "Loomwear CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run session-store migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Inspect the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Inspect orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Run storefront session-store migrations
    Storefront,
    /// Run admin session-store migrations
    Admin,
    /// Run all session-store migrations
    All,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products
    List {
        /// Only this category (`hoodies`, `tshirt`, `oversize-tshirt`)
        #[arg(short, long)]
        category: Option<String>,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List orders, newest first
    List {
        /// Only this status (`pending`, `in-transit`, `delivered`)
        #[arg(short, long)]
        status: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Storefront => commands::migrate::storefront().await?,
            MigrateTarget::Admin => commands::migrate::admin().await?,
            MigrateTarget::All => {
                commands::migrate::storefront().await?;
                commands::migrate::admin().await?;
            }
        },
        Commands::Catalog { action } => match action {
            CatalogAction::List { category } => {
                commands::catalog::list(category.as_deref()).await?;
            }
        },
        Commands::Orders { action } => match action {
            OrdersAction::List { status } => {
                commands::orders::list(status.as_deref()).await?;
            }
        },
    }
    Ok(())
}
