//! CLI administration tool for clicktrail.
//!
//! Inspects links and recorded clicks directly in the database, without
//! going through the HTTP service.
//!
//! # Usage
//!
//! ```bash
//! # Check database connection
//! cargo run --bin clicktrail-admin -- db check
//!
//! # Show a link with its attribution metadata
//! cargo run --bin clicktrail-admin -- link show abc123
//!
//! # Show the 20 most recent clicks on a link
//! cargo run --bin clicktrail-admin -- link clicks abc123 --limit 20
//!
//! # Totals
//! cargo run --bin clicktrail-admin -- stats
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use clicktrail::domain::entities::{Click, Link};
use clicktrail::domain::repositories::{ClickRepository, LinkRepository};
use clicktrail::infrastructure::persistence::{PgClickRepository, PgLinkRepository};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for inspecting clicktrail data.
#[derive(Parser)]
#[command(name = "clicktrail-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Inspect links and their clicks
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link inspection subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Show link destination, attribution metadata and click counter
    Show {
        /// Short code
        code: String,
    },

    /// List recent click events for a link
    Clicks {
        /// Short code
        code: String,

        /// Maximum number of clicks to show
        #[arg(short, long, default_value_t = 20)]
        limit: i64,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches link inspection commands.
async fn handle_link_action(action: LinkAction, pool: &PgPool) -> Result<()> {
    let pool = Arc::new(pool.clone());
    let links = PgLinkRepository::new(pool.clone());

    match action {
        LinkAction::Show { code } => {
            let link = find_link(&links, &code).await?;
            show_link(&link);
        }
        LinkAction::Clicks { code, limit } => {
            let link = find_link(&links, &code).await?;
            let clicks = PgClickRepository::new(pool)
                .list_recent(link.id, limit.max(1))
                .await
                .map_err(|e| anyhow::anyhow!("Failed to list clicks: {}", e))?;
            list_clicks(&link, &clicks);
        }
    }

    Ok(())
}

async fn find_link(links: &PgLinkRepository, code: &str) -> Result<Link> {
    links
        .find_by_code(code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .with_context(|| format!("Link '{}' not found", code))
}

/// Prints one link with its attribution metadata.
///
/// # Output Format
///
/// ```text
/// 🔗 Link abc123
///
///   Destination:  https://dest.example/page
///   Owner:        team-growth
///   Campaign:     spring-launch
///   UTM:          source=newsletter medium=email
///   Clicks:       42
///   Last click:   2025-03-01 12:30:05
///   Created:      2025-02-20 09:00:00
/// ```
fn show_link(link: &Link) {
    println!("{} {}", "🔗 Link".bright_blue().bold(), link.code.cyan());
    println!();
    println!("  Destination:  {}", link.destination_url.bright_white());
    println!("  Owner:        {}", or_dash(link.owner_id.as_deref()));
    println!("  Campaign:     {}", or_dash(link.campaign_id.as_deref()));

    if link.utm.is_empty() {
        println!("  UTM:          {}", "-".bright_black());
    } else {
        let utm = [
            ("source", &link.utm.source),
            ("medium", &link.utm.medium),
            ("campaign", &link.utm.campaign),
            ("term", &link.utm.term),
            ("content", &link.utm.content),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| format!("{}={}", key, v)))
        .collect::<Vec<_>>()
        .join(" ");
        println!("  UTM:          {}", utm.cyan());
    }

    println!(
        "  Clicks:       {}",
        link.click_count.to_string().bright_green().bold()
    );
    println!(
        "  Last click:   {}",
        link.last_clicked_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string())
            .bright_black()
    );
    println!(
        "  Created:      {}",
        link.created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .bright_black()
    );
    println!();
}

/// Prints recent clicks, newest first.
///
/// Unenriched clicks show `pending` in the location and device columns.
fn list_clicks(link: &Link, clicks: &[Click]) {
    println!(
        "{} {}",
        "📋 Recent clicks for".bright_blue().bold(),
        link.code.cyan()
    );
    println!();

    if clicks.is_empty() {
        println!("{}", "  No clicks recorded".yellow());
        println!();
        return;
    }

    println!(
        "  {:<8} {:<20} {:<12} {:<24} {:<24}",
        "ID".bright_white().bold(),
        "Time".bright_white().bold(),
        "Visitor".bright_white().bold(),
        "Location".bright_white().bold(),
        "Device".bright_white().bold()
    );
    println!("  {}", "─".repeat(90).bright_black());

    for click in clicks {
        let (location, device) = match &click.enrichment {
            Some(e) => {
                let location = [&e.country_code, &e.region, &e.city]
                    .into_iter()
                    .filter_map(|v| v.as_deref())
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut device = [&e.browser, &e.os, &e.device_category]
                    .into_iter()
                    .filter_map(|v| v.as_deref())
                    .collect::<Vec<_>>()
                    .join(" / ");
                if e.is_bot {
                    device.push_str(" [bot]");
                }
                (location, device)
            }
            None => ("pending".to_string(), "pending".to_string()),
        };

        println!(
            "  {:<8} {:<20} {:<12} {:<24} {}",
            click.id.to_string().bright_black(),
            click.clicked_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            click.visitor_id.chars().take(10).collect::<String>().cyan(),
            location,
            device
        );
    }

    println!();
    println!(
        "  Shown: {}",
        clicks.len().to_string().bright_white().bold()
    );
    println!();
}

fn or_dash(value: Option<&str>) -> ColoredString {
    match value {
        Some(v) => v.cyan(),
        None => "-".bright_black(),
    }
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of links
/// - Total number of clicks
/// - Clicks still waiting for enrichment
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(pool)
        .await?;

    let clicks_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks")
        .fetch_one(pool)
        .await?;

    let pending_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks WHERE enriched_at IS NULL")
            .fetch_one(pool)
            .await?;

    println!(
        "  Links:              {}",
        links_count.to_string().bright_green().bold()
    );
    println!(
        "  Clicks:             {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!(
        "  Pending enrichment: {}",
        pending_count.to_string().bright_yellow().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
