//! CLI administration tool for framelink.
//!
//! Works directly on the configured link file and cache directory, so it can
//! be used while the server is stopped or on a host without HTTP access.
//! A running server picks up link changes on its next request.
//!
//! # Usage
//!
//! ```bash
//! # List all short links
//! cargo run --bin admin -- links list
//!
//! # Show one link
//! cargo run --bin admin -- links show aB3xYz9Q
//!
//! # Delete a link without prompting
//! cargo run --bin admin -- links delete aB3xYz9Q -y
//!
//! # Disk cache usage
//! cargo run --bin admin -- cache stats
//!
//! # Drop every cached screenshot
//! cargo run --bin admin -- cache clear
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `LINKS_FILE`, `CACHE_DIR`, `CACHE_TTL_SECONDS`, and
//! `REDIS_URL` / `REDIS_HOST` when the Redis tier should be cleared too.

use framelink::config::Config;
use framelink::domain::entities::ShortLink;
use framelink::domain::repositories::LinkRepository;
use framelink::infrastructure::cache::{CacheService, DiskCache, RedisCache};
use framelink::infrastructure::persistence::FileLinkRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;

/// CLI tool for managing framelink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage short links
    Links {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Manage the screenshot cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

/// Short link subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// List all short links
    List,

    /// Show details of one link
    Show {
        /// Short id
        short_id: String,
    },

    /// Delete a link
    Delete {
        /// Short id
        short_id: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Cache subcommands.
#[derive(Subcommand)]
enum CacheAction {
    /// Show disk cache usage
    Stats,

    /// Remove every cached screenshot
    Clear {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Links { action } => handle_link_action(action, &config).await?,
        Commands::Cache { action } => handle_cache_action(action, &config).await?,
    }

    Ok(())
}

/// Dispatches short link commands.
async fn handle_link_action(action: LinkAction, config: &Config) -> Result<()> {
    let repo = FileLinkRepository::open(&config.links_file)
        .await
        .with_context(|| format!("Failed to open {}", config.links_file.display()))?;

    match action {
        LinkAction::List => list_links(&repo).await?,
        LinkAction::Show { short_id } => show_link(&repo, &short_id).await?,
        LinkAction::Delete { short_id, yes } => delete_link(&repo, &short_id, yes).await?,
    }

    Ok(())
}

/// Lists all short links, newest first.
///
/// # Output Format
///
/// ```text
/// 🔗 Short Links
///
///   ID        Created            Time    Destination
///   ─────────────────────────────────────────────────────────────────────────
///   aB3xYz9Q  2024-01-15 10:30   1:05    https://vimeo.com/76979871
/// ```
async fn list_links(repo: &FileLinkRepository) -> Result<()> {
    println!("{}", "🔗 Short Links".bright_blue().bold());
    println!();

    let links = repo
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        println!();
        println!("  Create one with: {} /shorten?url=...", "POST".bright_cyan());
        return Ok(());
    }

    println!(
        "  {:<9} {:<18} {:<7} {}",
        "ID".bright_white().bold(),
        "Created".bright_white().bold(),
        "Time".bright_white().bold(),
        "Destination".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in &links {
        println!(
            "  {:<9} {:<18} {:<7} {}",
            link.short_id.cyan(),
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            format_timestamp(link.timestamp),
            truncate(&link.destination_url, 60)
        );
    }

    println!();
    println!("  Total: {}", links.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

async fn show_link(repo: &FileLinkRepository, short_id: &str) -> Result<()> {
    let link = find_link(repo, short_id).await?;

    println!("{}", "🔗 Short Link".bright_blue().bold());
    println!();
    print_link_details(&link);
    println!();

    Ok(())
}

/// Deletes a link after confirmation (default: No).
///
/// The cached screenshot is left alone; other links or direct
/// `/screenshot` requests may share it.
async fn delete_link(repo: &FileLinkRepository, short_id: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑️  Delete Short Link".bright_blue().bold());
    println!();

    let link = find_link(repo, short_id).await?;
    print_link_details(&link);
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    repo.delete(short_id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    println!();
    println!("{}", "✅ Link deleted".green().bold());
    println!();

    Ok(())
}

async fn find_link(repo: &FileLinkRepository, short_id: &str) -> Result<ShortLink> {
    repo.find_by_id(short_id)
        .await
        .map_err(|e| anyhow::anyhow!("Link store error: {}", e))?
        .with_context(|| format!("Link '{}' not found", short_id))
}

fn print_link_details(link: &ShortLink) {
    println!("  ID:          {}", link.short_id.cyan());
    println!("  Title:       {}", link.metadata.title.bright_white());
    if let Some(site) = &link.metadata.site_name {
        println!("  Site:        {}", site);
    }
    println!("  Destination: {}", link.destination_url);
    println!("  Redirect:    {}", link.redirect_url().bright_black());
    println!("  Timestamp:   {}", format_timestamp(link.timestamp));
    println!("  Viewport:    {}x{}", link.width, link.height);
    println!("  Clicks:      {}", link.clicks.to_string().bright_green());
    println!(
        "  Screenshot:  {}",
        link.screenshot_key.as_str().bright_black()
    );
    println!(
        "  Created:     {}",
        link.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

/// Dispatches cache commands.
async fn handle_cache_action(action: CacheAction, config: &Config) -> Result<()> {
    let disk = DiskCache::open(&config.cache_dir, config.cache_ttl())
        .await
        .with_context(|| format!("Failed to open {}", config.cache_dir.display()))?;

    match action {
        CacheAction::Stats => cache_stats(&disk).await?,
        CacheAction::Clear { yes } => clear_cache(&disk, config, yes).await?,
    }

    Ok(())
}

async fn cache_stats(disk: &DiskCache) -> Result<()> {
    println!("{}", "📊 Disk Cache".bright_blue().bold());
    println!();

    let stats = disk
        .stats()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read cache directory: {}", e))?;

    println!("  Directory: {}", disk.dir().display().to_string().bright_white());
    println!("  TTL:       {}s", disk.ttl().as_secs());
    println!(
        "  Entries:   {}",
        stats.entries.to_string().bright_green().bold()
    );
    println!(
        "  Expired:   {}",
        stats.expired.to_string().yellow().bold()
    );
    println!(
        "  Size:      {}",
        format_bytes(stats.total_bytes).bright_green().bold()
    );
    println!();

    Ok(())
}

/// Clears the disk tier, and Redis when it is configured and reachable.
async fn clear_cache(disk: &DiskCache, config: &Config, skip_confirm: bool) -> Result<()> {
    println!("{}", "🧹 Clear Screenshot Cache".bright_blue().bold());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Remove every cached screenshot?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let removed = disk
        .clear()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to clear disk cache: {}", e))?;
    println!(
        "  Disk:  {} entries removed",
        removed.to_string().bright_green().bold()
    );

    if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl()).await {
            Ok(redis) => {
                let removed = redis
                    .clear()
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to clear Redis: {}", e))?;
                println!(
                    "  Redis: {} entries removed",
                    removed.to_string().bright_green().bold()
                );
            }
            Err(e) => {
                println!("{}", format!("⚠️  Redis unreachable, skipped: {}", e).yellow());
            }
        }
    }

    println!();
    println!("{}", "✅ Cache cleared".green().bold());
    println!();

    Ok(())
}

/// Formats seconds as `m:ss`.
fn format_timestamp(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let head: String = s.chars().take(max_chars - 1).collect();
    format!("{head}…")
}
