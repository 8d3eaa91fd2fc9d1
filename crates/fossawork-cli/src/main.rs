use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use fossawork_client::backend::FossaworkBackend;
use fossawork_client::geocode::Geocoder;
use fossawork_core::summary::summarize;
use fossawork_core::work_week::{
    Direction, WeekInfo, WorkWeekConfig, compute_week, is_in_week, navigate_week,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "fossawork",
    about = "Inspect FossaWork work orders by logical work week"
)]
struct Cli {
    /// Base URL of the FossaWork backend
    #[arg(long, default_value = "http://localhost:8000")]
    base_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the logical week and a per-day work-order summary
    Week {
        /// Anchor date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        anchor: Option<NaiveDate>,

        /// Shift the shown week by this many weeks (negative for past)
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i32,
    },

    /// List work orders scheduled in the current week
    Orders {
        /// Include orders outside the current week and unscheduled ones
        #[arg(long)]
        all: bool,
    },

    /// Geocode the addresses of the current week's work orders
    Geocode {
        /// Delay between geocoding requests, in milliseconds
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
    },
}

/// Fetch preferences, falling back to the documented default configuration
/// (weekends excluded, no holidays) when the backend is unavailable.
async fn load_config(backend: &FossaworkBackend) -> WorkWeekConfig {
    match backend.fetch_work_week_config().await {
        Ok(config) => config,
        Err(e) => {
            warn!("failed to fetch work-week preferences, using defaults: {e}");
            WorkWeekConfig::default()
        }
    }
}

/// Resolve the week for the anchor date, shifted by `offset` weeks.
fn resolve_week(
    anchor: NaiveDateTime,
    offset: i32,
    config: &WorkWeekConfig,
    now: NaiveDateTime,
) -> WeekInfo {
    let mut week = compute_week(anchor, config, now);
    let direction = if offset < 0 {
        Direction::Prev
    } else {
        Direction::Next
    };
    for _ in 0..offset.unsigned_abs() {
        week = navigate_week(&week, direction, config, now);
    }
    week
}

async fn cmd_week(backend: &FossaworkBackend, anchor: Option<NaiveDate>, offset: i32) -> Result<()> {
    let config = load_config(backend).await;
    let now = Local::now().naive_local();
    let anchor = anchor
        .map(|d| d.and_hms_opt(0, 0, 0).unwrap())
        .unwrap_or(now);

    let week = resolve_week(anchor, offset, &config, now);
    let orders = backend
        .fetch_work_orders()
        .await
        .context("failed to fetch work orders")?;
    let summary = summarize(&orders, &week, &config);

    let marker = if week.is_current_week { " (current)" } else { "" };
    println!("Week {}: {}{marker}", week.week_number, week.display_text);
    for (day, count) in &summary.per_day {
        println!("  {}: {count} order(s)", day.format("%a %b %-d"));
    }
    println!(
        "{} scheduled this week, {} unscheduled",
        summary.scheduled, summary.unscheduled
    );

    Ok(())
}

async fn cmd_orders(backend: &FossaworkBackend, all: bool) -> Result<()> {
    let config = load_config(backend).await;
    let now = Local::now().naive_local();
    let week = compute_week(now, &config, now);

    let orders = backend
        .fetch_work_orders()
        .await
        .context("failed to fetch work orders")?;

    let mut shown = 0;
    for order in &orders {
        let in_week = order
            .scheduled_date
            .map(|d| is_in_week(d, &week, &config))
            .unwrap_or(false);
        if !all && !in_week {
            continue;
        }

        let when = match order.scheduled_date {
            Some(d) => d.format("%Y-%m-%d %H:%M").to_string(),
            None => "unscheduled".to_string(),
        };
        let description = order.description.as_deref().unwrap_or("-");
        let address = order.address.as_deref().unwrap_or("no address");
        println!("{}  {when}  {description}  ({address})", order.id);
        shown += 1;
    }

    if shown == 0 {
        println!("No work orders for week {}.", week.display_text);
    }

    Ok(())
}

async fn cmd_geocode(backend: &FossaworkBackend, delay_ms: u64) -> Result<()> {
    let config = load_config(backend).await;
    let now = Local::now().naive_local();
    let week = compute_week(now, &config, now);

    let orders = backend
        .fetch_work_orders()
        .await
        .context("failed to fetch work orders")?;

    let in_week: Vec<_> = orders
        .into_iter()
        .filter(|o| {
            o.scheduled_date
                .map(|d| is_in_week(d, &week, &config))
                .unwrap_or(false)
        })
        .collect();

    let with_address = in_week.iter().filter(|o| o.address.is_some()).count();
    info!(
        "geocoding {with_address} address(es) for week {}, {delay_ms}ms between requests",
        week.display_text
    );

    let geocoder = Geocoder::new();
    let results = geocoder
        .geocode_orders(&in_week, Duration::from_millis(delay_ms))
        .await;

    for (id, coords) in &results {
        match coords {
            Some(c) => println!("{id}: {:.7}, {:.7}", c.lat, c.lon),
            None => println!("{id}: no match"),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    let backend = FossaworkBackend::new(cli.base_url.clone());

    match &cli.command {
        Commands::Week { anchor, offset } => {
            cmd_week(&backend, *anchor, *offset).await?;
        }
        Commands::Orders { all } => {
            cmd_orders(&backend, *all).await?;
        }
        Commands::Geocode { delay_ms } => {
            cmd_geocode(&backend, *delay_ms).await?;
        }
    }

    Ok(())
}
