//! pricewise: recommend a price from an item's candidate grid.
//!
//! Loads the trained artifact bundle once, then scores every grid price
//! for the requested item and context with the demand model plus an
//! optional exploration bonus, subject to a min-margin guardrail.

mod app;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use common::{Context, DecisionRequest, Weekday};
use tracing::error;

use app::{App, Rendered};
use config::AppConfig;

#[derive(Parser)]
#[command(name = "pricewise", about = "Dynamic price recommendation over a discrete grid")]
struct Cli {
    /// Path to config.toml (defaults to ./config.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recommend a price for one item and context.
    Recommend {
        /// Catalog item identifier, e.g. FOODS_1_001.
        #[arg(long)]
        item: Option<String>,

        #[arg(long, default_value = "Friday")]
        weekday: Weekday,

        #[arg(long, default_value_t = 11, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,

        /// Holiday or event day.
        #[arg(long)]
        event: bool,

        /// Minimum price floor, e.g. 7.50.
        #[arg(long)]
        min_margin: Option<String>,

        /// Disable the exploration bonus.
        #[arg(long)]
        no_explore: bool,
    },

    /// List items with a usable price grid.
    Items {
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pricewise=info,decision_engine=info,demand_model=info".into()
            }),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let app = App::new(config)?;

    match cli.command {
        Command::Items { limit } => {
            for item in app.usable_items(limit) {
                println!("{}", item);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Recommend {
            item,
            weekday,
            month,
            event,
            min_margin,
            no_explore,
        } => {
            let request = DecisionRequest {
                item_id: item,
                context: Context::new(weekday, month, event)?,
                min_margin,
                explore: !no_explore,
            };

            match app.recommend(&request) {
                Rendered::Priced {
                    envelope,
                    note,
                    summary,
                } => {
                    println!("{}", serde_json::to_string_pretty(&envelope)?);
                    eprintln!("{}", note);
                    eprintln!("{}", summary);
                    Ok(ExitCode::SUCCESS)
                }
                Rendered::Rejected(rejection) => {
                    eprintln!("{}", rejection.message());
                    Ok(ExitCode::from(2))
                }
            }
        }
    }
}
