use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cart_shame::config::Settings;
use cart_shame::page::{FilePageSource, HttpPageSource};
use cart_shame::traits::PageSource;
use cart_shame::watcher::{ContentPoller, mutation_channel};
use cart_shame::{CartReport, CartShame};

#[derive(Parser)]
#[command(name = "cart-shame", version, about = "How many hours of work is that cart?")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look at a page once and report its cart total
    Detect {
        /// Page URL; also the hostname used for site overrides
        url: String,
        /// Read the markup from this file instead of fetching the URL
        #[arg(long)]
        file: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Keep re-checking a cart page and report every change
    Watch {
        url: String,
    },
}

fn print_report(report: &CartReport) {
    match (report.total, report.hours, &report.message) {
        (Some(total), Some(hours), Some(message)) => {
            println!("{message}");
            println!(
                "  total ${total:.2} ({hours:.1} h) via {}",
                report.provenance.as_deref().unwrap_or("unknown")
            );
        }
        _ if !report.is_cart_page => println!("{} is not a cart page", report.site),
        _ => println!("No cart total detected on {}", report.site),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    let app = CartShame::new(settings);

    match cli.command {
        Command::Detect { url, file, json } => {
            let source: Box<dyn PageSource> = match file {
                Some(path) => Box::new(FilePageSource::new(path, url)),
                None => Box::new(HttpPageSource::new(url)?),
            };

            let page = source.snapshot().await?;
            let report = app.inspect(&page);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Command::Watch { url } => {
            let source = Arc::new(HttpPageSource::new(url)?);

            let page = source.snapshot().await?;
            let report = app.inspect(&page);
            print_report(&report);
            if !report.is_cart_page {
                return Ok(());
            }
            if let Some(total) = report.total {
                app.track(&report.site, total);
            }

            let (tx, rx) = mutation_channel();
            let handle = app.watch(&report, source.clone(), rx, |total, hours| {
                println!("Cart updated: ${total:.2} ({hours:.1} h)");
            });

            let poller = ContentPoller::with_baseline(source.clone(), tx, &page);
            let mut sched = poller.start(&app.settings().poll_schedule).await?;

            info!("Watching {} - press Ctrl-C to stop", source.url());
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
            }

            handle.unsubscribe();
            sched.shutdown().await?;

            let ledger = app.ledger();
            let weekly = ledger
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .take_weekly_report();
            println!("{}", weekly.summary());
        }
    }

    Ok(())
}
