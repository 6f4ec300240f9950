//! jobscout - job opportunity search service and CLI.
//!
//! `serve` runs the HTTP API and the daily scheduler; the other commands run
//! a single step of the pipeline and print the invocation counters.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use jobscout::pipeline::Pipeline;
use jobscout::server::config::{Config, Secrets};
use jobscout::server::{AppState, build_pipeline, router, start_scheduler};
use jobscout::{JobscoutError, MetricsSnapshot};

/// International job opportunity search service.
#[derive(Parser)]
#[command(name = "jobscout")]
#[command(version = jobscout::PKG_VERSION)]
#[command(about = "Search, summarize and email international job opportunities")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "JOBSCOUT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API and the daily scheduler
    Serve,

    /// Run the scheduled job once: search, extract, dedupe, store, email
    RunOnce,

    /// Search and have the agent analyze the results (no storage, no email)
    Search {
        /// Search query
        query: String,
    },

    /// Show condensed search results without calling the agent
    Preview {
        /// Search query (default: the configured query)
        query: Option<String>,
    },

    /// Send raw text to the agent
    Invoke {
        /// Text to send
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    // Initialise tracing (default: info; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;
    let secrets = Secrets::load()?;
    let pipeline = build_pipeline(&config, &secrets).await?;

    match args.command {
        Command::Serve => serve(&config, pipeline).await?,

        Command::RunOnce => {
            let report = pipeline.run_scheduled().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            print_metrics(&pipeline);
        }

        Command::Search { query } => {
            let response = pipeline.analyze(&query).await?;
            println!("{}", response.output);
            print_metrics(&pipeline);
        }

        Command::Preview { query } => {
            let settings = pipeline.settings();
            let query = query.unwrap_or_else(|| settings.query.clone());
            let results = pipeline.preview(&query, settings.max_results).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
            print_metrics(&pipeline);
        }

        Command::Invoke { text } => {
            let response = pipeline.gateway().invoke(text).await?;
            println!("{}", response.output);
            print_metrics(&pipeline);
        }
    }

    Ok(())
}

async fn serve(config: &Config, pipeline: Arc<Pipeline>) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = config
        .server
        .address
        .parse()
        .map_err(|e| JobscoutError::Configuration(format!("Invalid address: {e}")))?;

    let mut scheduler = if config.schedule.enabled {
        Some(start_scheduler(pipeline.clone(), &config.schedule.cron).await?)
    } else {
        info!("scheduler disabled");
        None
    };

    let build = jobscout::BuildInfo::current();
    info!(
        version = %build,
        built_at = build.built_at,
        features = ?build.features,
        %addr,
        "jobscout starting"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(AppState { pipeline }))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
        })
        .await?;

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }
    Ok(())
}

fn print_metrics(pipeline: &Pipeline) {
    let snapshot: MetricsSnapshot = pipeline.gateway().metrics();
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => eprintln!("metrics: {json}"),
        Err(e) => eprintln!("metrics unavailable: {e}"),
    }
}
