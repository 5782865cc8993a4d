use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use trustcheck::config::Config;
use trustcheck::output::{jsonl, terminal};
use trustcheck::pipeline::analyze;
use trustcheck::web::AppState;

/// trustcheck: misinformation screening for Facebook posts.
///
/// Fetches recent posts from a Facebook account and asks a hosted Gemini
/// classifier whether each one is Trustworthy or Misinformation.
#[derive(Parser)]
#[command(name = "trustcheck", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve GET /analyze over HTTP
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "5000")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Run one analysis now and print the results
    Analyze,

    /// Show which configuration values are set
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("trustcheck=info,tower_http=info")
            }),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Serve { port, bind } => {
            trustcheck::web::run_server(config, port, &bind).await?;
        }

        Commands::Analyze => {
            let state = AppState::from_config(config)?;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("  {spinner} {msg} ({elapsed})")?,
            );
            spinner.set_message("Fetching and classifying posts...");
            spinner.enable_steady_tick(Duration::from_millis(120));

            let outcome = analyze::run(
                state.factory.as_ref(),
                state.source.as_ref(),
                state.config.post_limit,
            )
            .await;
            spinner.finish_and_clear();

            let batch = outcome?;
            terminal::display_batch(&batch);

            if batch.is_sample() {
                println!(
                    "\n{}",
                    "No posts were retrieved; showing sample data. Check FB_USER_ID and FB_ACCESS_TOKEN."
                        .dimmed()
                );
            } else if let Some(path) = jsonl::save_batch(&state.config.output_dir, &batch.results) {
                info!(path = %path.display(), "Results written");
                println!("\nResults saved to {}", path.display());
            }
        }

        Commands::Status => {
            println!("trustcheck configuration:\n");
            trustcheck::status::show(&config);
        }
    }

    Ok(())
}
