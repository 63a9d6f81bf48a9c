//! Goalboard
//!
//! Run the goal tracker server, or drive a tracker from the terminal against
//! the configured document store.

use anyhow::Context;
use clap::{Parser, Subcommand};
use goalboard::api::{serve, AppState};
use goalboard::auth::LocalAuthProvider;
use goalboard::config::{generate_default_config, Config, LoggingConfig};
use goalboard::progress::DocumentProgressStore;
use goalboard::store::Database;
use goalboard::tracker::{self, Completion};
use goalboard::view::{tick_label, RenderedView};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "goalboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Track completion of a fixed set of goals")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: search the usual locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP and WebSocket server
    Serve,

    /// Print the objective list and chart
    Show {
        /// Custom token to sign in with (default: auth.initial_auth_token, else anonymous)
        #[arg(short, long)]
        token: Option<String>,
        /// Keep printing after every change
        #[arg(short, long)]
        follow: bool,
    },

    /// Mark an objective complete
    Complete {
        /// Objective id, e.g. goal_listen
        goal_id: String,
        /// Custom token to sign in with (default: auth.initial_auth_token, else anonymous)
        #[arg(short, long)]
        token: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        return write_default_config(output.as_deref());
    }

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_tracing(&config.logging);

    tracing::info!("Goalboard v{}", env!("CARGO_PKG_VERSION"));

    let database = Database::open(config.storage.backend, Path::new(&config.storage.data_dir))
        .context("Failed to open document store")?;
    tracing::info!(backend = %database.backend(), data_dir = %config.storage.data_dir, "Document store ready");

    let auth = LocalAuthProvider::from_config(&config.auth);

    match cli.command {
        Commands::Serve => {
            let state = AppState::new(database, config.app.app_id.clone(), auth, config.api.clone());
            serve(state, &config.api).await?;
        }
        Commands::Show { token, follow } => {
            let token = token.or_else(|| config.auth.initial_auth_token.clone());
            let store = Arc::new(DocumentProgressStore::new(
                Arc::new(database),
                config.app.app_id.clone(),
            ));

            let Some((mut tracker, mut subscription)) =
                tracker::setup(store, &auth, token.as_deref()).await
            else {
                std::process::exit(1);
            };

            if follow {
                if tracker.run(subscription, print_view).await.is_err() {
                    std::process::exit(1);
                }
            } else {
                match subscription.next().await {
                    Some(Ok(progress)) => print_view(&tracker.apply_snapshot(progress)),
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "Error fetching user progress");
                        std::process::exit(1);
                    }
                    None => {}
                }
            }
        }
        Commands::Complete { goal_id, token } => {
            let token = token.or_else(|| config.auth.initial_auth_token.clone());
            let store = Arc::new(DocumentProgressStore::new(
                Arc::new(database),
                config.app.app_id.clone(),
            ));

            let Some((mut tracker, mut subscription)) =
                tracker::setup(store, &auth, token.as_deref()).await
            else {
                std::process::exit(1);
            };

            // The current state decides whether the objective can still be completed
            match subscription.next().await {
                Some(Ok(progress)) => {
                    tracker.apply_snapshot(progress);
                }
                Some(Err(e)) => {
                    tracing::error!(error = %e, "Error fetching user progress");
                    std::process::exit(1);
                }
                None => {}
            }

            match tracker.complete_goal(&goal_id).await {
                Ok(Completion::Written) => {
                    println!("Goal \"{}\" marked as completed.", goal_id);
                    if let Some(Ok(progress)) = subscription.next().await {
                        print_view(&tracker.apply_snapshot(progress));
                    }
                }
                Ok(Completion::AlreadyCompleted) => {
                    println!("Goal \"{}\" is already completed.", goal_id);
                }
                Err(e) => {
                    tracing::error!(error = %e, goal_id = %goal_id, "Error updating objective");
                    std::process::exit(1);
                }
            }
        }
        Commands::Config { .. } => unreachable!("handled before loading config"),
    }

    Ok(())
}

/// Initialize logging; `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "goalboard={},tower_http=info",
            logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn write_default_config(output: Option<&Path>) -> anyhow::Result<()> {
    let content = generate_default_config();
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote default config to {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Terminal rendering of one snapshot
fn print_view(view: &RenderedView) {
    println!();
    for goal in &view.goals {
        let mark = if goal.completed { "x" } else { " " };
        let when = goal
            .completed_at
            .map(|at| format!(" ({})", at.format("%Y-%m-%d %H:%M")))
            .unwrap_or_default();
        println!("[{}] {:<45} {}{}", mark, goal.text, goal.button_label, when);
    }

    println!();
    println!("{}", view.chart.title);
    for (label, value) in view.chart.data.labels.iter().zip(&view.chart.data.dataset.data) {
        let bar = if *value == 1 { "##########" } else { "" };
        println!("  {:<6} |{:<10}| {}", label, bar, tick_label(*value));
    }
}
