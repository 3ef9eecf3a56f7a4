use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod output;

use commands::Context;
use config::ConfigLoader;

#[derive(Parser)]
#[command(name = "engage", about = "Drive push subscription, routing and the service extension")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Shared store document (overrides config)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Use this config file instead of the user and project layers
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the stored subscription status
    Status,
    /// Reconcile the subscription status with a permission state
    Reconcile(commands::subscription::ReconcileArgs),
    /// Report a successful registration with a device token
    Register(commands::subscription::RegisterArgs),
    /// Report a failed registration
    Fail(commands::subscription::FailArgs),
    /// Report that the user declined notifications
    Decline,
    /// Track an event
    Track(commands::events::TrackArgs),
    /// Report a delivered notification
    Deliver(commands::events::DeliverArgs),
    /// Route a notification tap or button press
    Route(commands::route::RouteArgs),
    /// Process a notification as the service extension
    Extension(commands::extension::ExtensionArgs),
    /// Reset the badge count
    ResetBadge,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_path(path)?,
        None => ConfigLoader::load()?,
    };
    let ctx = Context::new(config, cli.store);

    match cli.command {
        Commands::Status => commands::subscription::status(&ctx).await,
        Commands::Reconcile(args) => commands::subscription::reconcile(&ctx, args).await,
        Commands::Register(args) => commands::subscription::register(&ctx, args).await,
        Commands::Fail(args) => commands::subscription::fail(&ctx, args).await,
        Commands::Decline => commands::subscription::decline(&ctx).await,
        Commands::Track(args) => commands::events::track(&ctx, args).await,
        Commands::Deliver(args) => commands::events::deliver(&ctx, args).await,
        Commands::Route(args) => commands::route::run(&ctx, args).await,
        Commands::Extension(args) => commands::extension::run(&ctx, args).await,
        Commands::ResetBadge => commands::extension::reset_badge(&ctx).await,
    }
}
