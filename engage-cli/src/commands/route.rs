use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde_json::Map;

use engage_core::routing::DEFAULT_ACTION_IDENTIFIER;
use engage_core::subscription::PermissionState;

use super::{Context, read_payload};
use crate::output::{emit, route_line};

/// Arguments for `engage route`
#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Notification category
    #[arg(long)]
    pub category: String,

    /// Action identifier; omit for a default tap
    #[arg(long, default_value = DEFAULT_ACTION_IDENTIFIER)]
    pub action: String,

    /// Notification payload file, or `-` for stdin
    #[arg(long)]
    pub payload: Option<PathBuf>,
}

/// Handle a notification response and print the outcome
pub async fn run(ctx: &Context, args: RouteArgs) -> Result<()> {
    let payload = match &args.payload {
        Some(path) => read_payload(path)?,
        None => Map::new(),
    };

    let outcome = ctx
        .engage(PermissionState::NotDetermined)
        .handle_notification_response(&args.category, &args.action, &payload)
        .await;
    emit(&route_line(&outcome));
    Ok(())
}
