//! Event tracking commands

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use engage_core::subscription::PermissionState;

use super::{Context, parse_object, read_payload};

/// Arguments for `engage track`
#[derive(Args, Debug)]
pub struct TrackArgs {
    /// Event name
    pub name: String,

    /// Event properties as a JSON object
    #[arg(long, default_value = "{}")]
    pub properties: String,
}

/// Arguments for `engage deliver`
#[derive(Args, Debug)]
pub struct DeliverArgs {
    /// Notification payload file, or `-` for stdin
    #[arg(long)]
    pub payload: PathBuf,

    /// Treat the notification as the one that launched the app
    #[arg(long)]
    pub launch: bool,
}

/// Track an arbitrary event through enrichment
pub async fn track(ctx: &Context, args: TrackArgs) -> Result<()> {
    let properties = parse_object(&args.properties)?;
    ctx.engage(PermissionState::NotDetermined)
        .track(&args.name, properties)
        .await;
    Ok(())
}

/// Report a notification delivered to the app
pub async fn deliver(ctx: &Context, args: DeliverArgs) -> Result<()> {
    let payload = read_payload(&args.payload)?;
    let engage = ctx.engage(PermissionState::NotDetermined);
    if args.launch {
        engage.did_finish_launching(Some(&payload)).await;
    } else {
        engage.received_remote_notification(&payload).await;
    }
    Ok(())
}
