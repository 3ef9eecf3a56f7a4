//! Subscription status commands

use anyhow::Result;
use clap::Args;
use serde_json::json;

use engage_core::DeviceToken;
use engage_core::subscription::{PermissionState, StatusTransition};

use super::Context;
use crate::output::emit;

/// Arguments for `engage reconcile`
#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Platform authorization state (not_determined, denied, authorized, provisional, ephemeral)
    #[arg(long)]
    pub permission: PermissionState,
}

/// Arguments for `engage register`
#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Device token as a hex string
    pub token: String,
}

/// Arguments for `engage fail`
#[derive(Args, Debug)]
pub struct FailArgs {
    /// Reason reported by the platform
    pub reason: Option<String>,
}

/// Print the persisted status and device token
pub async fn status(ctx: &Context) -> Result<()> {
    let engage = ctx.engage(PermissionState::NotDetermined);
    let token = engage.subscriptions().device_token().await;
    emit(&json!({
        "status": engage.status().await,
        "device_token": token.as_ref().map(DeviceToken::as_str),
    }));
    Ok(())
}

/// Align the stored status with `permission`
pub async fn reconcile(ctx: &Context, args: ReconcileArgs) -> Result<()> {
    let engage = ctx.engage(args.permission);
    let transition = engage.configure().await;
    emit(&transition_line(transition.as_ref()));
    Ok(())
}

pub async fn register(ctx: &Context, args: RegisterArgs) -> Result<()> {
    let engage = ctx.engage(PermissionState::Authorized);
    engage
        .registered_for_remote_notifications(DeviceToken::new(args.token))
        .await;
    Ok(())
}

pub async fn fail(ctx: &Context, args: FailArgs) -> Result<()> {
    let engage = ctx.engage(PermissionState::NotDetermined);
    engage
        .failed_to_register_for_remote_notifications(args.reason.as_deref())
        .await;
    Ok(())
}

pub async fn decline(ctx: &Context) -> Result<()> {
    let engage = ctx.engage(PermissionState::Denied);
    engage.declined_remote_notifications().await;
    Ok(())
}

fn transition_line(transition: Option<&StatusTransition>) -> serde_json::Value {
    match transition {
        Some(t) => json!({"changed": true, "from": t.from, "to": t.to}),
        None => json!({"changed": false}),
    }
}
