//! Push subscription state machine

mod manager;
mod status;

pub use manager::{StatusCallback, SubscriptionManager};
pub(crate) use manager::{load_device_token, load_status};
pub use status::{DeviceToken, PermissionState, StatusTransition, SubscriptionStatus};
