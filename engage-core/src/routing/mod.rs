//! Inbound notification routing

mod action;
mod router;

pub use action::{ActionIdentifier, ActionKind, DEFAULT_ACTION_IDENTIFIER};
pub use router::{ActionRouter, CUSTOM_ACTION_KEY, DEEP_LINK_KEY, OpenSignal, RouteOutcome};
