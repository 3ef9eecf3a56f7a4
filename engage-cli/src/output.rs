//! Everything the CLI reports goes to stdout as one JSON object per line.
//! Logs go to stderr.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::info;
use url::Url;

use engage_core::extension::{CategorySink, NotificationCategory};
use engage_core::{EventSink, PushHost, RawEvent, RouteOutcome};

/// Print a JSON value as a single line
pub fn emit(value: &Value) {
    println!("{}", value);
}

/// JSON line describing a routing outcome
pub fn route_line(outcome: &RouteOutcome) -> Value {
    match outcome {
        RouteOutcome::NoOp => json!({"outcome": "no_op"}),
        RouteOutcome::OpenedUrl(url) => json!({"outcome": "opened_url", "url": url.as_str()}),
        RouteOutcome::Open(signal) => json!({"outcome": "open", "signal": signal}),
    }
}

/// EventSink that prints every dispatched event
pub struct JsonLinesSink;

#[async_trait]
impl EventSink for JsonLinesSink {
    async fn dispatch(&self, event: RawEvent) {
        match serde_json::to_value(&event) {
            Ok(value) => emit(&value),
            Err(e) => tracing::warn!("Failed to serialize event: {}", e),
        }
    }
}

/// Host that reports platform requests instead of performing them
pub struct CliHost;

impl PushHost for CliHost {
    fn register_for_remote_notifications(&self) {
        info!("Registration for remote notifications requested");
        emit(&json!({"type": "register_for_remote_notifications"}));
    }

    fn open_url(&self, url: &Url) {
        emit(&json!({"type": "open_url", "url": url.as_str()}));
    }
}

/// CategorySink that prints the registered categories
pub struct JsonCategorySink;

impl CategorySink for JsonCategorySink {
    fn set_categories(&self, categories: &[NotificationCategory]) {
        emit(&json!({"type": "categories", "categories": categories}));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engage_core::OpenSignal;
    use serde_json::Map;

    #[test]
    fn route_lines() {
        assert_eq!(route_line(&RouteOutcome::NoOp), json!({"outcome": "no_op"}));

        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(
            route_line(&RouteOutcome::OpenedUrl(url)),
            json!({"outcome": "opened_url", "url": "https://example.com/"})
        );

        let signal = OpenSignal::merged("deep_link", "app://x", &Map::new());
        assert_eq!(
            route_line(&RouteOutcome::Open(signal)),
            json!({"outcome": "open", "signal": {"deep_link": "app://x"}})
        );
    }
}
