//! Default-shaped failure bodies.
//!
//! Failures are reported in the body, with HTTP 200, so that clients can
//! render the usual shape and check for an `error` field.

use axum::Json;
use serde_json::{json, Value};

use crate::instance::Summary;

pub fn error(message: &str) -> Json<Value> {
    Json(json!({ "error": message }))
}

pub fn listing(message: &str) -> Json<Value> {
    Json(json!({
        "error": message,
        "molts": [],
        "summary": Summary::default(),
    }))
}

pub fn health(message: &str) -> Json<Value> {
    Json(json!({ "error": message, "status": "unknown" }))
}

pub fn history(message: &str) -> Json<Value> {
    Json(json!({
        "error": message,
        "entries": [],
        "count": 0,
        "uptime_percent": 0,
    }))
}

pub fn watch_state(message: &str) -> Json<Value> {
    Json(json!({
        "error": message,
        "consecutive_failures": 0,
        "alert_sent": false,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_has_zeroed_summary() {
        let Json(body) = listing("boom");
        assert_eq!(body["error"], "boom");
        assert_eq!(body["molts"], json!([]));
        assert_eq!(body["summary"], json!({"total": 0, "running": 0, "stopped": 0}));
    }

    #[test]
    fn history_is_empty_and_zero() {
        let Json(body) = history("boom");
        assert_eq!(body["count"], 0);
        assert_eq!(body["uptime_percent"], 0);
        assert_eq!(body["entries"], json!([]));
    }
}
