//! Per-instance config file (`port` and webhook `token`).

use std::path::Path;

use serde_yaml::Value;

use super::types::InstanceSettings;
use crate::error::{AppError, Result};

/// Sections searched after the top level, in order.
static SECTIONS: [&str; 3] = ["gateway", "webhook", "hooks"];

fn candidates<'a>(doc: &'a Value, key: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
    std::iter::once(doc.get(key))
        .chain(
            SECTIONS
                .iter()
                .map(move |section| doc.get(*section).and_then(|s| s.get(key))),
        )
        .flatten()
}

fn as_port(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_token(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// First value for `key` anywhere below `doc`, depth first in document order.
fn find_nested<'a, T>(doc: &'a Value, key: &str, pick: fn(&'a Value) -> Option<T>) -> Option<T> {
    match doc {
        Value::Mapping(map) => map.iter().find_map(|(k, v)| {
            let here = if k.as_str() == Some(key) { pick(v) } else { None };
            here.or_else(|| find_nested(v, key, pick))
        }),
        Value::Sequence(items) => items.iter().find_map(|v| find_nested(v, key, pick)),
        _ => None,
    }
}

/// Parse an instance config. YAML is a superset of JSON, so both formats work.
///
/// Keys are looked up at the top level, then in the known sections, then
/// anywhere else in the document.
pub fn parse_settings(raw: &str) -> Result<InstanceSettings> {
    let doc: Value = serde_yaml::from_str(raw.trim_start_matches('\u{feff}'))?;
    if !doc.is_mapping() {
        return Err(AppError::parse("Instance config is not a mapping"));
    }

    let port = candidates(&doc, "port")
        .find_map(as_port)
        .or_else(|| find_nested(&doc, "port", as_port));
    let token = candidates(&doc, "token")
        .find_map(as_token)
        .or_else(|| find_nested(&doc, "token", as_token));
    Ok(InstanceSettings { port, token })
}

pub async fn read_instance_settings(path: &Path) -> Result<InstanceSettings> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::io(format!("{}: {}", path.display(), e)))?;
    parse_settings(&raw)
}
