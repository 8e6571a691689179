//! Normalization of remote response payloads.

use log::warn;

use crate::model::records_from_json;
use crate::query::SourcePage;

/// Normalizes a remote payload into a [`SourcePage`].
///
/// A bare array is the full item set with no total. An object with an
/// `items` array is an envelope whose `pagination.total` (if numeric) is
/// propagated. Any other shape yields an empty page and a warning.
/// Non-object array elements are dropped with a warning.
pub fn normalize_response(body: serde_json::Value) -> SourcePage {
    match body {
        serde_json::Value::Array(items) => SourcePage::new(collect(items)),
        serde_json::Value::Object(mut envelope) => {
            let total = envelope
                .get("pagination")
                .and_then(|p| p.get("total"))
                .and_then(serde_json::Value::as_u64)
                .and_then(|t| usize::try_from(t).ok());
            match envelope.remove("items") {
                Some(serde_json::Value::Array(items)) => {
                    let page = SourcePage::new(collect(items));
                    match total {
                        Some(total) => page.with_total(total),
                        None => page,
                    }
                }
                _ => {
                    warn!("Unexpected response shape: object without an items array");
                    SourcePage::default()
                }
            }
        }
        other => {
            warn!("Unexpected response shape: {}", json_kind(&other));
            SourcePage::default()
        }
    }
}

fn collect(items: Vec<serde_json::Value>) -> Vec<crate::model::Record> {
    let (records, skipped) = records_from_json(items);
    if skipped > 0 {
        warn!("Skipped {} non-object items in response", skipped);
    }
    records
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
