//! Catalog records: games, genres, platforms, and the game <-> platform join.

use crate::domain::validation::ValidationErrors;
use serde_json::{Map, Value as JsonValue};

pub mod game;
pub mod genre;
pub mod platform;

pub use game::{Game, GameDetail, GameDraft};
pub use genre::{Genre, GenreDetail, GenreDraft};
pub use platform::{GamePlatform, Platform, PlatformDetail, PlatformDraft};

/// Reads an id that passed the `integer` rule: JSON integers, integral floats, or numeric strings.
pub fn id_from_json(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.2e18)
                .map(|f| f as i64)
        }),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Text of a validated field. Absent, null and `""` read as `None`.
fn text_field(record: &Map<String, JsonValue>, key: &str) -> Option<String> {
    match record.get(key)? {
        JsonValue::String(s) if s.is_empty() => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// [`text_field`] for fields that must be scalars. An array or object is recorded as a type error
/// under `key` and reads as `None`.
fn scalar_field(
    record: &Map<String, JsonValue>,
    key: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    if matches!(record.get(key), Some(JsonValue::Array(_) | JsonValue::Object(_))) {
        errors.add(key, format!("The {} must be a string.", key));
        return None;
    }
    text_field(record, key)
}

/// Ids of a validated array field, deduplicated in first-seen order. Objects contribute their
/// values, the same way the rule engine sees them.
fn id_list_field(record: &Map<String, JsonValue>, key: &str) -> Vec<i64> {
    let items: Vec<&JsonValue> = match record.get(key) {
        Some(JsonValue::Array(items)) => items.iter().collect(),
        Some(JsonValue::Object(map)) => map.values().collect(),
        _ => Vec::new(),
    };
    let mut ids: Vec<i64> = Vec::new();
    for id in items.into_iter().filter_map(id_from_json) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}
