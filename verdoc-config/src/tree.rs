// Case-insensitive configuration value tree

use serde_json::{Map, Value};

/// Canonical form of a configuration key.
///
/// Keys compare equal ignoring ASCII case and `_`/`-` separators, so
/// `AuthorizationEnabled`, `authorization_enabled` and `AUTHORIZATIONENABLED`
/// address the same entry.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn existing_key(map: &Map<String, Value>, key: &str) -> Option<String> {
    let wanted = normalize_key(key);
    map.keys().find(|k| normalize_key(k) == wanted).cloned()
}

/// Look up a value by section path
pub fn get_path<'a>(map: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let key = existing_key(map, first)?;
    let value = map.get(&key)?;

    if rest.is_empty() {
        return Some(value);
    }
    match value {
        Value::Object(child) => get_path(child, rest),
        _ => None,
    }
}

/// Set a value by section path, creating intermediate sections.
///
/// A scalar in the way of a nested key is replaced by a section.
pub fn set_path(map: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };
    let key = existing_key(map, first).unwrap_or_else(|| first.to_string());

    if rest.is_empty() {
        map.insert(key, value);
        return;
    }

    let entry = map
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(child) = entry {
        set_path(child, rest, value);
    }
}

/// Deep-merge `source` into `target`; `source` wins on conflicts
pub fn merge(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        let existing = existing_key(target, key);
        if let (Some(k), Value::Object(source_child)) = (&existing, value) {
            if let Some(Value::Object(target_child)) = target.get_mut(k) {
                merge(target_child, source_child);
                continue;
            }
        }
        target.insert(existing.unwrap_or_else(|| key.clone()), value.clone());
    }
}

/// Copy of `value` with every object key normalized
pub fn normalized(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (normalize_key(k), normalized(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(normalized).collect()),
        other => other.clone(),
    }
}

/// Copy of `value` with string scalars parsed as booleans or numbers
/// where they read as one. Environment sources only produce strings.
pub fn coerce_scalars(value: &Value) -> Value {
    match value {
        Value::String(s) => coerce_str(s),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), coerce_scalars(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(coerce_scalars).collect()),
        other => other.clone(),
    }
}

fn coerce_str(s: &str) -> Value {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::from(n);
    }
    if let Some(n) = trimmed
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
    {
        return Value::Number(n);
    }
    Value::String(s.to_string())
}
