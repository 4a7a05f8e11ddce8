//! Schema validation helpers for Engram JSON5 configuration.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Check one document against the schema and return its top-level object.
///
/// Every key is optional, so a partial layer and a full config pass the same
/// checks.
pub(super) fn validate_document(
    value: Value,
    layer: &str,
) -> Result<Map<String, Value>, ConfigError> {
    let Value::Object(map) = value else {
        return Err(invalid_field(layer, "", "expected object"));
    };
    validate_sections(&map, layer)?;
    Ok(map)
}

fn validate_sections(map: &Map<String, Value>, layer: &str) -> Result<(), ConfigError> {
    let allowed = ["$schema", "memory", "embedder", "index", "segmenter"];
    ensure_allowed_keys(map, &allowed, layer, "")?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("memory") {
        validate_memory(value, layer, "memory")?;
    }
    if let Some(value) = map.get("embedder") {
        validate_embedder(value, layer, "embedder")?;
    }
    if let Some(value) = map.get("index") {
        validate_index(value, layer, "index")?;
    }
    if let Some(value) = map.get("segmenter") {
        validate_segmenter(value, layer, "segmenter")?;
    }

    Ok(())
}

/// Validate the "memory" block.
fn validate_memory(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let allowed = [
        "agent_name",
        "collection_number",
        "chunk_size",
        "recall_limit",
        "min_relevance_score",
    ];
    ensure_allowed_keys(map, &allowed, layer, path)?;

    if let Some(value) = map.get("agent_name") {
        expect_string(value, layer, &join_path(path, "agent_name"))?;
    }
    for key in ["collection_number", "chunk_size", "recall_limit"] {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("min_relevance_score") {
        expect_f64(value, layer, &join_path(path, "min_relevance_score"))?;
    }
    Ok(())
}

/// Validate the "embedder" block.
fn validate_embedder(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let allowed = ["provider", "dimensions", "model", "base_url", "api_key_env"];
    ensure_allowed_keys(map, &allowed, layer, path)?;

    if let Some(value) = map.get("provider") {
        validate_embedder_provider(value, layer, &join_path(path, "provider"))?;
    }
    if let Some(value) = map.get("dimensions") {
        expect_u64(value, layer, &join_path(path, "dimensions"))?;
    }
    for key in ["model", "base_url", "api_key_env"] {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    Ok(())
}

/// Validate an embedder provider name.
fn validate_embedder_provider(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let Some(provider) = value.as_str() else {
        return Err(invalid_field(layer, path, "expected string"));
    };
    if matches!(provider, "hashing" | "openai") {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "invalid embedder provider"))
    }
}

/// Validate the "index" block.
fn validate_index(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["provider", "path"], layer, path)?;

    if let Some(value) = map.get("provider") {
        let provider_path = join_path(path, "provider");
        let Some(provider) = value.as_str() else {
            return Err(invalid_field(layer, &provider_path, "expected string"));
        };
        if !matches!(provider, "memory" | "file") {
            return Err(invalid_field(
                layer,
                &provider_path,
                "invalid index provider",
            ));
        }
    }
    if let Some(value) = map.get("path") {
        expect_string(value, layer, &join_path(path, "path"))?;
    }
    Ok(())
}

/// Validate the "segmenter" block.
fn validate_segmenter(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["lexicon"], layer, path)?;

    if let Some(value) = map.get("lexicon") {
        expect_string(value, layer, &join_path(path, "lexicon"))?;
    }
    Ok(())
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

/// Expect a JSON string or return a typed error.
fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.as_str().is_some() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

/// Expect a non-negative JSON integer or return a typed error.
fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

/// Expect a JSON number or return a typed error.
fn expect_f64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_f64() || value.is_u64() || value.is_i64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected number"))
    }
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_field(layer, &join_path(path, key), "unknown key"));
        }
    }
    Ok(())
}

/// Join nested paths for better error messages.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-field error.
fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}
