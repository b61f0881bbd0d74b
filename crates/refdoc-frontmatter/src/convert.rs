//! Conversion from parsed YAML to JSON-compatible metadata values.

use serde_json::{Number, Value};
use yaml_rust2::{Yaml, YamlLoader};

use crate::{Error, Meta, Result};

/// Parse a frontmatter block into a metadata mapping.
///
/// An empty or comment-only block yields an empty mapping.
pub(crate) fn parse_meta(yaml: &str) -> Result<Meta> {
    if yaml.trim().is_empty() {
        return Ok(Meta::new());
    }

    let docs = YamlLoader::load_from_str(yaml)?;
    match docs.into_iter().next() {
        None | Some(Yaml::Null) => Ok(Meta::new()),
        Some(Yaml::Hash(hash)) => {
            let mut meta = Meta::new();
            for (key, value) in hash.iter() {
                meta.insert(key_to_string(key)?, yaml_to_value(value)?);
            }
            Ok(meta)
        }
        Some(other) => Err(Error::NotAMapping {
            found: kind_name(&other),
        }),
    }
}

/// Convert a YAML node to a JSON value.
///
/// Reals that do not fit a JSON number (`.inf`, `.nan`) become `null`.
pub(crate) fn yaml_to_value(yaml: &Yaml) -> Result<Value> {
    Ok(match yaml {
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Integer(i) => Value::from(*i),
        Yaml::Real(s) => s
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number),
        Yaml::Boolean(b) => Value::Bool(*b),
        Yaml::Array(items) => Value::Array(
            items
                .iter()
                .map(yaml_to_value)
                .collect::<Result<Vec<_>>>()?,
        ),
        Yaml::Hash(hash) => {
            let mut map = serde_json::Map::new();
            for (key, value) in hash.iter() {
                map.insert(key_to_string(key)?, yaml_to_value(value)?);
            }
            Value::Object(map)
        }
        Yaml::Null | Yaml::Alias(_) | Yaml::BadValue => Value::Null,
    })
}

fn key_to_string(key: &Yaml) -> Result<String> {
    match key {
        Yaml::String(s) => Ok(s.clone()),
        Yaml::Integer(i) => Ok(i.to_string()),
        Yaml::Real(s) => Ok(s.clone()),
        Yaml::Boolean(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        other => Err(Error::UnsupportedKey {
            key: format!("{:?}", other),
        }),
    }
}

fn kind_name(yaml: &Yaml) -> &'static str {
    match yaml {
        Yaml::String(_) => "a string",
        Yaml::Integer(_) | Yaml::Real(_) => "a number",
        Yaml::Boolean(_) => "a boolean",
        Yaml::Array(_) => "a sequence",
        Yaml::Hash(_) => "a mapping",
        Yaml::Null => "null",
        Yaml::Alias(_) | Yaml::BadValue => "an invalid value",
    }
}
