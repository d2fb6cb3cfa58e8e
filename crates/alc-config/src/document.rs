//! The persisted chain document.
//!
//! A chain is stored as a JSON array of internally tagged nodes:
//!
//! ```json
//! [
//!   { "type": "device", "id": 1, "device": { "id": 12, "name": "Rio3224-D2", "latency": 0.31 } },
//!   { "type": "split", "id": 2, "branches": [[], []],
//!     "branch_names": { "0": "Path A", "1": "Path B" }, "selected_ports": {} }
//! ]
//! ```
//!
//! Older documents stored bare device records at the top level with no
//! `type` tag. [`from_json`] migrates those to device nodes before decoding.

use alc_core::{Chain, parse_device};
use serde_json::{Map, Value, json};

use crate::error::ConfigError;

/// Serializes a chain to compact JSON.
pub fn to_json(chain: &Chain) -> Result<String, ConfigError> {
    Ok(serde_json::to_string(chain)?)
}

/// Serializes a chain to indented JSON.
pub fn to_json_pretty(chain: &Chain) -> Result<String, ConfigError> {
    Ok(serde_json::to_string_pretty(chain)?)
}

/// Parses a chain document, migrating legacy nodes and validating the tree.
pub fn from_json(json: &str) -> Result<Chain, ConfigError> {
    let mut value: Value = serde_json::from_str(json)?;
    let migrated = migrate_legacy_nodes(&mut value)?;
    if migrated > 0 {
        tracing::debug!("chain_migrate: {migrated} legacy node(s)");
    }
    let chain: Chain = serde_json::from_value(value)?;
    chain.validate()?;
    Ok(chain)
}

/// Rewrites top-level node objects that lack a `type` tag as device nodes.
///
/// A legacy object that already nests its descriptor under `device` only
/// gains the tag. A bare catalog record is wrapped: its descriptor moves
/// under `device`, its `nickname` is kept, and it receives a fresh node id
/// above every id already present. Returns the number of migrated nodes.
pub fn migrate_legacy_nodes(document: &mut Value) -> Result<usize, ConfigError> {
    let Value::Array(nodes) = document else {
        return Err(ConfigError::Document("expected an array of nodes".to_string()));
    };
    let mut next_id = max_node_id(nodes).map_or(1, |max| max + 1);
    let mut migrated = 0;

    for (position, node) in nodes.iter_mut().enumerate() {
        let Value::Object(fields) = node else {
            return Err(ConfigError::Document(format!("node {position} is not an object")));
        };
        if fields.contains_key("type") {
            continue;
        }
        if fields.contains_key("device") {
            fields.insert("type".to_string(), json!("device"));
            if !fields.get("id").is_some_and(Value::is_u64) {
                fields.insert("id".to_string(), json!(next_id));
                next_id += 1;
            }
        } else {
            let mut record = std::mem::take(fields);
            let nickname = record.remove("nickname").filter(Value::is_string);
            record.remove("uniqueId");
            let device = parse_device(Value::Object(record), position)?;
            let mut wrapped = Map::new();
            wrapped.insert("type".to_string(), json!("device"));
            wrapped.insert("id".to_string(), json!(next_id));
            wrapped.insert("device".to_string(), serde_json::to_value(device)?);
            if let Some(nickname) = nickname {
                wrapped.insert("nickname".to_string(), nickname);
            }
            *fields = wrapped;
            next_id += 1;
        }
        migrated += 1;
    }
    Ok(migrated)
}

/// Highest numeric node id among tagged or nested-descriptor nodes.
fn max_node_id(nodes: &[Value]) -> Option<u64> {
    nodes
        .iter()
        .filter(|node| node.get("type").is_some() || node.get("device").is_some())
        .filter_map(|node| {
            let own = node.get("id").and_then(Value::as_u64);
            let nested = node
                .get("branches")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(Value::as_array)
                .filter_map(|branch| max_node_id(branch))
                .max();
            own.max(nested)
        })
        .max()
}
