//! Defensive probing of untrusted upstream JSON.
//!
//! The aggregation API does not use consistent casing for chain keys and
//! names the same figure differently across endpoints. Every lookup here is
//! driven by an explicit, ordered list of accepted key synonyms.

use std::collections::HashMap;

use serde_json::{Map, Value};

use inkdash_common::types::TargetChain;

/// Coerce a JSON value to a finite number.
///
/// Accepts numbers and numeric strings (whitespace trimmed). Everything else,
/// including `null`, booleans and empty strings, is unknown.
pub fn to_num(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// First non-null value among `keys` (exact match, in order).
pub fn first_present<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let map = obj.as_object()?;
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find(|v| !v.is_null())
}

/// `to_num` of the first non-null synonym.
///
/// A present-but-unparseable value does not fall through to later synonyms.
pub fn num_from_any(obj: &Value, keys: &[&str]) -> Option<f64> {
    first_present(obj, keys).and_then(to_num)
}

/// First synonym whose value is a JSON object.
pub fn pick_breakdown<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let map = obj.as_object()?;
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find(|v| v.is_object())
}

/// Case-folding index over one object's own keys.
///
/// Built once per payload; when two keys fold to the same string the first
/// one in document order wins.
pub struct KeyIndex<'a> {
    map: &'a Map<String, Value>,
    folded: HashMap<String, &'a str>,
}

impl<'a> KeyIndex<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        let mut folded = HashMap::with_capacity(map.len());
        for key in map.keys() {
            folded.entry(key.trim().to_lowercase()).or_insert(key.as_str());
        }
        Self { map, folded }
    }

    pub fn get_exact(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    pub fn get_ci(&self, key: &str) -> Option<&'a Value> {
        let original = self.folded.get(&key.trim().to_lowercase())?;
        self.map.get(*original)
    }
}

/// Locate the chain's entry inside a breakdown object.
///
/// Order: exact display name, exact slug, case-insensitive display name,
/// case-insensitive slug. Null entries count as absent.
pub fn pick_chain<'a>(breakdown: &'a Value, chain: &TargetChain) -> Option<&'a Value> {
    let map = breakdown.as_object()?;
    let index = KeyIndex::new(map);
    [
        index.get_exact(&chain.name),
        index.get_exact(&chain.slug),
        index.get_ci(&chain.name),
        index.get_ci(&chain.slug),
    ]
    .into_iter()
    .flatten()
    .find(|v| !v.is_null())
}

/// Field as a trimmed string, empty when absent or not a string.
pub fn str_field(obj: &Value, key: &str) -> String {
    obj.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}
