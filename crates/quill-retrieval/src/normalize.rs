//! Converts the result shapes different search services return into
//! [`RetrievedDoc`]s.
//!
//! Three shapes are recognised:
//! - Elasticsearch native: `{"hits": {"hits": [{"_id", "_score", "_source"}]}}`
//! - flat: `{"results": [entry, ...]}`, optionally with `distance` per entry
//! - scored pairs: `{"results": [[entry, distance], ...]}`
//!
//! A bare top-level array is treated like `results`.

use quill_types::{JournalEntry, RetrievedDoc};
use serde_json::Value;

use crate::error::{Result, RetrievalError};

pub fn normalize_results(body: &Value) -> Result<Vec<RetrievedDoc>> {
    if let Some(hits) = body.pointer("/hits/hits").and_then(Value::as_array) {
        return hits.iter().map(from_es_hit).collect();
    }

    let items = body
        .get("results")
        .and_then(Value::as_array)
        .or_else(|| body.as_array())
        .ok_or_else(|| RetrievalError::Decode("unrecognised search response shape".into()))?;

    items
        .iter()
        .map(|item| match item {
            Value::Array(pair) => from_pair(pair),
            other => from_flat(other),
        })
        .collect()
}

fn from_es_hit(hit: &Value) -> Result<RetrievedDoc> {
    let source = hit.get("_source").cloned().unwrap_or_else(|| Value::Object(Default::default()));
    let mut entry: JournalEntry = serde_json::from_value(source)?;

    if entry.id.is_empty() {
        if let Some(id) = hit.get("_id").and_then(Value::as_str) {
            entry.id = id.to_string();
        }
    }
    if entry.score.is_none() {
        entry.score = hit.get("_score").and_then(Value::as_f64).map(|s| s as f32);
    }

    Ok(RetrievedDoc::new(entry, None))
}

fn from_flat(item: &Value) -> Result<RetrievedDoc> {
    let entry: JournalEntry = serde_json::from_value(item.clone())?;
    let distance = item
        .get("distance")
        .or_else(|| item.get("_distance"))
        .and_then(Value::as_f64)
        .map(|d| d as f32);

    Ok(RetrievedDoc::new(entry, distance))
}

fn from_pair(pair: &[Value]) -> Result<RetrievedDoc> {
    let [entry, distance] = pair else {
        return Err(RetrievalError::Decode(format!(
            "expected [entry, distance] pair, got {} elements",
            pair.len()
        )));
    };

    let entry: JournalEntry = serde_json::from_value(entry.clone())?;
    Ok(RetrievedDoc::new(entry, distance.as_f64().map(|d| d as f32)))
}
