//! Model flattening for the key/value store
//!
//! Serializes a YAML value tree into ordered `(path, value)` leaf pairs.
//! Mappings recurse with `/<key>` segments in source order; sequences recurse
//! with 6-digit zero-padded decimal indices so lexicographic key order equals
//! numeric order — sequences longer than 999,999 elements are outside the
//! format. Scalars become leaves only when truthy: empty strings, zero,
//! `false`, empty collections and null are silently skipped, which is how
//! optional fields stay out of the published tree.

use serde_yaml::{Mapping, Value};
use tracing::warn;

use crate::kv::{KvSink, SinkError};

/// Sentinel leaf written after every other key; readers treat its presence
/// as the completion signal for a replace, since individual puts have no
/// cross-key atomicity.
pub const SENTINEL_KEY: &str = "last_updated";

/// Largest sequence index representable in the zero-padded key format.
pub const MAX_SEQUENCE_INDEX: usize = 999_999;

/// The three node kinds of the flattened format.
#[derive(Debug)]
pub enum Node<'a> {
    Mapping(&'a Mapping),
    Sequence(&'a [Value]),
    Scalar(&'a Value),
}

/// Classify a value into its node kind. YAML tags are transparent: a tagged
/// value classifies as its inner value.
pub fn classify(value: &Value) -> Node<'_> {
    match value {
        Value::Mapping(m) => Node::Mapping(m),
        Value::Sequence(items) => Node::Sequence(items),
        Value::Tagged(tagged) => classify(&tagged.value),
        scalar => Node::Scalar(scalar),
    }
}

/// Whether a value produces output at all.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(items) => !items.is_empty(),
        Value::Mapping(m) => !m.is_empty(),
        Value::Tagged(tagged) => truthy(&tagged.value),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        // Null and collections never reach here: null is falsy and
        // collections classify as Mapping/Sequence.
        _ => String::new(),
    }
}

/// Flatten a value tree into ordered `(path, value)` leaves under `prefix`.
pub fn flatten(root: &Value, prefix: &str) -> Vec<(String, String)> {
    let mut leaves = Vec::new();
    walk(root, prefix, &mut leaves);
    leaves
}

fn walk(value: &Value, path: &str, leaves: &mut Vec<(String, String)>) {
    match classify(value) {
        Node::Mapping(map) => {
            for (k, v) in map {
                match classify(k) {
                    Node::Scalar(key) if truthy(key) || matches!(key, Value::Number(_)) => {
                        walk(v, &format!("{path}/{}", scalar_text(key)), leaves);
                    }
                    _ => warn!(path, "skipping mapping entry with non-scalar or empty key"),
                }
            }
        }
        Node::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                walk(item, &format!("{path}/{index:06}"), leaves);
            }
        }
        Node::Scalar(scalar) => {
            if truthy(scalar) {
                leaves.push((path.to_string(), scalar_text(scalar)));
            }
        }
    }
}

/// Replace the tree under `prefix` in the sink.
///
/// Ordering contract: full prefix delete, then every leaf, then the single
/// `last_updated` sentinel. A crash mid-write leaves a partial tree with no
/// sentinel. Returns the number of data leaves written.
pub fn publish(
    sink: &mut dyn KvSink,
    prefix: &str,
    root: &Value,
) -> Result<usize, SinkError> {
    sink.delete_prefix(prefix)?;

    let leaves = flatten(root, prefix);
    for (path, value) in &leaves {
        sink.put(path, value)?;
    }

    let stamp = chrono::Utc::now().timestamp().to_string();
    sink.put(&format!("{prefix}/{SENTINEL_KEY}"), &stamp)?;
    Ok(leaves.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemorySink;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    /// Rebuild a mapping/sequence tree from flattened leaves.
    fn unflatten(leaves: &[(String, String)], prefix: &str) -> Value {
        let mut root = Value::Null;
        for (path, text) in leaves {
            let rel = path.strip_prefix(prefix).unwrap().trim_start_matches('/');
            let segments: Vec<&str> = rel.split('/').collect();
            insert_path(&mut root, &segments, text);
        }
        root
    }

    fn insert_path(node: &mut Value, segments: &[&str], text: &str) {
        let segment = segments[0];
        let is_index = segment.len() == 6 && segment.chars().all(|c| c.is_ascii_digit());

        if segments.len() == 1 {
            let leaf = Value::String(text.to_string());
            if is_index {
                as_sequence(node).push(leaf);
            } else {
                as_mapping(node).insert(Value::String(segment.to_string()), leaf);
            }
            return;
        }

        let child = if is_index {
            let seq = as_sequence(node);
            let index: usize = segment.parse().unwrap();
            if seq.len() <= index {
                seq.resize(index + 1, Value::Null);
            }
            &mut seq[index]
        } else {
            let map = as_mapping(node);
            let key = Value::String(segment.to_string());
            if !map.contains_key(&key) {
                map.insert(key.clone(), Value::Null);
            }
            map.get_mut(&key).unwrap()
        };
        insert_path(child, &segments[1..], text);
    }

    fn as_mapping(node: &mut Value) -> &mut Mapping {
        if !matches!(node, Value::Mapping(_)) {
            *node = Value::Mapping(Mapping::new());
        }
        match node {
            Value::Mapping(m) => m,
            _ => unreachable!(),
        }
    }

    fn as_sequence(node: &mut Value) -> &mut Vec<Value> {
        if !matches!(node, Value::Sequence(_)) {
            *node = Value::Sequence(Vec::new());
        }
        match node {
            Value::Sequence(s) => s,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_mapping_paths_follow_source_order() {
        let value = yaml("{zeta: 1, alpha: 2}");
        let leaves = flatten(&value, "/t");
        assert_eq!(
            leaves,
            vec![
                ("/t/zeta".to_string(), "1".to_string()),
                ("/t/alpha".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_sequence_indices_zero_padded() {
        let value = yaml("[a, b, c]");
        let leaves = flatten(&value, "/t");
        assert_eq!(leaves[0].0, "/t/000000");
        assert_eq!(leaves[2].0, "/t/000002");
    }

    #[test]
    fn test_falsy_scalars_emit_nothing() {
        let value = yaml(r#"{empty: "", zero: 0, none: null, off: false, list: [], map: {}}"#);
        assert!(flatten(&value, "/t").is_empty());
    }

    #[test]
    fn test_nested_structure() {
        let value = yaml(r#"
endpoints:
  ep1:
    host: node1
    port: 411
"#);
        let leaves = flatten(&value, "/orion");
        assert_eq!(
            leaves,
            vec![
                ("/orion/endpoints/ep1/host".to_string(), "node1".to_string()),
                ("/orion/endpoints/ep1/port".to_string(), "411".to_string()),
            ]
        );
    }

    #[test]
    fn test_round_trip_reconstruction() {
        let value = yaml(r#"
groups:
  l1:
    members: [n1, n2, n3]
    kind: aggregation
counts: [one, two]
"#);
        let leaves = flatten(&value, "/t");
        let rebuilt = unflatten(&leaves, "/t");

        assert_eq!(
            rebuilt["groups"]["l1"]["members"],
            yaml("[n1, n2, n3]")
        );
        assert_eq!(rebuilt["groups"]["l1"]["kind"], yaml("aggregation"));
        assert_eq!(rebuilt["counts"], yaml("[one, two]"));
    }

    #[test]
    fn test_publish_deletes_stale_tree_first() {
        let mut sink = MemorySink::new();
        sink.put("/orion/stale/key", "old").unwrap();
        sink.put("/other/key", "kept").unwrap();

        publish(&mut sink, "/orion", &yaml("{fresh: 1}")).unwrap();

        assert_eq!(sink.get("/orion/stale/key"), None);
        assert_eq!(sink.get("/orion/fresh"), Some("1"));
        assert_eq!(sink.get("/other/key"), Some("kept"));
    }

    #[test]
    fn test_publish_writes_sentinel() {
        let mut sink = MemorySink::new();
        let count = publish(&mut sink, "/orion", &yaml("{a: 1, b: 2}")).unwrap();
        assert_eq!(count, 2);
        assert!(sink.get("/orion/last_updated").is_some());
    }

    /// Sink that records operation order, for the replace-ordering contract.
    #[derive(Default)]
    struct RecordingSink {
        ops: Vec<String>,
    }

    impl KvSink for RecordingSink {
        fn put(&mut self, path: &str, _value: &str) -> Result<(), SinkError> {
            self.ops.push(format!("put {path}"));
            Ok(())
        }

        fn delete_prefix(&mut self, prefix: &str) -> Result<(), SinkError> {
            self.ops.push(format!("del {prefix}"));
            Ok(())
        }
    }

    #[test]
    fn test_publish_ordering_delete_first_sentinel_last() {
        let mut sink = RecordingSink::default();
        publish(&mut sink, "/orion", &yaml("{a: 1, b: 2}")).unwrap();

        assert_eq!(sink.ops.first().unwrap(), "del /orion");
        assert_eq!(sink.ops.last().unwrap(), "put /orion/last_updated");
        assert_eq!(sink.ops.len(), 4);
    }

    #[test]
    fn test_tagged_values_classify_as_inner() {
        let value = yaml("!custom {a: 1}");
        let leaves = flatten(&value, "/t");
        assert_eq!(leaves, vec![("/t/a".to_string(), "1".to_string())]);
    }
}
