// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Ordered in-memory log tree.
//!
//! Every node is a JSON object whose named children are sub-trees; records
//! live in the reserved `"logs"` array next to the children. Child insertion
//! order and record append order are both preserved through serialization.

use serde_json::{Map, Value};

use crate::record::Record;

/// Reserved key holding a node's record array. Never a valid child name.
pub const LOGS_KEY: &str = "logs";

/// Rooted tree of named object nodes with per-node record arrays.
#[derive(Debug, Default)]
pub struct LogTree {
    root: Map<String, Value>,
}

impl LogTree {
    #[must_use]
    pub fn new() -> Self {
        Self { root: Map::new() }
    }

    /// Walk `path` from the root, creating missing children as empty
    /// objects. Fails without modifying the final step when a traversed
    /// child exists but is not an object.
    fn node_mut<'a>(
        root: &'a mut Map<String, Value>,
        path: &[String],
    ) -> Result<&'a mut Map<String, Value>, String> {
        let mut node = root;
        for name in path {
            let child = node
                .entry(name.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            node = child
                .as_object_mut()
                .ok_or_else(|| format!("log node '{}' is not an object", name))?;
        }
        Ok(node)
    }

    /// Create every node along `path` that does not exist yet.
    ///
    /// Node descents create their nodes even when no record is emitted at
    /// them, so a trailing directive still leaves a visible empty object.
    pub fn ensure_path(&mut self, path: &[String]) -> Result<(), String> {
        Self::node_mut(&mut self.root, path).map(|_| ())
    }

    /// Append `record` to the `"logs"` array of the node at `path`,
    /// creating the array on first use.
    pub fn append_record(&mut self, path: &[String], record: &Record) -> Result<(), String> {
        let node = Self::node_mut(&mut self.root, path)?;
        let entry = node
            .entry(LOGS_KEY.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        let Value::Array(records) = entry else {
            return Err(format!("reserved key '{}' holds a non-array value", LOGS_KEY));
        };
        let value = serde_json::to_value(record)
            .map_err(|e| format!("serialize log record: {}", e))?;
        records.push(value);
        Ok(())
    }

    /// Render the whole tree as a pretty-printed JSON document.
    /// An empty tree renders as `{}`.
    pub fn to_pretty_string(&self) -> Result<String, String> {
        serde_json::to_string_pretty(&self.root)
            .map_err(|e| format!("serialize log tree: {}", e))
    }

    /// Drop all children and records; the root object remains.
    pub fn clear(&mut self) {
        self.root.clear();
    }

    /// Move the tree out, leaving a fresh empty root in place.
    #[must_use]
    pub fn take(&mut self) -> LogTree {
        LogTree {
            root: std::mem::take(&mut self.root),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Total number of records stored anywhere in the tree.
    #[must_use]
    pub fn record_count(&self) -> usize {
        fn count(node: &Map<String, Value>) -> usize {
            node.iter()
                .map(|(key, value)| match value {
                    Value::Array(records) if key == LOGS_KEY => records.len(),
                    Value::Object(child) => count(child),
                    _ => 0,
                })
                .sum()
        }
        count(&self.root)
    }

    /// Snapshot of the tree as a plain JSON value.
    #[must_use]
    pub fn as_value(&self) -> Value {
        Value::Object(self.root.clone())
    }
}
