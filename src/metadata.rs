use indexmap::IndexMap;
use serde_json::Value;

pub use crate::constants::columns::{COLUMN_DELIMITER, METADATA_BLOCK};
use crate::types::{CellValue, ColumnName};
use crate::utils::serialize_value;

/// Canonical leading segment for namespaced output columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnKey {
    name: &'static str,
}

impl ColumnKey {
    /// Create a column key with a canonical static name.
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    /// Return the raw key name.
    pub const fn as_str(&self) -> &'static str {
        self.name
    }

    /// Join a sub-path onto this key (e.g., "metadata.model").
    pub fn encode(&self, rest: &str) -> ColumnName {
        format!("{}{}{}", self.name, COLUMN_DELIMITER, rest)
    }

    /// Strip this key's prefix from a namespaced column.
    pub fn strip<'a>(&self, column: &'a str) -> Option<&'a str> {
        column
            .strip_prefix(self.name)
            .and_then(|rest| rest.strip_prefix(COLUMN_DELIMITER))
    }
}

/// Copy the shared `metadata` block one level deep into `metadata.<key>` columns.
///
/// Missing or non-object blocks contribute nothing.
pub fn metadata_columns(payload: &Value) -> IndexMap<ColumnName, CellValue> {
    let mut columns = IndexMap::new();
    if let Some(Value::Object(block)) = payload.get(METADATA_BLOCK.as_str()) {
        for (key, value) in block {
            columns.insert(METADATA_BLOCK.encode(key), serialize_value(value));
        }
    }
    columns
}

/// True if `column` belongs to the shared metadata block.
pub fn is_metadata_column(column: &str) -> bool {
    METADATA_BLOCK.strip(column).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn column_key_encodes_and_strips_paths() {
        let encoded = METADATA_BLOCK.encode("model");
        assert_eq!(encoded, "metadata.model");
        assert_eq!(METADATA_BLOCK.strip(&encoded), Some("model"));
        assert_eq!(METADATA_BLOCK.strip("metadatamodel"), None);
        assert_eq!(METADATA_BLOCK.strip("kolb.overall.summary"), None);
    }

    #[test]
    fn metadata_block_is_flattened_one_level() {
        let payload = json!({
            "metadata": {
                "model": "gpt-x",
                "temperature": 0.2,
                "prompt": {"version": 3}
            },
            "other": 1
        });
        let columns = metadata_columns(&payload);
        assert_eq!(columns.len(), 3);
        assert_eq!(columns["metadata.model"], "gpt-x");
        assert_eq!(columns["metadata.temperature"], "0.2");
        assert_eq!(columns["metadata.prompt"], "{\"version\": 3}");
    }

    #[test]
    fn missing_or_scalar_metadata_contributes_nothing() {
        assert!(metadata_columns(&json!({"a": 1})).is_empty());
        assert!(metadata_columns(&json!({"metadata": "n/a"})).is_empty());
        assert!(is_metadata_column("metadata.model"));
        assert!(!is_metadata_column("kolb.metadata"));
    }
}
