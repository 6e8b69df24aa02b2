use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Domain, domain_order_key};
use crate::keys::FileKey;

pub use crate::types::{CaseId, DomainName, SubjectId};

/// One loaded analysis file: its key and its decoded object payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawRecord {
    /// Identity parsed from the filename.
    pub key: FileKey,
    /// Decoded JSON object (legacy one-element arrays already unwrapped).
    pub payload: Value,
}

impl RawRecord {
    /// Record for an already unwrapped payload.
    pub fn new(key: FileKey, payload: Value) -> Self {
        Self { key, payload }
    }

    /// Subject of the record.
    pub fn subject_id(&self) -> &str {
        &self.key.subject_id
    }

    /// Case identifier of the record.
    pub fn case_id(&self) -> &str {
        &self.key.case_id
    }

    /// Domain name of the record.
    pub fn domain(&self) -> &str {
        &self.key.domain
    }
}

/// Grouping key for a case.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CaseKey {
    /// Subject identifier.
    pub subject_id: SubjectId,
    /// Case identifier, possibly multi-token.
    pub case_id: CaseId,
}

impl CaseKey {
    /// Key for `(subject_id, case_id)`.
    pub fn new(subject_id: impl Into<SubjectId>, case_id: impl Into<CaseId>) -> Self {
        Self {
            subject_id: subject_id.into(),
            case_id: case_id.into(),
        }
    }

    /// `subject_id + "_" + case_id`.
    pub fn case_key(&self) -> String {
        format!("{}_{}", self.subject_id, self.case_id)
    }
}

impl From<&FileKey> for CaseKey {
    fn from(key: &FileKey) -> Self {
        CaseKey::new(key.subject_id.clone(), key.case_id.clone())
    }
}

/// All records of one case, at most one per domain.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Case {
    /// Records keyed by domain name.
    pub records: BTreeMap<DomainName, RawRecord>,
}

impl Case {
    /// Add a record; a later record for the same domain replaces the earlier one.
    pub fn insert(&mut self, record: RawRecord) -> Option<RawRecord> {
        self.records.insert(record.key.domain.clone(), record)
    }

    /// Record for a domain, if loaded.
    pub fn get(&self, domain: &str) -> Option<&RawRecord> {
        self.records.get(domain)
    }

    /// Records in declared domain order, unknown domains last by name.
    pub fn records_in_domain_order(&self) -> Vec<&RawRecord> {
        let mut records: Vec<&RawRecord> = self.records.values().collect();
        records.sort_by(|a, b| domain_order_key(a.domain()).cmp(&domain_order_key(b.domain())));
        records
    }

    /// Declared domains in `expected` without a loaded record.
    pub fn missing_domains(&self, expected: &[Domain]) -> Vec<Domain> {
        expected
            .iter()
            .copied()
            .filter(|domain| !self.records.contains_key(domain.as_str()))
            .collect()
    }

    /// True when every domain in `expected` has a record.
    pub fn is_complete(&self, expected: &[Domain]) -> bool {
        self.missing_domains(expected).is_empty()
    }
}

/// Normalize a decoded file to the record object shape.
///
/// Accepts an object, or the legacy one-element array whose sole element is an
/// object. Anything else is rejected with a short reason.
pub fn unwrap_record_payload(value: Value) -> Result<Value, String> {
    match value {
        Value::Object(_) => Ok(value),
        Value::Array(mut items) => {
            if items.len() == 1 && items[0].is_object() {
                Ok(items.remove(0))
            } else {
                Err(format!(
                    "array with {} element(s) does not wrap exactly one object",
                    items.len()
                ))
            }
        }
        other => Err(format!("top-level value is {}", json_kind(&other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(domain: &str) -> RawRecord {
        RawRecord::new(
            FileKey {
                subject_id: "barth".into(),
                case_id: "02".into(),
                domain: domain.into(),
            },
            json!({}),
        )
    }

    #[test]
    fn legacy_single_object_array_is_unwrapped() {
        assert_eq!(
            unwrap_record_payload(json!([{"a": 1}])).unwrap(),
            json!({"a": 1})
        );
        assert_eq!(unwrap_record_payload(json!({"a": 1})).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn other_shapes_are_rejected() {
        assert!(unwrap_record_payload(json!([])).is_err());
        assert!(unwrap_record_payload(json!([{"a": 1}, {"b": 2}])).is_err());
        assert!(unwrap_record_payload(json!([1])).is_err());
        assert!(unwrap_record_payload(json!("text")).is_err());
        assert!(unwrap_record_payload(Value::Null).is_err());
    }

    #[test]
    fn case_orders_records_by_declared_domain() {
        let mut case = Case::default();
        case.insert(record("narrative"));
        case.insert(record("zz_custom"));
        case.insert(record("aristoteles"));
        case.insert(record("kolb"));
        let order: Vec<&str> = case
            .records_in_domain_order()
            .iter()
            .map(|record| record.domain())
            .collect();
        assert_eq!(order, vec!["aristoteles", "kolb", "narrative", "zz_custom"]);
    }

    #[test]
    fn completeness_is_measured_against_expected_domains() {
        let mut case = Case::default();
        case.insert(record("aristoteles"));
        case.insert(record("kolb"));
        assert!(case.is_complete(&[Domain::Aristoteles, Domain::Kolb]));
        assert_eq!(
            case.missing_domains(&[Domain::Aristoteles, Domain::Dekker, Domain::Kolb]),
            vec![Domain::Dekker]
        );
    }

    #[test]
    fn case_key_formats_subject_and_case() {
        assert_eq!(CaseKey::new("barth", "02").case_key(), "barth_02");
    }
}
