//! Per-domain flattening of nested analysis payloads into namespaced cells.
//!
//! Each [`Domain`] is bound to a static [`RuleSet`] (see [`rules`]). A rule set
//! is data: a list of [`Rule`]s that copy values out of the payload, followed by
//! [`Derivation`]s that fill blank aggregate columns from their numeric
//! components. Extraction is pure and total; missing nested fields degrade to
//! empty cells.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::constants::columns::COLUMN_DELIMITER;
use crate::domain::Domain;
use crate::metadata::metadata_columns;
use crate::types::{CellValue, ColumnName};
use crate::utils::{lookup_first, lookup_path, serialize_value};

/// Fallback aggregate derivations.
pub mod derive;
/// Static per-domain rule sets.
pub mod rules;

pub use derive::{Components, Derivation};

/// Flattened cells produced from one record, in rule order.
pub type FlatRecord = IndexMap<ColumnName, CellValue>;

/// Ordinal mapping for a qualitative field.
///
/// Labels are matched case-insensitively after trimming; unmapped labels
/// produce an empty cell.
#[derive(Debug)]
pub struct CategoricalTable {
    /// Table name, for diagnostics.
    pub name: &'static str,
    /// Lowercase label to ordinal.
    pub levels: &'static [(&'static str, u8)],
}

impl CategoricalTable {
    /// Ordinal for a JSON value, if it is a mapped label.
    pub fn level(&self, value: &Value) -> Option<u8> {
        let label = value.as_str()?.trim().to_lowercase();
        self.levels
            .iter()
            .find(|(candidate, _)| *candidate == label)
            .map(|(_, level)| *level)
    }
}

/// Post-processing applied to a looked-up value.
#[derive(Clone, Copy, Debug)]
pub enum Post {
    /// Route through the value serializer.
    Serialize,
    /// Map a qualitative label to its ordinal.
    Categorical(&'static CategoricalTable),
}

impl Post {
    fn apply(self, value: Option<&Value>) -> CellValue {
        match (self, value) {
            (_, None) => String::new(),
            (Post::Serialize, Some(value)) => serialize_value(value),
            (Post::Categorical(table), Some(value)) => table
                .level(value)
                .map(|level| level.to_string())
                .unwrap_or_default(),
        }
    }
}

/// One value copied from a section into `<section column>.<suffix>`.
#[derive(Clone, Copy, Debug)]
pub struct ChildField {
    /// Key (or dotted path) relative to the section.
    pub key: &'static str,
    /// Older spellings tried after `key`.
    pub synonyms: &'static [&'static str],
    /// Output name appended to the section column.
    pub suffix: &'static str,
    /// Post-processing of the looked-up value.
    pub post: Post,
}

impl ChildField {
    /// Copy `key` under its own name.
    pub const fn same(key: &'static str) -> Self {
        Self {
            key,
            synonyms: &[],
            suffix: key,
            post: Post::Serialize,
        }
    }

    /// Copy `key` under a canonical output name.
    pub const fn renamed(key: &'static str, suffix: &'static str) -> Self {
        Self {
            key,
            synonyms: &[],
            suffix,
            post: Post::Serialize,
        }
    }

    /// Also accept older spellings of the key.
    pub const fn or(mut self, synonyms: &'static [&'static str]) -> Self {
        self.synonyms = synonyms;
        self
    }

    /// Map the value through an ordinal table.
    pub const fn categorical(mut self, table: &'static CategoricalTable) -> Self {
        self.post = Post::Categorical(table);
        self
    }

    fn cell(&self, section: &Value) -> CellValue {
        self.post.apply(resolve(section, self.key, self.synonyms))
    }
}

/// When a section's columns are emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    /// Always emit every field, blank when the section is missing.
    Always,
    /// Emit only when the section resolves to an object.
    IfPresent,
}

/// Which children of an object an [`Rule::EachChild`] rule visits.
#[derive(Clone, Copy, Debug)]
pub enum KeyFilter {
    /// Every child whose value is an object.
    Objects,
    /// Object children whose key starts with the prefix.
    Prefixed(&'static str),
}

impl KeyFilter {
    fn accepts(self, key: &str, value: &Value) -> bool {
        value.is_object()
            && match self {
                KeyFilter::Objects => true,
                KeyFilter::Prefixed(prefix) => key.starts_with(prefix),
            }
    }
}

/// A declarative extraction rule.
#[derive(Clone, Copy, Debug)]
pub enum Rule {
    /// Copy fields of the object at `path` (or a synonym) into `column.*`.
    Section {
        /// Dotted path of the section object.
        path: &'static str,
        /// Older section paths tried after `path`.
        synonyms: &'static [&'static str],
        /// Column stem for the copied fields.
        column: &'static str,
        /// Whether the section's cells are emitted when it is absent.
        presence: Presence,
        /// Fields copied out of the section.
        fields: &'static [ChildField],
    },
    /// Visit dynamic children of the object at `path`, normalizing each child
    /// key through `renames`, and emit `column.<child>.<suffix>`.
    EachChild {
        /// Dotted path of the parent object.
        path: &'static str,
        /// Column stem for the children.
        column: &'static str,
        /// Which children are visited.
        filter: KeyFilter,
        /// `(raw key, normalized key)` pairs.
        renames: &'static [(&'static str, &'static str)],
        /// Fields copied out of each child.
        fields: &'static [ChildField],
    },
    /// Generic flatten of every top-level key not listed in `except`.
    FlattenRest {
        /// Top-level keys handled by other rules.
        except: &'static [&'static str],
    },
}

impl Rule {
    /// Shorthand for an always-emitted section.
    pub const fn section(
        path: &'static str,
        column: &'static str,
        fields: &'static [ChildField],
    ) -> Self {
        Rule::Section {
            path,
            synonyms: &[],
            column,
            presence: Presence::Always,
            fields,
        }
    }

    /// Shorthand for a section emitted only when present.
    pub const fn optional(
        path: &'static str,
        column: &'static str,
        fields: &'static [ChildField],
    ) -> Self {
        Rule::Section {
            path,
            synonyms: &[],
            column,
            presence: Presence::IfPresent,
            fields,
        }
    }

    /// Shorthand for an optional section that also accepts older spellings.
    pub const fn optional_or(
        path: &'static str,
        synonyms: &'static [&'static str],
        column: &'static str,
        fields: &'static [ChildField],
    ) -> Self {
        Rule::Section {
            path,
            synonyms,
            column,
            presence: Presence::IfPresent,
            fields,
        }
    }

    fn apply(&self, payload: &Value, out: &mut Vec<(ColumnName, CellValue)>) {
        match *self {
            Rule::Section {
                path,
                synonyms,
                column,
                presence,
                fields,
            } => {
                let section = resolve(payload, path, synonyms).filter(|value| value.is_object());
                match (section, presence) {
                    (Some(section), _) => {
                        for field in fields {
                            out.push((join(column, field.suffix), field.cell(section)));
                        }
                    }
                    (None, Presence::Always) => {
                        for field in fields {
                            out.push((join(column, field.suffix), String::new()));
                        }
                    }
                    (None, Presence::IfPresent) => {}
                }
            }
            Rule::EachChild {
                path,
                column,
                filter,
                renames,
                fields,
            } => {
                let Some(Value::Object(children)) = lookup_path(payload, path) else {
                    return;
                };
                for (key, child) in children {
                    if !filter.accepts(key, child) {
                        continue;
                    }
                    let child_column = join(column, &normalize_key(key, renames));
                    for field in fields {
                        out.push((join(&child_column, field.suffix), field.cell(child)));
                    }
                }
            }
            Rule::FlattenRest { except } => {
                let Some(top) = payload.as_object() else {
                    return;
                };
                for (key, value) in top {
                    if !except.contains(&key.as_str()) {
                        flatten_value(key, value, out);
                    }
                }
            }
        }
    }
}

/// Rules and derivations bound to one domain.
#[derive(Debug)]
pub struct RuleSet {
    /// Domain the set applies to.
    pub domain: Domain,
    /// Copy rules, applied in order.
    pub rules: &'static [Rule],
    /// Aggregates filled after the copy rules.
    pub derivations: &'static [Derivation],
}

impl RuleSet {
    /// Column prefix for this domain's data cells.
    pub fn prefix(&self) -> &'static str {
        self.domain.as_str()
    }

    /// Apply the copy rules only, producing domain-prefixed cells.
    pub fn apply_rules(&self, payload: &Value) -> FlatRecord {
        let mut cells = Vec::new();
        for rule in self.rules {
            rule.apply(payload, &mut cells);
        }
        cells
            .into_iter()
            .map(|(column, value)| (join(self.prefix(), &column), value))
            .collect()
    }

    /// Fill blank aggregate cells from their numeric components, in order.
    pub fn apply_derivations(&self, record: &mut FlatRecord) {
        for derivation in self.derivations {
            derivation.apply(self.prefix(), record);
        }
    }
}

/// Flattens payloads according to their domain's rule set.
#[derive(Clone, Copy, Debug)]
pub struct DomainExtractor {
    derive_aggregates: bool,
}

impl Default for DomainExtractor {
    fn default() -> Self {
        Self {
            derive_aggregates: true,
        }
    }
}

impl DomainExtractor {
    /// Extractor with derivations enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the fallback aggregate derivations.
    pub fn with_derivations(mut self, derive_aggregates: bool) -> Self {
        self.derive_aggregates = derive_aggregates;
        self
    }

    /// Flatten one payload. Unknown domains contribute metadata columns only.
    pub fn extract(&self, payload: &Value, domain: &str) -> FlatRecord {
        let mut record = metadata_columns(payload);
        let Some(rule_set) = Domain::from_name(domain).map(rules::rule_set) else {
            return record;
        };
        record.extend(rule_set.apply_rules(payload));
        if self.derive_aggregates {
            rule_set.apply_derivations(&mut record);
        }
        record
    }
}

fn resolve<'a>(value: &'a Value, key: &str, synonyms: &[&str]) -> Option<&'a Value> {
    lookup_path(value, key)
        .filter(|found| !found.is_null())
        .or_else(|| lookup_first(value, synonyms))
}

/// Apply a rename table to a dynamic child key, replacing every occurrence in order.
pub fn normalize_key(key: &str, renames: &[(&str, &str)]) -> String {
    renames
        .iter()
        .fold(key.to_string(), |current, (from, to)| current.replace(from, to))
}

fn join(column: &str, suffix: &str) -> ColumnName {
    if column.is_empty() {
        suffix.to_string()
    } else {
        format!("{column}{COLUMN_DELIMITER}{suffix}")
    }
}

/// An object whose values are all scalars is flattened one level further;
/// anything else is serialized in place.
fn flatten_value(column: &str, value: &Value, out: &mut Vec<(ColumnName, CellValue)>) {
    match value {
        Value::Object(map) => flatten_object(column, map, out),
        other => out.push((column.to_string(), serialize_value(other))),
    }
}

fn flatten_object(column: &str, map: &Map<String, Value>, out: &mut Vec<(ColumnName, CellValue)>) {
    for (key, value) in map {
        let child_column = join(column, key);
        match value {
            Value::Object(inner) if inner.values().all(is_scalar) => {
                flatten_object(&child_column, inner, out)
            }
            other => out.push((child_column, serialize_value(other))),
        }
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}
