//! Case-per-row tabular export over the union of every observed column.

use std::collections::BTreeSet;
use std::io::Write;

use tracing::debug;

use crate::constants::columns::FIXED_COLUMNS;
use crate::data::{Case, CaseKey};
use crate::errors::CorpusError;
use crate::extract::{DomainExtractor, FlatRecord};
use crate::metadata::is_metadata_column;
use crate::tsv::{Quoting, write_record};
use crate::types::ColumnName;

/// Every data cell of one case, merged across its domains.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatRow {
    /// Case the row belongs to.
    pub key: CaseKey,
    /// Domain-prefixed data cells.
    pub cells: FlatRecord,
}

impl FlatRow {
    /// Extract every record of a case in declared domain order.
    ///
    /// Metadata columns keep the value from the first domain that set them.
    pub fn from_case(key: CaseKey, case: &Case, extractor: &DomainExtractor) -> Self {
        let mut cells = FlatRecord::new();
        for record in case.records_in_domain_order() {
            for (column, value) in extractor.extract(&record.payload, record.domain()) {
                if is_metadata_column(&column) && cells.contains_key(&column) {
                    continue;
                }
                cells.insert(column, value);
            }
        }
        Self { key, cells }
    }

    /// Cell for a column, empty when this row never observed it.
    pub fn cell(&self, column: &str) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }
}

/// Union of all data columns seen across rows, kept sorted.
#[derive(Clone, Debug, Default)]
pub struct ColumnUniverse {
    columns: BTreeSet<ColumnName>,
}

impl ColumnUniverse {
    /// Add the row's columns.
    pub fn observe(&mut self, row: &FlatRow) {
        for column in row.cells.keys() {
            if !self.columns.contains(column) {
                self.columns.insert(column.clone());
            }
        }
    }

    /// Number of data columns, fixed columns excluded.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True before any data column was seen.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// True if `column` was seen.
    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    /// Fixed columns first, then data columns lexicographically.
    pub fn header(&self) -> Vec<ColumnName> {
        FIXED_COLUMNS
            .iter()
            .map(|column| column.to_string())
            .chain(self.columns.iter().cloned())
            .collect()
    }
}

/// Builds rows in a first pass and writes them against the complete header.
///
/// Rows are cached on insertion so the write pass never re-extracts.
#[derive(Debug, Default)]
pub struct SchemaUnionWriter {
    extractor: DomainExtractor,
    universe: ColumnUniverse,
    rows: Vec<FlatRow>,
}

impl SchemaUnionWriter {
    /// Empty writer flattening with `extractor`.
    pub fn new(extractor: DomainExtractor) -> Self {
        Self {
            extractor,
            universe: ColumnUniverse::default(),
            rows: Vec::new(),
        }
    }

    /// Extract one case and fold its columns into the universe.
    pub fn add_case(&mut self, key: &CaseKey, case: &Case) {
        let row = FlatRow::from_case(key.clone(), case, &self.extractor);
        debug!(
            "[table:add_case] flattened {} into {} cells",
            key.case_key(),
            row.cells.len()
        );
        self.universe.observe(&row);
        self.rows.push(row);
    }

    /// Columns seen so far.
    pub fn universe(&self) -> &ColumnUniverse {
        &self.universe
    }

    /// Cached rows sorted by `(subject_id, case_id)`.
    pub fn rows(&self) -> Vec<&FlatRow> {
        let mut rows: Vec<&FlatRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        rows
    }

    /// Write the header and one fully quoted row per case. Returns the row count.
    pub fn write_tsv<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, CorpusError> {
        let header = self.universe.header();
        write_record(writer, &header, Quoting::All)?;
        let rows = self.rows();
        for row in &rows {
            let fixed = [
                row.key.subject_id.clone(),
                row.key.case_id.clone(),
                row.key.case_key(),
            ];
            let data = header[FIXED_COLUMNS.len()..]
                .iter()
                .map(|column| row.cell(column).to_string());
            write_record(writer, fixed.into_iter().chain(data), Quoting::All)?;
        }
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawRecord;
    use crate::keys::FileKey;
    use serde_json::{Value, json};

    fn record(subject: &str, case: &str, domain: &str, payload: Value) -> RawRecord {
        RawRecord::new(
            FileKey {
                subject_id: subject.into(),
                case_id: case.into(),
                domain: domain.into(),
            },
            payload,
        )
    }

    fn case_of(records: Vec<RawRecord>) -> (CaseKey, Case) {
        let key = CaseKey::from(&records[0].key);
        let mut case = Case::default();
        for record in records {
            case.insert(record);
        }
        (key, case)
    }

    fn fixture() -> Vec<(CaseKey, Case)> {
        vec![
            case_of(vec![
                record(
                    "barth",
                    "02",
                    "kolb",
                    json!({"metadata": {"model": "kolb-run"}, "overall_picture": {"summary": "k"}}),
                ),
                record(
                    "barth",
                    "02",
                    "aristoteles",
                    json!({"metadata": {"model": "first"}, "overall_picture": {"summary": "a"}}),
                ),
            ]),
            case_of(vec![record(
                "augustine",
                "01",
                "dekker",
                json!({"analysis_per_criterion": {"criterion_1_x": {"score_1_to_10": 7}}}),
            )]),
        ]
    }

    #[test]
    fn metadata_keeps_first_domain_in_declared_order() {
        let cases = fixture();
        let (key, case) = &cases[0];
        let row = FlatRow::from_case(key.clone(), case, &DomainExtractor::new());
        assert_eq!(row.cell("metadata.model"), "first");
        assert_eq!(row.cell("aristoteles.overall.summary"), "a");
        assert_eq!(row.cell("kolb.overall.summary"), "k");
        assert_eq!(row.cell("dekker.x.score"), "");
    }

    #[test]
    fn header_is_independent_of_case_order() {
        let forward = fixture();
        let mut backward = fixture();
        backward.reverse();

        let mut a = SchemaUnionWriter::default();
        for (key, case) in &forward {
            a.add_case(key, case);
        }
        let mut b = SchemaUnionWriter::default();
        for (key, case) in &backward {
            b.add_case(key, case);
        }

        let header = a.universe().header();
        assert_eq!(header, b.universe().header());
        assert_eq!(&header[..3], &["subject_id", "case_id", "case_key"]);
        let data = &header[3..];
        assert!(data.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(a.universe().contains("dekker.1_x.score"));

        let mut out_a = Vec::new();
        let mut out_b = Vec::new();
        a.write_tsv(&mut out_a).unwrap();
        b.write_tsv(&mut out_b).unwrap();
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn rows_are_sorted_quoted_and_padded() {
        let mut writer = SchemaUnionWriter::default();
        for (key, case) in fixture() {
            writer.add_case(&key, &case);
        }
        let mut out = Vec::new();
        assert_eq!(writer.write_tsv(&mut out).unwrap(), 2);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("\"subject_id\"\t\"case_id\"\t\"case_key\"\t"));
        assert!(lines[1].starts_with("\"augustine\"\t\"01\"\t\"augustine_01\"\t"));
        assert!(lines[2].starts_with("\"barth\"\t\"02\"\t\"barth_02\"\t"));
        let width = lines[0].split('\t').count();
        assert!(lines.iter().all(|line| line.split('\t').count() == width));
    }
}
