use crate::metadata::ColumnKey;

/// Constants used by filename parsing.
pub mod filename {
    /// Extension every analysis record file must carry.
    pub const RECORD_EXTENSION: &str = ".json";
    /// Delimiter between filename tokens (`subject_case_domain`).
    pub const TOKEN_DELIMITER: char = '_';
    /// Minimum number of stem tokens for a parseable filename.
    pub const MIN_TOKENS: usize = 3;
    /// Name fragments of auxiliary artifacts that share the input directory.
    pub const AUXILIARY_FRAGMENTS: [&str; 4] = ["statistics", "violin_data", "file_index", ".raw"];
    /// Token marking a repeated experimental run (`solle_01_B_kolb.json`).
    pub const REPEAT_RUN_MARKER: &str = "B";
}

/// Constants used by column naming and the shared metadata block.
pub mod columns {
    use super::ColumnKey;

    /// Separator between column path segments (`dekker.overall.average_score`).
    pub const COLUMN_DELIMITER: &str = ".";
    /// Top-level payload key holding domain-independent metadata.
    pub const METADATA_BLOCK: ColumnKey = ColumnKey::new("metadata");
    /// Fixed leading column carrying the subject identifier.
    pub const SUBJECT_COLUMN: &str = "subject_id";
    /// Fixed leading column carrying the case identifier.
    pub const CASE_COLUMN: &str = "case_id";
    /// Fixed leading column carrying `subject_id + "_" + case_id`.
    pub const CASE_KEY_COLUMN: &str = "case_key";
    /// Fixed columns emitted before every discovered data column.
    pub const FIXED_COLUMNS: [&str; 3] = [SUBJECT_COLUMN, CASE_COLUMN, CASE_KEY_COLUMN];
}

/// Constants used by tab-separated output writers.
pub mod tsv {
    /// Field delimiter for every tabular output.
    pub const FIELD_DELIMITER: char = '\t';
    /// Quote character wrapping cells.
    pub const QUOTE: char = '"';
    /// Line terminator for every tabular output.
    pub const LINE_TERMINATOR: &str = "\n";
}

/// Constants used by score extraction and summary statistics.
pub mod scores {
    /// Lowest accepted score (inclusive).
    pub const SCORE_MIN: f64 = 0.0;
    /// Highest accepted score (inclusive).
    pub const SCORE_MAX: f64 = 10.0;
    /// Decimal places kept in reported statistics.
    pub const REPORT_DECIMALS: i32 = 2;
    /// Separator between domain name and metric label in metric keys.
    pub const METRIC_KEY_DELIMITER: &str = "_";
}

/// Constants used by the completeness report.
pub mod completeness {
    /// Report header, in column order.
    pub const REPORT_COLUMNS: [&str; 7] = [
        "subject_id",
        "case_id",
        "case_key",
        "domain",
        "issue_kind",
        "field",
        "description",
    ];
}

/// Constants used by corpus loading and default output layout.
pub mod corpus {
    /// Default directory scanned for analysis record files.
    pub const DEFAULT_INPUT_DIR: &str = "docs";
    /// Default tabular export path.
    pub const DEFAULT_EXPORT_PATH: &str = "data/analysis_records.tsv";
    /// Default statistics document path.
    pub const DEFAULT_STATISTICS_PATH: &str = "docs/statistics.json";
    /// Default distribution document path.
    pub const DEFAULT_DISTRIBUTION_PATH: &str = "docs/violin_data.json";
    /// Default completeness report path.
    pub const DEFAULT_COMPLETENESS_PATH: &str = "data/incomplete_cases_report.tsv";
    /// Log message used when unreadable records are skipped.
    pub const SKIP_UNREADABLE_MSG: &str = "skipping unreadable analysis file";
    /// Log message used when a file decodes to something other than an object.
    pub const SKIP_INVALID_MSG: &str = "skipping analysis file that is not a JSON object";
}
