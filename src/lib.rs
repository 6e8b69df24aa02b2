#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// CLI runner behind the `analysis_corpus` binary.
pub mod apps;
/// Completeness report over expected domains and critical score fields.
pub mod completeness;
/// Pipeline run configuration.
pub mod config;
/// Centralized constants used across parsing, extraction, and outputs.
pub mod constants;
/// Directory loading into cases.
pub mod corpus;
/// Raw record and case types.
pub mod data;
/// Evaluation domains and vocabulary versions.
pub mod domain;
/// Per-domain flattening rules.
pub mod extract;
/// Filename key parsing.
pub mod keys;
/// Metadata block column helpers.
pub mod metadata;
/// Score extraction and summary statistics.
pub mod metrics;
/// End-to-end batch run.
pub mod pipeline;
/// Schema-union tabular export.
pub mod table;
/// Input/output transports (local filesystem).
pub mod transport;
/// Tab-separated record encoding.
pub mod tsv;
/// Shared type aliases.
pub mod types;
/// Value serialization and dotted-path lookup helpers.
pub mod utils;

mod errors;

pub use completeness::{CompletenessChecker, CompletenessReport, Issue, IssueKind};
pub use config::{OutputPaths, PipelineConfig};
pub use corpus::{Corpus, CorpusLoader, LoadFailure, LoadStats};
pub use data::{Case, CaseKey, RawRecord};
pub use domain::{Domain, VOCABULARY_V1, VOCABULARY_V2};
pub use errors::CorpusError;
pub use extract::{DomainExtractor, FlatRecord};
pub use keys::{FileKey, KeyParser, KeyRejection, RepeatRuns};
pub use metrics::{DetailLevel, DistributionDocument, MetricAggregator, StatisticsDocument};
pub use pipeline::{Pipeline, PipelineOutputs, RunSummary};
pub use table::{FlatRow, SchemaUnionWriter};
pub use types::{CaseId, CategoryId, CellValue, ColumnName, DomainName, MetricKey, SubjectId};
pub use utils::serialize_value;
