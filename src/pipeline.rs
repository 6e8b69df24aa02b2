//! One batch run: load the corpus, then fan out to the four outputs.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::completeness::{CompletenessChecker, CompletenessReport};
use crate::config::PipelineConfig;
use crate::corpus::{Corpus, CorpusLoader, LoadStats};
use crate::data::{Case, CaseKey};
use crate::errors::CorpusError;
use crate::extract::DomainExtractor;
use crate::keys::RepeatRuns;
use crate::metrics::{DistributionDocument, StatisticsDocument};
use crate::table::SchemaUnionWriter;
use crate::transport::fs::write_file;

/// Counts reported after a successful run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Counters of the load pass.
    pub load: LoadStats,
    /// Rows written to the export (repeat runs excluded unless configured).
    pub exported_cases: usize,
    /// Data columns in the export, fixed columns excluded.
    pub exported_columns: usize,
    /// Metrics in the summary level.
    pub summary_metrics: usize,
    /// Metrics in the detailed level.
    pub detailed_metrics: usize,
    /// Rows written to the completeness report.
    pub completeness_issues: usize,
    /// Cases without any completeness issue.
    pub complete_cases: usize,
}

/// Everything a run derives from one loaded corpus, before any file is written.
#[derive(Debug)]
pub struct PipelineOutputs {
    /// Cached export rows and their column union.
    pub table: SchemaUnionWriter,
    /// Mean/deviation document.
    pub statistics: StatisticsDocument,
    /// Distribution document.
    pub distribution: DistributionDocument,
    /// Completeness gap report.
    pub completeness: CompletenessReport,
}

impl PipelineOutputs {
    /// Write the export TSV; returns the data row count.
    pub fn write_table<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, CorpusError> {
        self.table.write_tsv(writer)
    }

    /// Write the statistics document as pretty JSON.
    pub fn write_statistics<W: Write>(&self, writer: W) -> Result<(), CorpusError> {
        serde_json::to_writer_pretty(writer, &self.statistics)?;
        Ok(())
    }

    /// Write the distribution document as pretty JSON.
    pub fn write_distribution<W: Write>(&self, writer: W) -> Result<(), CorpusError> {
        serde_json::to_writer_pretty(writer, &self.distribution)?;
        Ok(())
    }

    /// Write the completeness TSV; returns the issue count.
    pub fn write_completeness<W: Write + ?Sized>(
        &self,
        writer: &mut W,
    ) -> Result<usize, CorpusError> {
        self.completeness.write_tsv(writer)
    }
}

/// Loads a record directory and produces the export, the two score documents,
/// and the completeness report.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Pipeline over `config`.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the configured input directory.
    ///
    /// Fails with [`CorpusError::EmptyCorpus`] when no case survives the
    /// repeat-run policy, so a corpus holding only repeat runs produces no
    /// output at all (the completeness report included).
    pub fn load(&self) -> Result<Corpus, CorpusError> {
        self.config.validate()?;
        let loader = CorpusLoader::new(self.config.key_parser())
            .with_follow_symlinks(self.config.follow_symlinks);
        let corpus = loader.load(&self.config.input_dir)?;
        if self.primary_cases(&corpus).next().is_none() {
            return Err(CorpusError::EmptyCorpus {
                path: self.config.input_dir.clone(),
            });
        }
        Ok(corpus)
    }

    /// Cases that feed the export and both score documents.
    pub fn primary_cases<'a>(
        &'a self,
        corpus: &'a Corpus,
    ) -> impl Iterator<Item = (&'a CaseKey, &'a Case)> + 'a {
        let parser = self.config.key_parser();
        let repeat_runs = self.config.repeat_runs;
        corpus.cases_where(move |key| {
            repeat_runs == RepeatRuns::Include || !parser.is_repeat_case(&key.case_id)
        })
    }

    /// Build every output in memory. `generated_at` stamps both documents.
    pub fn build(&self, corpus: &Corpus, generated_at: DateTime<Utc>) -> PipelineOutputs {
        let mut table = SchemaUnionWriter::new(
            DomainExtractor::new().with_derivations(self.config.derive_aggregates),
        );
        for (key, case) in self.primary_cases(corpus) {
            table.add_case(key, case);
        }
        let records = || {
            self.primary_cases(corpus)
                .flat_map(|(_, case)| case.records_in_domain_order())
        };

        PipelineOutputs {
            table,
            statistics: StatisticsDocument::build(records(), generated_at),
            distribution: DistributionDocument::build(records(), generated_at),
            completeness: CompletenessChecker::new()
                .with_expected_domains(&self.config.vocabulary)
                .check(corpus),
        }
    }

    /// Load, build, and write all four outputs.
    pub fn run(&self, generated_at: DateTime<Utc>) -> Result<RunSummary, CorpusError> {
        let corpus = self.load()?;
        let outputs = self.build(&corpus, generated_at);
        let paths = &self.config.outputs;

        let exported_cases = write_file(&paths.export, |writer| outputs.write_table(writer))?;
        write_file(&paths.statistics, |writer| outputs.write_statistics(writer))?;
        write_file(&paths.distribution, |writer| {
            outputs.write_distribution(writer)
        })?;
        let completeness_issues = write_file(&paths.completeness, |writer| {
            outputs.write_completeness(writer)
        })?;

        let summary = RunSummary {
            load: corpus.stats().clone(),
            exported_cases,
            exported_columns: outputs.table.universe().len(),
            summary_metrics: outputs.statistics.summary.len(),
            detailed_metrics: outputs.statistics.detailed.len(),
            completeness_issues,
            complete_cases: outputs.completeness.complete_cases(),
        };
        info!(
            "[pipeline:run] exported {} cases x {} columns to {}",
            summary.exported_cases,
            summary.exported_columns,
            paths.export.display()
        );
        info!(
            "[pipeline:run] {} summary / {} detailed metrics to {} and {}",
            summary.summary_metrics,
            summary.detailed_metrics,
            paths.statistics.display(),
            paths.distribution.display()
        );
        info!(
            "[pipeline:run] {} completeness issues ({} complete cases) to {}",
            summary.completeness_issues,
            summary.complete_cases,
            paths.completeness.display()
        );
        Ok(summary)
    }
}
