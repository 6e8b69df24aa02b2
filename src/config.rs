use std::path::{Path, PathBuf};

use crate::constants::corpus::{
    DEFAULT_COMPLETENESS_PATH, DEFAULT_DISTRIBUTION_PATH, DEFAULT_EXPORT_PATH, DEFAULT_INPUT_DIR,
    DEFAULT_STATISTICS_PATH,
};
use crate::domain::{Domain, VOCABULARY_V2};
use crate::errors::CorpusError;
use crate::keys::{KeyParser, RepeatRuns};

/// Where each pipeline output is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPaths {
    /// Schema-union TSV export.
    pub export: PathBuf,
    /// Mean/deviation statistics document.
    pub statistics: PathBuf,
    /// Distribution (box/violin) document.
    pub distribution: PathBuf,
    /// Completeness gap report.
    pub completeness: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            export: PathBuf::from(DEFAULT_EXPORT_PATH),
            statistics: PathBuf::from(DEFAULT_STATISTICS_PATH),
            distribution: PathBuf::from(DEFAULT_DISTRIBUTION_PATH),
            completeness: PathBuf::from(DEFAULT_COMPLETENESS_PATH),
        }
    }
}

impl OutputPaths {
    /// Default file names placed under one directory.
    pub fn under(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let name = |path: &str| {
            Path::new(path)
                .file_name()
                .map(|name| dir.join(name))
                .unwrap_or_else(|| dir.join(path))
        };
        Self {
            export: name(DEFAULT_EXPORT_PATH),
            statistics: name(DEFAULT_STATISTICS_PATH),
            distribution: name(DEFAULT_DISTRIBUTION_PATH),
            completeness: name(DEFAULT_COMPLETENESS_PATH),
        }
    }
}

/// Run configuration for one pipeline pass.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Directory scanned for record files.
    pub input_dir: PathBuf,
    /// Destinations of the four outputs.
    pub outputs: OutputPaths,
    /// Declared domain vocabulary; also the domains every case must hold.
    pub vocabulary: Vec<Domain>,
    /// Whether repeat-run cases reach the export and the statistics.
    /// Completeness always sees them.
    pub repeat_runs: RepeatRuns,
    /// Fill derived aggregate columns in the export.
    pub derive_aggregates: bool,
    /// Follow symlinks while scanning the input directory.
    pub follow_symlinks: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            outputs: OutputPaths::default(),
            vocabulary: VOCABULARY_V2.to_vec(),
            repeat_runs: RepeatRuns::Exclude,
            derive_aggregates: true,
            follow_symlinks: false,
        }
    }
}

impl PipelineConfig {
    /// Defaults over `input_dir`.
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            ..Self::default()
        }
    }

    /// Override all output destinations.
    pub fn with_outputs(mut self, outputs: OutputPaths) -> Self {
        self.outputs = outputs;
        self
    }

    /// Override the declared domain vocabulary.
    pub fn with_vocabulary(mut self, vocabulary: &[Domain]) -> Self {
        self.vocabulary = vocabulary.to_vec();
        self
    }

    /// Include or exclude repeat-run cases from export and statistics.
    pub fn with_repeat_runs(mut self, repeat_runs: RepeatRuns) -> Self {
        self.repeat_runs = repeat_runs;
        self
    }

    /// Enable or disable derived aggregate columns.
    pub fn with_derived_aggregates(mut self, derive_aggregates: bool) -> Self {
        self.derive_aggregates = derive_aggregates;
        self
    }

    /// Configure symlink traversal of the input directory.
    pub fn with_follow_symlinks(mut self, follow_symlinks: bool) -> Self {
        self.follow_symlinks = follow_symlinks;
        self
    }

    /// Parser used for loading; repeat runs always resolve so completeness
    /// can see them, and are filtered later according to `repeat_runs`.
    pub fn key_parser(&self) -> KeyParser {
        KeyParser::new()
            .with_vocabulary(&self.vocabulary)
            .with_repeat_runs(RepeatRuns::Include)
    }

    /// Reject configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), CorpusError> {
        if self.vocabulary.is_empty() {
            return Err(CorpusError::Configuration(
                "domain vocabulary must not be empty".to_string(),
            ));
        }
        let outputs = [
            &self.outputs.export,
            &self.outputs.statistics,
            &self.outputs.distribution,
            &self.outputs.completeness,
        ];
        for (idx, path) in outputs.iter().enumerate() {
            if outputs[..idx].contains(path) {
                return Err(CorpusError::Configuration(format!(
                    "output path '{}' is used for more than one output",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}
