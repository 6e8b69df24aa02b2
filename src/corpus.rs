//! Directory loading: filenames to keys, files to payloads, payloads to cases.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::constants::corpus::{SKIP_INVALID_MSG, SKIP_UNREADABLE_MSG};
use crate::data::{Case, CaseKey, RawRecord, unwrap_record_payload};
use crate::errors::CorpusError;
use crate::keys::{FileKey, KeyParser};
use crate::transport::fs::{DirectoryScan, file_name, read_text};
use crate::types::SubjectId;

/// Counters describing one load pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Regular files found in the input directory.
    pub files_seen: usize,
    /// Records decoded and grouped into cases.
    pub loaded: usize,
    /// Files whose names do not resolve to a record key.
    pub unparseable_names: usize,
    /// Loaded records belonging to repeat-run cases.
    pub repeat_run_records: usize,
    /// Files that could not be read or decoded.
    pub read_failures: usize,
    /// Files that decoded to something other than a record object.
    pub invalid_structures: usize,
    /// Filenames matching more than one declared domain name.
    pub ambiguous_names: usize,
}

/// Why a keyed file produced no record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The file could not be read.
    Read,
    /// The file is not valid JSON.
    Decode,
    /// The JSON is neither an object nor a one-object array.
    InvalidStructure,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::Read => "read",
            FailureKind::Decode => "decode",
            FailureKind::InvalidStructure => "invalid_structure",
        })
    }
}

/// A file that resolved to a key but could not be loaded.
///
/// `reason` never contains the path, so reports stay independent of where
/// the corpus lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    /// File that failed.
    pub path: PathBuf,
    /// Key parsed from its name.
    pub key: FileKey,
    /// Failure category.
    pub kind: FailureKind,
    /// Underlying error message.
    pub reason: String,
}

/// All records of one input directory, grouped by case.
#[derive(Clone, Debug, Default)]
pub struct Corpus {
    root: PathBuf,
    cases: BTreeMap<CaseKey, Case>,
    failures: Vec<LoadFailure>,
    stats: LoadStats,
}

impl Corpus {
    /// Directory the corpus was loaded from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Cases in `(subject_id, case_id)` order.
    pub fn cases(&self) -> &BTreeMap<CaseKey, Case> {
        &self.cases
    }

    /// Keyed files that produced no record, in scan order.
    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    /// Counters of the load pass.
    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    /// True when no record loaded.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Every loaded record, cases in order, domains in declared order.
    pub fn records(&self) -> impl Iterator<Item = &RawRecord> {
        self.cases
            .values()
            .flat_map(|case| case.records_in_domain_order())
    }

    /// Sorted distinct subjects with at least one loaded record.
    pub fn subjects(&self) -> Vec<SubjectId> {
        let mut subjects: Vec<SubjectId> = self
            .cases
            .keys()
            .map(|key| key.subject_id.clone())
            .collect();
        subjects.dedup();
        subjects
    }

    /// Cases `keep` accepts, borrowed in `(subject_id, case_id)` order.
    pub fn cases_where<F>(&self, mut keep: F) -> impl Iterator<Item = (&CaseKey, &Case)>
    where
        F: FnMut(&CaseKey) -> bool,
    {
        self.cases.iter().filter(move |(key, _)| keep(key))
    }

    /// Add a decoded record; returns the record it replaced, if any.
    pub fn insert(&mut self, record: RawRecord) -> Option<RawRecord> {
        self.cases
            .entry(CaseKey::from(&record.key))
            .or_default()
            .insert(record)
    }

    /// Register a keyed file that failed to load.
    pub fn push_failure(&mut self, failure: LoadFailure) {
        self.failures.push(failure);
    }
}

/// Loads every record file of one directory level.
#[derive(Clone, Debug, Default)]
pub struct CorpusLoader {
    parser: KeyParser,
    follow_links: bool,
}

impl CorpusLoader {
    /// Loader resolving names with `parser`.
    pub fn new(parser: KeyParser) -> Self {
        Self {
            parser,
            follow_links: false,
        }
    }

    /// Configure symlink traversal.
    pub fn with_follow_symlinks(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Filename parser in use.
    pub fn parser(&self) -> &KeyParser {
        &self.parser
    }

    /// Scan `root` and load every file whose name resolves to a key.
    ///
    /// Per-file failures are logged, counted, and kept as [`LoadFailure`]s;
    /// only a missing directory fails the whole load.
    pub fn load(&self, root: impl AsRef<Path>) -> Result<Corpus, CorpusError> {
        let root = root.as_ref();
        let files = DirectoryScan::new(root)
            .with_follow_symlinks(self.follow_links)
            .files()?;

        let mut corpus = Corpus {
            root: root.to_path_buf(),
            ..Corpus::default()
        };
        corpus.stats.files_seen = files.len();

        for path in files {
            let Some(name) = file_name(&path) else {
                corpus.stats.unparseable_names += 1;
                continue;
            };
            let key = match self.parser.classify(name) {
                Ok(key) => key,
                Err(rejection) => {
                    debug!("[corpus:load] ignoring {} ({:?})", path.display(), rejection);
                    corpus.stats.unparseable_names += 1;
                    continue;
                }
            };
            if self.parser.is_ambiguous(name) {
                corpus.stats.ambiguous_names += 1;
                warn!(
                    "[corpus:load] {} matches several domain names; resolved as domain '{}'",
                    name, key.domain
                );
            }
            match self.load_file(&path, &key) {
                Ok(payload) => {
                    if self.parser.is_repeat_case(&key.case_id) {
                        corpus.stats.repeat_run_records += 1;
                    }
                    corpus.stats.loaded += 1;
                    corpus.insert(RawRecord::new(key, payload));
                }
                Err(err) => {
                    let (kind, reason) = match &err {
                        CorpusError::Read { source, .. } => (FailureKind::Read, source.to_string()),
                        CorpusError::Decode { source, .. } => {
                            (FailureKind::Decode, source.to_string())
                        }
                        CorpusError::InvalidRecord { details, .. } => {
                            (FailureKind::InvalidStructure, details.clone())
                        }
                        other => (FailureKind::Read, other.to_string()),
                    };
                    if kind == FailureKind::InvalidStructure {
                        corpus.stats.invalid_structures += 1;
                        warn!("[corpus:load] {}: {}", SKIP_INVALID_MSG, err);
                    } else {
                        corpus.stats.read_failures += 1;
                        warn!("[corpus:load] {}: {}", SKIP_UNREADABLE_MSG, err);
                    }
                    corpus.push_failure(LoadFailure {
                        path,
                        key,
                        kind,
                        reason,
                    });
                }
            }
        }

        info!(
            "[corpus:load] {} files in {}: loaded={} cases={} unparseable={} failed={} invalid={}",
            corpus.stats.files_seen,
            root.display(),
            corpus.stats.loaded,
            corpus.cases.len(),
            corpus.stats.unparseable_names,
            corpus.stats.read_failures,
            corpus.stats.invalid_structures
        );
        Ok(corpus)
    }

    fn load_file(&self, path: &Path, key: &FileKey) -> Result<serde_json::Value, CorpusError> {
        let text = read_text(path)?;
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|source| CorpusError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        let payload = unwrap_record_payload(value).map_err(|details| CorpusError::InvalidRecord {
            path: path.to_path_buf(),
            details,
        })?;
        debug!("[corpus:load] loaded {} as {}", path.display(), key.domain);
        Ok(payload)
    }
}
