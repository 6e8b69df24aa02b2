//! Gap report: missing domain files, missing critical score fields, unreadable files.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::Write;

use serde::Serialize;
use tracing::info;

use crate::constants::completeness::REPORT_COLUMNS;
use crate::corpus::Corpus;
use crate::data::CaseKey;
use crate::domain::Domain;
use crate::errors::CorpusError;
use crate::tsv::{Quoting, write_record};
use crate::types::{CaseId, DomainName, SubjectId};
use crate::utils::{is_blank, lookup_path};

/// A score field every record of a domain must carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CriticalField {
    /// Synonym dotted paths; the field is present if any of them is non-blank.
    pub paths: &'static [&'static str],
    /// Short name written to the report's `field` column.
    pub field: &'static str,
}

const fn critical(paths: &'static [&'static str], field: &'static str) -> CriticalField {
    CriticalField { paths, field }
}

const ARISTOTELES: &[CriticalField] = &[
    critical(&["aristotelian_modes_analysis.logos.score"], "logos.score"),
    critical(&["aristotelian_modes_analysis.pathos.score"], "pathos.score"),
    critical(&["aristotelian_modes_analysis.ethos.score"], "ethos.score"),
    critical(&["overall_picture.overall_rhetorical_score"], "overall.score"),
];

// The average is derived from the criteria, so one criterion stands in for it.
const DEKKER: &[CriticalField] = &[critical(
    &[
        "analysis_per_criterion.1_specific_bible_passage.score_1_to_10",
        "analysis_per_criterion.criterion_1_specific_bible_passage.score_1_to_10",
    ],
    "specific_bible_passage.score",
)];

const KOLB: &[CriticalField] = &[
    critical(
        &["kolb_phases_analysis.phase_1_concrete_experience.score"],
        "concrete_experience.score",
    ),
    critical(
        &["kolb_phases_analysis.phase_2_reflective_observation.score"],
        "reflective_observation.score",
    ),
    critical(
        &["kolb_phases_analysis.phase_3_abstract_conceptualization.score"],
        "abstract_conceptualization.score",
    ),
    critical(
        &["kolb_phases_analysis.phase_4_active_experimentation.score"],
        "active_experimentation.score",
    ),
    critical(&["overall_picture.overall_kolb_score"], "overall.score"),
];

const SCHULZ_VON_THUN: &[CriticalField] = &[
    critical(
        &["schulz_von_thun_analysis.factual_content_blue.score"],
        "factual_content.score",
    ),
    critical(
        &["schulz_von_thun_analysis.self_revelation_green.score"],
        "self_revelation.score",
    ),
    critical(
        &["schulz_von_thun_analysis.relational_aspect_yellow.score"],
        "relational_aspect.score",
    ),
    critical(
        &["schulz_von_thun_analysis.appeal_aspect_red.score"],
        "appeal_aspect.score",
    ),
    critical(
        &["overall_picture.overall_communication_score"],
        "overall.score",
    ),
];

const ESTHETIEK: &[CriticalField] = &[critical(
    &["overall_aesthetics.overall_aesthetic_score"],
    "overall.score",
)];

const TRANSACTIONAL: &[CriticalField] = &[critical(
    &["conclusion_and_recommendation.psychological_health_score"],
    "overall.score",
)];

const METAPHOR: &[CriticalField] = &[critical(
    &["diagnostische_evaluatie.coherentie_analyse.overall_coherentie"],
    "coherentie.overall",
)];

const SPEECH_ACT: &[CriticalField] = &[
    critical(
        &["drievoudige_structuur_analyse.illocutie.helderheid_score"],
        "illocutie.helderheid_score",
    ),
    critical(
        &["diagnostische_evaluatie.gebeuren_score"],
        "diagnose.gebeuren_score",
    ),
];

const NARRATIVE: &[CriticalField] = &[critical(
    &["diagnostische_evaluatie.narratieve_coherentie.coherentie_score"],
    "coherentie.score",
)];

/// Critical fields checked for a domain's records.
pub fn critical_fields(domain: Domain) -> &'static [CriticalField] {
    match domain {
        Domain::Aristoteles => ARISTOTELES,
        Domain::Dekker => DEKKER,
        Domain::Kolb => KOLB,
        Domain::SchulzVonThun => SCHULZ_VON_THUN,
        Domain::Esthetiek => ESTHETIEK,
        Domain::Transactional => TRANSACTIONAL,
        Domain::Metaphor => METAPHOR,
        Domain::SpeechAct => SPEECH_ACT,
        Domain::Narrative => NARRATIVE,
    }
}

/// Category of one completeness issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// An expected domain file is absent.
    MissingFile,
    /// A critical score field is absent or empty.
    MissingField,
    /// The domain file exists but could not be loaded.
    ReadError,
}

impl IssueKind {
    /// Name written to the report's `issue_kind` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            IssueKind::MissingFile => "missing_file",
            IssueKind::MissingField => "missing_field",
            IssueKind::ReadError => "read_error",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the completeness report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Subject of the affected case.
    pub subject_id: SubjectId,
    /// Case identifier of the affected case.
    pub case_id: CaseId,
    /// Domain the issue belongs to.
    pub domain: DomainName,
    /// Issue category.
    pub kind: IssueKind,
    /// Critical field name for `missing_field`, empty otherwise.
    pub field: String,
    /// Human-readable explanation.
    pub description: String,
}

impl Issue {
    fn new(key: &CaseKey, domain: Domain, kind: IssueKind, field: &str, description: String) -> Self {
        Self {
            subject_id: key.subject_id.clone(),
            case_id: key.case_id.clone(),
            domain: domain.as_str().to_string(),
            kind,
            field: field.to_string(),
            description,
        }
    }

    /// `subject_id + "_" + case_id`.
    pub fn case_key(&self) -> String {
        format!("{}_{}", self.subject_id, self.case_id)
    }
}

/// What the checker observed for one expected domain of one case.
enum Observation<'a> {
    Missing,
    Loaded(&'a serde_json::Value),
    Failed(&'a str),
}

/// Cross-references expected domains with what each case actually holds.
#[derive(Clone, Debug)]
pub struct CompletenessChecker {
    expected: Vec<Domain>,
}

impl Default for CompletenessChecker {
    fn default() -> Self {
        Self {
            expected: Domain::ALL.to_vec(),
        }
    }
}

impl CompletenessChecker {
    /// Checker expecting every declared domain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the domains every case must hold (order is report order).
    pub fn with_expected_domains(mut self, expected: &[Domain]) -> Self {
        self.expected = expected.to_vec();
        self
    }

    /// Domains every case must hold, in report order.
    pub fn expected_domains(&self) -> &[Domain] {
        &self.expected
    }

    /// Check every case that has at least one expected-domain file.
    ///
    /// Files that failed to load still make their case known and are reported
    /// as `read_error` instead of `missing_file`.
    pub fn check(&self, corpus: &Corpus) -> CompletenessReport {
        let mut failures: BTreeMap<CaseKey, BTreeMap<&str, &str>> = BTreeMap::new();
        for failure in corpus.failures() {
            failures
                .entry(CaseKey::from(&failure.key))
                .or_default()
                .insert(failure.key.domain.as_str(), failure.reason.as_str());
        }

        let mut keys: BTreeSet<CaseKey> = BTreeSet::new();
        for (key, case) in corpus.cases() {
            if self.expected.iter().any(|domain| case.get(domain.as_str()).is_some()) {
                keys.insert(key.clone());
            }
        }
        for (key, domains) in &failures {
            if self
                .expected
                .iter()
                .any(|domain| domains.contains_key(domain.as_str()))
            {
                keys.insert(key.clone());
            }
        }

        let mut issues = Vec::new();
        for key in &keys {
            for &domain in &self.expected {
                let observation = match corpus
                    .cases()
                    .get(key)
                    .and_then(|case| case.get(domain.as_str()))
                {
                    Some(record) => Observation::Loaded(&record.payload),
                    None => match failures.get(key).and_then(|f| f.get(domain.as_str())) {
                        Some(reason) => Observation::Failed(*reason),
                        None => Observation::Missing,
                    },
                };
                match observation {
                    Observation::Missing => issues.push(Issue::new(
                        key,
                        domain,
                        IssueKind::MissingFile,
                        "",
                        format!("File {}_{}.json does not exist", key.case_key(), domain),
                    )),
                    Observation::Failed(reason) => issues.push(Issue::new(
                        key,
                        domain,
                        IssueKind::ReadError,
                        "",
                        format!("Error reading file: {reason}"),
                    )),
                    Observation::Loaded(payload) => {
                        for critical in critical_fields(domain) {
                            let present = critical
                                .paths
                                .iter()
                                .any(|path| !is_blank(lookup_path(payload, path)));
                            if !present {
                                issues.push(Issue::new(
                                    key,
                                    domain,
                                    IssueKind::MissingField,
                                    critical.field,
                                    format!("Field {} is missing or empty", critical.paths[0]),
                                ));
                            }
                        }
                    }
                }
            }
        }

        let report = CompletenessReport {
            cases_checked: keys.len(),
            issues,
        };
        info!(
            "[completeness:check] {} cases checked, {} complete, {} issues",
            report.cases_checked,
            report.complete_cases(),
            report.issues.len()
        );
        report
    }
}

/// Issues found by one check, in case then declared-domain order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CompletenessReport {
    /// Cases inspected, repeat runs included.
    pub cases_checked: usize,
    /// Issues in `(subject_id, case_id)` then domain order.
    pub issues: Vec<Issue>,
}

impl CompletenessReport {
    /// True when no issue was found.
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issue totals per kind.
    pub fn counts_by_kind(&self) -> BTreeMap<IssueKind, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct cases with at least one issue.
    pub fn affected_cases(&self) -> usize {
        self.issues
            .iter()
            .map(|issue| (&issue.subject_id, &issue.case_id))
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// `subject -> (issues, affected cases)`.
    pub fn by_subject(&self) -> BTreeMap<SubjectId, (usize, usize)> {
        let mut grouped: BTreeMap<SubjectId, (usize, BTreeSet<&str>)> = BTreeMap::new();
        for issue in &self.issues {
            let entry = grouped.entry(issue.subject_id.clone()).or_default();
            entry.0 += 1;
            entry.1.insert(issue.case_id.as_str());
        }
        grouped
            .into_iter()
            .map(|(subject, (issues, cases))| (subject, (issues, cases.len())))
            .collect()
    }

    /// Checked cases without any issue.
    pub fn complete_cases(&self) -> usize {
        self.cases_checked.saturating_sub(self.affected_cases())
    }

    /// Header plus one row per issue; returns the number of issue rows.
    pub fn write_tsv<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, CorpusError> {
        write_record(writer, REPORT_COLUMNS, Quoting::Minimal)?;
        for issue in &self.issues {
            let case_key = issue.case_key();
            write_record(
                writer,
                [
                    issue.subject_id.as_str(),
                    issue.case_id.as_str(),
                    case_key.as_str(),
                    issue.domain.as_str(),
                    issue.kind.as_str(),
                    issue.field.as_str(),
                    issue.description.as_str(),
                ],
                Quoting::Minimal,
            )?;
        }
        Ok(self.issues.len())
    }
}
