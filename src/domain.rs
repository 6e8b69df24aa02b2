//! The closed set of evaluation domains and their versioned vocabulary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One evaluation rubric applied to every case.
///
/// Variant order is the declared vocabulary order. Filename parsing breaks
/// ties in this order and cases iterate their records in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Aristotelian modes of persuasion.
    Aristoteles,
    /// Dekker sermon criteria.
    Dekker,
    /// Kolb learning cycle.
    Kolb,
    /// Schulz von Thun four-sides model.
    SchulzVonThun,
    /// Aesthetic evaluation.
    Esthetiek,
    /// Transactional analysis.
    Transactional,
    /// Metaphor analysis.
    Metaphor,
    /// Speech act analysis.
    SpeechAct,
    /// Narrative analysis.
    Narrative,
}

/// First vocabulary: the six rubric domains of the initial corpus.
pub const VOCABULARY_V1: &[Domain] = &[
    Domain::Aristoteles,
    Domain::Dekker,
    Domain::Kolb,
    Domain::SchulzVonThun,
    Domain::Esthetiek,
    Domain::Transactional,
];

/// Current vocabulary: adds the metaphor, speech-act, and narrative domains.
pub const VOCABULARY_V2: &[Domain] = &[
    Domain::Aristoteles,
    Domain::Dekker,
    Domain::Kolb,
    Domain::SchulzVonThun,
    Domain::Esthetiek,
    Domain::Transactional,
    Domain::Metaphor,
    Domain::SpeechAct,
    Domain::Narrative,
];

impl Domain {
    /// Every domain in declared order.
    pub const ALL: &'static [Domain] = VOCABULARY_V2;

    /// Canonical filename spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Domain::Aristoteles => "aristoteles",
            Domain::Dekker => "dekker",
            Domain::Kolb => "kolb",
            Domain::SchulzVonThun => "schulz_von_thun",
            Domain::Esthetiek => "esthetiek",
            Domain::Transactional => "transactional",
            Domain::Metaphor => "metaphor",
            Domain::SpeechAct => "speech_act",
            Domain::Narrative => "narrative",
        }
    }

    /// Resolve a filename spelling; unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Domain> {
        Domain::ALL
            .iter()
            .copied()
            .find(|domain| domain.as_str() == name)
    }

    /// Number of filename tokens the domain name spans.
    pub fn token_count(self) -> usize {
        self.as_str().split('_').count()
    }

    /// Position in the declared vocabulary.
    pub fn rank(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort key for raw domain names: declared domains first in vocabulary order,
/// then unknown names lexicographically.
pub fn domain_order_key(name: &str) -> (usize, &str) {
    match Domain::from_name(name) {
        Some(domain) => (domain.rank(), ""),
        None => (Domain::ALL.len(), name),
    }
}
