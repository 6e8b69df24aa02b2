//! Per-domain score rules feeding the statistics documents.
//!
//! Scores are read from the raw payload, not from the flattened export, so
//! derived aggregates never enter the statistics.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::scores::METRIC_KEY_DELIMITER;
use crate::domain::Domain;
use crate::types::MetricKey;
use crate::utils::{as_number, lookup_first, lookup_path, score_in_range};

/// Which metric subset to compute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailLevel {
    /// Headline metrics only.
    Summary,
    /// Headline metrics plus sub-criteria.
    Detailed,
}

/// How a candidate score must look before it is range-checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    /// Non-zero; a literal `0` counts as "not scored".
    Truthy,
    /// Any number, zero included.
    NotNull,
}

impl Presence {
    fn accepts(self, value: &Value) -> Option<f64> {
        let score = as_number(value)?;
        if self == Presence::Truthy && score == 0.0 {
            return None;
        }
        score_in_range(score).then_some(score)
    }
}

/// Detail levels a rule contributes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Levels {
    /// Summary and detailed documents.
    Both,
    /// Summary document only.
    SummaryOnly,
    /// Detailed document only.
    DetailedOnly,
}

impl Levels {
    fn includes(self, level: DetailLevel) -> bool {
        matches!(
            (self, level),
            (Levels::Both, _)
                | (Levels::SummaryOnly, DetailLevel::Summary)
                | (Levels::DetailedOnly, DetailLevel::Detailed)
        )
    }
}

/// Display label derived from a dynamic child key.
#[derive(Clone, Copy, Debug)]
pub enum ChildLabel {
    /// `criterion_1_specific_bible_passage` -> `#1 specific bible passage`.
    Numbered,
    /// `criterion_a1_imagery` -> `Imagery`, stripping markers of one section letter.
    Titled(&'static LazyLock<Regex>),
}

impl ChildLabel {
    /// Display label for a child key.
    pub fn label(self, key: &str) -> String {
        match self {
            ChildLabel::Numbered => numbered_label(key),
            ChildLabel::Titled(marker) => {
                let stripped = marker.replace_all(key, "");
                title_case(&stripped.replace('_', " "))
            }
        }
    }
}

/// One score extraction rule.
#[derive(Clone, Copy, Debug)]
pub enum ScoreRule {
    /// A single dotted path under a fixed label.
    Fixed {
        /// Dotted path of the score.
        path: &'static str,
        /// Metric label after the domain prefix.
        label: &'static str,
        /// Documents the metric appears in.
        levels: Levels,
    },
    /// Every object child of `path`, scored by the first present key.
    EachChild {
        /// Dotted path of the parent object.
        path: &'static str,
        /// Score keys tried in order on each child.
        keys: &'static [&'static str],
        /// Which scores count as present.
        presence: Presence,
        /// Label derived from the child key.
        label: ChildLabel,
        /// Documents the metrics appear in.
        levels: Levels,
    },
}

const fn both(path: &'static str, label: &'static str) -> ScoreRule {
    ScoreRule::Fixed {
        path,
        label,
        levels: Levels::Both,
    }
}

const fn detailed(path: &'static str, label: &'static str) -> ScoreRule {
    ScoreRule::Fixed {
        path,
        label,
        levels: Levels::DetailedOnly,
    }
}

const fn summary(path: &'static str, label: &'static str) -> ScoreRule {
    ScoreRule::Fixed {
        path,
        label,
        levels: Levels::SummaryOnly,
    }
}

static POETICS_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"criterion_a\d+_").expect("valid poetics marker pattern"));
static DRAMATURGY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"criterion_b\d+_").expect("valid dramaturgy marker pattern"));

static ARISTOTELES: &[ScoreRule] = &[
    both("aristotelian_modes_analysis.logos.score", "Logos"),
    both("aristotelian_modes_analysis.pathos.score", "Pathos"),
    both("aristotelian_modes_analysis.ethos.score", "Ethos"),
    both("overall_picture.overall_rhetorical_score", "Overall"),
    detailed("rhetorical_balance_analysis.balance_score", "Balance Score"),
];

static DEKKER: &[ScoreRule] = &[ScoreRule::EachChild {
    path: "analysis_per_criterion",
    keys: &["score_1_to_10", "score"],
    presence: Presence::Truthy,
    label: ChildLabel::Numbered,
    levels: Levels::Both,
}];

static KOLB: &[ScoreRule] = &[
    both("kolb_phases_analysis.phase_1_concrete_experience.score", "Concrete Experience"),
    both("kolb_phases_analysis.phase_2_reflective_observation.score", "Reflective Observation"),
    both(
        "kolb_phases_analysis.phase_3_abstract_conceptualization.score",
        "Abstract Conceptualization",
    ),
    both("kolb_phases_analysis.phase_4_active_experimentation.score", "Active Experimentation"),
    detailed("learning_styles_analysis.dreamer.score", "Dreamer"),
    detailed("learning_styles_analysis.thinker.score", "Thinker"),
    detailed("learning_styles_analysis.doer.score", "Doer"),
    detailed("learning_styles_analysis.decider.score", "Decider"),
    detailed("learning_styles_analysis.assimilating_style.score", "Assimilating"),
    detailed("learning_styles_analysis.converging_style.score", "Converging"),
    detailed("learning_styles_analysis.accommodating_style.score", "Accommodating"),
    detailed("learning_styles_analysis.diverging_style.score", "Diverging"),
    detailed("integrality_and_cycle.cycle_completeness.score", "Cycle Completeness"),
    detailed("integrality_and_cycle.balance_between_phases.score", "Balance Between Phases"),
    detailed("integrality_and_cycle.holistic_learning.score", "Holistic Learning"),
    both("overall_picture.overall_kolb_score", "Overall"),
];

static SCHULZ_VON_THUN: &[ScoreRule] = &[
    both("schulz_von_thun_analysis.factual_content_blue.score", "Factual Content"),
    both("schulz_von_thun_analysis.self_revelation_green.score", "Self-Revelation"),
    both("schulz_von_thun_analysis.relational_aspect_yellow.score", "Relational Aspect"),
    both("schulz_von_thun_analysis.appeal_aspect_red.score", "Appeal Aspect"),
    both("overall_picture.overall_communication_score", "Overall"),
];

static ESTHETIEK: &[ScoreRule] = &[
    ScoreRule::EachChild {
        path: "domain_a_poetics_of_language",
        keys: &["score"],
        presence: Presence::NotNull,
        label: ChildLabel::Titled(&POETICS_MARKER),
        levels: Levels::DetailedOnly,
    },
    ScoreRule::EachChild {
        path: "domain_b_dramaturgy_of_structure",
        keys: &["score"],
        presence: Presence::NotNull,
        label: ChildLabel::Titled(&DRAMATURGY_MARKER),
        levels: Levels::DetailedOnly,
    },
    detailed("kitsch_diagnosis.anti_kitsch_score", "Anti-Kitsch"),
    detailed("space_for_grace_analysis.space_score", "Space for Grace"),
    summary("domain_a_poetics_of_language.average_score_language", "Poetics"),
    summary("domain_b_dramaturgy_of_structure.average_score_structure", "Dramaturgy"),
    both("overall_aesthetics.overall_aesthetic_score", "Overall"),
];

static TRANSACTIONAL: &[ScoreRule] = &[
    both(
        "ego_positions_scan.parent.freedom_from_critical_parent_CP.score",
        "Freedom from Critical Parent",
    ),
    both("ego_positions_scan.parent.healthy_care_NP.score", "Nurturing Parent"),
    both("ego_positions_scan.adult.score", "Adult Presence"),
    both(
        "ego_positions_scan.child.freedom_from_adapted_child_AC.score",
        "Freedom from Adapted Child",
    ),
    both("ego_positions_scan.child.free_child_FC.score", "Free Child"),
    both("transaction_analysis.communicative_purity_score", "Communicative Purity"),
    both("conclusion_and_recommendation.psychological_health_score", "Overall"),
];

static METAPHOR: &[ScoreRule] = &[both(
    "diagnostische_evaluatie.coherentie_analyse.overall_coherentie",
    "Coherence",
)];

static SPEECH_ACT: &[ScoreRule] = &[
    both(
        "drievoudige_structuur_analyse.illocutie.helderheid_score",
        "Illocution Clarity",
    ),
    both("diagnostische_evaluatie.gebeuren_score", "Event"),
];

static NARRATIVE: &[ScoreRule] = &[both(
    "diagnostische_evaluatie.narratieve_coherentie.coherentie_score",
    "Coherence",
)];

/// Score rules bound to a domain.
pub fn score_rules(domain: Domain) -> &'static [ScoreRule] {
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

/// `<domain>_<label>`.
pub fn metric_key(domain: Domain, label: &str) -> MetricKey {
    format!("{}{}{}", domain.as_str(), METRIC_KEY_DELIMITER, label)
}

/// Valid scores of one payload at one detail level, keyed by metric.
///
/// A label produced twice keeps the later score. Unknown domains and
/// non-object payloads yield nothing.
pub fn extract_scores(payload: &Value, domain: &str, level: DetailLevel) -> IndexMap<MetricKey, f64> {
    let mut scores = IndexMap::new();
    let Some(domain) = Domain::from_name(domain) else {
        return scores;
    };
    if !payload.is_object() {
        return scores;
    }
    for rule in score_rules(domain) {
        match *rule {
            ScoreRule::Fixed {
                path,
                label,
                levels,
            } => {
                if !levels.includes(level) {
                    continue;
                }
                if let Some(score) =
                    lookup_path(payload, path).and_then(|value| Presence::Truthy.accepts(value))
                {
                    scores.insert(metric_key(domain, label), score);
                }
            }
            ScoreRule::EachChild {
                path,
                keys,
                presence,
                label,
                levels,
            } => {
                if !levels.includes(level) {
                    continue;
                }
                let Some(Value::Object(children)) = lookup_path(payload, path) else {
                    continue;
                };
                for (key, child) in children {
                    if !child.is_object() {
                        continue;
                    }
                    if let Some(score) =
                        lookup_first(child, keys).and_then(|value| presence.accepts(value))
                    {
                        scores.insert(metric_key(domain, &label.label(key)), score);
                    }
                }
            }
        }
    }
    scores
}

/// `criterion_3_concrete_concrete_language` -> `#3 concrete language`.
fn numbered_label(key: &str) -> String {
    let name = key
        .replace("concrete_concrete", "concrete")
        .replace("criterion_", "")
        .replace('_', " ");
    match name.split_once(' ') {
        Some((head, rest)) if is_ascii_number(head) => format!("#{head} {rest}"),
        None if is_ascii_number(&name) => format!("#{name}"),
        _ => name,
    }
}

fn is_ascii_number(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|ch| ch.is_ascii_digit())
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut titled = String::with_capacity(text.len());
    let mut in_word = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                titled.extend(ch.to_lowercase());
            } else {
                titled.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            titled.push(ch);
            in_word = false;
        }
    }
    titled
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_and_out_of_range_scores_are_dropped() {
        let payload = json!({
            "aristotelian_modes_analysis": {
                "logos": {"score": 0},
                "pathos": {"score": 11},
                "ethos": {"score": "8"}
            },
            "overall_picture": {"overall_rhetorical_score": 7.5}
        });
        let scores = extract_scores(&payload, "aristoteles", DetailLevel::Summary);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores["aristoteles_Overall"], 7.5);
    }

    #[test]
    fn detail_levels_select_different_rule_subsets() {
        let payload = json!({
            "rhetorical_balance_analysis": {"balance_score": 6},
            "overall_picture": {"overall_rhetorical_score": 7}
        });
        let summary = extract_scores(&payload, "aristoteles", DetailLevel::Summary);
        let detailed = extract_scores(&payload, "aristoteles", DetailLevel::Detailed);
        assert!(!summary.contains_key("aristoteles_Balance Score"));
        assert_eq!(detailed["aristoteles_Balance Score"], 6.0);
        assert_eq!(summary["aristoteles_Overall"], detailed["aristoteles_Overall"]);
    }

    #[test]
    fn dekker_labels_are_numbered() {
        let payload = json!({
            "analysis_per_criterion": {
                "criterion_1_specific_bible_passage": {"score_1_to_10": 8},
                "criterion_3_concrete_concrete_language": {"score": 6},
                "criterion_4_unscored": {"score_1_to_10": 0},
                "remarks": "text"
            }
        });
        let scores = extract_scores(&payload, "dekker", DetailLevel::Summary);
        assert_eq!(scores["dekker_#1 specific bible passage"], 8.0);
        assert_eq!(scores["dekker_#3 concrete language"], 6.0);
        assert_eq!(scores.len(), 2);
    }

    #[test]
    fn esthetiek_detailed_criteria_keep_zero_scores() {
        let payload = json!({
            "domain_a_poetics_of_language": {
                "criterion_a1_imagery": {"score": 0},
                "criterion_a2_rhythm_and_sound": {"score": 7},
                "average_score_language": 3.5
            },
            "domain_b_dramaturgy_of_structure": {
                "criterion_b1_plot_tension": {"score": 5}
            },
            "kitsch_diagnosis": {"anti_kitsch_score": 0}
        });
        let detailed = extract_scores(&payload, "esthetiek", DetailLevel::Detailed);
        assert_eq!(detailed["esthetiek_Imagery"], 0.0);
        assert_eq!(detailed["esthetiek_Rhythm And Sound"], 7.0);
        assert_eq!(detailed["esthetiek_Plot Tension"], 5.0);
        assert!(!detailed.contains_key("esthetiek_Anti-Kitsch"));
        assert!(!detailed.contains_key("esthetiek_Poetics"));

        let summary = extract_scores(&payload, "esthetiek", DetailLevel::Summary);
        assert_eq!(summary["esthetiek_Poetics"], 3.5);
        assert!(!summary.contains_key("esthetiek_Imagery"));
    }

    #[test]
    fn unknown_domains_and_non_objects_yield_nothing() {
        assert!(extract_scores(&json!({"score": 5}), "new_rubric", DetailLevel::Summary).is_empty());
        assert!(extract_scores(&json!([1, 2]), "kolb", DetailLevel::Summary).is_empty());
    }

    #[test]
    fn titled_labels_strip_only_their_section_marker() {
        assert_eq!(
            ChildLabel::Titled(&POETICS_MARKER).label("criterion_a12_word_choice"),
            "Word Choice"
        );
        assert_eq!(
            ChildLabel::Titled(&DRAMATURGY_MARKER).label("criterion_b3_climax"),
            "Climax"
        );
        assert_eq!(
            ChildLabel::Titled(&DRAMATURGY_MARKER).label("criterion_a1_imagery"),
            "Criterion A1 Imagery"
        );
    }

    #[test]
    fn title_case_restarts_after_non_letters() {
        assert_eq!(title_case("space for grace"), "Space For Grace");
        assert_eq!(title_case("a1b test"), "A1B Test");
    }

    #[test]
    fn numbered_label_leaves_unnumbered_keys_alone() {
        assert_eq!(numbered_label("criterion_7"), "#7");
        assert_eq!(numbered_label("clarity_of_goal"), "clarity of goal");
    }
}
