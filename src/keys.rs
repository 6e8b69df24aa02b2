//! Filename to record-key resolution.
//!
//! Filenames look like `<subject>_<case tokens...>_<domain tokens...>.json`.
//! Case identifiers and domain names may both span several `_`-separated
//! tokens, so the domain start is located by scanning for a known domain name.

use serde::{Deserialize, Serialize};

use crate::constants::filename::{
    AUXILIARY_FRAGMENTS, MIN_TOKENS, RECORD_EXTENSION, REPEAT_RUN_MARKER, TOKEN_DELIMITER,
};
use crate::domain::{Domain, VOCABULARY_V2};
use crate::types::{CaseId, DomainName, SubjectId};

/// Identity of one analysis record file.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileKey {
    /// First filename token.
    pub subject_id: SubjectId,
    /// Tokens between subject and domain.
    pub case_id: CaseId,
    /// Remaining tokens; a declared domain name when known.
    pub domain: DomainName,
}

impl FileKey {
    /// `subject_id + "_" + case_id`.
    pub fn case_key(&self) -> String {
        format!("{}{}{}", self.subject_id, TOKEN_DELIMITER, self.case_id)
    }

    /// The declared domain this key names, if any.
    pub fn known_domain(&self) -> Option<Domain> {
        Domain::from_name(&self.domain)
    }
}

/// Why a filename did not produce a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyRejection {
    /// Missing the record extension.
    Extension,
    /// Matches an auxiliary artifact name (statistics, index, raw dumps).
    Auxiliary,
    /// Fewer than three stem tokens.
    TooFewTokens,
    /// Carries the repeat-run marker while repeat runs are excluded.
    RepeatRun,
}

/// Whether files of a repeated experimental run resolve to keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RepeatRuns {
    /// Keep repeat runs; the marker becomes part of the case id (`01_B`).
    #[default]
    Include,
    /// Reject repeat-run files outright.
    Exclude,
}

/// Resolves filenames into `(subject_id, case_id, domain)` keys.
#[derive(Clone, Debug)]
pub struct KeyParser {
    vocabulary: Vec<Domain>,
    repeat_runs: RepeatRuns,
    repeat_marker: String,
}

impl Default for KeyParser {
    fn default() -> Self {
        Self {
            vocabulary: VOCABULARY_V2.to_vec(),
            repeat_runs: RepeatRuns::Include,
            repeat_marker: REPEAT_RUN_MARKER.to_string(),
        }
    }
}

impl KeyParser {
    /// Parser over the current vocabulary that keeps repeat runs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the declared domain vocabulary (order matters for ties).
    pub fn with_vocabulary(mut self, vocabulary: &[Domain]) -> Self {
        self.vocabulary = vocabulary.to_vec();
        self
    }

    /// Include or exclude repeat-run files.
    pub fn with_repeat_runs(mut self, repeat_runs: RepeatRuns) -> Self {
        self.repeat_runs = repeat_runs;
        self
    }

    /// Override the repeat-run marker token.
    pub fn with_repeat_marker(mut self, marker: impl Into<String>) -> Self {
        self.repeat_marker = marker.into();
        self
    }

    /// Declared vocabulary in tie-break order.
    pub fn vocabulary(&self) -> &[Domain] {
        &self.vocabulary
    }

    /// Parse a filename, returning `None` for anything unparseable.
    pub fn parse(&self, filename: &str) -> Option<FileKey> {
        self.classify(filename).ok()
    }

    /// Parse a filename, reporting why it was rejected.
    ///
    /// Under [`RepeatRuns::Exclude`] a marker token right after the case token
    /// rejects the file whether or not the domain is declared.
    pub fn classify(&self, filename: &str) -> Result<FileKey, KeyRejection> {
        let tokens = self.stem_tokens(filename)?;

        let subject_id = tokens[0].to_string();
        let key = match self.domain_start(&tokens) {
            Some((start, _)) if start >= 2 => {
                let case_id = join_tokens(&tokens[1..start]);
                if self.repeat_runs == RepeatRuns::Exclude && self.is_repeat_case(&case_id) {
                    return Err(KeyRejection::RepeatRun);
                }
                FileKey {
                    subject_id,
                    case_id,
                    domain: join_tokens(&tokens[start..]),
                }
            }
            _ => {
                // The positional split leaves the marker at the head of the domain.
                if self.repeat_runs == RepeatRuns::Exclude
                    && tokens.len() > MIN_TOKENS
                    && tokens[2] == self.repeat_marker
                {
                    return Err(KeyRejection::RepeatRun);
                }
                FileKey {
                    subject_id,
                    case_id: tokens[1].to_string(),
                    domain: join_tokens(&tokens[2..]),
                }
            }
        };
        Ok(key)
    }

    /// True if a case id carries the repeat-run marker after its first token.
    pub fn is_repeat_case(&self, case_id: &str) -> bool {
        case_id
            .split(TOKEN_DELIMITER)
            .skip(1)
            .any(|token| token == self.repeat_marker)
    }

    /// Every `(start index, domain)` pair whose name occurs in the filename
    /// after the subject token, in scan order.
    ///
    /// More than one entry means the filename is ambiguous under the declared
    /// vocabulary; parsing still resolves it by first match.
    pub fn domain_matches(&self, filename: &str) -> Vec<(usize, Domain)> {
        let Ok(tokens) = self.stem_tokens(filename) else {
            return Vec::new();
        };
        let mut matches = Vec::new();
        for start in 1..tokens.len() {
            for domain in &self.vocabulary {
                if domain_matches_at(&tokens, start, *domain) {
                    matches.push((start, *domain));
                }
            }
        }
        matches
    }

    /// True if more than one declared domain name occurs in the filename.
    pub fn is_ambiguous(&self, filename: &str) -> bool {
        self.domain_matches(filename).len() > 1
    }

    fn stem_tokens<'a>(&self, filename: &'a str) -> Result<Vec<&'a str>, KeyRejection> {
        let Some(stem) = filename.strip_suffix(RECORD_EXTENSION) else {
            return Err(KeyRejection::Extension);
        };
        if AUXILIARY_FRAGMENTS
            .iter()
            .any(|fragment| filename.contains(fragment))
        {
            return Err(KeyRejection::Auxiliary);
        }
        let tokens: Vec<&str> = stem.split(TOKEN_DELIMITER).collect();
        if tokens.len() < MIN_TOKENS {
            return Err(KeyRejection::TooFewTokens);
        }
        Ok(tokens)
    }

    /// Leftmost start index at which any domain matches; ties at one index go
    /// to the earliest declared domain.
    fn domain_start(&self, tokens: &[&str]) -> Option<(usize, Domain)> {
        (1..tokens.len()).find_map(|start| {
            self.vocabulary
                .iter()
                .find(|domain| domain_matches_at(tokens, start, **domain))
                .map(|domain| (start, *domain))
        })
    }
}

fn domain_matches_at(tokens: &[&str], start: usize, domain: Domain) -> bool {
    let end = start + domain.token_count();
    end <= tokens.len()
        && domain
            .as_str()
            .split(TOKEN_DELIMITER)
            .eq(tokens[start..end].iter().copied())
}

fn join_tokens(tokens: &[&str]) -> String {
    let mut joined = String::new();
    for (idx, token) in tokens.iter().enumerate() {
        if idx > 0 {
            joined.push(TOKEN_DELIMITER);
        }
        joined.push_str(token);
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VOCABULARY_V1;

    fn key(subject: &str, case: &str, domain: &str) -> FileKey {
        FileKey {
            subject_id: subject.into(),
            case_id: case.into(),
            domain: domain.into(),
        }
    }

    #[test]
    fn parses_single_token_domain() {
        let parser = KeyParser::new();
        assert_eq!(
            parser.parse("augustine_01_aristoteles.json"),
            Some(key("augustine", "01", "aristoteles"))
        );
    }

    #[test]
    fn parses_multi_token_domain_and_multi_token_case() {
        let parser = KeyParser::new();
        assert_eq!(
            parser.parse("luther_07_schulz_von_thun.json"),
            Some(key("luther", "07", "schulz_von_thun"))
        );
        assert_eq!(
            parser.parse("hervormd_11jan2026_01_speech_act.json"),
            Some(key("hervormd", "11jan2026_01", "speech_act"))
        );
    }

    #[test]
    fn case_tokens_sharing_a_domain_prefix_stay_in_the_case_id() {
        let parser = KeyParser::new();
        assert_eq!(
            parser.parse("a_speech_01_speech_act.json"),
            Some(key("a", "speech_01", "speech_act"))
        );
        assert_eq!(
            parser.parse("x_von_01_schulz_von_thun.json"),
            Some(key("x", "von_01", "schulz_von_thun"))
        );
        assert_eq!(
            parser.parse("a_speech_speech_act.json"),
            Some(key("a", "speech", "speech_act"))
        );
    }

    #[test]
    fn leftmost_match_wins_over_later_domain_tokens() {
        let parser = KeyParser::new();
        // "kolb" at index 2 is found before "narrative" at index 3.
        assert_eq!(
            parser.parse("barth_x_kolb_narrative.json"),
            Some(key("barth", "x", "kolb_narrative"))
        );
        assert!(parser.is_ambiguous("barth_x_kolb_narrative.json"));
        assert!(!parser.is_ambiguous("barth_01_kolb.json"));
    }

    #[test]
    fn match_at_index_one_falls_back_to_positional_split() {
        let parser = KeyParser::new();
        assert_eq!(
            parser.parse("calvin_kolb_01.json"),
            Some(key("calvin", "kolb", "01"))
        );
    }

    #[test]
    fn unknown_domain_falls_back_to_positional_split() {
        let parser = KeyParser::new();
        assert_eq!(
            parser.parse("calvin_03_new_rubric.json"),
            Some(key("calvin", "03", "new_rubric"))
        );
        assert_eq!(
            parser.parse("calvin_03_new_rubric.json").unwrap().known_domain(),
            None
        );
    }

    #[test]
    fn vocabulary_version_changes_resolution() {
        let v1 = KeyParser::new().with_vocabulary(VOCABULARY_V1);
        // Without speech_act in the vocabulary the scan cannot find the domain.
        assert_eq!(
            v1.parse("hervormd_11jan2026_01_speech_act.json"),
            Some(key("hervormd", "11jan2026", "01_speech_act"))
        );
    }

    #[test]
    fn domain_matches_lists_hits_in_scan_order() {
        let parser = KeyParser::new().with_vocabulary(&[Domain::Metaphor, Domain::Kolb]);
        assert_eq!(parser.domain_matches("a_01_kolb.json"), vec![(2, Domain::Kolb)]);
        assert_eq!(
            parser.domain_matches("a_metaphor_kolb_metaphor.json"),
            vec![(1, Domain::Metaphor), (2, Domain::Kolb), (3, Domain::Metaphor)]
        );
        assert!(parser.domain_matches("notes.txt").is_empty());
    }

    #[test]
    fn rejects_wrong_extension_auxiliary_files_and_short_stems() {
        let parser = KeyParser::new();
        assert_eq!(
            parser.classify("augustine_01_kolb.txt"),
            Err(KeyRejection::Extension)
        );
        assert_eq!(
            parser.classify("statistics.json"),
            Err(KeyRejection::Auxiliary)
        );
        assert_eq!(
            parser.classify("augustine_01_kolb.raw.json"),
            Err(KeyRejection::Auxiliary)
        );
        assert_eq!(
            parser.classify("augustine_kolb.json"),
            Err(KeyRejection::TooFewTokens)
        );
    }

    #[test]
    fn repeat_runs_are_kept_or_rejected_by_policy() {
        let include = KeyParser::new();
        assert_eq!(
            include.parse("solle_01_B_aristoteles.json"),
            Some(key("solle", "01_B", "aristoteles"))
        );

        let exclude = KeyParser::new().with_repeat_runs(RepeatRuns::Exclude);
        assert_eq!(
            exclude.classify("solle_01_B_aristoteles.json"),
            Err(KeyRejection::RepeatRun)
        );
        assert_eq!(
            exclude.parse("solle_01_aristoteles.json"),
            Some(key("solle", "01", "aristoteles"))
        );
        // A case id that is itself the marker is not a repeat run.
        assert_eq!(
            exclude.parse("solle_B_aristoteles.json"),
            Some(key("solle", "B", "aristoteles"))
        );
    }

    #[test]
    fn repeat_marker_is_rejected_before_unknown_domains_too() {
        let exclude = KeyParser::new().with_repeat_runs(RepeatRuns::Exclude);
        assert_eq!(
            exclude.classify("solle_01_B_newrubric.json"),
            Err(KeyRejection::RepeatRun)
        );
        assert_eq!(
            exclude.parse("solle_01_B.json"),
            Some(key("solle", "01", "B"))
        );
        assert_eq!(
            KeyParser::new().parse("solle_01_B_newrubric.json"),
            Some(key("solle", "01", "B_newrubric"))
        );
    }

    #[test]
    fn repeat_case_detection_ignores_the_leading_token() {
        let parser = KeyParser::new();
        assert!(parser.is_repeat_case("01_B"));
        assert!(parser.is_repeat_case("11jan2026_B_01"));
        assert!(!parser.is_repeat_case("B"));
        assert!(!parser.is_repeat_case("01"));
        assert!(KeyParser::new().with_repeat_marker("R").is_repeat_case("01_R"));
    }

    #[test]
    fn case_key_joins_subject_and_case() {
        assert_eq!(key("solle", "01_B", "kolb").case_key(), "solle_01_B");
    }
}
