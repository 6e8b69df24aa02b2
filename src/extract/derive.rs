//! Fallback aggregates computed from component cells.

use serde_json::Value;

use crate::constants::columns::COLUMN_DELIMITER;
use crate::extract::FlatRecord;
use crate::utils::serialize_value;

/// Cells averaged into a derived aggregate, relative to the domain prefix.
#[derive(Clone, Copy, Debug)]
pub enum Components {
    /// A fixed list of columns.
    Columns(&'static [&'static str]),
    /// Every column `<prefix><segment><suffix>` where `segment` is a single
    /// non-empty path segment.
    Pattern {
        /// Text before the varying segment, possibly empty.
        prefix: &'static str,
        /// Text after the varying segment.
        suffix: &'static str,
    },
}

impl Components {
    fn matches(&self, relative: &str) -> bool {
        match *self {
            Components::Columns(columns) => columns.contains(&relative),
            Components::Pattern { prefix, suffix } => relative
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(suffix))
                .is_some_and(|segment| {
                    !segment.is_empty() && !segment.contains(COLUMN_DELIMITER)
                }),
        }
    }
}

/// Fill `target` with the mean of its numeric components when it is blank.
#[derive(Clone, Copy, Debug)]
pub struct Derivation {
    /// Column filled when blank, relative to the domain prefix.
    pub target: &'static str,
    /// Columns averaged into the target.
    pub components: Components,
}

impl Derivation {
    /// Derivation over a fixed column list.
    pub const fn columns(target: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            target,
            components: Components::Columns(columns),
        }
    }

    /// Derivation over every `prefix.*.suffix` column.
    pub const fn pattern(target: &'static str, prefix: &'static str, suffix: &'static str) -> Self {
        Self {
            target,
            components: Components::Pattern { prefix, suffix },
        }
    }

    /// Mean of the numeric component cells, if any parse.
    pub fn mean(&self, prefix: &str, record: &FlatRecord) -> Option<f64> {
        let target = self.target;
        let values: Vec<f64> = record
            .iter()
            .filter_map(|(column, cell)| {
                let relative = column.strip_prefix(prefix)?.strip_prefix(COLUMN_DELIMITER)?;
                (relative != target && self.components.matches(relative)).then_some(cell)
            })
            .filter_map(|cell| cell.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Apply to one record. Present values are never overwritten.
    pub fn apply(&self, prefix: &str, record: &mut FlatRecord) {
        let column = format!("{prefix}{COLUMN_DELIMITER}{}", self.target);
        if record.get(&column).is_some_and(|cell| !cell.is_empty()) {
            return;
        }
        if let Some(mean) = self.mean(prefix, record) {
            record.insert(column, serialize_value(&Value::from(mean)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cells: &[(&str, &str)]) -> FlatRecord {
        cells
            .iter()
            .map(|(column, cell)| (column.to_string(), cell.to_string()))
            .collect()
    }

    #[test]
    fn blank_target_is_filled_with_component_mean() {
        let mut cells = record(&[
            ("kolb.concrete_experience.score", "6"),
            ("kolb.reflective_observation.score", "8"),
            ("kolb.overall.overall_kolb_score", ""),
        ]);
        Derivation::columns(
            "overall.overall_kolb_score",
            &["concrete_experience.score", "reflective_observation.score"],
        )
        .apply("kolb", &mut cells);
        assert_eq!(cells["kolb.overall.overall_kolb_score"], "7.0");
    }

    #[test]
    fn present_target_is_left_alone() {
        let mut cells = record(&[("dekker.a.score", "2"), ("dekker.overall.average_score", "9")]);
        Derivation::pattern("overall.average_score", "", ".score").apply("dekker", &mut cells);
        assert_eq!(cells["dekker.overall.average_score"], "9");
    }

    #[test]
    fn pattern_matches_single_segment_only() {
        let mut cells = record(&[
            ("esthetiek.poetics.a1_metaphor.score", "6"),
            ("esthetiek.poetics.a2_rhythm.score", "9"),
            ("esthetiek.poetics.a2_rhythm.sub.score", "1"),
            ("esthetiek.dramaturgy.b1_plot.score", "2"),
            ("esthetiek.poetics.a3_image.score", "n/a"),
        ]);
        Derivation::pattern("poetics.average_score", "poetics.", ".score")
            .apply("esthetiek", &mut cells);
        assert_eq!(cells["esthetiek.poetics.average_score"], "7.5");
    }

    #[test]
    fn no_numeric_components_leaves_target_absent() {
        let mut cells = record(&[("kolb.concrete_experience.score", "")]);
        Derivation::columns("overall.overall_kolb_score", &["concrete_experience.score"])
            .apply("kolb", &mut cells);
        assert!(!cells.contains_key("kolb.overall.overall_kolb_score"));
    }
}
