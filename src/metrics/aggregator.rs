use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::RawRecord;
use crate::metrics::scores::{DetailLevel, extract_scores};
use crate::metrics::summary::{DistributionSummary, StatSummary};
use crate::types::{CaseId, CategoryId, MetricKey, SubjectId};

/// `metric -> category -> summary`, both levels sorted.
pub type MetricTable<T> = BTreeMap<MetricKey, BTreeMap<CategoryId, T>>;

/// Run-scoped grouping of valid scores by metric and subject.
#[derive(Clone, Debug)]
pub struct MetricAggregator {
    level: DetailLevel,
    series: MetricTable<Vec<f64>>,
}

impl MetricAggregator {
    /// Empty aggregator for one detail level.
    pub fn new(level: DetailLevel) -> Self {
        Self {
            level,
            series: BTreeMap::new(),
        }
    }

    /// Detail level this aggregator computes.
    pub fn level(&self) -> DetailLevel {
        self.level
    }

    /// Fold one record's valid scores into the series of its subject.
    pub fn ingest(&mut self, record: &RawRecord) {
        for (metric, score) in extract_scores(&record.payload, record.domain(), self.level) {
            self.series
                .entry(metric)
                .or_default()
                .entry(record.subject_id().to_string())
                .or_default()
                .push(score);
        }
    }

    /// Fold every record in order.
    pub fn ingest_all<'a, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'a RawRecord>,
    {
        for record in records {
            self.ingest(record);
        }
    }

    /// Raw grouped scores, in ingestion order per series.
    pub fn series(&self) -> &MetricTable<Vec<f64>> {
        &self.series
    }

    /// Mean and deviation per series.
    pub fn statistics(&self) -> MetricTable<StatSummary> {
        self.summarize(StatSummary::from_values)
    }

    /// Full distributions per series.
    pub fn distributions(&self) -> MetricTable<DistributionSummary> {
        self.summarize(DistributionSummary::from_values)
    }

    fn summarize<T, F>(&self, summarize: F) -> MetricTable<T>
    where
        F: Fn(&[f64]) -> Option<T>,
    {
        self.series
            .iter()
            .map(|(metric, categories)| {
                let summaries = categories
                    .iter()
                    .filter_map(|(category, values)| {
                        summarize(values).map(|summary| (category.clone(), summary))
                    })
                    .collect();
                (metric.clone(), summaries)
            })
            .collect()
    }
}

/// Sorted distinct subjects of the given records.
fn subjects<'a>(records: impl IntoIterator<Item = &'a RawRecord>) -> Vec<SubjectId> {
    records
        .into_iter()
        .map(|record| record.subject_id().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn aggregate(records: &[&RawRecord], level: DetailLevel) -> MetricAggregator {
    let mut aggregator = MetricAggregator::new(level);
    aggregator.ingest_all(records.iter().copied());
    aggregator
}

/// Mean/deviation document for both detail levels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatisticsDocument {
    /// Generation timestamp supplied by the caller.
    pub generated_at: DateTime<Utc>,
    /// Sorted subjects with at least one record.
    pub subjects: Vec<SubjectId>,
    /// Headline metrics.
    pub summary: MetricTable<StatSummary>,
    /// Every metric, sub-criteria included.
    pub detailed: MetricTable<StatSummary>,
}

impl StatisticsDocument {
    /// Aggregate both detail levels over `records`.
    pub fn build<'a, I>(records: I, generated_at: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a RawRecord>,
    {
        let records: Vec<&RawRecord> = records.into_iter().collect();
        Self {
            generated_at,
            subjects: subjects(records.iter().copied()),
            summary: aggregate(&records, DetailLevel::Summary).statistics(),
            detailed: aggregate(&records, DetailLevel::Detailed).statistics(),
        }
    }
}

/// Distribution document for both detail levels, with cases per subject.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistributionDocument {
    /// Generation timestamp supplied by the caller.
    pub generated_at: DateTime<Utc>,
    /// Sorted subjects with at least one record.
    pub subjects: Vec<SubjectId>,
    /// Distinct cases per subject.
    pub case_counts: BTreeMap<SubjectId, usize>,
    /// Headline metrics.
    pub summary: MetricTable<DistributionSummary>,
    /// Every metric, sub-criteria included.
    pub detailed: MetricTable<DistributionSummary>,
}

impl DistributionDocument {
    /// Aggregate both detail levels over `records`.
    pub fn build<'a, I>(records: I, generated_at: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a RawRecord>,
    {
        let records: Vec<&RawRecord> = records.into_iter().collect();
        let mut cases: BTreeMap<SubjectId, BTreeSet<CaseId>> = BTreeMap::new();
        for record in &records {
            cases
                .entry(record.subject_id().to_string())
                .or_default()
                .insert(record.case_id().to_string());
        }
        Self {
            generated_at,
            subjects: subjects(records.iter().copied()),
            case_counts: cases
                .into_iter()
                .map(|(subject, case_ids)| (subject, case_ids.len()))
                .collect(),
            summary: aggregate(&records, DetailLevel::Summary).distributions(),
            detailed: aggregate(&records, DetailLevel::Detailed).distributions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::FileKey;
    use chrono::TimeZone;
    use serde_json::{Value, json};

    fn record(subject: &str, case: &str, domain: &str, payload: Value) -> RawRecord {
        RawRecord::new(
            FileKey {
                subject_id: subject.into(),
                case_id: case.into(),
                domain: domain.into(),
            },
            payload,
        )
    }

    fn kolb(subject: &str, case: &str, overall: f64) -> RawRecord {
        record(
            subject,
            case,
            "kolb",
            json!({
                "overall_picture": {"overall_kolb_score": overall},
                "learning_styles_analysis": {"doer": {"score": 4}}
            }),
        )
    }

    fn pinned() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 11, 9, 30, 0).unwrap()
    }

    #[test]
    fn scores_group_by_metric_then_subject() {
        let records = [
            kolb("barth", "01", 6.0),
            kolb("barth", "02", 8.0),
            kolb("augustine", "01", 7.0),
        ];
        let mut aggregator = MetricAggregator::new(DetailLevel::Summary);
        aggregator.ingest_all(&records);
        let stats = aggregator.statistics();
        let overall = &stats["kolb_Overall"];
        assert_eq!(overall["barth"].mean, 7.0);
        assert_eq!(overall["barth"].std_dev, 1.0);
        assert_eq!(overall["augustine"].count, 1);
        assert!(!stats.contains_key("kolb_Doer"));
    }

    #[test]
    fn statistics_document_covers_both_levels() {
        let records = [kolb("barth", "01", 6.0), kolb("augustine", "01", 7.0)];
        let doc = StatisticsDocument::build(&records, pinned());
        assert_eq!(doc.subjects, vec!["augustine", "barth"]);
        assert!(doc.summary.contains_key("kolb_Overall"));
        assert!(!doc.summary.contains_key("kolb_Doer"));
        assert_eq!(doc.detailed["kolb_Doer"]["barth"].mean, 4.0);

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["generated_at"], "2026-01-11T09:30:00Z");
        assert_eq!(json["summary"]["kolb_Overall"]["barth"]["stdDev"], 0.0);
    }

    #[test]
    fn distribution_document_counts_distinct_cases() {
        let records = [
            kolb("barth", "01", 6.0),
            record("barth", "01", "aristoteles", json!({})),
            kolb("barth", "02", 9.0),
            kolb("augustine", "01", 7.0),
        ];
        let doc = DistributionDocument::build(&records, pinned());
        assert_eq!(doc.case_counts["barth"], 2);
        assert_eq!(doc.case_counts["augustine"], 1);
        let barth = &doc.summary["kolb_Overall"]["barth"];
        assert_eq!(barth.values, vec![6.0, 9.0]);
        assert_eq!(barth.summary.median, 7.5);
    }
}
