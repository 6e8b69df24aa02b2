//! Score aggregation into per-metric, per-subject summaries.

mod aggregator;
mod scores;
mod summary;

pub use aggregator::{DistributionDocument, MetricAggregator, MetricTable, StatisticsDocument};
pub use scores::{
    ChildLabel, DetailLevel, Levels, Presence, ScoreRule, extract_scores, metric_key, score_rules,
};
pub use summary::{BoxSummary, DistributionSummary, StatSummary, median, quartiles};
