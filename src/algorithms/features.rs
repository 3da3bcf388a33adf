use crate::models::UserTopicRow;
use std::collections::{BTreeSet, HashMap};

pub const ACCURACY_PREFIX: &str = "accuracy_unique_";
pub const ATTEMPTED_PREFIX: &str = "attempted_unique_";
pub const STRUGGLE_PREFIX: &str = "struggle_score_";
pub const RATING_COLUMN: &str = "rating";
pub const TREND_SLOPE_COLUMN: &str = "trend_slope";

/// Tracked topics named by the per-topic training columns, sorted.
pub fn topics_from_columns(columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .filter_map(|column| {
            column
                .strip_prefix(ACCURACY_PREFIX)
                .or_else(|| column.strip_prefix(ATTEMPTED_PREFIX))
                .or_else(|| column.strip_prefix(STRUGGLE_PREFIX))
        })
        .filter(|topic| !topic.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Encodes a user's topic rows and rating in training-column order.
///
/// Topics without a row, unknown columns and `trend_slope` are 0.0. When a
/// topic appears in several rows the last one wins.
pub fn build_feature_vector(columns: &[String], rows: &[UserTopicRow], rating: f64) -> Vec<f64> {
    let by_topic: HashMap<&str, &UserTopicRow> =
        rows.iter().map(|row| (row.topic.as_str(), row)).collect();

    let topic_value = |topic: &str, pick: fn(&UserTopicRow) -> f64| {
        by_topic.get(topic).map(|row| pick(row)).unwrap_or(0.0)
    };

    columns
        .iter()
        .map(|column| {
            if let Some(topic) = column.strip_prefix(ACCURACY_PREFIX) {
                topic_value(topic, |row| row.accuracy_unique)
            } else if let Some(topic) = column.strip_prefix(ATTEMPTED_PREFIX) {
                topic_value(topic, |row| row.attempted_unique as f64)
            } else if let Some(topic) = column.strip_prefix(STRUGGLE_PREFIX) {
                topic_value(topic, |row| row.struggle_score)
            } else if column == RATING_COLUMN {
                rating
            } else {
                // trend_slope is never derived from rating history.
                0.0
            }
        })
        .collect()
}
