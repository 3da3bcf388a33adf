//! Rebuilds a user's topic statistics from their Codeforces submission history
//! when the pretrained dataset has no record of them.

use crate::error::UpstreamError;
use crate::models::UserTopicRow;
use crate::services::codeforces::{CodeforcesApi, Submission};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct LiveFeatures {
    pub rating: f64,
    pub topic_rows: Vec<UserTopicRow>,
    pub solved_keys: HashSet<String>,
}

#[derive(Debug, Default)]
struct ProblemTally {
    topics: BTreeSet<String>,
    submissions: u32,
    solved: bool,
}

pub struct LiveFeatureBuilder {
    api: Arc<dyn CodeforcesApi>,
    max_submissions: usize,
}

impl LiveFeatureBuilder {
    pub fn new(api: Arc<dyn CodeforcesApi>, max_submissions: usize) -> Self {
        Self {
            api,
            max_submissions,
        }
    }

    pub async fn build(
        &self,
        handle: &str,
        topics: &[String],
    ) -> Result<LiveFeatures, UpstreamError> {
        let profile = self
            .api
            .user_info(handle)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::UnknownUser(handle.to_string()))?;

        let submissions = self.api.user_status(handle, self.max_submissions).await?;
        if submissions.is_empty() {
            return Err(UpstreamError::NoSubmissions(handle.to_string()));
        }

        let (topic_rows, solved_keys) = aggregate_submissions(handle, &submissions, topics);
        let rating = profile.rating.unwrap_or(0) as f64;

        info!(
            "Built live features for {}: rating {}, {} submissions, {} solved problems",
            profile.handle,
            rating,
            submissions.len(),
            solved_keys.len()
        );

        Ok(LiveFeatures {
            rating,
            topic_rows,
            solved_keys,
        })
    }
}

/// Rolls submissions up into one row per tracked topic plus the solved keys.
///
/// A problem tagged with several tracked topics contributes its full
/// submission count to each of them.
pub fn aggregate_submissions(
    user_id: &str,
    submissions: &[Submission],
    topics: &[String],
) -> (Vec<UserTopicRow>, HashSet<String>) {
    let tracked: HashSet<&str> = topics.iter().map(String::as_str).collect();
    let mut problems: HashMap<String, ProblemTally> = HashMap::new();

    for submission in submissions {
        let Some(problem_key) = submission.problem_key() else {
            continue;
        };

        let tally = problems.entry(problem_key).or_default();
        tally.submissions += 1;
        tally.solved |= submission.is_accepted();
        tally.topics.extend(
            submission
                .problem
                .tags
                .iter()
                .filter(|tag| tracked.contains(tag.as_str()))
                .cloned(),
        );
    }

    let mut per_topic: HashMap<&str, (u32, u32, u32)> = HashMap::new();
    for tally in problems.values() {
        for topic in &tally.topics {
            let entry = per_topic.entry(topic.as_str()).or_default();
            entry.0 += 1;
            entry.1 += u32::from(tally.solved);
            entry.2 += tally.submissions;
        }
    }

    let rows: Vec<UserTopicRow> = topics
        .iter()
        .map(|topic| {
            let (attempted, solved, submissions) =
                per_topic.get(topic.as_str()).copied().unwrap_or_default();
            let accuracy = if attempted == 0 {
                0.0
            } else {
                solved as f64 / attempted as f64
            };
            UserTopicRow {
                user_id: user_id.to_string(),
                topic: topic.clone(),
                attempted_unique: attempted,
                solved_unique: solved,
                submissions,
                accuracy_unique: accuracy,
                struggle_score: submissions as f64 / solved.max(1) as f64,
            }
        })
        .collect();

    let solved_keys: HashSet<String> = problems
        .into_iter()
        .filter(|(_, tally)| tally.solved)
        .map(|(key, _)| key)
        .collect();

    (rows, solved_keys)
}
