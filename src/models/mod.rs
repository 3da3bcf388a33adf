use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ClusterId = i64;

/// Per-topic practice statistics for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTopicRow {
    pub user_id: String,
    pub topic: String,
    pub attempted_unique: u32,
    pub solved_unique: u32,
    pub submissions: u32,
    pub accuracy_unique: f64,
    pub struggle_score: f64,
}

impl UserTopicRow {
    pub fn empty(user_id: &str, topic: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            topic: topic.to_string(),
            attempted_unique: 0,
            solved_unique: 0,
            submissions: 0,
            accuracy_unique: 0.0,
            struggle_score: 0.0,
        }
    }
}

/// A ranked practice candidate inside a (cluster, topic) bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemCandidate {
    pub problem_key: String,
    pub problem_name: String,
    pub problem_rating: f64,
    pub success_rate: f64,
    pub median_submissions_until_ok: f64,
    pub cf_link: String,
}

/// Reference point for nearest-neighbor classification.
#[derive(Debug, Clone, PartialEq)]
pub struct KnownUserVector {
    pub user_id: String,
    pub cluster: ClusterId,
    pub vector: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterSource {
    Dataset,
    DatasetPredictedCluster,
    DatasetCaseInsensitiveMatch,
    LiveCodeforcesFallback,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    #[serde(rename = "codeforcesId", default)]
    pub codeforces_id: String,
    #[serde(rename = "perTopic")]
    pub per_topic: Option<i64>,
    #[serde(rename = "forceRefresh", default)]
    pub force_refresh: bool,
}

impl RecommendationRequest {
    pub fn new(codeforces_id: impl Into<String>) -> Self {
        Self {
            codeforces_id: codeforces_id.into(),
            per_topic: None,
            force_refresh: false,
        }
    }

    pub fn with_per_topic(mut self, per_topic: i64) -> Self {
        self.per_topic = Some(per_topic);
        self
    }

    pub fn with_force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRecommendation {
    pub topic: String,
    pub weakness_score: f64,
    pub attempted_unique: u32,
    pub solved_unique: u32,
    pub accuracy_unique: f64,
    pub struggle_score: f64,
    pub problems: Vec<ProblemCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub codeforces_id: String,
    pub cluster: ClusterId,
    pub cluster_source: ClusterSource,
    pub top_weak_topics_count: usize,
    pub recommendations: Vec<TopicRecommendation>,
    pub cached: bool,
    pub generated_at: DateTime<Utc>,
}
