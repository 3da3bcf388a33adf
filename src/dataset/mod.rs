//! Pretrained dataset tables.
//!
//! The tables are parsed once per process and exposed as an immutable
//! [`Dataset`] behind an `Arc`. Every lookup the recommendation pipeline needs
//! (topic rows, clusters, ratings, candidate problems, the reference vectors
//! used for classification) is precomputed at load time, except the solved
//! problem set which is scanned from the attempt history on each call.

use crate::algorithms::features::{build_feature_vector, topics_from_columns};
use crate::error::DatasetError;
use crate::models::{ClusterId, KnownUserVector, ProblemCandidate, UserTopicRow};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

pub mod identity;

pub use identity::{resolve, ResolveMode, Resolution};

pub const FEATURE_COLUMNS_FILE: &str = "training_feature_columns.csv";
pub const TOPIC_STATS_FILE: &str = "user_topic_stats.csv";
pub const CLUSTERS_FILE: &str = "user_clusters.csv";
pub const RATINGS_FILE: &str = "user_ratings.csv";
pub const PROBLEM_HISTORY_FILE: &str = "user_problem_history.csv";
pub const CLUSTER_PROBLEMS_FILE: &str = "cluster_topic_problems.csv";

/// One historical attempt row; `solved` marks an accepted outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemAttempt {
    pub user_id: String,
    pub contest_id: String,
    pub problem_index: String,
    pub solved: bool,
}

impl ProblemAttempt {
    pub fn problem_key(&self) -> String {
        format!("{}-{}", self.contest_id, self.problem_index)
    }
}

/// Candidate row of the per-cluster problem statistics table.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterProblem {
    pub cluster: ClusterId,
    pub topic: String,
    pub candidate: ProblemCandidate,
}

/// Raw tables in file order, before indexing.
#[derive(Debug, Clone, Default)]
pub struct DatasetTables {
    pub feature_columns: Vec<String>,
    pub topic_rows: Vec<UserTopicRow>,
    pub clusters: Vec<(String, ClusterId)>,
    pub ratings: Vec<(String, f64)>,
    pub attempts: Vec<ProblemAttempt>,
    pub cluster_problems: Vec<ClusterProblem>,
}

#[derive(Debug)]
pub struct Dataset {
    feature_columns: Vec<String>,
    topics: Vec<String>,
    topic_rows: HashMap<String, Vec<UserTopicRow>>,
    clusters: HashMap<String, ClusterId>,
    ratings: HashMap<String, f64>,
    attempts: Vec<ProblemAttempt>,
    problems: HashMap<(ClusterId, String), Vec<ProblemCandidate>>,
    known_users: Vec<KnownUserVector>,
    folded_identities: HashMap<String, String>,
}

impl Dataset {
    pub fn load(dir: &Path) -> Result<Self, DatasetError> {
        info!("Loading dataset from {}", dir.display());

        let feature_columns =
            read_table::<FeatureColumnRecord>(dir, FEATURE_COLUMNS_FILE, &["column"])?
                .into_iter()
                .map(|r| r.column)
                .collect();

        let topic_rows = read_table::<TopicStatRecord>(
            dir,
            TOPIC_STATS_FILE,
            &[
                "user_id",
                "topic",
                "attempted_unique",
                "solved_unique",
                "submissions",
                "accuracy_unique",
                "struggle_score",
            ],
        )?
        .into_iter()
        .map(UserTopicRow::from)
        .collect();

        let clusters = read_table::<ClusterRecord>(dir, CLUSTERS_FILE, &["user_id", "cluster"])?
            .into_iter()
            .map(|r| (r.user_id, r.cluster))
            .collect();

        let ratings = read_table::<RatingRecord>(dir, RATINGS_FILE, &["user_id", "rating"])?
            .into_iter()
            .map(|r| (r.user_id, r.rating))
            .collect();

        let attempts = read_table::<AttemptRecord>(
            dir,
            PROBLEM_HISTORY_FILE,
            &["user_id", "contest_id", "problem_index", "solved"],
        )?
        .into_iter()
        .map(|r| ProblemAttempt {
            user_id: r.user_id,
            contest_id: r.contest_id,
            problem_index: r.problem_index,
            solved: r.solved,
        })
        .collect();

        let cluster_problems = read_table::<ClusterProblemRecord>(
            dir,
            CLUSTER_PROBLEMS_FILE,
            &[
                "cluster",
                "topic",
                "problem_key",
                "problem_name",
                "problem_rating",
                "success_rate",
                "median_submissions_until_ok",
                "cf_link",
            ],
        )?
        .into_iter()
        .map(ClusterProblem::from)
        .collect();

        let dataset = Self::from_tables(DatasetTables {
            feature_columns,
            topic_rows,
            clusters,
            ratings,
            attempts,
            cluster_problems,
        });

        info!(
            "Dataset loaded: {} feature columns, {} topics, {} reference users, {} attempts",
            dataset.feature_columns.len(),
            dataset.topics.len(),
            dataset.known_users.len(),
            dataset.attempts.len()
        );

        Ok(dataset)
    }

    pub fn from_tables(tables: DatasetTables) -> Self {
        let topics = topics_from_columns(&tables.feature_columns);

        // Identity universe in load order: clusters, topic rows, ratings.
        let mut folded_identities = HashMap::new();
        let mut fold = |user_id: &str| {
            folded_identities
                .entry(user_id.to_lowercase())
                .or_insert_with(|| user_id.to_string());
        };

        let mut topic_rows: HashMap<String, Vec<UserTopicRow>> = HashMap::new();
        for (user_id, _) in &tables.clusters {
            fold(user_id.as_str());
        }
        for row in tables.topic_rows {
            fold(row.user_id.as_str());
            topic_rows.entry(row.user_id.clone()).or_default().push(row);
        }
        for (user_id, _) in &tables.ratings {
            fold(user_id.as_str());
        }

        let ratings: HashMap<String, f64> = tables.ratings.into_iter().collect();

        let mut clusters = HashMap::new();
        let mut known_users = Vec::new();
        for (user_id, cluster) in tables.clusters {
            if clusters.contains_key(&user_id) {
                continue;
            }
            clusters.insert(user_id.clone(), cluster);

            if let Some(rows) = topic_rows.get(&user_id) {
                let rating = ratings.get(&user_id).copied().unwrap_or(0.0);
                known_users.push(KnownUserVector {
                    vector: build_feature_vector(&tables.feature_columns, rows, rating),
                    user_id,
                    cluster,
                });
            }
        }

        let mut problems: HashMap<(ClusterId, String), Vec<ProblemCandidate>> = HashMap::new();
        for problem in tables.cluster_problems {
            problems
                .entry((problem.cluster, problem.topic))
                .or_default()
                .push(problem.candidate);
        }

        Self {
            feature_columns: tables.feature_columns,
            topics,
            topic_rows,
            clusters,
            ratings,
            attempts: tables.attempts,
            problems,
            known_users,
            folded_identities,
        }
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn known_users(&self) -> &[KnownUserVector] {
        &self.known_users
    }

    pub fn topic_rows(&self, user_id: &str) -> Option<&[UserTopicRow]> {
        self.topic_rows.get(user_id).map(Vec::as_slice)
    }

    pub fn cluster_of(&self, user_id: &str) -> Option<ClusterId> {
        self.clusters.get(user_id).copied()
    }

    pub fn rating_of(&self, user_id: &str) -> Option<f64> {
        self.ratings.get(user_id).copied()
    }

    pub fn candidates(&self, cluster: ClusterId, topic: &str) -> &[ProblemCandidate] {
        self.problems
            .get(&(cluster, topic.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains_identity(&self, user_id: &str) -> bool {
        self.clusters.contains_key(user_id)
            || self.topic_rows.contains_key(user_id)
            || self.ratings.contains_key(user_id)
    }

    /// First dataset key, in load order, that folds to the same lowercase form.
    pub fn identity_ignoring_case(&self, user_id: &str) -> Option<&str> {
        self.folded_identities
            .get(&user_id.to_lowercase())
            .map(String::as_str)
    }

    /// Full scan of the attempt history; not memoized.
    pub fn solved_problems(&self, user_id: &str) -> HashSet<String> {
        self.attempts
            .iter()
            .filter(|a| a.solved && a.user_id == user_id)
            .map(ProblemAttempt::problem_key)
            .collect()
    }
}

/// Load-once handle over the dataset directory.
pub struct DatasetStore {
    dir: PathBuf,
    cell: OnceCell<Arc<Dataset>>,
}

impl DatasetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cell: OnceCell::new(),
        }
    }

    pub fn preloaded(dataset: Dataset) -> Self {
        Self {
            dir: PathBuf::new(),
            cell: OnceCell::new_with(Some(Arc::new(dataset))),
        }
    }

    /// Parses the tables on first use. A failed load leaves the cell empty.
    pub async fn get(&self) -> Result<Arc<Dataset>, DatasetError> {
        let dataset = self
            .cell
            .get_or_try_init(|| async {
                let dir = self.dir.clone();
                match tokio::task::spawn_blocking(move || Dataset::load(&dir)).await {
                    Ok(loaded) => loaded.map(Arc::new),
                    Err(e) => Err(DatasetError::Join(e.to_string())),
                }
            })
            .await?;
        Ok(Arc::clone(dataset))
    }
}

fn read_table<T: DeserializeOwned>(
    dir: &Path,
    file: &str,
    required: &[&str],
) -> Result<Vec<T>, DatasetError> {
    let path = dir.join(file);
    if !path.is_file() {
        return Err(DatasetError::MissingFile(path.display().to_string()));
    }

    let csv_error = |source| DatasetError::Csv {
        file: file.to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&path)
        .map_err(csv_error)?;

    let headers = reader.headers().map_err(csv_error)?.clone();
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(DatasetError::Schema {
                file: file.to_string(),
                column: column.to_string(),
            });
        }
    }

    let mut records = Vec::new();
    for result in reader.deserialize::<T>() {
        let record = result.map_err(|e| match e.position().map(|pos| pos.line()) {
            Some(line) => DatasetError::Parse {
                file: file.to_string(),
                line,
                message: e.to_string(),
            },
            None => csv_error(e),
        })?;
        records.push(record);
    }
    Ok(records)
}

#[derive(Debug, Deserialize)]
struct FeatureColumnRecord {
    column: String,
}

#[derive(Debug, Deserialize)]
struct TopicStatRecord {
    user_id: String,
    topic: String,
    #[serde(deserialize_with = "deserialize_finite")]
    attempted_unique: f64,
    #[serde(deserialize_with = "deserialize_finite")]
    solved_unique: f64,
    #[serde(deserialize_with = "deserialize_finite")]
    submissions: f64,
    #[serde(deserialize_with = "deserialize_finite")]
    accuracy_unique: f64,
    #[serde(deserialize_with = "deserialize_finite")]
    struggle_score: f64,
}

impl From<TopicStatRecord> for UserTopicRow {
    fn from(r: TopicStatRecord) -> Self {
        Self {
            user_id: r.user_id,
            topic: r.topic,
            attempted_unique: r.attempted_unique.max(0.0) as u32,
            solved_unique: r.solved_unique.max(0.0) as u32,
            submissions: r.submissions.max(0.0) as u32,
            accuracy_unique: r.accuracy_unique,
            struggle_score: r.struggle_score,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ClusterRecord {
    user_id: String,
    cluster: ClusterId,
}

#[derive(Debug, Deserialize)]
struct RatingRecord {
    user_id: String,
    #[serde(deserialize_with = "deserialize_finite")]
    rating: f64,
}

#[derive(Debug, Deserialize)]
struct AttemptRecord {
    user_id: String,
    contest_id: String,
    problem_index: String,
    #[serde(deserialize_with = "deserialize_flag")]
    solved: bool,
}

#[derive(Debug, Deserialize)]
struct ClusterProblemRecord {
    cluster: ClusterId,
    topic: String,
    problem_key: String,
    problem_name: String,
    #[serde(deserialize_with = "deserialize_optional_finite")]
    problem_rating: Option<f64>,
    #[serde(deserialize_with = "deserialize_finite")]
    success_rate: f64,
    #[serde(deserialize_with = "deserialize_finite")]
    median_submissions_until_ok: f64,
    cf_link: String,
}

impl From<ClusterProblemRecord> for ClusterProblem {
    fn from(r: ClusterProblemRecord) -> Self {
        Self {
            cluster: r.cluster,
            topic: r.topic,
            candidate: ProblemCandidate {
                problem_key: r.problem_key,
                problem_name: r.problem_name,
                problem_rating: r.problem_rating.unwrap_or(0.0),
                success_rate: r.success_rate,
                median_submissions_until_ok: r.median_submissions_until_ok,
                cf_link: r.cf_link,
            },
        }
    }
}

/// Numeric cell that must be finite; `NaN` and infinities would break ranking.
fn deserialize_finite<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(serde::de::Error::custom(format!(
            "non-finite number `{}`",
            value
        )))
    }
}

fn deserialize_optional_finite<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<f64>::deserialize(deserializer)? {
        Some(value) if !value.is_finite() => Err(serde::de::Error::custom(format!(
            "non-finite number `{}`",
            value
        ))),
        other => Ok(other),
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" => Ok(true),
        "0" | "0.0" | "false" | "no" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid solved flag `{}`",
            other
        ))),
    }
}
