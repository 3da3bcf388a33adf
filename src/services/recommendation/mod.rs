use crate::algorithms::{predict_cluster, recommend, select_weak};
use crate::config::Config;
use crate::dataset::{resolve, Dataset, DatasetStore, ResolveMode, Resolution};
use crate::error::{MentorError, Result};
use crate::models::*;
use crate::services::cache::ResultCache;
use crate::services::live_features::LiveFeatureBuilder;
use crate::utils::{clamp_per_topic, validate_codeforces_id};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything the ranking stages need about one user.
struct UserFeatures {
    cluster: ClusterId,
    cluster_source: ClusterSource,
    rating: f64,
    topic_rows: Vec<UserTopicRow>,
    solved_keys: HashSet<String>,
}

pub struct RecommendationService {
    dataset: Arc<DatasetStore>,
    live_features: Arc<LiveFeatureBuilder>,
    cache: Arc<dyn ResultCache>,
    config: Arc<Config>,
}

impl RecommendationService {
    pub fn new(
        dataset: Arc<DatasetStore>,
        live_features: Arc<LiveFeatureBuilder>,
        cache: Arc<dyn ResultCache>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            dataset,
            live_features,
            cache,
            config,
        }
    }

    pub async fn get_recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse> {
        let handle = validate_codeforces_id(&request.codeforces_id)?;
        let per_topic = clamp_per_topic(request.per_topic, &self.config.recommendation);

        let dataset = self.dataset.get().await?;
        let resolution = resolve(&dataset, &handle);
        let identity = resolution
            .canonical_id
            .clone()
            .unwrap_or_else(|| handle.clone());

        if !request.force_refresh {
            if let Some(mut cached) = self.cached_result(&identity).await {
                info!("Serving cached recommendations for {}", identity);
                cached.cached = true;
                return Ok(cached);
            }
        }

        let features = self.user_features(&dataset, &identity, &resolution).await?;
        let response = self.rank(&dataset, identity, features, per_topic);

        // Best effort: the freshly computed result is returned either way.
        if let Err(e) = self.cache.put(&response.codeforces_id, &response).await {
            warn!(
                "Failed to cache recommendations for {}: {}",
                response.codeforces_id, e
            );
        }

        Ok(response)
    }

    async fn cached_result(&self, identity: &str) -> Option<RecommendationResponse> {
        match self.cache.get(identity).await {
            Ok(Some(payload)) if !payload.recommendations.is_empty() => Some(payload),
            Ok(_) => None,
            Err(e) => {
                warn!("Failed to read cached recommendations for {}: {}", identity, e);
                None
            }
        }
    }

    async fn user_features(
        &self,
        dataset: &Dataset,
        identity: &str,
        resolution: &Resolution,
    ) -> Result<UserFeatures> {
        if resolution.canonical_id.is_some() {
            if let Some(rows) = dataset.topic_rows(identity) {
                return Ok(self.dataset_features(dataset, identity, resolution.mode, rows));
            }
        }

        info!("{} has no dataset topic rows, falling back to Codeforces", identity);
        let live = self
            .live_features
            .build(identity, dataset.topics())
            .await
            .map_err(|e| {
                MentorError::NotFound(format!(
                    "Codeforces user {} was not found in the dataset and the live fallback failed: {}",
                    identity, e
                ))
            })?;

        let cluster = predict_cluster(
            dataset.known_users(),
            dataset.feature_columns(),
            &live.topic_rows,
            live.rating,
            self.config.recommendation.default_cluster,
        );

        Ok(UserFeatures {
            cluster,
            cluster_source: ClusterSource::LiveCodeforcesFallback,
            rating: live.rating,
            topic_rows: live.topic_rows,
            solved_keys: live.solved_keys,
        })
    }

    fn dataset_features(
        &self,
        dataset: &Dataset,
        identity: &str,
        mode: ResolveMode,
        rows: &[UserTopicRow],
    ) -> UserFeatures {
        let rating = dataset.rating_of(identity).unwrap_or(0.0);

        let (cluster, cluster_source) = match dataset.cluster_of(identity) {
            Some(cluster) if mode == ResolveMode::CaseInsensitive => {
                (cluster, ClusterSource::DatasetCaseInsensitiveMatch)
            }
            Some(cluster) => (cluster, ClusterSource::Dataset),
            None => (
                predict_cluster(
                    dataset.known_users(),
                    dataset.feature_columns(),
                    rows,
                    rating,
                    self.config.recommendation.default_cluster,
                ),
                ClusterSource::DatasetPredictedCluster,
            ),
        };

        UserFeatures {
            cluster,
            cluster_source,
            rating,
            topic_rows: rows.to_vec(),
            solved_keys: dataset.solved_problems(identity),
        }
    }

    fn rank(
        &self,
        dataset: &Dataset,
        identity: String,
        features: UserFeatures,
        per_topic: usize,
    ) -> RecommendationResponse {
        let weak = select_weak(
            &features.topic_rows,
            self.config.recommendation.weak_topic_count,
        );

        let recommendations: Vec<TopicRecommendation> = weak
            .iter()
            .map(|scored| TopicRecommendation {
                topic: scored.row.topic.clone(),
                weakness_score: scored.score,
                attempted_unique: scored.row.attempted_unique,
                solved_unique: scored.row.solved_unique,
                accuracy_unique: scored.row.accuracy_unique,
                struggle_score: scored.row.struggle_score,
                problems: recommend(
                    dataset.candidates(features.cluster, &scored.row.topic),
                    &features.solved_keys,
                    features.rating,
                    per_topic,
                ),
            })
            .collect();

        info!(
            "Computed {} weak topics for {} in cluster {} ({:?})",
            recommendations.len(),
            identity,
            features.cluster,
            features.cluster_source
        );

        RecommendationResponse {
            codeforces_id: identity,
            cluster: features.cluster,
            cluster_source: features.cluster_source,
            top_weak_topics_count: recommendations.len(),
            recommendations,
            cached: false,
            generated_at: Utc::now(),
        }
    }
}
