pub mod algorithms;
pub mod api;
pub mod config;
pub mod dataset;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{MentorError, Result};
pub use models::*;

use services::cache::{InMemoryResultCache, RedisResultCache, ResultCache};
use services::codeforces::CodeforcesClient;
use services::live_features::LiveFeatureBuilder;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dataset: Arc<dataset::DatasetStore>,
    pub recommendation_service: Arc<services::recommendation::RecommendationService>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let dataset = Arc::new(dataset::DatasetStore::new(config.dataset.dir.clone()));

        let codeforces = Arc::new(CodeforcesClient::new(&config.codeforces)?);
        let live_features = Arc::new(LiveFeatureBuilder::new(
            codeforces,
            config.codeforces.max_submissions,
        ));

        let cache: Arc<dyn ResultCache> = match &config.redis.url {
            Some(url) => {
                info!("Caching recommendations in Redis at {}", url);
                Arc::new(RedisResultCache::new(url, config.redis.ttl_seconds)?)
            }
            None => {
                info!("No Redis URL configured, caching recommendations in memory");
                Arc::new(InMemoryResultCache::new())
            }
        };

        let recommendation_service = Arc::new(services::recommendation::RecommendationService::new(
            dataset.clone(),
            live_features,
            cache,
            config.clone(),
        ));

        // Requests retry the load and answer 500 while the dataset is broken.
        if let Err(e) = dataset.get().await {
            warn!("Dataset preload failed: {}", e);
        }

        Ok(Self {
            config,
            dataset,
            recommendation_service,
        })
    }
}

pub async fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
