#![allow(dead_code)]

use async_trait::async_trait;
use cp_mentor::config::Config;
use cp_mentor::dataset::DatasetStore;
use cp_mentor::error::{CacheError, UpstreamError};
use cp_mentor::services::cache::{InMemoryResultCache, ResultCache};
use cp_mentor::services::codeforces::{CodeforcesApi, Problem, RatingChange, Submission, UserInfo};
use cp_mentor::services::live_features::LiveFeatureBuilder;
use cp_mentor::services::recommendation::RecommendationService;
use cp_mentor::RecommendationResponse;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn write_dataset(dir: &Path) {
    fs::write(
        dir.join("training_feature_columns.csv"),
        "column\n\
         accuracy_unique_dp\naccuracy_unique_graphs\naccuracy_unique_math\n\
         attempted_unique_dp\nattempted_unique_graphs\nattempted_unique_math\n\
         struggle_score_dp\nstruggle_score_graphs\nstruggle_score_math\n\
         rating\ntrend_slope\n",
    )
    .unwrap();
    fs::write(
        dir.join("user_topic_stats.csv"),
        "user_id,topic,attempted_unique,solved_unique,submissions,accuracy_unique,struggle_score\n\
         ABC123,dp,10,2,10,0.2,5.0\n\
         ABC123,graphs,5,5,5,1.0,1.0\n\
         ABC123,math,0,0,0,0.0,0.0\n\
         pro,dp,20,18,25,0.9,1.39\n\
         pro,graphs,10,9,12,0.9,1.33\n\
         pro,math,5,5,5,1.0,1.0\n\
         mixed_Case,dp,4,4,4,1.0,1.0\n\
         mixed_Case,graphs,2,1,3,0.5,3.0\n\
         mixed_Case,math,1,1,1,1.0,1.0\n",
    )
    .unwrap();
    fs::write(dir.join("user_clusters.csv"), "user_id,cluster\nABC123,1\npro,2\n").unwrap();
    fs::write(
        dir.join("user_ratings.csv"),
        "user_id,rating\nABC123,1200\npro,2000\nmixed_Case,1950\nrated_only,1000\n",
    )
    .unwrap();
    fs::write(
        dir.join("user_problem_history.csv"),
        "user_id,contest_id,problem_index,solved\nABC123,1500,A,1\nABC123,1500,B,0\n",
    )
    .unwrap();
    fs::write(
        dir.join("cluster_topic_problems.csv"),
        "cluster,topic,problem_key,problem_name,problem_rating,success_rate,median_submissions_until_ok,cf_link\n\
         1,dp,1500-A,Already Solved,1100,0.99,1,https://codeforces.com/problemset/problem/1500/A\n\
         1,dp,1500-B,Knapsack Lite,1300,0.9,1,https://codeforces.com/problemset/problem/1500/B\n\
         1,dp,1600-C,Grid Paths,1200,0.6,2,https://codeforces.com/problemset/problem/1600/C\n\
         1,dp,1700-D,Subsequences,1400,0.95,1,https://codeforces.com/problemset/problem/1700/D\n\
         1,dp,1800-E,Bitmasks,2100,0.5,3,https://codeforces.com/problemset/problem/1800/E\n\
         1,math,1900-A,Divisors,,0.7,2,https://codeforces.com/problemset/problem/1900/A\n\
         2,dp,2000-A,Hard DP,2200,0.4,3,https://codeforces.com/problemset/problem/2000/A\n\
         2,graphs,2000-B,Flows,2300,0.3,4,https://codeforces.com/problemset/problem/2000/B\n",
    )
    .unwrap();
}

pub fn submission(contest_id: i64, index: &str, tags: &[&str], verdict: &str) -> Submission {
    Submission {
        id: 0,
        contest_id: Some(contest_id),
        problem: Problem {
            contest_id: Some(contest_id),
            index: Some(index.to_string()),
            name: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            rating: None,
        },
        verdict: Some(verdict.to_string()),
    }
}

/// In-process stand-in for the Codeforces API.
#[derive(Default)]
pub struct FakeCodeforces {
    users: HashMap<String, (UserInfo, Vec<Submission>)>,
    pub calls: AtomicUsize,
}

impl FakeCodeforces {
    pub fn with_user(
        mut self,
        handle: &str,
        rating: Option<i64>,
        submissions: Vec<Submission>,
    ) -> Self {
        let info = UserInfo {
            handle: handle.to_string(),
            rating,
            max_rating: rating,
            rank: None,
        };
        self.users.insert(handle.to_string(), (info, submissions));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, handle: &str) -> Result<&(UserInfo, Vec<Submission>), UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.users.get(handle).ok_or_else(|| {
            UpstreamError::Api(format!("handles: User with handle {} not found", handle))
        })
    }
}

#[async_trait]
impl CodeforcesApi for FakeCodeforces {
    async fn user_info(&self, handle: &str) -> Result<Vec<UserInfo>, UpstreamError> {
        Ok(vec![self.lookup(handle)?.0.clone()])
    }

    async fn user_rating(&self, handle: &str) -> Result<Vec<RatingChange>, UpstreamError> {
        self.lookup(handle)?;
        Ok(Vec::new())
    }

    async fn user_status(
        &self,
        handle: &str,
        count: usize,
    ) -> Result<Vec<Submission>, UpstreamError> {
        Ok(self.lookup(handle)?.1.iter().take(count).cloned().collect())
    }
}

/// Cache whose writes always fail.
pub struct BrokenCache;

#[async_trait]
impl ResultCache for BrokenCache {
    async fn get(&self, _id: &str) -> Result<Option<RecommendationResponse>, CacheError> {
        Ok(None)
    }

    async fn put(&self, _id: &str, _payload: &RecommendationResponse) -> Result<(), CacheError> {
        Err(CacheError::Serialization(
            serde_json::from_str::<u8>("not json").unwrap_err(),
        ))
    }
}

pub fn default_codeforces() -> FakeCodeforces {
    FakeCodeforces::default()
        .with_user(
            "newbie",
            Some(1150),
            vec![
                submission(1700, "D", &["dp"], "OK"),
                submission(2100, "A", &["math"], "WRONG_ANSWER"),
                submission(2100, "A", &["math"], "WRONG_ANSWER"),
                submission(2100, "A", &["math"], "WRONG_ANSWER"),
            ],
        )
        .with_user("rated_only", Some(1000), vec![submission(1900, "A", &["math"], "OK")])
        .with_user("silent", Some(1400), Vec::new())
}

pub struct Harness {
    pub service: RecommendationService,
    pub cache: Arc<InMemoryResultCache>,
    pub codeforces: Arc<FakeCodeforces>,
    pub dataset: Arc<DatasetStore>,
    pub config: Arc<Config>,
    _dir: tempfile::TempDir,
}

pub fn harness() -> Harness {
    harness_with(default_codeforces())
}

pub fn harness_with(codeforces: FakeCodeforces) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());

    let config = Arc::new(Config::default());
    let dataset = Arc::new(DatasetStore::new(dir.path()));
    let codeforces = Arc::new(codeforces);
    let cache = Arc::new(InMemoryResultCache::new());
    let live = Arc::new(LiveFeatureBuilder::new(
        codeforces.clone(),
        config.codeforces.max_submissions,
    ));
    let service = RecommendationService::new(dataset.clone(), live, cache.clone(), config.clone());

    Harness {
        service,
        cache,
        codeforces,
        dataset,
        config,
        _dir: dir,
    }
}
