//! Read-only client for the Codeforces public API.
//!
//! Every method returns the `result` payload of an `"OK"` response. Any other
//! status is reported with the `comment` the service sent back. Requests are
//! bounded by the configured timeout and never retried.

use crate::config::CodeforcesConfig;
use crate::error::UpstreamError;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[async_trait]
pub trait CodeforcesApi: Send + Sync {
    async fn user_info(&self, handle: &str) -> Result<Vec<UserInfo>, UpstreamError>;
    async fn user_rating(&self, handle: &str) -> Result<Vec<RatingChange>, UpstreamError>;
    /// Most recent submissions first, at most `count`.
    async fn user_status(
        &self,
        handle: &str,
        count: usize,
    ) -> Result<Vec<Submission>, UpstreamError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub handle: String,
    pub rating: Option<i64>,
    pub max_rating: Option<i64>,
    pub rank: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingChange {
    pub contest_id: i64,
    pub contest_name: String,
    pub rank: i64,
    pub old_rating: i64,
    pub new_rating: i64,
    pub rating_update_time_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: i64,
    pub contest_id: Option<i64>,
    pub problem: Problem,
    pub verdict: Option<String>,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        self.verdict.as_deref() == Some("OK")
    }

    /// `{contest_id}-{index}`, when both parts are known.
    pub fn problem_key(&self) -> Option<String> {
        let contest_id = self.problem.contest_id.or(self.contest_id)?;
        let index = self.problem.index.as_deref().filter(|i| !i.is_empty())?;
        Some(format!("{}-{}", contest_id, index))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub contest_id: Option<i64>,
    pub index: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub rating: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    status: String,
    comment: Option<String>,
    result: Option<T>,
}

pub struct CodeforcesClient {
    http: Client,
    base_url: String,
}

impl CodeforcesClient {
    pub fn new(config: &CodeforcesConfig) -> Result<Self, UpstreamError> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let url = format!("{}/{}", self.base_url, method);
        debug!("GET {} {:?}", url, query);

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        // Failed calls still carry a JSON envelope with a 4xx status.
        match serde_json::from_slice::<ApiEnvelope<T>>(&body) {
            Ok(envelope) if envelope.status == "OK" => envelope
                .result
                .ok_or_else(|| UpstreamError::Api(format!("{} returned no result", method))),
            Ok(envelope) => Err(UpstreamError::Api(envelope.comment.unwrap_or_else(|| {
                format!("{} failed with status {}", method, envelope.status)
            }))),
            Err(_) if !status.is_success() => Err(UpstreamError::Api(format!(
                "{} returned HTTP {}",
                method, status
            ))),
            Err(e) => Err(UpstreamError::Api(format!(
                "invalid {} response: {}",
                method, e
            ))),
        }
    }
}

#[async_trait]
impl CodeforcesApi for CodeforcesClient {
    async fn user_info(&self, handle: &str) -> Result<Vec<UserInfo>, UpstreamError> {
        self.call("user.info", &[("handles", handle.to_string())]).await
    }

    async fn user_rating(&self, handle: &str) -> Result<Vec<RatingChange>, UpstreamError> {
        self.call("user.rating", &[("handle", handle.to_string())]).await
    }

    async fn user_status(
        &self,
        handle: &str,
        count: usize,
    ) -> Result<Vec<Submission>, UpstreamError> {
        self.call(
            "user.status",
            &[
                ("handle", handle.to_string()),
                ("from", "1".to_string()),
                ("count", count.to_string()),
            ],
        )
        .await
    }
}
