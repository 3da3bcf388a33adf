pub mod cache;
pub mod codeforces;
pub mod live_features;
pub mod recommendation;
