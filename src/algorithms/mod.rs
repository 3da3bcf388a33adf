pub mod classifier;
pub mod features;
pub mod selector;
pub mod weakness;

pub use classifier::{nearest_cluster, predict_cluster};
pub use features::{build_feature_vector, topics_from_columns};
pub use selector::{candidate_score, recommend};
pub use weakness::{select_weak, weakness, ScoredTopic};
