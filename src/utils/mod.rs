pub mod validation;

pub use validation::{clamp_per_topic, validate_codeforces_id};
