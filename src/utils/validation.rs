use crate::config::RecommendationConfig;
use crate::error::{MentorError, Result};

pub const MAX_HANDLE_LENGTH: usize = 64;

/// Trimmed handle, or a validation error for blank or malformed input.
pub fn validate_codeforces_id(raw: &str) -> Result<String> {
    let handle = raw.trim();

    if handle.is_empty() {
        return Err(MentorError::Validation("codeforcesId is required".to_string()));
    }

    if handle.len() > MAX_HANDLE_LENGTH {
        return Err(MentorError::Validation(format!(
            "codeforcesId too long (max {} characters)",
            MAX_HANDLE_LENGTH
        )));
    }

    if handle.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(MentorError::Validation(
            "codeforcesId cannot contain whitespace".to_string(),
        ));
    }

    Ok(handle.to_string())
}

/// Problems per topic, defaulted and clamped to `[1, max_per_topic]`.
pub fn clamp_per_topic(per_topic: Option<i64>, config: &RecommendationConfig) -> usize {
    let max = config.max_per_topic.max(1) as i64;
    per_topic
        .unwrap_or(config.default_per_topic as i64)
        .clamp(1, max) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_codeforces_id() {
        assert_eq!(validate_codeforces_id("  tourist ").unwrap(), "tourist");
        assert!(matches!(
            validate_codeforces_id("   "),
            Err(MentorError::Validation(_))
        ));
        assert!(validate_codeforces_id("").is_err());
        assert!(validate_codeforces_id("two words").is_err());
        assert!(validate_codeforces_id(&"x".repeat(MAX_HANDLE_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_clamp_per_topic() {
        let config = RecommendationConfig::default();
        assert_eq!(clamp_per_topic(None, &config), 3);
        assert_eq!(clamp_per_topic(Some(0), &config), 1);
        assert_eq!(clamp_per_topic(Some(-4), &config), 1);
        assert_eq!(clamp_per_topic(Some(7), &config), 7);
        assert_eq!(clamp_per_topic(Some(50), &config), 10);
    }
}
