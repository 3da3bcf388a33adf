use super::Dataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    Exact,
    CaseInsensitive,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub canonical_id: Option<String>,
    pub mode: ResolveMode,
}

/// Maps a raw handle onto a key of the dataset's identity universe.
pub fn resolve(dataset: &Dataset, raw_id: &str) -> Resolution {
    if dataset.contains_identity(raw_id) {
        return Resolution {
            canonical_id: Some(raw_id.to_string()),
            mode: ResolveMode::Exact,
        };
    }

    match dataset.identity_ignoring_case(raw_id) {
        Some(canonical) => Resolution {
            canonical_id: Some(canonical.to_string()),
            mode: ResolveMode::CaseInsensitive,
        },
        None => Resolution {
            canonical_id: None,
            mode: ResolveMode::None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetTables;

    fn dataset() -> Dataset {
        Dataset::from_tables(DatasetTables {
            clusters: vec![("ABC123".to_string(), 1)],
            ratings: vec![("rated_only".to_string(), 1400.0)],
            ..Default::default()
        })
    }

    #[test]
    fn test_exact_match() {
        let resolution = resolve(&dataset(), "ABC123");
        assert_eq!(resolution.canonical_id.as_deref(), Some("ABC123"));
        assert_eq!(resolution.mode, ResolveMode::Exact);
    }

    #[test]
    fn test_case_insensitive_match() {
        let resolution = resolve(&dataset(), "abc123");
        assert_eq!(resolution.canonical_id.as_deref(), Some("ABC123"));
        assert_eq!(resolution.mode, ResolveMode::CaseInsensitive);
    }

    #[test]
    fn test_universe_includes_rating_table() {
        let resolution = resolve(&dataset(), "Rated_Only");
        assert_eq!(resolution.canonical_id.as_deref(), Some("rated_only"));
        assert_eq!(resolution.mode, ResolveMode::CaseInsensitive);
    }

    #[test]
    fn test_unresolved() {
        let resolution = resolve(&dataset(), "ghost");
        assert_eq!(resolution.canonical_id, None);
        assert_eq!(resolution.mode, ResolveMode::None);
    }
}
