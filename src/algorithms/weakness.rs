use crate::models::UserTopicRow;

pub const STRUGGLE_CAP: f64 = 8.0;
pub const UNATTEMPTED_PENALTY: f64 = 0.4;

/// Composite weakness of a topic: inverse accuracy, capped struggle and a flat
/// penalty for topics never attempted.
pub fn weakness(row: &UserTopicRow) -> f64 {
    let penalty = if row.attempted_unique == 0 {
        UNATTEMPTED_PENALTY
    } else {
        0.0
    };
    (1.0 - row.accuracy_unique) + row.struggle_score.min(STRUGGLE_CAP) / 10.0 + penalty
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredTopic<'a> {
    pub row: &'a UserTopicRow,
    pub score: f64,
}

/// Weakest `limit` topics, highest score first; ties keep row order.
pub fn select_weak(rows: &[UserTopicRow], limit: usize) -> Vec<ScoredTopic<'_>> {
    let mut scored: Vec<ScoredTopic<'_>> = rows
        .iter()
        .map(|row| ScoredTopic {
            row,
            score: weakness(row),
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(topic: &str, attempted: u32, solved: u32, struggle: f64) -> UserTopicRow {
        let accuracy = if attempted == 0 {
            0.0
        } else {
            solved as f64 / attempted as f64
        };
        UserTopicRow {
            attempted_unique: attempted,
            solved_unique: solved,
            accuracy_unique: accuracy,
            struggle_score: struggle,
            ..UserTopicRow::empty("u", topic)
        }
    }

    #[test]
    fn test_weakness_formula() {
        let score = weakness(&row("dp", 10, 2, 5.0));
        assert!((score - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_struggle_is_capped() {
        let capped = weakness(&row("dp", 10, 5, 8.0));
        let runaway = weakness(&row("dp", 10, 5, 120.0));
        assert!((capped - runaway).abs() < 1e-12);
    }

    #[test]
    fn test_unattempted_penalty() {
        let score = weakness(&row("geometry", 0, 0, 0.0));
        assert!((score - 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_weakness_monotonic_in_accuracy() {
        let mut previous = f64::NEG_INFINITY;
        for step in (0..=10).rev() {
            let mut r = row("dp", 10, 0, 3.0);
            r.accuracy_unique = step as f64 / 10.0;
            let score = weakness(&r);
            assert!(score >= previous);
            previous = score;
        }
    }

    #[test]
    fn test_select_weak_orders_and_truncates() {
        let rows = vec![
            row("a", 10, 10, 1.0),
            row("b", 10, 2, 5.0),
            row("c", 0, 0, 0.0),
            row("d", 10, 9, 1.0),
            row("e", 10, 5, 2.0),
            row("f", 10, 1, 9.0),
            row("g", 4, 1, 4.0),
        ];
        let weak: Vec<&str> = select_weak(&rows, 5)
            .iter()
            .map(|s| s.row.topic.as_str())
            .collect();
        assert_eq!(weak, vec!["f", "c", "b", "g", "e"]);
    }

    #[test]
    fn test_select_weak_order_survives_nan_score() {
        let mut broken = row("n", 10, 5, 1.0);
        broken.accuracy_unique = f64::NAN;
        let rows = vec![row("strong", 10, 9, 1.0), broken, row("weak", 10, 1, 6.0)];

        let weak: Vec<&str> = select_weak(&rows, 3)
            .iter()
            .map(|s| s.row.topic.as_str())
            .collect();
        let position = |topic: &str| weak.iter().position(|t| *t == topic).unwrap();
        assert!(position("weak") < position("strong"));
    }

    #[test]
    fn test_select_weak_ties_keep_row_order() {
        let rows = vec![row("x", 0, 0, 0.0), row("y", 0, 0, 0.0), row("z", 0, 0, 0.0)];
        let weak: Vec<&str> = select_weak(&rows, 2)
            .iter()
            .map(|s| s.row.topic.as_str())
            .collect();
        assert_eq!(weak, vec!["x", "y"]);
    }
}
