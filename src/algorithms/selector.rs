use crate::models::ProblemCandidate;
use std::collections::HashSet;

/// Rating distance is only penalised when both ratings are known.
pub fn candidate_score(candidate: &ProblemCandidate, user_rating: f64) -> f64 {
    let rating_gap = if candidate.problem_rating > 0.0 && user_rating > 0.0 {
        (candidate.problem_rating - user_rating).abs() / 800.0
    } else {
        0.0
    };
    candidate.success_rate * 100.0 - candidate.median_submissions_until_ok - rating_gap
}

/// Best `limit` unsolved candidates, highest score first; ties keep input order.
pub fn recommend(
    candidates: &[ProblemCandidate],
    solved: &HashSet<String>,
    user_rating: f64,
    limit: usize,
) -> Vec<ProblemCandidate> {
    let mut scored: Vec<(&ProblemCandidate, f64)> = candidates
        .iter()
        .filter(|c| !solved.contains(&c.problem_key))
        .map(|c| (c, candidate_score(c, user_rating)))
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .take(limit)
        .map(|(c, _)| c.clone())
        .collect()
}
