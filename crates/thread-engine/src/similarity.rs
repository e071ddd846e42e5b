//! Set similarity functions.
//!
//! Pure Rust implementations without external dependencies.

use std::collections::HashSet;

/// Calculate the Jaccard similarity between two sets of strings.
///
/// Returns |intersection| / |union| in [0.0, 1.0]. Two empty sets are
/// defined as fully similar (1.0) and one empty set against a non-empty one
/// scores 0.0. The vacuous-truth case is a deliberate policy, relied on by
/// the matcher for posts and threads that both lack entities.
///
/// Symmetric and deterministic. Duplicate elements in the input slices are
/// collapsed before scoring.
pub fn jaccard_similarity<A, B>(a: &[A], b: &[B]) -> f64
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let set_a: HashSet<&str> = a.iter().map(AsRef::as_ref).collect();
    let set_b: HashSet<&str> = b.iter().map(AsRef::as_ref).collect();

    if set_a.is_empty() && set_b.is_empty() {
        return 1.0;
    }
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();

    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_jaccard_identical_sets() {
        let a = ["fed", "rates", "hike"];
        assert!((jaccard_similarity(&a, &a) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_jaccard_disjoint_sets() {
        let a = ["fed", "rates"];
        let b = ["nvda", "earnings"];
        assert!(jaccard_similarity(&a, &b).abs() < f64::EPSILON);
    }

    #[test]
    fn test_jaccard_partial_overlap() {
        let a = ["fed", "rates", "hike"];
        let b = ["fed", "rates", "markets"];
        // Intersection 2, union 4
        assert!((jaccard_similarity(&a, &b) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_jaccard_both_empty_is_one() {
        let empty: [&str; 0] = [];
        assert!((jaccard_similarity(&empty, &empty) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_jaccard_one_empty_is_zero() {
        let empty: [&str; 0] = [];
        let b = ["x"];
        assert!(jaccard_similarity(&empty, &b).abs() < f64::EPSILON);
        assert!(jaccard_similarity(&b, &empty).abs() < f64::EPSILON);
    }

    #[test]
    fn test_jaccard_symmetric() {
        let a = ["alpha", "bravo", "charlie"];
        let b = ["bravo", "delta"];
        assert_eq!(jaccard_similarity(&a, &b), jaccard_similarity(&b, &a));
    }

    #[test]
    fn test_jaccard_collapses_duplicates() {
        let a = ["fed", "fed", "rates"];
        let b = ["fed", "rates"];
        assert!((jaccard_similarity(&a, &b) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_jaccard_mixed_element_types() {
        let a = vec!["fed".to_string(), "rates".to_string()];
        let b = ["fed", "rates"];
        assert!((jaccard_similarity(&a, &b) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_jaccard_bounds_randomized() {
        let mut rng = rand::rng();
        let vocab = ["a", "b", "c", "d", "e", "f", "g", "h"];

        for _ in 0..500 {
            let a: Vec<&str> = vocab
                .iter()
                .filter(|_| rng.random_bool(0.5))
                .copied()
                .collect();
            let b: Vec<&str> = vocab
                .iter()
                .filter(|_| rng.random_bool(0.5))
                .copied()
                .collect();

            let sim = jaccard_similarity(&a, &b);
            assert!((0.0..=1.0).contains(&sim), "out of bounds: {}", sim);
            assert_eq!(sim, jaccard_similarity(&b, &a));
            if !a.is_empty() {
                assert!((jaccard_similarity(&a, &a) - 1.0).abs() < f64::EPSILON);
            }
        }
    }
}
