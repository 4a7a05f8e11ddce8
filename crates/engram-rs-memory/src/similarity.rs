//! Cosine similarity scoring with explicit degenerate-vector handling.

use crate::error::MemoryError;
use log::warn;

/// Score assigned to zero-norm candidates.
pub const DEGENERATE_SCORE: f32 = -1.0;

/// Cosine similarity between `query` and every candidate vector.
///
/// Zero-norm candidates score exactly [`DEGENERATE_SCORE`]. When no candidate
/// can be scored against the query (the query or every candidate has zero
/// norm) the batch is rejected with [`MemoryError::DegenerateVectors`]. An
/// empty batch yields an empty result.
pub fn cosine_similarity_scores<V: AsRef<[f32]>>(
    query: &[f32],
    candidates: &[V],
) -> Result<Vec<f32>, MemoryError> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }
    for candidate in candidates {
        let actual = candidate.as_ref().len();
        if actual != query.len() {
            return Err(MemoryError::DimensionMismatch {
                expected: query.len(),
                actual,
            });
        }
    }

    let query_norm = l2_norm(query);
    let mut scores = vec![DEGENERATE_SCORE; candidates.len()];
    let mut valid = 0usize;
    if query_norm != 0.0 {
        for (score, candidate) in scores.iter_mut().zip(candidates) {
            let candidate = candidate.as_ref();
            let candidate_norm = l2_norm(candidate);
            if candidate_norm == 0.0 {
                continue;
            }
            let cosine = dot(query, candidate) / (query_norm * candidate_norm);
            *score = cosine.clamp(-1.0, 1.0) as f32;
            valid += 1;
        }
    }

    if valid == 0 {
        return Err(MemoryError::DegenerateVectors);
    }
    if valid < candidates.len() {
        warn!(
            "some candidate embeddings are zero vectors; scoring them {} (degenerate={}, total={})",
            DEGENERATE_SCORE,
            candidates.len() - valid,
            candidates.len()
        );
    }
    Ok(scores)
}

fn l2_norm(vector: &[f32]) -> f64 {
    vector
        .iter()
        .map(|value| f64::from(*value) * f64::from(*value))
        .sum::<f64>()
        .sqrt()
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn identical_vectors_score_one() {
        let query = vec![0.3, -1.2, 4.5];
        let scores = cosine_similarity_scores(&query, &[query.clone()]).expect("scores");
        assert!((scores[0] - 1.0).abs() < EPSILON);
    }

    #[test]
    fn opposite_and_orthogonal_vectors() {
        let scores =
            cosine_similarity_scores(&[1.0, 0.0], &[vec![-2.0, 0.0], vec![0.0, 3.0]])
                .expect("scores");
        assert!((scores[0] + 1.0).abs() < EPSILON);
        assert!(scores[1].abs() < EPSILON);
    }

    #[test]
    fn scores_ignore_magnitude() {
        let scores = cosine_similarity_scores(&[1.0, 1.0], &[vec![10.0, 10.0], vec![0.1, 0.1]])
            .expect("scores");
        assert!((scores[0] - scores[1]).abs() < EPSILON);
    }

    #[test]
    fn unit_vectors_stay_within_bounds() {
        let unit = |angle: f32| vec![angle.cos(), angle.sin()];
        let query = unit(0.4);
        let candidates: Vec<Vec<f32>> = (0..64).map(|step| unit(step as f32 * 0.1)).collect();
        let scores = cosine_similarity_scores(&query, &candidates).expect("scores");
        assert!(scores.iter().all(|score| (-1.0..=1.0).contains(score)));
    }

    #[test]
    fn zero_candidate_scores_minus_one_exactly() {
        let scores = cosine_similarity_scores(&[1.0, 2.0], &[vec![0.0, 0.0], vec![1.0, 2.0]])
            .expect("scores");
        assert_eq!(scores[0], -1.0);
        assert!((scores[1] - 1.0).abs() < EPSILON);
    }

    #[test]
    fn all_degenerate_candidates_are_rejected() {
        let err = cosine_similarity_scores(&[1.0, 0.0], &[vec![0.0, 0.0], vec![0.0, 0.0]])
            .unwrap_err();
        assert!(matches!(err, MemoryError::DegenerateVectors));
    }

    #[test]
    fn degenerate_query_is_rejected() {
        let err = cosine_similarity_scores(&[0.0, 0.0], &[vec![0.0, 0.0]]).unwrap_err();
        assert!(matches!(err, MemoryError::DegenerateVectors));
        let err = cosine_similarity_scores(&[0.0, 0.0], &[vec![1.0, 0.0]]).unwrap_err();
        assert!(matches!(err, MemoryError::DegenerateVectors));
    }

    #[test]
    fn empty_batch_is_empty() {
        let candidates: Vec<Vec<f32>> = Vec::new();
        let scores = cosine_similarity_scores(&[1.0], &candidates).expect("scores");
        assert!(scores.is_empty());
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let err = cosine_similarity_scores(&[1.0, 0.0], &[vec![1.0, 0.0, 0.0]]).unwrap_err();
        assert!(matches!(
            err,
            MemoryError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }
}
