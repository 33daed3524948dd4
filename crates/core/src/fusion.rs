use crate::models::{FusedResult, RankedResult};
use std::collections::HashMap;

/// Dampens top-rank dominance in reciprocal-rank scoring.
pub const RRF_DAMPING: f64 = 60.0;

/// Rank used in the combined-rank tie-break for a retriever that did not
/// return the chunk at all.
const MISSING_RANK: usize = usize::MAX / 4;

#[derive(Debug, Clone, Copy)]
pub struct FusionWeights {
    pub lexical: f64,
    pub vector: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        // Literal term matches are the stronger signal for form-like
        // financial documents.
        Self {
            lexical: 0.7,
            vector: 0.3,
        }
    }
}

#[derive(Debug, Default)]
struct Accumulated {
    fused_score: f64,
    lexical_rank: Option<usize>,
    vector_rank: Option<usize>,
}

/// Weighted reciprocal-rank fusion of the two retriever lists. A chunk in
/// only one list scores from that list alone. Output is deduplicated by
/// chunk id and sorted fused score descending, ties broken by lowest
/// combined rank then ascending chunk id.
pub fn fuse(
    lexical: &[RankedResult],
    vector: &[RankedResult],
    weights: FusionWeights,
) -> Vec<FusedResult> {
    let mut accumulated: HashMap<usize, Accumulated> = HashMap::new();

    for result in lexical {
        let entry = accumulated.entry(result.chunk_id).or_default();
        entry.fused_score += weights.lexical / (result.rank as f64 + RRF_DAMPING);
        entry.lexical_rank = Some(result.rank);
    }

    for result in vector {
        let entry = accumulated.entry(result.chunk_id).or_default();
        entry.fused_score += weights.vector / (result.rank as f64 + RRF_DAMPING);
        entry.vector_rank = Some(result.rank);
    }

    let mut fused: Vec<(usize, Accumulated)> = accumulated.into_iter().collect();
    fused.sort_by(|(left_id, left), (right_id, right)| {
        right
            .fused_score
            .total_cmp(&left.fused_score)
            .then_with(|| combined_rank(left).cmp(&combined_rank(right)))
            .then_with(|| left_id.cmp(right_id))
    });

    fused
        .into_iter()
        .map(|(chunk_id, entry)| FusedResult {
            chunk_id,
            fused_score: entry.fused_score,
        })
        .collect()
}

fn combined_rank(entry: &Accumulated) -> usize {
    entry.lexical_rank.unwrap_or(MISSING_RANK) + entry.vector_rank.unwrap_or(MISSING_RANK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(pairs: &[(usize, f64)]) -> Vec<RankedResult> {
        pairs
            .iter()
            .enumerate()
            .map(|(position, (chunk_id, score))| RankedResult {
                chunk_id: *chunk_id,
                score: *score,
                rank: position + 1,
            })
            .collect()
    }

    #[test]
    fn chunk_first_in_both_lists_fuses_first() {
        let lexical = ranked(&[(7, 9.0), (2, 4.0), (5, 1.0)]);
        let vector = ranked(&[(7, 0.9), (5, 0.4)]);

        let fused = fuse(&lexical, &vector, FusionWeights::default());
        assert_eq!(fused[0].chunk_id, 7);
    }

    #[test]
    fn fused_output_has_no_duplicate_chunk_ids() {
        let lexical = ranked(&[(1, 3.0), (2, 2.0)]);
        let vector = ranked(&[(2, 0.8), (1, 0.7)]);

        let fused = fuse(&lexical, &vector, FusionWeights::default());
        assert_eq!(fused.len(), 2);
        let mut ids: Vec<usize> = fused.iter().map(|result| result.chunk_id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn chunk_absent_from_both_lists_never_appears() {
        let fused = fuse(
            &ranked(&[(1, 1.0)]),
            &ranked(&[(2, 0.5)]),
            FusionWeights::default(),
        );
        assert!(fused.iter().all(|result| result.chunk_id != 3));
    }

    #[test]
    fn single_list_membership_still_scores() {
        let fused = fuse(&ranked(&[(4, 2.0)]), &[], FusionWeights::default());
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].chunk_id, 4);
        assert!(fused[0].fused_score > 0.0);
    }

    #[test]
    fn lexical_weight_dominates_on_equal_ranks() {
        // Chunk 1 is lexical #1, chunk 2 is vector #1.
        let fused = fuse(
            &ranked(&[(1, 5.0)]),
            &ranked(&[(2, 0.9)]),
            FusionWeights::default(),
        );
        assert_eq!(fused[0].chunk_id, 1);
    }

    #[test]
    fn equal_scores_break_ties_by_combined_rank_then_id() {
        let weights = FusionWeights {
            lexical: 0.5,
            vector: 0.5,
        };
        // Chunks 8 and 3 each appear at rank 1 of one list only, with the
        // same weight, so scores tie and the id decides.
        let fused = fuse(&ranked(&[(8, 1.0)]), &ranked(&[(3, 1.0)]), weights);
        assert_eq!(fused.len(), 2);
        assert_eq!(fused[0].chunk_id, 3);
        assert_eq!(fused[1].chunk_id, 8);
    }

    #[test]
    fn empty_inputs_fuse_to_empty_output() {
        assert!(fuse(&[], &[], FusionWeights::default()).is_empty());
    }
}
