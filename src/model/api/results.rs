use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{api::id::ApiId, mongodb::Id};

/// Name reported for votes whose candidate no longer exists.
pub const UNKNOWN_CANDIDATE: &str = "Unknown";

/// One row of the final tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub candidate_id: ApiId,
    pub candidate_name: String,
    pub votes: u64,
}

impl CandidateResult {
    /// Join per-candidate vote counts with candidate names and order them by
    /// descending count, breaking ties by candidate ID.
    pub fn ranked(
        counts: impl IntoIterator<Item = (Id, u64)>,
        names: &HashMap<Id, String>,
    ) -> Vec<CandidateResult> {
        let mut results = counts
            .into_iter()
            .map(|(id, votes)| CandidateResult {
                candidate_id: id.into(),
                candidate_name: names
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_CANDIDATE.to_string()),
                votes,
            })
            .collect::<Vec<_>>();
        results.sort_by(|a, b| {
            b.votes
                .cmp(&a.votes)
                .then_with(|| a.candidate_id.cmp(&b.candidate_id))
        });
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranked_by_descending_count() {
        let a = Id::new();
        let b = Id::new();
        let names = HashMap::from([(a, "A".to_string()), (b, "B".to_string())]);

        let results = CandidateResult::ranked([(b, 1), (a, 2)], &names);

        assert_eq!(
            results,
            vec![
                CandidateResult {
                    candidate_id: a.into(),
                    candidate_name: "A".to_string(),
                    votes: 2,
                },
                CandidateResult {
                    candidate_id: b.into(),
                    candidate_name: "B".to_string(),
                    votes: 1,
                },
            ]
        );
    }

    #[test]
    fn deleted_candidates_are_unknown() {
        let gone = Id::new();
        let results = CandidateResult::ranked([(gone, 3)], &HashMap::new());
        assert_eq!(results[0].candidate_name, UNKNOWN_CANDIDATE);
        assert_eq!(results[0].votes, 3);
    }

    #[test]
    fn ties_are_stable() {
        let mut ids = vec![Id::new(), Id::new(), Id::new()];
        let results = CandidateResult::ranked(ids.iter().map(|id| (*id, 4)), &HashMap::new());
        ids.sort();
        let ranked_ids = results.iter().map(|r| *r.candidate_id).collect::<Vec<_>>();
        assert_eq!(ranked_ids, ids);
    }

    #[test]
    fn no_votes_no_results() {
        assert!(CandidateResult::ranked(Vec::<(Id, u64)>::new(), &HashMap::new()).is_empty());
    }
}
