use serde::{Deserialize, Serialize};

/// A ballot: the voter (by name) and their chosen candidate's hex ID.
#[derive(Clone, Deserialize, Serialize)]
pub struct VoteRequest {
    pub voter_name: String,
    pub candidate_id: String,
}
