use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// A cast vote. `voter_id` is unique across the collection.
///
/// The candidate is not required to exist: votes survive the deletion of their
/// candidate and are tallied under an unknown name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub voter_id: Id,
    pub candidate_id: Id,
}
