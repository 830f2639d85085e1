use serde::{Deserialize, Serialize};

use crate::model::common::ElectionState;

/// Name of the singleton election record.
pub const MAIN_ELECTION: &str = "main_election";

/// The election's status record. Its absence means the election is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionRecord {
    pub name: String,
    #[serde(default)]
    pub election_status: ElectionState,
}
