use serde::{Deserialize, Serialize};

use crate::model::common::ElectionState;

/// Request to open or close the election. Parsed case-insensitively; a
/// missing status is rejected like any other invalid one.
#[derive(Clone, Deserialize, Serialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: String,
}

/// The election's current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct StatusDesc {
    pub election_status: ElectionState,
}
