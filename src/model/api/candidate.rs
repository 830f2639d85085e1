use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::{api::id::ApiId, db::Candidate, db::NewCandidate};

/// A candidate to be added.
#[derive(Clone, Deserialize, Serialize)]
pub struct CandidateSpec {
    pub name: String,
    #[serde(default)]
    pub bio: String,
}

impl TryFrom<CandidateSpec> for NewCandidate {
    type Error = Error;

    fn try_from(spec: CandidateSpec) -> Result<Self, Self::Error> {
        let name = spec.name.trim();
        if name.is_empty() {
            return Err(Error::bad_request("Missing candidate name"));
        }
        Ok(Self {
            name: name.to_string(),
            bio: spec.bio.trim().to_string(),
        })
    }
}

/// API-friendly representation of a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDesc {
    pub id: ApiId,
    pub name: String,
    pub bio: String,
}

impl From<Candidate> for CandidateDesc {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id.into(),
            name: candidate.candidate.name,
            bio: candidate.candidate.bio,
        }
    }
}
