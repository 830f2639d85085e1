//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in an DB-friendly way, e.g.:
//!
//! - IDs are serialised in MongoDB's own format.

mod candidate;
pub use candidate::{Candidate, CandidateCore, NewCandidate};

mod election;
pub use election::{ElectionRecord, MAIN_ELECTION};

mod vote;
pub use vote::Vote;

mod voter;
pub use voter::{hash_password, EnrolledFace, NewVoter, Voter, VoterCore};
