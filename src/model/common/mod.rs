//! Types shared between the database and the API.

mod election;
pub use election::{ElectionState, ParseStateError};
