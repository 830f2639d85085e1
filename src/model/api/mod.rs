//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - IDs are serialised as hex strings.

pub mod candidate;
pub mod contact;
pub mod election;
pub mod id;
pub mod message;
pub mod results;
pub mod vote;
pub mod voter;
