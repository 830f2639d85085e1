use std::fmt::{Display, Formatter};
use std::str::FromStr;

use mongodb::bson::{to_bson, Bson};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether the election is accepting votes.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionState {
    /// Votes may be cast; results are hidden.
    #[default]
    Open,
    /// No more votes; results are public.
    Closed,
}

impl Display for ElectionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for ElectionState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            _ => Err(ParseStateError),
        }
    }
}

#[derive(Debug, Error)]
#[error("Status must be 'open' or 'closed'")]
pub struct ParseStateError;

impl From<ElectionState> for Bson {
    fn from(state: ElectionState) -> Self {
        to_bson(&state).expect("Serialisation is infallible")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("open".parse::<ElectionState>().unwrap(), ElectionState::Open);
        assert_eq!(
            "CLOSED".parse::<ElectionState>().unwrap(),
            ElectionState::Closed
        );
        assert_eq!(
            " Closed ".parse::<ElectionState>().unwrap(),
            ElectionState::Closed
        );
        assert!("paused".parse::<ElectionState>().is_err());
        assert!("".parse::<ElectionState>().is_err());
    }

    #[test]
    fn serialises_lowercase() {
        assert_eq!(Bson::from(ElectionState::Closed), Bson::String("closed".into()));
        assert_eq!(ElectionState::default(), ElectionState::Open);
    }
}
