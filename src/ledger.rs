//! The election ledger: open/closed gating, one vote per voter, and tallying.

use std::collections::HashMap;

use log::{debug, info};
use mongodb::{
    bson::{doc, from_document, Bson, Document},
    options::UpdateOptions,
    Database,
};
use rocket::{
    futures::TryStreamExt,
    http::Status,
    request::{self, FromRequest, Request},
    State,
};
use serde::Deserialize;
use thiserror::Error;

use crate::error::Result;
use crate::model::{
    api::results::CandidateResult,
    common::ElectionState,
    db::{Candidate, ElectionRecord, Vote, Voter, MAIN_ELECTION},
    mongodb::{is_duplicate_key_error, Coll, Id},
};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Election is closed")]
    ElectionClosed,
    #[error("Voter not found")]
    VoterNotFound,
    #[error("Already voted")]
    AlreadyVoted,
    #[error("Invalid candidate ID")]
    InvalidCandidateId,
    #[error("Election is still open or not set. Results not available.")]
    ElectionNotClosed,
}

impl LedgerError {
    pub fn status(&self) -> Status {
        match self {
            Self::ElectionClosed => Status::Forbidden,
            Self::VoterNotFound => Status::NotFound,
            Self::AlreadyVoted | Self::InvalidCandidateId | Self::ElectionNotClosed => {
                Status::BadRequest
            }
        }
    }
}

/// Handles on every collection the ledger touches.
pub struct Ledger {
    elections: Coll<ElectionRecord>,
    voters: Coll<Voter>,
    candidates: Coll<Candidate>,
    votes: Coll<Vote>,
}

/// One `$group` row of the tally pipeline.
#[derive(Deserialize)]
struct CandidateCount {
    #[serde(rename = "_id")]
    candidate_id: Id,
    total: u64,
}

impl Ledger {
    pub fn from_db(db: &Database) -> Self {
        Self {
            elections: Coll::from_db(db),
            voters: Coll::from_db(db),
            candidates: Coll::from_db(db),
            votes: Coll::from_db(db),
        }
    }

    /// The current state of the election; open if it was never set.
    pub async fn status(&self) -> Result<ElectionState> {
        let record = self
            .elections
            .find_one(doc! { "name": MAIN_ELECTION }, None)
            .await?;
        Ok(record
            .map(|record| record.election_status)
            .unwrap_or_default())
    }

    /// Fail with [`LedgerError::ElectionClosed`] unless votes are being accepted.
    pub async fn ensure_open(&self) -> Result<()> {
        match self.status().await? {
            ElectionState::Open => Ok(()),
            ElectionState::Closed => Err(LedgerError::ElectionClosed.into()),
        }
    }

    /// Open or close the election.
    pub async fn set_status(&self, state: ElectionState) -> Result<()> {
        let options = UpdateOptions::builder().upsert(true).build();
        self.elections
            .update_one(
                doc! { "name": MAIN_ELECTION },
                doc! { "$set": { "election_status": state } },
                options,
            )
            .await?;
        info!("Election is now {state}");
        Ok(())
    }

    /// Record `voter_name`'s vote for `candidate_id`.
    ///
    /// The candidate ID only has to be well-formed; it is not checked against
    /// the candidate list.
    pub async fn cast_vote(&self, voter_name: &str, candidate_id: &str) -> Result<Vote> {
        self.ensure_open().await?;

        let voter = self
            .voters
            .find_one(doc! { "name": voter_name.trim() }, None)
            .await?
            .ok_or(LedgerError::VoterNotFound)?;

        let already_voted = self
            .votes
            .find_one(doc! { "voter_id": voter.id }, None)
            .await?
            .is_some();
        if already_voted {
            return Err(LedgerError::AlreadyVoted.into());
        }

        let candidate_id = candidate_id
            .trim()
            .parse::<Id>()
            .map_err(|_| LedgerError::InvalidCandidateId)?;

        let vote = Vote {
            voter_id: voter.id,
            candidate_id,
        };
        // The unique index on `voter_id` catches a concurrent duplicate that
        // slipped past the check above.
        if let Err(e) = self.votes.insert_one(&vote, None).await {
            return Err(if is_duplicate_key_error(&e) {
                LedgerError::AlreadyVoted.into()
            } else {
                e.into()
            });
        }
        info!("Voter {} cast a vote", voter.id);
        Ok(vote)
    }

    /// Count the votes per candidate, most votes first. Only available once
    /// the election is closed.
    pub async fn tally(&self) -> Result<Vec<CandidateResult>> {
        if self.status().await? != ElectionState::Closed {
            return Err(LedgerError::ElectionNotClosed.into());
        }

        let pipeline = [doc! {
            "$group": { "_id": "$candidate_id", "total": { "$sum": 1 } }
        }];
        let counts = self
            .votes
            .aggregate(pipeline, None)
            .await?
            .try_collect::<Vec<Document>>()
            .await?
            .into_iter()
            .map(|row| from_document::<CandidateCount>(row).map(|c| (c.candidate_id, c.total)))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!("Tallied votes for {} candidates", counts.len());

        let ids = counts
            .iter()
            .map(|(id, _)| Bson::from(*id))
            .collect::<Vec<_>>();
        let names = self
            .candidates
            .find(doc! { "_id": { "$in": ids } }, None)
            .await?
            .try_collect::<Vec<Candidate>>()
            .await?
            .into_iter()
            .map(|candidate| (candidate.id, candidate.candidate.name))
            .collect::<HashMap<_, _>>();

        Ok(CandidateResult::ranked(counts, &names))
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Ledger {
    type Error = ();

    /// Panics iff the [`Database`] is not managed by [`rocket::Rocket`].
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let db = req.guard::<&State<Database>>().await.unwrap();
        request::Outcome::Success(Ledger::from_db(db))
    }
}
