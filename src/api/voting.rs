use rocket::{
    serde::json::{Error as JsonError, Json},
    Route,
};

use crate::error::Result;
use crate::ledger::Ledger;
use crate::model::api::{message::VoteReceipt, results::CandidateResult, vote::VoteRequest};

use super::common::body_or;

pub fn routes() -> Vec<Route> {
    routes![vote, results]
}

/// Record a vote. Bodies are parsed as JSON whatever their declared content type.
#[post("/vote", data = "<body>")]
pub async fn vote(
    body: std::result::Result<Json<VoteRequest>, JsonError<'_>>,
    ledger: Ledger,
) -> Result<Json<VoteReceipt>> {
    // Before the body, so a closed election is a 403 for any request.
    // `cast_vote` checks again.
    ledger.ensure_open().await?;
    let request = body_or(body, "Missing voter_name or candidate_id")?;

    ledger
        .cast_vote(&request.voter_name, &request.candidate_id)
        .await?;

    Ok(Json(VoteReceipt::recorded()))
}

#[get("/results")]
pub async fn results(ledger: Ledger) -> Result<Json<Vec<CandidateResult>>> {
    Ok(Json(ledger.tally().await?))
}
