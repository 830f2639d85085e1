use rocket::{
    serde::json::{Error as JsonError, Json},
    Route,
};

use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::model::{
    api::{
        election::{StatusDesc, StatusUpdate},
        message::Message,
    },
    common::ElectionState,
};

use super::common::required;

pub fn routes() -> Vec<Route> {
    routes![get_status, set_status]
}

#[get("/election_status")]
pub async fn get_status(ledger: Ledger) -> Result<Json<StatusDesc>> {
    let election_status = ledger.status().await?;
    Ok(Json(StatusDesc { election_status }))
}

#[post("/election_status", data = "<body>", format = "json")]
pub async fn set_status(
    body: std::result::Result<Json<StatusUpdate>, JsonError<'_>>,
    ledger: Ledger,
) -> Result<Json<Message>> {
    let update = required(body)?;
    let state = update
        .status
        .parse::<ElectionState>()
        .map_err(|e| Error::bad_request(e.to_string()))?;

    ledger.set_status(state).await?;

    Ok(Json(Message::new(format!("Election {state} successfully"))))
}
