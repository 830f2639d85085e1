use log::debug;
use rocket::serde::json::{Error as JsonError, Json};

use crate::error::{Error, Result};

pub const MISSING_FIELDS: &str = "Missing required fields";

/// Unwrap a JSON request body, reporting any parse failure as a 400 with the
/// given message.
pub fn body_or<T>(body: std::result::Result<Json<T>, JsonError<'_>>, message: &str) -> Result<T> {
    body.map(Json::into_inner).map_err(|e| {
        debug!("Rejected request body: {e:?}");
        Error::bad_request(message)
    })
}

/// Unwrap a JSON request body whose fields are all required.
pub fn required<T>(body: std::result::Result<Json<T>, JsonError<'_>>) -> Result<T> {
    body_or(body, MISSING_FIELDS)
}
