use argon2::Error as Argon2Error;
use image::ImageError;
use jsonwebtoken::errors::Error as JwtError;
use log::error;
use mongodb::{
    bson::{de::Error as BsonDeError, ser::Error as BsonSerError},
    error::Error as DbError,
};
use rocket::{
    http::Status,
    response::{self, Responder},
    serde::json::Json,
    Request,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{face::FaceError, ledger::LedgerError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    BsonSer(#[from] BsonSerError),
    #[error(transparent)]
    BsonDe(#[from] BsonDeError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Argon2(#[from] Argon2Error),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Face(#[from] FaceError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::Status(Status::BadRequest, msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::Status(Status::NotFound, msg.into())
    }

    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Db(_)
            | Self::BsonSer(_)
            | Self::BsonDe(_)
            | Self::Jwt(_)
            | Self::Argon2(_)
            | Self::Image(_) => Status::InternalServerError,
            Self::Face(err) => err.status(),
            Self::Ledger(err) => err.status(),
            Self::Status(status, _) => *status,
        }
    }
}

/// The body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        let message = if status.code >= 500 {
            // Don't leak internals to the client.
            error!("{self}");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorBody::new(message))).respond_to(req)
    }
}
