use std::ops::Deref;

use argon2::{Config, Error as Argon2Error};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::face::FaceEncoding;
use crate::model::mongodb::Id;

/// Core voter data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoterCore {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub face_encoding: FaceEncoding,
}

impl VoterCore {
    /// Check whether the given password is correct.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> Result<bool, Argon2Error> {
        argon2::verify_encoded(&self.password_hash, password.as_ref())
    }
}

/// Hash a password with a fresh random salt, in argon2's encoded form.
pub fn hash_password(password: &str) -> Result<String, Argon2Error> {
    // 16 bytes is recommended for password hashing:
    //  https://en.wikipedia.org/wiki/Argon2
    let mut salt = [0_u8; 16];
    rand::thread_rng().fill(&mut salt);
    argon2::hash_encoded(password.as_bytes(), &salt, &Config::default())
}

/// A voter without an ID.
pub type NewVoter = VoterCore;

/// A voter from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voter {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub voter: VoterCore,
}

impl Deref for Voter {
    type Target = VoterCore;

    fn deref(&self) -> &Self::Target {
        &self.voter
    }
}

/// Only the stored face of a voter, for scans that need nothing else.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnrolledFace {
    pub face_encoding: FaceEncoding,
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;
    use crate::face::stub;

    impl VoterCore {
        /// Alice, password "correct horse", face shade 0.
        pub fn example() -> Self {
            Self {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                phone: "0123456789".to_string(),
                password_hash: hash_password("correct horse").unwrap(),
                face_encoding: stub::encoding(0),
            }
        }

        /// Bob, password "battery staple", face shade 200.
        pub fn example2() -> Self {
            Self {
                name: "Bob".to_string(),
                email: "bob@example.com".to_string(),
                phone: "9876543210".to_string(),
                password_hash: hash_password("battery staple").unwrap(),
                face_encoding: stub::encoding(200),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let voter = VoterCore::example();
        assert!(voter.verify_password("correct horse").unwrap());
        assert!(!voter.verify_password("Correct horse").unwrap());
    }

    #[test]
    fn salts_differ() {
        assert_ne!(hash_password("pw").unwrap(), hash_password("pw").unwrap());
    }
}
