use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::api::contact::{Email, Phone};

/// Body of a registration request. The password is plaintext and is never stored.
#[derive(Clone, Deserialize, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    /// Base64 photo, optionally as a `data:` URL.
    pub image: String,
}

/// A registration request whose fields have passed validation.
pub struct Registration {
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    pub password: String,
    pub image: String,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = Error;

    /// Trim every field, then check the phone number and email address.
    fn try_from(req: RegisterRequest) -> Result<Self, Self::Error> {
        let name = req.name.trim().to_string();
        let password = req.password.trim().to_string();
        if name.is_empty() || password.is_empty() || req.image.trim().is_empty() {
            return Err(Error::bad_request("Missing required fields"));
        }
        let phone = req
            .phone
            .parse::<Phone>()
            .map_err(|e| Error::bad_request(e.to_string()))?;
        let email = req
            .email
            .parse::<Email>()
            .map_err(|e| Error::bad_request(e.to_string()))?;
        Ok(Self {
            name,
            email,
            phone,
            password,
            image: req.image,
        })
    }
}

/// Body of a login request.
#[derive(Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
    /// Base64 photo, optionally as a `data:` URL.
    pub image: String,
    pub captcha_input: String,
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;
    use crate::face::stub;

    impl RegisterRequest {
        /// A valid registration with a single face of the given shade.
        pub fn example(shade: u8) -> Self {
            Self {
                name: "Carol".to_string(),
                email: "carol@example.com".to_string(),
                phone: "5550001111".to_string(),
                password: "hunter22".to_string(),
                image: stub::photo(&[shade]),
            }
        }
    }
}
