use log::{debug, info};
use mongodb::{bson::doc, options::FindOptions};
use rocket::{
    futures::TryStreamExt,
    http::Status,
    serde::json::{Error as JsonError, Json},
    Route, State,
};

use crate::{
    captcha::{Captcha, CaptchaError},
    error::{Error, Result},
    face::{decode_photo, FaceEncoding, FaceVerifier},
    model::{
        api::{
            message::StatusMessage,
            voter::{LoginRequest, RegisterRequest, Registration},
        },
        db::{hash_password, EnrolledFace, NewVoter, Voter},
        mongodb::{is_duplicate_key_error, Coll},
    },
};

use super::common::required;

const CONTACT_TAKEN: &str = "User with same email or phone already exists";
const FACE_TAKEN: &str = "Face already registered with another user";

pub fn routes() -> Vec<Route> {
    routes![register, login]
}

#[post("/register", data = "<body>", format = "json")]
pub async fn register(
    body: std::result::Result<Json<RegisterRequest>, JsonError<'_>>,
    voters: Coll<Voter>,
    new_voters: Coll<NewVoter>,
    faces: Coll<EnrolledFace>,
    verifier: &State<FaceVerifier>,
) -> Result<(Status, Json<StatusMessage>)> {
    let registration = Registration::try_from(required(body)?)?;
    let email = registration.email.to_string();
    let phone = registration.phone.to_string();

    let with_contact = doc! {
        "$or": [{ "email": &email }, { "phone": &phone }]
    };
    if voters.find_one(with_contact, None).await?.is_some() {
        return Err(Error::bad_request(CONTACT_TAKEN));
    }

    let photo = decode_photo(&registration.image)?;
    let face_encoding = verifier.enroll(&photo).await?;

    let registered = enrolled_faces(&faces).await?;
    if !FaceVerifier::check_uniqueness(&face_encoding, &registered) {
        return Err(Error::bad_request(FACE_TAKEN));
    }

    let voter = NewVoter {
        name: registration.name,
        email,
        phone,
        password_hash: hash_password(&registration.password)?,
        face_encoding,
    };
    if let Err(e) = new_voters.insert_one(&voter, None).await {
        return Err(if is_duplicate_key_error(&e) {
            Error::bad_request(CONTACT_TAKEN)
        } else {
            e.into()
        });
    }
    info!("Registered voter {}", voter.name);

    Ok((Status::Created, Json(StatusMessage::new("registered"))))
}

/// Every stored face encoding, without the rest of the voter documents.
async fn enrolled_faces(faces: &Coll<EnrolledFace>) -> Result<Vec<FaceEncoding>> {
    let options = FindOptions::builder()
        .projection(doc! { "face_encoding": 1, "_id": 0 })
        .build();
    let faces = faces
        .find(None, options)
        .await?
        .try_collect::<Vec<_>>()
        .await?;
    Ok(faces.into_iter().map(|face| face.face_encoding).collect())
}

/// Check, in order: the CAPTCHA, the voter's name, their password, and their
/// face. Each failure is reported distinctly.
#[post("/login", data = "<body>", format = "json")]
pub async fn login(
    body: std::result::Result<Json<LoginRequest>, JsonError<'_>>,
    captcha: std::result::Result<Captcha, CaptchaError>,
    voters: Coll<Voter>,
    verifier: &State<FaceVerifier>,
) -> Result<Json<StatusMessage>> {
    let request = required(body)?;

    match captcha {
        Ok(captcha) if captcha.matches(&request.captcha_input) => {}
        Ok(_) => return Err(Error::bad_request("Incorrect CAPTCHA")),
        Err(e) => {
            debug!("No usable CAPTCHA: {e}");
            return Err(Error::bad_request("Incorrect CAPTCHA"));
        }
    }

    let voter = voters
        .find_one(doc! { "name": request.name.trim() }, None)
        .await?
        .ok_or_else(|| Error::not_found("User not found"))?;

    if !voter.verify_password(request.password.trim())? {
        return Err(Error::Status(
            Status::Unauthorized,
            "Wrong password".to_string(),
        ));
    }

    let photo = decode_photo(&request.image)?;
    if !verifier.verify(&voter.face_encoding, &photo).await? {
        return Err(Error::Status(
            Status::Unauthorized,
            "Face does not match".to_string(),
        ));
    }
    info!("Voter {} logged in", voter.id);

    Ok(Json(StatusMessage::new("login success")))
}
