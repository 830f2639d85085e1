//! Face-based identity: enrolment, uniqueness and login-time matching.
//!
//! The heavy lifting (detecting faces and embedding them) is delegated to a
//! [`FaceEncoder`] backend; this module only enforces the single-face contract
//! and compares encodings by Euclidean distance.

use data_encoding::BASE64;
use image::RgbImage;
use rocket::http::Status;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "dlib")]
mod dlib;
#[cfg(not(feature = "dlib"))]
mod remote;

#[cfg(feature = "dlib")]
pub use dlib::DlibEncoder;
#[cfg(not(feature = "dlib"))]
pub use remote::RemoteEncoder;

/// Number of components in a face encoding.
pub const ENCODING_LENGTH: usize = 128;

/// Two encodings closer than this belong to the same person. Calibrated for
/// the 128-d dlib embedding model; not configurable.
pub const MATCH_THRESHOLD: f64 = 0.45;

/// A fixed-length embedding summarising one face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct FaceEncoding(Vec<f64>);

impl FaceEncoding {
    /// Euclidean distance between two encodings.
    pub fn distance(&self, other: &FaceEncoding) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    /// Do these two encodings belong to the same face?
    pub fn matches(&self, other: &FaceEncoding) -> bool {
        self.distance(other) < MATCH_THRESHOLD
    }
}

impl TryFrom<Vec<f64>> for FaceEncoding {
    type Error = EncodingLengthError;

    fn try_from(components: Vec<f64>) -> Result<Self, Self::Error> {
        if components.len() != ENCODING_LENGTH {
            return Err(EncodingLengthError(components.len()));
        }
        Ok(Self(components))
    }
}

impl From<FaceEncoding> for Vec<f64> {
    fn from(encoding: FaceEncoding) -> Self {
        encoding.0
    }
}

#[derive(Debug, Error)]
#[error("face encoding must have {ENCODING_LENGTH} components, got {0}")]
pub struct EncodingLengthError(pub usize);

#[derive(Debug, Error)]
pub enum FaceError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("No face detected in image")]
    NoFaceDetected,
    #[error("Image must contain exactly one face, found {0}")]
    MultipleFacesDetected(usize),
    #[error("Face recognition backend failed: {0}")]
    Backend(String),
}

impl FaceError {
    pub fn status(&self) -> Status {
        match self {
            Self::InvalidImage(_) | Self::NoFaceDetected | Self::MultipleFacesDetected(_) => {
                Status::BadRequest
            }
            Self::Backend(_) => Status::InternalServerError,
        }
    }
}

/// A backend that finds every face in an image and embeds each one.
#[rocket::async_trait]
pub trait FaceEncoder: Send + Sync {
    async fn encode_faces(&self, image: &RgbImage) -> Result<Vec<FaceEncoding>, FaceError>;
}

/// Run CPU-bound encoding work on the blocking thread pool, off the async workers.
#[cfg_attr(not(feature = "dlib"), allow(dead_code))]
pub(crate) async fn encode_blocking<F>(work: F) -> Result<Vec<FaceEncoding>, FaceError>
where
    F: FnOnce() -> Result<Vec<FaceEncoding>, FaceError> + Send + 'static,
{
    rocket::tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| FaceError::Backend(e.to_string()))?
}

/// Decode a base64 photo, optionally wrapped in a `data:` URL, into pixels.
pub fn decode_photo(photo: &str) -> Result<RgbImage, FaceError> {
    let payload = match photo.split_once(',') {
        Some((_, payload)) => payload,
        None => photo,
    }
    .trim();
    if payload.is_empty() {
        return Err(FaceError::InvalidImage("empty image string".to_string()));
    }
    let bytes = BASE64
        .decode(payload.as_bytes())
        .map_err(|e| FaceError::InvalidImage(e.to_string()))?;
    let image =
        image::load_from_memory(&bytes).map_err(|e| FaceError::InvalidImage(e.to_string()))?;
    Ok(image.to_rgb8())
}

/// Managed state wrapping the configured [`FaceEncoder`].
pub struct FaceVerifier {
    encoder: Box<dyn FaceEncoder>,
}

impl FaceVerifier {
    pub fn new(encoder: impl FaceEncoder + 'static) -> Self {
        Self {
            encoder: Box::new(encoder),
        }
    }

    /// Extract the encoding of the single face in `photo`.
    pub async fn enroll(&self, photo: &RgbImage) -> Result<FaceEncoding, FaceError> {
        let mut encodings = self.encoder.encode_faces(photo).await?;
        match encodings.len() {
            0 => Err(FaceError::NoFaceDetected),
            1 => Ok(encodings.remove(0)),
            n => Err(FaceError::MultipleFacesDetected(n)),
        }
    }

    /// Check `presented` shows the same face as `claimed`.
    pub async fn verify(
        &self,
        claimed: &FaceEncoding,
        presented: &RgbImage,
    ) -> Result<bool, FaceError> {
        let presented = self.enroll(presented).await?;
        Ok(claimed.matches(&presented))
    }

    /// True iff `encoding` is not within matching distance of any stored encoding.
    /// This is a linear scan.
    pub fn check_uniqueness<'a>(
        encoding: &FaceEncoding,
        stored: impl IntoIterator<Item = &'a FaceEncoding>,
    ) -> bool {
        stored.into_iter().all(|other| !encoding.matches(other))
    }
}


#[cfg(test)]
mod tests {
    use super::stub::{encoding, photo, StubEncoder};
    use super::*;

    #[test]
    fn euclidean_distance() {
        let mut a = vec![0.0; ENCODING_LENGTH];
        let mut b = vec![0.0; ENCODING_LENGTH];
        a[0] = 3.0;
        b[1] = 4.0;
        let a = FaceEncoding::try_from(a).unwrap();
        let b = FaceEncoding::try_from(b).unwrap();
        assert!((a.distance(&b) - 5.0).abs() < 1e-9);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut components = vec![0.0; ENCODING_LENGTH];
        let origin = FaceEncoding::try_from(components.clone()).unwrap();
        components[0] = MATCH_THRESHOLD;
        let boundary = FaceEncoding::try_from(components.clone()).unwrap();
        components[0] = MATCH_THRESHOLD - 0.01;
        let inside = FaceEncoding::try_from(components).unwrap();
        assert!(!origin.matches(&boundary));
        assert!(origin.matches(&inside));
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(FaceEncoding::try_from(vec![0.0; 4]).is_err());
        let json = format!("[{}]", vec!["0.5"; 3].join(","));
        assert!(rocket::serde::json::serde_json::from_str::<FaceEncoding>(&json).is_err());
    }

    #[test]
    fn uniqueness_scan() {
        let stored = vec![encoding(0), encoding(200)];
        assert!(!FaceVerifier::check_uniqueness(&encoding(50), &stored));
        assert!(FaceVerifier::check_uniqueness(&encoding(120), &stored));
        assert!(FaceVerifier::check_uniqueness(
            &encoding(120),
            Vec::<FaceEncoding>::new().iter()
        ));
    }

    #[test]
    fn photo_decoding() {
        let raw = photo(&[10]);
        assert_eq!(decode_photo(&raw).unwrap().width(), 1);
        let url = format!("data:image/png;base64,{raw}");
        assert_eq!(decode_photo(&url).unwrap().get_pixel(0, 0).0, [10, 0, 0]);
        assert!(matches!(decode_photo(""), Err(FaceError::InvalidImage(_))));
        assert!(matches!(
            decode_photo("bm90IGFuIGltYWdl"),
            Err(FaceError::InvalidImage(_))
        ));
    }

    #[rocket::async_test]
    async fn enroll_requires_exactly_one_face() {
        let verifier = FaceVerifier::new(StubEncoder);
        let none = decode_photo(&photo(&[])).unwrap();
        let two = decode_photo(&photo(&[0, 200])).unwrap();
        let one = decode_photo(&photo(&[30])).unwrap();

        assert!(matches!(
            verifier.enroll(&none).await,
            Err(FaceError::NoFaceDetected)
        ));
        assert!(matches!(
            verifier.enroll(&two).await,
            Err(FaceError::MultipleFacesDetected(2))
        ));
        assert_eq!(verifier.enroll(&one).await.unwrap(), encoding(30));
    }

    #[rocket::async_test]
    async fn verify_against_claimed() {
        let verifier = FaceVerifier::new(StubEncoder);
        let presented = decode_photo(&photo(&[40])).unwrap();
        assert!(verifier.verify(&encoding(0), &presented).await.unwrap());
        assert!(!verifier.verify(&encoding(255), &presented).await.unwrap());
    }

    #[rocket::async_test]
    async fn blocking_encode_returns_work_result() {
        let faces = encode_blocking(|| Ok(vec![encoding(10), encoding(20)]))
            .await
            .unwrap();
        assert_eq!(vec![encoding(10), encoding(20)], faces);

        let failed = encode_blocking(|| Err(FaceError::NoFaceDetected)).await;
        assert!(matches!(failed, Err(FaceError::NoFaceDetected)));
    }

    #[rocket::async_test]
    async fn blocking_encode_panic_is_backend_error() {
        let result = encode_blocking(|| panic!("model crashed")).await;
        assert!(matches!(result, Err(FaceError::Backend(_))));
    }
}
