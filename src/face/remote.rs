use std::io::Cursor;

use data_encoding::BASE64;
use image::{DynamicImage, ImageOutputFormat, RgbImage};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{FaceEncoder, FaceEncoding, FaceError};

/// Delegates face encoding to an HTTP embedding service.
///
/// The service receives `{"image": "<base64 PNG>"}` and answers with
/// `{"encodings": [[f64; 128], ...]}`, one entry per detected face.
pub struct RemoteEncoder {
    client: Client,
    url: String,
}

impl RemoteEncoder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[derive(Serialize)]
struct EncodeRequest {
    image: String,
}

#[derive(Deserialize)]
struct EncodeResponse {
    encodings: Vec<FaceEncoding>,
}

#[rocket::async_trait]
impl FaceEncoder for RemoteEncoder {
    async fn encode_faces(&self, image: &RgbImage) -> Result<Vec<FaceEncoding>, FaceError> {
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(image.clone())
            .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
            .map_err(|e| FaceError::Backend(e.to_string()))?;

        let response = self
            .client
            .post(&self.url)
            .json(&EncodeRequest {
                image: BASE64.encode(&png),
            })
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| FaceError::Backend(e.to_string()))?
            .json::<EncodeResponse>()
            .await
            .map_err(|e| FaceError::Backend(e.to_string()))?;

        Ok(response.encodings)
    }
}
