use std::path::Path;
use std::sync::{Arc, Mutex};

use dlib_face_recognition::{
    FaceDetector, FaceDetectorTrait, FaceEncoderNetwork, FaceEncoderTrait, ImageMatrix,
    LandmarkPredictor, LandmarkPredictorTrait,
};
use image::RgbImage;

use super::{encode_blocking, FaceEncoder, FaceEncoding, FaceError};

struct Models {
    detector: FaceDetector,
    landmarks: LandmarkPredictor,
    network: FaceEncoderNetwork,
}

/// Encodes faces in-process with dlib's HOG detector, 68-point landmark
/// predictor and ResNet embedding network.
pub struct DlibEncoder {
    models: Arc<Mutex<Models>>,
}

impl DlibEncoder {
    /// Load the landmark predictor and encoder network from their model files.
    pub fn open(
        landmark_model: impl AsRef<Path>,
        encoder_model: impl AsRef<Path>,
    ) -> Result<Self, FaceError> {
        let landmarks = LandmarkPredictor::open(landmark_model).map_err(FaceError::Backend)?;
        let network = FaceEncoderNetwork::open(encoder_model).map_err(FaceError::Backend)?;
        Ok(Self {
            models: Arc::new(Mutex::new(Models {
                detector: FaceDetector::new(),
                landmarks,
                network,
            })),
        })
    }
}

impl Models {
    fn encode(&self, image: &RgbImage) -> Result<Vec<FaceEncoding>, FaceError> {
        let matrix = ImageMatrix::from_image(image);
        let landmarks = self
            .detector
            .face_locations(&matrix)
            .iter()
            .map(|rect| self.landmarks.face_landmarks(&matrix, rect))
            .collect::<Vec<_>>();
        self.network
            .get_face_encodings(&matrix, &landmarks, 0)
            .iter()
            .map(|encoding| {
                FaceEncoding::try_from(encoding.as_ref().to_vec())
                    .map_err(|e| FaceError::Backend(e.to_string()))
            })
            .collect()
    }
}

#[rocket::async_trait]
impl FaceEncoder for DlibEncoder {
    async fn encode_faces(&self, image: &RgbImage) -> Result<Vec<FaceEncoding>, FaceError> {
        let models = Arc::clone(&self.models);
        let image = image.clone();
        encode_blocking(move || {
            models
                .lock()
                .map_err(|_| FaceError::Backend("dlib models poisoned".to_string()))?
                .encode(&image)
        })
        .await
    }
}
