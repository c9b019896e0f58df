use std::path::Path;

use crate::error::RedactError;
use crate::face_locator::{FaceBounds, FaceLocator};

/// Face locator backed by the `rustface` crate (SeetaFace engine).
///
/// Loads a SeetaFace frontal-face model from disk on construction; the
/// model file is supplied by the caller and is not bundled with the crate.
pub struct RustfaceLocator {
    model: rustface::Model,
}

impl RustfaceLocator {
    /// Load a SeetaFace model file (e.g. `seeta_fd_frontal_v1.0.bin`).
    pub fn from_model_path(path: impl AsRef<Path>) -> Result<Self, RedactError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| RedactError::ModelLoad(format!("{}: {e}", path.display())))?;
        let model = rustface::read_model(std::io::Cursor::new(bytes))
            .map_err(|e| RedactError::ModelLoad(format!("{}: {e}", path.display())))?;
        Ok(Self { model })
    }
}

impl FaceLocator for RustfaceLocator {
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(20);
        detector.set_score_thresh(2.0);
        detector.set_pyramid_scale_factor(0.8);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(gray, width, height));

        faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceBounds {
                    x: bbox.x() as f64,
                    y: bbox.y() as f64,
                    width: bbox.width() as f64,
                    height: bbox.height() as f64,
                    confidence: face.score(),
                }
            })
            .collect()
    }
}
