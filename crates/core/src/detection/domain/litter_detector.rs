use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::detection::domain::inference_settings::InferenceSettings;
use crate::detection::domain::label_map::LabelMap;
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("failed to load model from {path}: {message}")]
    Load { path: String, message: String },
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("unexpected model output: {0}")]
    Output(String),
}

/// Domain interface for litter detection.
///
/// Returned detections are already mapped to source-image pixels and
/// carry their resolved class names. Post-filtering happens elsewhere.
pub trait LitterDetector: Send {
    fn detect(
        &mut self,
        frame: &Frame,
        settings: &InferenceSettings,
    ) -> Result<Vec<Detection>, DetectError>;

    /// The class names the detector resolved at load time.
    fn labels(&self) -> LabelMap;
}

/// A cached detector shared through the model cache.
impl<D: LitterDetector> LitterDetector for Arc<Mutex<D>> {
    fn detect(
        &mut self,
        frame: &Frame,
        settings: &InferenceSettings,
    ) -> Result<Vec<Detection>, DetectError> {
        self.lock()
            .map_err(|_| DetectError::Inference("detector lock poisoned".into()))?
            .detect(frame, settings)
    }

    fn labels(&self) -> LabelMap {
        match self.lock() {
            Ok(detector) => detector.labels(),
            Err(poisoned) => poisoned.into_inner().labels(),
        }
    }
}
