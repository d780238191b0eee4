//! Litter detection with local disposal guidance.
//!
//! A pretrained YOLO model (ONNX export) finds PET bottles, drink cans and
//! bottle caps in a photo. Detections are post-filtered by per-class
//! thresholds and box area, drawn onto the image, and paired with
//! hand-authored sorting instructions for the selected city.

pub mod detection;
pub mod guidance;
pub mod imaging;
pub mod pipeline;
pub mod render;
pub mod settings;
pub mod shared;
