pub mod detection_filter;
pub mod inference_settings;
pub mod label_map;
pub mod litter_detector;
