/// File name the downloaded model is cached under.
pub const MODEL_FILE_NAME: &str = "best.onnx";
pub const MODEL_URL: &str =
    "https://raw.githubusercontent.com/Bellzum/streamlit-main/main/yolo_litterv1.onnx";
/// Local checkpoint used when the model URL is not an `http(s)` address.
pub const LOCAL_MODEL: &str = "best.onnx";

/// Fallback label map when the checkpoint carries no class names.
pub const CLASS_NAMES: &[&str] = &["Clear plastic bottle", "Drink can", "Plastic bottle cap"];

pub const BOTTLE: &str = "Clear plastic bottle";
pub const CAN: &str = "Drink can";
pub const CAP: &str = "Plastic bottle cap";

pub const DEFAULT_IMGSZ: u32 = 640;
pub const IMGSZ_OPTIONS: &[u32] = &[320, 416, 512, 640, 800, 960, 1280];

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// The option closest to `target`; the earlier option wins a tie.
pub fn closest_size(target: u32, options: &[u32]) -> u32 {
    options
        .iter()
        .copied()
        .min_by_key(|&x| (x as i64 - target as i64).abs())
        .unwrap_or(target)
}
