pub mod execution_provider;
pub mod model_cache;
pub mod model_resolver;
pub mod onnx_yolo_detector;
