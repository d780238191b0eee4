use std::path::Path;

use crate::detection::domain::litter_detector::DetectError;

/// Open an ONNX Runtime session for `model_path` on the best available device.
///
/// CoreML on macOS, DirectML on Windows, CPU elsewhere. ONNX Runtime falls
/// back to CPU on its own when the preferred provider cannot be registered.
pub fn open_session(model_path: &Path) -> Result<ort::session::Session, DetectError> {
    let providers = preferred_execution_providers();
    log::debug!("Registering {} execution provider(s)", providers.len());

    ort::session::Session::builder()
        .map_err(load_err(model_path))?
        .with_execution_providers(providers)
        .map_err(load_err(model_path))?
        .commit_from_file(model_path)
        .map_err(load_err(model_path))
}

fn load_err<E: std::fmt::Display>(model_path: &Path) -> impl Fn(E) -> DetectError + '_ {
    move |e| DetectError::Load {
        path: model_path.display().to_string(),
        message: e.to_string(),
    }
}

fn preferred_execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}
