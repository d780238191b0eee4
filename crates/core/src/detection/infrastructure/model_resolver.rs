use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::shared::constants::MODEL_FILE_NAME;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error(
        "failed to download model from URL:\n{url}\n\n{causes}\n\n\
         If this is a private repo or rate limit issue, make the file public \
         or place the model next to the binary and set LOCAL_MODEL."
    )]
    Download { url: String, causes: String },
    #[error("model file not found: {0}. Provide MODEL_URL or set LOCAL_MODEL to an existing file.")]
    NotFound(PathBuf),
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Where the model checkpoint comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelSource {
    /// Downloaded once into the cache directory.
    Url(String),
    /// Used in place; must already exist.
    Local(PathBuf),
}

impl ModelSource {
    /// An `http(s)` model URL wins; anything else falls back to the local file.
    pub fn from_config(model_url: &str, local_model: &Path) -> Self {
        let url = model_url.trim();
        if url.starts_with("http") {
            ModelSource::Url(url.to_string())
        } else {
            ModelSource::Local(local_model.to_path_buf())
        }
    }
}

/// One way of fetching a URL into a file.
pub trait Fetcher {
    fn name(&self) -> &str;
    fn fetch(&self, url: &str, dest: &Path, progress: Option<&ProgressFn>) -> Result<(), String>;
}

/// Streams the body in chunks, reporting progress as it goes.
pub struct StreamingFetcher;

/// Fresh client with an explicit timeout that buffers the whole body.
pub struct BufferedFetcher;

/// Resolve the model to a path on disk, downloading into the default
/// cache directory when needed.
pub fn resolve(source: &ModelSource, progress: Option<ProgressFn>) -> Result<PathBuf, ModelResolveError> {
    resolve_in(
        source,
        &model_cache_dir()?,
        &[&StreamingFetcher, &BufferedFetcher],
        progress,
    )
}

/// Resolve the model using `cache_dir` and the given fetchers, tried in order.
pub fn resolve_in(
    source: &ModelSource,
    cache_dir: &Path,
    fetchers: &[&dyn Fetcher],
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    match source {
        ModelSource::Local(path) => {
            if path.exists() {
                Ok(path.clone())
            } else {
                Err(ModelResolveError::NotFound(path.clone()))
            }
        }
        ModelSource::Url(url) => {
            let cached_path = cache_dir.join(MODEL_FILE_NAME);
            if cached_path.exists() {
                log::debug!("Using cached model {}", cached_path.display());
                return Ok(cached_path);
            }
            fs::create_dir_all(cache_dir).map_err(ModelResolveError::CacheDir)?;
            download(url, &cached_path, fetchers, progress.as_ref())?;
            Ok(cached_path)
        }
    }
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/LitterScan/models/`
/// - Linux: `$XDG_CACHE_HOME/LitterScan/models/` or `~/.cache/LitterScan/models/`
/// - Windows: `%LOCALAPPDATA%/LitterScan/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("LitterScan").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("LitterScan").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

/// Try each fetcher in turn. Each attempt writes to `<dest>.part` and is
/// renamed into place only on success.
fn download(
    url: &str,
    dest: &Path,
    fetchers: &[&dyn Fetcher],
    progress: Option<&ProgressFn>,
) -> Result<(), ModelResolveError> {
    let temp_path = part_path(dest);
    let mut causes = Vec::new();

    for fetcher in fetchers {
        log::info!("Downloading model with {} fetcher", fetcher.name());
        let attempt = fetcher
            .fetch(url, &temp_path, progress)
            .and_then(|()| fs::rename(&temp_path, dest).map_err(|e| e.to_string()));
        match attempt {
            Ok(()) => return Ok(()),
            Err(e) => {
                log::warn!("{} download failed: {e}", fetcher.name());
                let _ = fs::remove_file(&temp_path);
                causes.push(format!("{} error: {e}", fetcher.name()));
            }
        }
    }

    Err(ModelResolveError::Download {
        url: url.to_string(),
        causes: causes.join("\n"),
    })
}

/// `<dest>.part`, keeping the original extension.
fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

impl Fetcher for StreamingFetcher {
    fn name(&self) -> &str {
        "streaming"
    }

    fn fetch(&self, url: &str, dest: &Path, progress: Option<&ProgressFn>) -> Result<(), String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| e.to_string())?;
        let mut response = client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.to_string())?;

        let total = response.content_length().unwrap_or(0);
        let mut downloaded: u64 = 0;
        let mut file = fs::File::create(dest).map_err(|e| e.to_string())?;

        let mut buf = vec![0u8; 8192];
        loop {
            let n = response.read(&mut buf).map_err(|e| e.to_string())?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n]).map_err(|e| e.to_string())?;
            downloaded += n as u64;
            if let Some(cb) = progress {
                cb(downloaded, total);
            }
        }
        file.flush().map_err(|e| e.to_string())
    }
}

impl Fetcher for BufferedFetcher {
    fn name(&self) -> &str {
        "buffered"
    }

    fn fetch(&self, url: &str, dest: &Path, progress: Option<&ProgressFn>) -> Result<(), String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .http1_only()
            .build()
            .map_err(|e| e.to_string())?;
        let bytes = client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.bytes())
            .map_err(|e| e.to_string())?;

        fs::write(dest, &bytes).map_err(|e| e.to_string())?;
        if let Some(cb) = progress {
            cb(bytes.len() as u64, bytes.len() as u64);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    struct FailingFetcher {
        calls: Cell<usize>,
    }

    impl Fetcher for FailingFetcher {
        fn name(&self) -> &str {
            "failing"
        }

        fn fetch(&self, _url: &str, dest: &Path, _p: Option<&ProgressFn>) -> Result<(), String> {
            self.calls.set(self.calls.get() + 1);
            // Leave a partial file behind to check cleanup.
            fs::write(dest, b"partial").unwrap();
            Err("connection reset".into())
        }
    }

    struct WritingFetcher;

    /// Records the path each fetch was asked to write.
    struct RecordingFetcher {
        dest: std::cell::RefCell<Option<PathBuf>>,
    }

    impl Fetcher for RecordingFetcher {
        fn name(&self) -> &str {
            "recording"
        }

        fn fetch(&self, _url: &str, dest: &Path, _p: Option<&ProgressFn>) -> Result<(), String> {
            *self.dest.borrow_mut() = Some(dest.to_path_buf());
            fs::write(dest, b"onnx").map_err(|e| e.to_string())
        }
    }

    impl Fetcher for WritingFetcher {
        fn name(&self) -> &str {
            "writing"
        }

        fn fetch(&self, _url: &str, dest: &Path, progress: Option<&ProgressFn>) -> Result<(), String> {
            fs::write(dest, b"onnx").map_err(|e| e.to_string())?;
            if let Some(cb) = progress {
                cb(4, 4);
            }
            Ok(())
        }
    }

    #[test]
    fn test_source_http_url_wins() {
        let source = ModelSource::from_config("  https://example.com/m.onnx ", Path::new("best.onnx"));
        assert_eq!(source, ModelSource::Url("https://example.com/m.onnx".into()));
    }

    #[test]
    fn test_source_non_http_uses_local() {
        let source = ModelSource::from_config("", Path::new("best.onnx"));
        assert_eq!(source, ModelSource::Local(PathBuf::from("best.onnx")));
    }

    #[test]
    fn test_local_existing_file_is_returned() {
        let tmp = TempDir::new().unwrap();
        let model = tmp.path().join("best.onnx");
        fs::write(&model, b"model").unwrap();

        let path = resolve_in(&ModelSource::Local(model.clone()), tmp.path(), &[], None).unwrap();
        assert_eq!(path, model);
    }

    #[test]
    fn test_local_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let model = tmp.path().join("missing.onnx");
        let err = resolve_in(&ModelSource::Local(model), tmp.path(), &[], None).unwrap_err();
        assert!(matches!(err, ModelResolveError::NotFound(_)));
    }

    #[test]
    fn test_cached_file_skips_download() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(MODEL_FILE_NAME), b"cached").unwrap();
        let failing = FailingFetcher { calls: Cell::new(0) };

        let path = resolve_in(
            &ModelSource::Url("http://example.invalid/m".into()),
            tmp.path(),
            &[&failing],
            None,
        )
        .unwrap();
        assert_eq!(fs::read(path).unwrap(), b"cached");
        assert_eq!(failing.calls.get(), 0);
    }

    #[test]
    fn test_falls_back_to_second_fetcher() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("models");
        let failing = FailingFetcher { calls: Cell::new(0) };

        let progress_called = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = progress_called.clone();

        let path = resolve_in(
            &ModelSource::Url("http://example.invalid/m".into()),
            &cache,
            &[&failing, &WritingFetcher],
            Some(Box::new(move |_, _| {
                flag.store(true, std::sync::atomic::Ordering::Relaxed);
            })),
        )
        .unwrap();

        assert_eq!(failing.calls.get(), 1);
        assert_eq!(path, cache.join(MODEL_FILE_NAME));
        assert_eq!(fs::read(&path).unwrap(), b"onnx");
        assert!(!part_path(&path).exists());
        assert!(progress_called.load(std::sync::atomic::Ordering::Relaxed));
    }

    #[test]
    fn test_all_fetchers_failing_reports_every_cause() {
        let tmp = TempDir::new().unwrap();
        let first = FailingFetcher { calls: Cell::new(0) };
        let second = FailingFetcher { calls: Cell::new(0) };

        let err = resolve_in(
            &ModelSource::Url("http://example.invalid/m".into()),
            tmp.path(),
            &[&first, &second],
            None,
        )
        .unwrap_err();

        let message = err.to_string();
        assert_eq!(message.matches("failing error: connection reset").count(), 2);
        assert!(message.contains("http://example.invalid/m"));
        // Neither the model nor the .part file should exist after failure
        let dest = tmp.path().join(MODEL_FILE_NAME);
        assert!(!dest.exists());
        assert!(!part_path(&dest).exists());
    }

    #[test]
    fn test_part_path_appends_suffix() {
        assert_eq!(
            part_path(Path::new("/cache/best.onnx")),
            PathBuf::from("/cache/best.onnx.part")
        );
    }

    #[test]
    fn test_download_writes_next_to_model_with_part_suffix() {
        let tmp = TempDir::new().unwrap();
        let recording = RecordingFetcher {
            dest: std::cell::RefCell::new(None),
        };

        let path = resolve_in(
            &ModelSource::Url("http://example.invalid/m".into()),
            tmp.path(),
            &[&recording],
            None,
        )
        .unwrap();

        assert_eq!(
            recording.dest.borrow().as_deref(),
            Some(tmp.path().join("best.onnx.part").as_path())
        );
        assert_eq!(path, tmp.path().join(MODEL_FILE_NAME));
        assert!(!tmp.path().join("best.onnx.part").exists());
    }

    #[test]
    fn test_model_cache_dir_returns_path() {
        let path = model_cache_dir().unwrap();
        assert!(path.to_string_lossy().contains("LitterScan"));
        assert!(path.to_string_lossy().contains("models"));
    }

    #[test]
    fn test_streaming_fetcher_invalid_url_returns_error() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("model.part");
        let result = StreamingFetcher.fetch("http://invalid.nonexistent.example.com/model", &dest, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_download_to_file() {
        // Skip in CI: requires network access
        if std::env::var("CI").is_ok() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("robots.txt");
        let result = download(
            "https://www.google.com/robots.txt",
            &dest,
            &[&StreamingFetcher, &BufferedFetcher],
            None,
        );
        if result.is_ok() {
            assert!(!fs::read(&dest).unwrap().is_empty());
        }
    }
}
