use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::UNIX_EPOCH;

/// Loaded model shared between callers.
pub type Shared<T> = Arc<Mutex<T>>;

/// Memoizes expensive model loads.
///
/// Entries are keyed by path, modification time and size, so replacing the
/// file on disk triggers a reload while repeated loads of an unchanged file
/// return the same instance.
pub struct ModelCache<T> {
    entries: Mutex<HashMap<String, Shared<T>>>,
}

impl<T> ModelCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached model for `path`, calling `load` on a miss.
    ///
    /// Failed loads are not cached.
    pub fn get_or_load<E, F>(&self, path: &Path, load: F) -> Result<Shared<T>, E>
    where
        F: FnOnce(&Path) -> Result<T, E>,
    {
        let key = cache_key_for(path);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(model) = entries.get(&key) {
            log::debug!("Model cache hit: {key}");
            return Ok(model.clone());
        }

        log::debug!("Model cache miss: {key}");
        let model = Arc::new(Mutex::new(load(path)?));
        entries.insert(key, model.clone());
        Ok(model)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for ModelCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// `"<path>:<mtime>:<size>"`, or just the path when the file can't be stat'ed.
pub fn cache_key_for(path: &Path) -> String {
    let stat = fs::metadata(path).ok().and_then(|meta| {
        let mtime = meta
            .modified()
            .ok()?
            .duration_since(UNIX_EPOCH)
            .ok()?
            .as_nanos();
        Some((mtime, meta.len()))
    });
    match stat {
        Some((mtime, size)) => format!("{}:{mtime}:{size}", path.display()),
        None => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    #[test]
    fn test_same_file_loads_once() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("best.onnx");
        fs::write(&path, b"v1").unwrap();

        let cache: ModelCache<String> = ModelCache::new();
        let loads = Cell::new(0);
        let load = |p: &Path| -> Result<String, String> {
            loads.set(loads.get() + 1);
            Ok(fs::read_to_string(p).unwrap())
        };

        let a = cache.get_or_load(&path, load).unwrap();
        let b = cache.get_or_load(&path, load).unwrap();
        assert_eq!(loads.get(), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_changed_size_reloads() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("best.onnx");
        fs::write(&path, b"v1").unwrap();

        let cache: ModelCache<String> = ModelCache::new();
        let load = |p: &Path| -> Result<String, String> { Ok(fs::read_to_string(p).unwrap()) };

        let first = cache.get_or_load(&path, load).unwrap();
        fs::write(&path, b"version two").unwrap();
        let second = cache.get_or_load(&path, load).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*second.lock().unwrap(), "version two");
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("best.onnx");
        fs::write(&path, b"v1").unwrap();

        let cache: ModelCache<String> = ModelCache::new();
        let result = cache.get_or_load(&path, |_| Err::<String, _>("corrupt"));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_key_includes_size() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("m.onnx");
        fs::write(&path, b"12345").unwrap();
        let key = cache_key_for(&path);
        assert!(key.starts_with(&path.display().to_string()));
        assert!(key.ends_with(":5"));
    }

    #[test]
    fn test_cache_key_missing_file_is_path() {
        let path = Path::new("/nonexistent/model.onnx");
        assert_eq!(cache_key_for(path), "/nonexistent/model.onnx");
    }
}
