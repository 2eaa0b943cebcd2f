use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::error::DataError;
use super::loader::load_file;
use super::model::Dataset;

struct CacheEntry {
    path: PathBuf,
    modified: Option<SystemTime>,
    dataset: Arc<Dataset>,
}

/// Holds the most recently loaded dataset, keyed by path and modification
/// time, so repeated requests for an unchanged file skip parsing and cleaning.
#[derive(Default)]
pub struct DatasetCache {
    entry: Option<CacheEntry>,
}

impl DatasetCache {
    /// Return the cached dataset for `path`, loading it when the path or its
    /// modification time differs from the cached entry.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Dataset>, DataError> {
        let modified = modification_time(path)?;

        if let Some(entry) = &self.entry {
            if entry.path == path && entry.modified == modified {
                log::debug!("Reusing cached dataset for {}", path.display());
                return Ok(Arc::clone(&entry.dataset));
            }
        }

        let dataset = Arc::new(load_file(path)?);
        self.entry = Some(CacheEntry {
            path: path.to_path_buf(),
            modified,
            dataset: Arc::clone(&dataset),
        });
        Ok(dataset)
    }

    /// Drop the cached entry; the next request reloads from disk.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

/// `None` on platforms without mtime support; such files are cached by path.
fn modification_time(path: &Path) -> Result<Option<SystemTime>, DataError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(meta.modified().ok()),
        Ok(_) => Err(DataError::NotFound(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(DataError::NotFound(path.to_path_buf()))
        }
        Err(source) => Err(DataError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{File, OpenOptions};
    use std::io::Write;
    use std::time::Duration;

    use super::*;

    const CSV: &str = "model_year,odometer,condition,type,model,price\n\
                       2010,1000,good,sedan,kia soul,5000\n";

    #[test]
    fn unchanged_file_is_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vehicles_us.csv");
        std::fs::write(&path, CSV).unwrap();

        let mut cache = DatasetCache::default();
        let first = cache.get_or_load(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn modified_file_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vehicles_us.csv");
        std::fs::write(&path, CSV).unwrap();

        let mut cache = DatasetCache::default();
        let first = cache.get_or_load(&path).unwrap();
        assert_eq!(first.len(), 1);

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"2012,3000,fair,truck,ram 1500,9000\n").unwrap();
        let later = SystemTime::now() + Duration::from_secs(60);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(later)
            .unwrap();

        let second = cache.get_or_load(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn invalidate_forces_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vehicles_us.csv");
        std::fs::write(&path, CSV).unwrap();

        let mut cache = DatasetCache::default();
        let first = cache.get_or_load(&path).unwrap();
        cache.invalidate();
        let second = cache.get_or_load(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_file_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = DatasetCache::default();
        let err = cache
            .get_or_load(&dir.path().join("missing.csv"))
            .unwrap_err();
        assert!(matches!(err, DataError::NotFound(_)));
        assert!(cache.entry.is_none());
    }
}
