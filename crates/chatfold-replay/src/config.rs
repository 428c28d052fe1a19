use std::path::{Path, PathBuf};

/// Outcome of loading `.env` files.
///
/// Loading runs before logging is set up, so results are kept here and
/// reported by [`EnvFiles::log`] once a subscriber exists.
#[derive(Debug, Default)]
pub struct EnvFiles {
    pub loaded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl EnvFiles {
    fn load(&mut self, path: &Path) {
        match dotenvy::from_path(path) {
            Ok(()) => self.loaded.push(path.to_path_buf()),
            Err(err) if err.not_found() => {}
            Err(err) => self.failed.push((path.to_path_buf(), err.to_string())),
        }
    }

    pub fn log(&self) {
        for path in &self.loaded {
            tracing::debug!(path = %path.display(), "loaded env file");
        }
        for (path, error) in &self.failed {
            tracing::warn!(path = %path.display(), error = %error, "ignored unreadable env file");
        }
    }
}

/// Loads the crate's own `.env`, then the nearest `.env` from the working
/// directory upward. Missing files are skipped and variables that are already
/// set keep their value.
pub fn init() -> EnvFiles {
    let mut files = EnvFiles::default();
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    files.load(&manifest_env);
    match dotenvy::dotenv() {
        Ok(path) if path == manifest_env => {}
        Ok(path) => files.loaded.push(path),
        Err(err) if err.not_found() => {}
        Err(err) => files.failed.push((PathBuf::from(".env"), err.to_string())),
    }
    files
}
