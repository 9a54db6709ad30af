use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use tempfile::TempDir;

static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

pub fn unique_id(prefix: &str) -> String {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}", prefix, id)
}

/// Registry name that no other test in the process uses.
pub fn unique_config_name() -> String {
    unique_id("test-config")
}

pub const APP_TOML: &str = r#"[app]
name = "demo"
version = "1.2.0"

[debug]
enabled = true
level = "warn"
"#;

pub const APP_JSON: &str = r#"{
  "app": {"name": "demo", "version": "1.2.0"},
  "debug": {"enabled": true, "level": "warn"}
}"#;

pub const APP_YAML: &str = "app:\n  name: demo\n  version: 1.2.0\ndebug:\n  enabled: true\n  level: warn\n";

pub const APP_INI: &str = "[app]\nname = demo\nversion = 1.2.0\n\n[debug]\nenabled = true\nlevel = warn\n";

/// Scratch directory holding configuration files.
pub struct ConfigDir {
    dir: TempDir
}

impl ConfigDir {
    pub fn new() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("chainconf-").tempdir()?;
        tracing::debug!(path = %dir.path().display(), "config dir fixture created");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Writes `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> io::Result<PathBuf> {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn mkdir(&self, relative: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = self.join(relative);
        fs::create_dir_all(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_id() {
        let a = unique_id("x");
        let b = unique_id("x");
        assert_ne!(a, b);
        assert!(a.starts_with("x-"));
    }

    #[test]
    fn test_config_dir_write_nested() {
        let dir = ConfigDir::new().unwrap();
        let path = dir.write("conf/app.toml", APP_TOML).unwrap();
        assert!(path.is_file());
        assert_eq!(fs::read_to_string(path).unwrap(), APP_TOML);
    }

    #[test]
    fn test_config_dir_removed_on_drop() {
        let dir = ConfigDir::new().unwrap();
        let root = dir.path().to_path_buf();
        drop(dir);
        assert!(!root.exists());
    }
}
