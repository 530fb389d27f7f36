use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};

/// Preferences file name in the data directory
pub const PREFERENCES_FILE: &str = "preferences.json";

/// A small string key-value store for local preferences.
///
/// Implementations are last-writer-wins; callers must not assume that a value
/// read earlier is still current.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Preferences kept as a JSON object on disk.
///
/// The file is read once on open and rewritten after every change.
pub struct FilePreferences {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FilePreferences {
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(PREFERENCES_FILE);
        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .context("Failed to read preferences file")?;
            serde_json::from_str(&contents).context("Failed to parse preferences file")?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents).context("Failed to write preferences file")?;
        Ok(())
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let mut updated = entries.clone();
        updated.insert(key.to_string(), value.to_string());
        // Memory only changes once the file is written
        self.persist(&updated)?;
        *entries = updated;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut updated = entries.clone();
        updated.remove(key);
        self.persist(&updated)?;
        *entries = updated;
        Ok(())
    }
}

/// Process-local preferences. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryPreferences {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_preferences_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");

        let prefs = FilePreferences::open(dir.path()).expect("open");
        assert_eq!(prefs.get("access_token").unwrap(), None);
        prefs.set("access_token", "A1").unwrap();
        prefs.set("user_id", "42").unwrap();
        prefs.remove("user_id").unwrap();

        let reopened = FilePreferences::open(dir.path()).expect("reopen");
        assert_eq!(reopened.get("access_token").unwrap().as_deref(), Some("A1"));
        assert_eq!(reopened.get("user_id").unwrap(), None);
        assert_eq!(reopened.path(), dir.path().join(PREFERENCES_FILE));
    }

    #[test]
    fn test_file_preferences_creates_missing_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("foodkeeper").join("data");

        let prefs = FilePreferences::open(&nested).expect("open");
        prefs.set("onboarding_completed", "true").unwrap();
        assert!(nested.join(PREFERENCES_FILE).exists());
    }

    #[test]
    fn test_file_preferences_rejects_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(PREFERENCES_FILE), "{not json").unwrap();
        assert!(FilePreferences::open(dir.path()).is_err());
    }

    #[test]
    fn test_file_preferences_unchanged_when_write_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let prefs = FilePreferences::open(dir.path()).expect("open");
        prefs.set("access_token", "A1").unwrap();

        // A directory in place of the file makes every write fail
        std::fs::remove_file(prefs.path()).unwrap();
        std::fs::create_dir(prefs.path()).unwrap();

        assert!(prefs.set("access_token", "A2").is_err());
        assert!(prefs.remove("access_token").is_err());
        assert_eq!(prefs.get("access_token").unwrap().as_deref(), Some("A1"));
    }

    #[test]
    fn test_memory_preferences() {
        let prefs = MemoryPreferences::new();
        prefs.set("k", "v").unwrap();
        assert_eq!(prefs.get("k").unwrap().as_deref(), Some("v"));
        prefs.remove("k").unwrap();
        prefs.remove("k").unwrap();
        assert_eq!(prefs.get("k").unwrap(), None);
    }
}
