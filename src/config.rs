use directories::ProjectDirs;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::quiz::{MAX_SECS_PER_QUESTION, SECS_PER_QUESTION};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub secs_per_question: u64,
    pub shuffle: bool,
    pub questions_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secs_per_question: SECS_PER_QUESTION,
            shuffle: false,
            questions_path: None,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "quizr") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("quizr_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) if !(1..=MAX_SECS_PER_QUESTION).contains(&cfg.secs_per_question) => {
                warn!(
                    "ignoring secs_per_question={} in {}, using {SECS_PER_QUESTION}",
                    cfg.secs_per_question,
                    self.path.display()
                );
                Config {
                    secs_per_question: SECS_PER_QUESTION,
                    ..cfg
                }
            }
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("ignoring unreadable config {}: {e}", self.path.display());
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            secs_per_question: 12,
            shuffle: true,
            questions_path: Some(PathBuf::from("/tmp/capitals.json")),
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
        assert_eq!(store.load().secs_per_question, 5);
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn out_of_range_allowance_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        fs::write(&path, br#"{"secs_per_question": 0, "shuffle": true}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.secs_per_question, SECS_PER_QUESTION);
        assert!(cfg.shuffle);

        fs::write(&path, br#"{"secs_per_question": 18446744073709551615}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.secs_per_question, SECS_PER_QUESTION);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"shuffle": true}"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert!(cfg.shuffle);
        assert_eq!(cfg.secs_per_question, SECS_PER_QUESTION);
        assert_eq!(cfg.questions_path, None);
    }
}
