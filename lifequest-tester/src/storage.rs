use std::fs;
use std::path::{Path, PathBuf};

use lifequest_engine::{
    LifeMap, LifeMapError, PartialRecord, ProfileRecord, ProfileStore, RuleBook, RuleBookError,
    RuleSource,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonStoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("profile {path} is malformed: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One pretty-printed JSON file per user under a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, user_id: &str) -> PathBuf {
        let safe: String = user_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }

    fn read(path: &Path) -> Result<Option<ProfileRecord>, JsonStoreError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(JsonStoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| JsonStoreError::Json {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl ProfileStore for JsonFileStore {
    type Error = JsonStoreError;

    fn load(&self, user_id: &str) -> Result<Option<ProfileRecord>, Self::Error> {
        Self::read(&self.path_for(user_id))
    }

    fn save(&self, user_id: &str, partial: &PartialRecord) -> Result<(), Self::Error> {
        let path = self.path_for(user_id);
        let io_err = |source| JsonStoreError::Io {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let mut record = Self::read(&path)?.unwrap_or_default();
        record.apply(partial);
        let payload = serde_json::to_vec_pretty(&record).map_err(|source| JsonStoreError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, payload).map_err(io_err)?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum FileRulesError {
    #[error("failed to read rules {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Rules(#[from] RuleBookError),
    #[error(transparent)]
    LifeMap(#[from] LifeMapError),
}

/// Rule book from `--rules` when given, otherwise the bundled one. The
/// LifeMap template is always the bundled map.
#[derive(Debug, Clone, Default)]
pub struct FileRules {
    rules_path: Option<PathBuf>,
}

impl FileRules {
    pub const fn new(rules_path: Option<PathBuf>) -> Self {
        Self { rules_path }
    }
}

impl RuleSource for FileRules {
    type Error = FileRulesError;

    fn load_rules(&self) -> Result<RuleBook, Self::Error> {
        let Some(path) = &self.rules_path else {
            return Ok(RuleBook::load_from_static()?);
        };
        let json = fs::read_to_string(path).map_err(|source| FileRulesError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(RuleBook::from_json(&json)?)
    }

    fn load_life_map(&self) -> Result<LifeMap, Self::Error> {
        Ok(LifeMap::load_from_static()?)
    }
}
