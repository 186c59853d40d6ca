use std::{fs, path::{Path, PathBuf}};

use serde::{Deserialize, Serialize};

use crate::{
    entity::Entity,
    error::{EtlError, Result},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EtlConfig {
    pub raw_dir: PathBuf,
    pub prepared_dir: PathBuf,
    pub database: PathBuf,
    /// Encoding label for raw inputs; UTF-8 when unset.
    pub input_encoding: Option<String>,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self::rooted_at(Path::new("data"))
    }
}

impl EtlConfig {
    pub fn rooted_at(data_dir: &Path) -> Self {
        Self {
            raw_dir: data_dir.join("raw"),
            prepared_dir: data_dir.join("prepared"),
            database: data_dir.join("smart_sales.db"),
            input_encoding: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EtlError::NotFound(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path)?;
        serde_yaml::from_str(&raw)
            .map_err(|err| EtlError::Config(format!("Parsing {}: {err}", path.display())))
    }

    pub fn raw_path(&self, entity: Entity) -> PathBuf {
        self.raw_dir.join(entity.raw_file())
    }

    pub fn prepared_path(&self, entity: Entity) -> PathBuf {
        self.prepared_dir.join(entity.prepared_file())
    }
}
