use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::{EntityType, Record, Schema};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse dataset '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Dataset validation failed: {message}")]
    ValidationError { message: String },
}

/// Schema plus seed records, as stored in a JSON file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub schema: Schema,
    #[serde(default)]
    pub records: BTreeMap<EntityType, Vec<Record>>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let content = fs::read_to_string(path).map_err(|e| DatasetError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let dataset: Dataset =
            serde_json::from_str(&content).map_err(|e| DatasetError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Checks:
    /// - every record table belongs to an entity in the schema
    /// - record ids are unique within their table
    pub fn validate(&self) -> Result<(), DatasetError> {
        for (entity, records) in &self.records {
            if self.schema.entity(entity).is_none() {
                return Err(DatasetError::ValidationError {
                    message: format!("Records given for unknown entity '{}'", entity),
                });
            }
            let mut ids: Vec<u64> = records.iter().map(|r| r.id).collect();
            ids.sort_unstable();
            if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
                return Err(DatasetError::ValidationError {
                    message: format!("Duplicate id {} in '{}'", pair[0], entity),
                });
            }
        }
        Ok(())
    }
}
