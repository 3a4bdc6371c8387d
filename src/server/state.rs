//! Application state shared across handlers

use crate::detector::DetectorConfig;
use crate::error::Result;
use crate::storage::Database;

use super::ServerConfig;

pub struct AppState {
    pub config: ServerConfig,
    pub detector: DetectorConfig,
    pub db: Database,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Self> {
        let db = Database::open(std::path::Path::new(&config.db_path))?;
        Ok(Self {
            config,
            detector: DetectorConfig::default(),
            db,
        })
    }

    /// In-memory state for tests
    pub fn in_memory(config: ServerConfig) -> Result<Self> {
        Ok(Self {
            config,
            detector: DetectorConfig::default(),
            db: Database::open_in_memory()?,
        })
    }
}
