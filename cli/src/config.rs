use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

use mealplan_core::db::StoreConfig;

pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    /// Resolve the database location once at startup. An explicit path (from
    /// `--db` or `MEALPLAN_DB`) wins over the per-user data directory.
    pub fn load(db_override: Option<PathBuf>) -> Result<Self> {
        if let Some(db_path) = db_override {
            return Ok(Config { db_path });
        }

        let proj_dirs =
            ProjectDirs::from("", "", "mealplan").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("mealplan.db");

        Ok(Config { db_path })
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.db_path)
    }
}
