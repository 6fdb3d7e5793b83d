// src/core/generator/saving.rs
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::metamodel::Metamodel;
use super::xmi::write_ecore;
use crate::config::{SavingConfig, SavingStrategyKind};
use crate::error::{EmeError, Result};

pub const ECORE_EXTENSION: &str = "ecore";

/// Decides where a generated metamodel is written
pub trait SavingStrategy {
    /// Called with the project name before the location is queried
    fn before_saving(&mut self, project_name: &str);

    /// File name without extension
    fn file_name(&self) -> String;

    /// Target directory
    fn file_path(&self) -> PathBuf;

    /// Whether the containing folder should be refreshed after writing
    fn should_refresh_folder(&self) -> bool;

    fn name(&self) -> &'static str;

    /// Write the metamodel as `<file_path>/<file_name>.ecore`
    fn save(&mut self, metamodel: &Metamodel) -> Result<PathBuf> {
        self.before_saving(&metamodel.project_name);

        let directory = self.file_path();
        fs::create_dir_all(&directory).map_err(|e| {
            EmeError::FileSystem(format!("Failed to create directory {}: {}", directory.display(), e))
        })?;

        let path = directory.join(format!("{}.{}", self.file_name(), ECORE_EXTENSION));
        fs::write(&path, write_ecore(metamodel)?)?;
        info!("💾 Saved metamodel of {} to {}", metamodel.project_name, path.display());

        if self.should_refresh_folder() {
            debug!("Folder refresh requested for {}, no workspace to notify", directory.display());
        }
        Ok(path)
    }
}

/// Saves into the `model` folder of the analyzed project, named after the project
#[derive(Debug, Clone)]
pub struct SameProjectSavingStrategy {
    project_dir: PathBuf,
    project_name: String,
}

impl SameProjectSavingStrategy {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            project_name: String::new(),
        }
    }
}

impl SavingStrategy for SameProjectSavingStrategy {
    fn before_saving(&mut self, project_name: &str) {
        self.project_name = project_name.to_string();
    }

    fn file_name(&self) -> String {
        self.project_name.clone()
    }

    fn file_path(&self) -> PathBuf {
        self.project_dir.join("model")
    }

    fn should_refresh_folder(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "same-project"
    }
}

/// Saves into a configured directory
#[derive(Debug, Clone)]
pub struct CustomPathSavingStrategy {
    directory: PathBuf,
    file_name: Option<String>,
    project_name: String,
}

impl CustomPathSavingStrategy {
    pub fn new(directory: impl Into<PathBuf>, file_name: Option<String>) -> Self {
        Self {
            directory: directory.into(),
            file_name,
            project_name: String::new(),
        }
    }
}

impl SavingStrategy for CustomPathSavingStrategy {
    fn before_saving(&mut self, project_name: &str) {
        self.project_name = project_name.to_string();
    }

    fn file_name(&self) -> String {
        self.file_name.clone().unwrap_or_else(|| self.project_name.clone())
    }

    fn file_path(&self) -> PathBuf {
        self.directory.clone()
    }

    fn should_refresh_folder(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "custom-path"
    }
}

/// Strategy selected by the configuration
pub fn strategy_from_config(config: &SavingConfig, project_dir: &Path) -> Result<Box<dyn SavingStrategy>> {
    match config.strategy {
        SavingStrategyKind::SameProject => Ok(Box::new(SameProjectSavingStrategy::new(project_dir))),
        SavingStrategyKind::CustomPath => {
            let directory = config.custom_path.clone().ok_or_else(|| {
                EmeError::Config("the custom-path saving strategy requires saving.custom_path".to_string())
            })?;
            Ok(Box::new(CustomPathSavingStrategy::new(directory, config.file_name.clone())))
        }
    }
}
