use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{EmeError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Source code parsing configuration
    pub parsing: ParsingConfig,

    /// Metamodel generation settings
    pub metamodel: MetamodelConfig,

    /// Where generated metamodels are written
    pub saving: SavingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name, defaults to the name of the analyzed directory
    pub name: Option<String>,

    /// Patterns to ignore in addition to .gitignore
    pub ignore_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// File extensions to parse
    pub file_extensions: Vec<String>,

    /// Maximum file size to parse (in bytes)
    pub max_file_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetamodelConfig {
    /// Name of the generated root package
    pub default_package_name: String,

    /// nsPrefix of the root package, defaults to the package name
    pub namespace_prefix: Option<String>,

    /// Emit accessors and mutators as operations
    pub extract_access_methods: bool,

    /// Emit constructors as operations
    pub extract_constructors: bool,

    /// Emit static fields and methods
    pub extract_static_members: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SavingStrategyKind {
    /// Save into `<project>/model/`
    SameProject,
    /// Save into `custom_path`
    CustomPath,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingConfig {
    pub strategy: SavingStrategyKind,

    /// Target directory for the custom-path strategy
    pub custom_path: Option<PathBuf>,

    /// File name (without extension) for the custom-path strategy
    pub file_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: ProjectConfig {
                name: None,
                ignore_patterns: vec![
                    "target/".to_string(),
                    "build/".to_string(),
                    "bin/".to_string(),
                    ".git/".to_string(),
                ],
            },
            parsing: ParsingConfig {
                file_extensions: vec!["java".to_string()],
                max_file_size: 1024 * 1024, // 1MB
            },
            metamodel: MetamodelConfig::default(),
            saving: SavingConfig {
                strategy: SavingStrategyKind::SameProject,
                custom_path: None,
                file_name: None,
            },
        }
    }
}

impl Default for MetamodelConfig {
    fn default() -> Self {
        Self {
            default_package_name: "DEFAULT".to_string(),
            namespace_prefix: None,
            extract_access_methods: false,
            extract_constructors: false,
            extract_static_members: false,
        }
    }
}

impl MetamodelConfig {
    /// nsPrefix used for the generated root package
    pub fn root_namespace_prefix(&self) -> &str {
        self.namespace_prefix
            .as_deref()
            .unwrap_or(&self.default_package_name)
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| EmeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| EmeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                let candidates = ["eme.toml", "Eme.toml", ".eme.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.metamodel.default_package_name.trim().is_empty() {
            return Err(EmeError::Config(
                "metamodel.default_package_name must not be empty".to_string(),
            ));
        }
        if self.saving.strategy == SavingStrategyKind::CustomPath && self.saving.custom_path.is_none() {
            return Err(EmeError::Config(
                "saving.custom_path is required for the custom-path strategy".to_string(),
            ));
        }
        Ok(())
    }
}
