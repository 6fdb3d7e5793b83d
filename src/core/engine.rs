// src/core/engine.rs
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{Config, SavingStrategyKind};
use super::extractor::{ExtractionResult, ExtractionStatistics, ProjectExtractor};
use super::generator::{strategy_from_config, MetamodelGenerator};
use super::host::JavaSourceHost;
use super::model::{ExtractedType, IntermediateModel, MethodType};

pub const CONFIG_FILE_NAME: &str = "eme.toml";

/// Orchestrates extraction, generation and saving for the CLI
pub struct Engine {
    config: Config,
}

#[derive(Serialize)]
struct InspectionReport<'a> {
    model: &'a IntermediateModel,
    stats: &'a ExtractionStatistics,
}

impl Engine {
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;
        debug!("Loaded configuration: {:?}", config);
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Extract the metamodel of a project and save it; returns the written file
    pub fn extract_and_save(
        &self,
        project_dir: &Path,
        name: Option<String>,
        strategy: Option<SavingStrategyKind>,
        output: Option<PathBuf>,
    ) -> Result<PathBuf> {
        let result = self.extract(project_dir, name)?;

        let mut saving = self.config.saving.clone();
        if let Some(output) = output {
            saving.custom_path = Some(output);
            saving.strategy = SavingStrategyKind::CustomPath;
        }
        if let Some(strategy) = strategy {
            saving.strategy = strategy;
        }

        let strategy = strategy_from_config(&saving, project_dir)?;
        let mut generator = MetamodelGenerator::new(self.config.metamodel.clone(), strategy)?;
        generator
            .generate_metamodel_from(&result.model)
            .with_context(|| format!("Failed to generate metamodel for {}", result.model.project_name()))?;
        let path = generator.save_metamodel()?;

        info!("✅ Metamodel written to {}", path.display());
        Ok(path)
    }

    /// Print the intermediate model of a project
    pub fn inspect(&self, project_dir: &Path, json: bool) -> Result<()> {
        let result = self.extract(project_dir, None)?;

        if json {
            let report = InspectionReport { model: &result.model, stats: &result.stats };
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{}", summarize(&result));
        }
        Ok(())
    }

    /// Write a default configuration file
    pub fn init(&self, path: Option<PathBuf>) -> Result<()> {
        let target_dir = match path {
            Some(path) => path,
            None => std::env::current_dir().context("Failed to determine the current directory")?,
        };
        let config_path = target_dir.join(CONFIG_FILE_NAME);
        info!("Initializing eme in: {}", target_dir.display());

        if config_path.exists() {
            warn!("{} already exists, leaving it untouched", config_path.display());
            return Ok(());
        }

        std::fs::create_dir_all(&target_dir)?;
        Config::default().save(&config_path)?;
        info!("📝 Wrote {}", config_path.display());
        Ok(())
    }

    fn extract(&self, project_dir: &Path, name: Option<String>) -> Result<ExtractionResult> {
        if !project_dir.is_dir() {
            anyhow::bail!("{} is not a directory", project_dir.display());
        }

        let project_name = name
            .or_else(|| self.config.project.name.clone())
            .or_else(|| directory_name(project_dir))
            .unwrap_or_else(|| "project".to_string());

        info!("🔍 Extracting {} from {}", project_name, project_dir.display());
        let host = JavaSourceHost::new(project_dir, &self.config.parsing, &self.config.project.ignore_patterns)?;
        let result = ProjectExtractor::new(host).extract(&project_name)?;
        Ok(result)
    }
}

fn directory_name(path: &Path) -> Option<String> {
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}

/// Human readable overview of an extracted model
fn summarize(result: &ExtractionResult) -> String {
    let model = &result.model;
    let mut summary = format!(
        "Project {}: {} packages, {} types ({} units skipped)\n",
        model.project_name(),
        model.package_count(),
        model.type_count(),
        result.stats.units_skipped
    );

    for package in model.packages() {
        let label = if package.is_root() { "<default>" } else { package.name.as_str() };
        summary.push_str(&format!("\n{}\n", label));

        for extracted_type in model.types_of(package) {
            let accessors = extracted_type
                .methods()
                .iter()
                .filter(|m| m.method_type.is_access_method())
                .count();
            let constructors = extracted_type
                .methods()
                .iter()
                .filter(|m| m.method_type == MethodType::Constructor)
                .count();
            let extra = match extracted_type {
                ExtractedType::Enum { enumerals, .. } => format!(", {} literals", enumerals.len()),
                ExtractedType::Class { super_class: Some(super_class), .. } => format!(", extends {}", super_class),
                _ => String::new(),
            };
            summary.push_str(&format!(
                "  {} {}: {} fields, {} methods ({} constructors, {} accessors/mutators){}\n",
                extracted_type.kind_name(),
                extracted_type.name(),
                extracted_type.fields().len(),
                extracted_type.methods().len(),
                constructors,
                accessors,
                extra
            ));
        }
    }

    for path in &result.stats.skipped_units {
        summary.push_str(&format!("\nskipped: {}", path.display()));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use predicates::prelude::*;

    fn write_shop(project: &assert_fs::TempDir) {
        project
            .child("src/shop/Item.java")
            .write_str(
                r#"package shop;

public class Item {
    private String name;
    private int quantity;

    public String getName() { return name; }
    public void setQuantity(int quantity) { this.quantity = quantity; }
}
"#,
            )
            .unwrap();
        project
            .child("src/shop/Order.java")
            .write_str(
                r#"package shop;

import java.util.List;

public class Order {
    private List<Item> items;
    private Status status;

    public enum Status { OPEN, PAID }

    public int total() { return 0; }
}
"#,
            )
            .unwrap();
    }

    #[test]
    fn test_extract_and_save_same_project() {
        let project = assert_fs::TempDir::new().unwrap();
        write_shop(&project);
        let engine = Engine::with_config(Config::default());

        let path = engine
            .extract_and_save(project.path(), Some("Shop".to_string()), None, None)
            .unwrap();

        assert_eq!(path, project.path().join("model").join("Shop.ecore"));
        let ecore = project.child("model/Shop.ecore");
        ecore.assert(predicate::str::contains(r#"nsURI="Shop/""#));
        ecore.assert(predicate::str::contains(r#"<eSubpackages name="shop" nsURI="Shop/shop/" nsPrefix="shop">"#));
        ecore.assert(predicate::str::contains(r#"xsi:type="ecore:EEnum" name="Order$Status""#));
        ecore.assert(predicate::str::contains(r#"name="items" upperBound="-1""#));
        ecore.assert(predicate::str::contains(r#"name="total""#));
        // accessors are not emitted by default
        ecore.assert(predicate::str::contains("getName").not());
    }

    #[test]
    fn test_output_switches_to_custom_path() {
        let project = assert_fs::TempDir::new().unwrap();
        let output = assert_fs::TempDir::new().unwrap();
        write_shop(&project);
        let engine = Engine::with_config(Config::default());

        let path = engine
            .extract_and_save(project.path(), Some("Shop".to_string()), None, Some(output.path().to_path_buf()))
            .unwrap();

        assert_eq!(path, output.path().join("Shop.ecore"));
        project.child("model").assert(predicate::path::missing());
    }

    #[test]
    fn test_project_without_sources_is_rejected() {
        let project = assert_fs::TempDir::new().unwrap();
        let engine = Engine::with_config(Config::default());

        let result = engine.extract_and_save(project.path(), None, None, None);

        assert!(result.is_err());
        project.child("model").assert(predicate::path::missing());
    }

    #[test]
    fn test_init_writes_default_config() {
        let dir = assert_fs::TempDir::new().unwrap();
        let engine = Engine::with_config(Config::default());

        engine.init(Some(dir.path().to_path_buf())).unwrap();

        dir.child(CONFIG_FILE_NAME)
            .assert(predicate::str::contains("default_package_name = \"DEFAULT\""));
        let loaded = Config::load(dir.child(CONFIG_FILE_NAME).path()).unwrap();
        assert_eq!(loaded.saving.strategy, SavingStrategyKind::SameProject);
    }
}
