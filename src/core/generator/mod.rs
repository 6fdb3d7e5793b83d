// src/core/generator/mod.rs
//! Ecore metamodel generation from the intermediate model

mod builder;
mod metamodel;
mod naming;
mod saving;
mod xmi;

pub use metamodel::Metamodel;
pub use saving::{strategy_from_config, SavingStrategy};

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use builder::EcoreBuilder;
use naming::NameSanitizer;
use crate::config::MetamodelConfig;
use crate::core::model::IntermediateModel;
use crate::error::{EmeError, Result};

/// Generates Ecore metamodels and saves the latest one through a saving strategy
pub struct MetamodelGenerator {
    config: MetamodelConfig,
    names: NameSanitizer,
    saving_strategy: Box<dyn SavingStrategy>,
    metamodel: Option<Arc<Metamodel>>,
}

impl MetamodelGenerator {
    pub fn new(config: MetamodelConfig, saving_strategy: Box<dyn SavingStrategy>) -> Result<Self> {
        Ok(Self {
            config,
            names: NameSanitizer::new()?,
            saving_strategy,
            metamodel: None,
        })
    }

    /// Generate the metamodel of a frozen intermediate model.
    ///
    /// Fails with an invalid-model error if the model has no root package, or
    /// nothing besides it. Nothing is kept from a failed generation.
    pub fn generate_metamodel_from(&mut self, model: &IntermediateModel) -> Result<Arc<Metamodel>> {
        info!("🏗️ Generating metamodel for {}", model.project_name());
        let metamodel = Arc::new(EcoreBuilder::new(model, &self.config, &self.names).build()?);
        info!(
            "Generated {} packages and {} classifiers",
            metamodel.package_count(),
            metamodel.classifier_count()
        );
        self.metamodel = Some(Arc::clone(&metamodel));
        Ok(metamodel)
    }

    /// Save the last generated metamodel with the active strategy
    pub fn save_metamodel(&mut self) -> Result<PathBuf> {
        let metamodel = self.metamodel.as_ref().ok_or_else(|| {
            EmeError::IllegalState("cannot save before a metamodel was generated".to_string())
        })?;
        debug!("Saving with the {} strategy", self.saving_strategy.name());
        self.saving_strategy.save(metamodel)
    }

    /// Replace the saving strategy; `None` is rejected and keeps the current one
    pub fn change_saving_strategy(&mut self, strategy: Option<Box<dyn SavingStrategy>>) -> Result<()> {
        let strategy = strategy.ok_or_else(|| EmeError::IllegalArgument("saving strategy is missing".to_string()))?;
        debug!("Switching saving strategy from {} to {}", self.saving_strategy.name(), strategy.name());
        self.saving_strategy = strategy;
        Ok(())
    }

    pub fn metamodel(&self) -> Option<Arc<Metamodel>> {
        self.metamodel.clone()
    }
}
