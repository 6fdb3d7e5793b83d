// src/core/model/intermediate.rs
use indexmap::IndexMap;
use serde::Serialize;
use tracing::trace;

use crate::error::{EmeError, Result};
use super::package::ExtractedPackage;
use super::types::ExtractedType;

/// Single-writer accumulator for the packages and types of one project.
///
/// Every mutation checks the model invariants: at most one root package,
/// unique package names, unique type full names, and no orphans (a package's
/// parent and a type's package must already exist).
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    project_name: String,
    packages: IndexMap<String, ExtractedPackage>,
    types: IndexMap<String, ExtractedType>,
    root: Option<String>,
}

impl ModelBuilder {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            packages: IndexMap::new(),
            types: IndexMap::new(),
            root: None,
        }
    }

    /// Add a package below its (already present) parent
    pub fn add_package(&mut self, package: ExtractedPackage) -> Result<()> {
        if self.packages.contains_key(&package.name) {
            return Err(EmeError::DuplicatePackage(package.name));
        }

        if package.is_root() {
            if self.root.is_some() {
                return Err(EmeError::DuplicateRoot(package.name));
            }
            self.root = Some(package.name.clone());
        } else {
            if package.name.is_empty() {
                return Err(EmeError::IllegalArgument(
                    "the unnamed package can only be added as root".to_string(),
                ));
            }
            let parent_name = package.parent_name().unwrap_or_default().to_string();
            let parent = self
                .packages
                .get_mut(&parent_name)
                .ok_or(EmeError::MissingPackage(parent_name))?;
            parent.subpackages.push(package.name.clone());
        }

        trace!("Added package {:?}", package.name);
        self.packages.insert(package.name.clone(), package);
        Ok(())
    }

    /// Add a type to its owning package, which must already exist
    pub fn add_type(&mut self, extracted_type: ExtractedType) -> Result<()> {
        let full_name = extracted_type.full_name().to_string();
        if self.types.contains_key(&full_name) {
            return Err(EmeError::DuplicateType(full_name));
        }

        let package_name = extracted_type.package_name().to_string();
        let package = self
            .packages
            .get_mut(&package_name)
            .ok_or(EmeError::MissingPackage(package_name))?;
        package.types.push(full_name.clone());

        trace!("Added {} {}", extracted_type.kind_name(), full_name);
        self.types.insert(full_name, extracted_type);
        Ok(())
    }

    pub fn get_package(&self, name: &str) -> Option<&ExtractedPackage> {
        self.packages.get(name)
    }

    /// Finish building; the returned snapshot cannot be mutated
    pub fn freeze(self) -> IntermediateModel {
        IntermediateModel {
            project_name: self.project_name,
            packages: self.packages,
            types: self.types,
            root: self.root,
        }
    }
}

/// Read-only snapshot of an extracted project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntermediateModel {
    project_name: String,
    packages: IndexMap<String, ExtractedPackage>,
    types: IndexMap<String, ExtractedType>,
    root: Option<String>,
}

impl IntermediateModel {
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn get_package(&self, name: &str) -> Option<&ExtractedPackage> {
        self.packages.get(name)
    }

    pub fn get_type(&self, full_name: &str) -> Option<&ExtractedType> {
        self.types.get(full_name)
    }

    pub fn root(&self) -> Option<&ExtractedPackage> {
        self.root.as_ref().and_then(|name| self.packages.get(name))
    }

    pub fn packages(&self) -> impl Iterator<Item = &ExtractedPackage> {
        self.packages.values()
    }

    pub fn subpackages_of<'a>(&'a self, package: &'a ExtractedPackage) -> impl Iterator<Item = &'a ExtractedPackage> {
        package.subpackages.iter().filter_map(|name| self.packages.get(name))
    }

    pub fn types_of<'a>(&'a self, package: &'a ExtractedPackage) -> impl Iterator<Item = &'a ExtractedType> {
        package.types.iter().filter_map(|name| self.types.get(name))
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Check that a metamodel can be generated: a root package must exist and
    /// the model must contain at least one further package or a type.
    pub fn ensure_generatable(&self) -> Result<&ExtractedPackage> {
        let root = self.root().ok_or_else(|| {
            EmeError::InvalidModel(format!("project {:?} has no root package", self.project_name))
        })?;
        if self.packages.len() < 2 && self.types.is_empty() {
            return Err(EmeError::InvalidModel(format!(
                "project {:?} contains neither packages nor types",
                self.project_name
            )));
        }
        Ok(root)
    }
}
