// src/core/model/package.rs
use serde::{Deserialize, Serialize};

/// Package of the intermediate model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPackage {
    /// Dotted name, empty for the default package
    pub name: String,
    is_root: bool,
    /// Full names of the contained types, in insertion order
    pub types: Vec<String>,
    /// Names of the direct subpackages, in insertion order
    pub subpackages: Vec<String>,
}

impl ExtractedPackage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_root: false,
            types: Vec::new(),
            subpackages: Vec::new(),
        }
    }

    /// Root package representing the unnamed default package
    pub fn root() -> Self {
        let mut package = Self::new("");
        package.set_as_root();
        package
    }

    pub fn set_as_root(&mut self) {
        self.is_root = true;
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Last segment of the dotted name
    pub fn simple_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[idx + 1..],
            None => &self.name,
        }
    }

    /// Name of the parent package; top-level packages have the root as parent
    pub fn parent_name(&self) -> Option<&str> {
        if self.is_root {
            return None;
        }
        match self.name.rfind('.') {
            Some(idx) => Some(&self.name[..idx]),
            None => Some(""),
        }
    }
}
