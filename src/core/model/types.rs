// src/core/model/types.rs
use serde::{Deserialize, Serialize};

use super::data_type::ExtractedTypeParameter;
use super::members::{AccessLevelModifier, ExtractedField, ExtractedMethod};

/// Common record shared by all extracted type kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub full_name: String,
    pub name: String,
    pub modifier: AccessLevelModifier,
    pub fields: Vec<ExtractedField>,
    pub methods: Vec<ExtractedMethod>,
    /// Full names of implemented (or, for interfaces, extended) interfaces
    pub interfaces: Vec<String>,
    pub type_parameters: Vec<ExtractedTypeParameter>,
}

impl TypeInfo {
    /// Create an empty record; the simple name is derived from the full name
    pub fn new(full_name: impl Into<String>, modifier: AccessLevelModifier) -> Self {
        let full_name = full_name.into();
        let name = match full_name.rfind('.') {
            Some(idx) => full_name[idx + 1..].to_string(),
            None => full_name.clone(),
        };
        Self {
            full_name,
            name,
            modifier,
            fields: Vec::new(),
            methods: Vec::new(),
            interfaces: Vec::new(),
            type_parameters: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractedType {
    Class {
        #[serde(flatten)]
        info: TypeInfo,
        is_abstract: bool,
        super_class: Option<String>,
    },
    Interface {
        #[serde(flatten)]
        info: TypeInfo,
    },
    Enum {
        #[serde(flatten)]
        info: TypeInfo,
        enumerals: Vec<String>,
    },
}

impl ExtractedType {
    pub fn class(info: TypeInfo, is_abstract: bool, super_class: Option<String>) -> Self {
        ExtractedType::Class { info, is_abstract, super_class }
    }

    pub fn interface(info: TypeInfo) -> Self {
        ExtractedType::Interface { info }
    }

    pub fn enumeration(info: TypeInfo, enumerals: Vec<String>) -> Self {
        ExtractedType::Enum { info, enumerals }
    }

    pub fn info(&self) -> &TypeInfo {
        match self {
            ExtractedType::Class { info, .. }
            | ExtractedType::Interface { info }
            | ExtractedType::Enum { info, .. } => info,
        }
    }

    pub fn full_name(&self) -> &str {
        &self.info().full_name
    }

    pub fn name(&self) -> &str {
        &self.info().name
    }

    pub fn fields(&self) -> &[ExtractedField] {
        &self.info().fields
    }

    pub fn methods(&self) -> &[ExtractedMethod] {
        &self.info().methods
    }

    /// Name of the owning package, i.e. the full name without the simple name
    pub fn package_name(&self) -> &str {
        let full_name = self.full_name();
        match full_name.rfind('.') {
            Some(idx) => &full_name[..idx],
            None => "",
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ExtractedType::Class { .. } => "class",
            ExtractedType::Interface { .. } => "interface",
            ExtractedType::Enum { .. } => "enum",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_is_full_name_without_simple_name() {
        let nested = ExtractedType::interface(TypeInfo::new("main.model.Outer$Inner", AccessLevelModifier::Public));
        assert_eq!(nested.name(), "Outer$Inner");
        assert_eq!(nested.package_name(), "main.model");

        let default_package = ExtractedType::class(TypeInfo::new("Main", AccessLevelModifier::Package), false, None);
        assert_eq!(default_package.name(), "Main");
        assert_eq!(default_package.package_name(), "");
    }
}
