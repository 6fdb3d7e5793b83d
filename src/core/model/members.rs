// src/core/model/members.rs
use serde::{Deserialize, Serialize};

use super::data_type::{DataType, ExtractedTypeParameter};

/// Java access level of a type or member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevelModifier {
    Public,
    Protected,
    Package,
    Private,
}

impl AccessLevelModifier {
    /// Determine the access level from a list of modifier keywords
    pub fn from_keywords<S: AsRef<str>>(keywords: &[S]) -> Self {
        let has = |k: &str| keywords.iter().any(|m| m.as_ref() == k);
        if has("public") {
            AccessLevelModifier::Public
        } else if has("protected") {
            AccessLevelModifier::Protected
        } else if has("private") {
            AccessLevelModifier::Private
        } else {
            AccessLevelModifier::Package
        }
    }
}

/// Role of a method, decided by flags and naming heuristics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MethodType {
    Constructor,
    Accessor,
    Mutator,
    Main,
    Normal,
}

impl MethodType {
    pub fn is_access_method(self) -> bool {
        matches!(self, MethodType::Accessor | MethodType::Mutator)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedField {
    pub name: String,
    /// Full name of the declaring type
    pub owner: String,
    pub data_type: DataType,
    pub is_final: bool,
    pub is_static: bool,
    pub modifier: AccessLevelModifier,
}

/// Typed, named method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedVariable {
    pub name: String,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_varargs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedMethod {
    /// `TypeName.methodName`
    pub name: String,
    pub return_type: DataType,
    pub parameters: Vec<ExtractedVariable>,
    pub throws_declarations: Vec<DataType>,
    pub type_parameters: Vec<ExtractedTypeParameter>,
    pub is_abstract: bool,
    pub is_static: bool,
    pub method_type: MethodType,
    pub modifier: AccessLevelModifier,
}

impl ExtractedMethod {
    /// Method name without the declaring type prefix
    pub fn simple_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[idx + 1..],
            None => &self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_level_from_keywords() {
        assert_eq!(AccessLevelModifier::from_keywords(&["static", "public"]), AccessLevelModifier::Public);
        assert_eq!(AccessLevelModifier::from_keywords(&["private", "final"]), AccessLevelModifier::Private);
        assert_eq!(AccessLevelModifier::from_keywords::<&str>(&[]), AccessLevelModifier::Package);
    }

    #[test]
    fn test_method_simple_name() {
        let method = ExtractedMethod {
            name: "Outer$Inner.getValue".to_string(),
            return_type: DataType::Void,
            parameters: vec![],
            throws_declarations: vec![],
            type_parameters: vec![],
            is_abstract: false,
            is_static: false,
            method_type: MethodType::Normal,
            modifier: AccessLevelModifier::Public,
        };
        assert_eq!(method.simple_name(), "getValue");
    }
}
