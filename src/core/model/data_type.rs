// src/core/model/data_type.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Java primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    pub const ALL: [Primitive; 8] = [
        Primitive::Boolean,
        Primitive::Byte,
        Primitive::Char,
        Primitive::Short,
        Primitive::Int,
        Primitive::Long,
        Primitive::Float,
        Primitive::Double,
    ];

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.keyword() == keyword)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    /// Fully qualified name of the wrapper class
    pub fn wrapper(self) -> &'static str {
        match self {
            Primitive::Boolean => "java.lang.Boolean",
            Primitive::Byte => "java.lang.Byte",
            Primitive::Char => "java.lang.Character",
            Primitive::Short => "java.lang.Short",
            Primitive::Int => "java.lang.Integer",
            Primitive::Long => "java.lang.Long",
            Primitive::Float => "java.lang.Float",
            Primitive::Double => "java.lang.Double",
        }
    }

    /// Primitive boxed by the given wrapper class name
    pub fn unboxed(full_name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.wrapper() == full_name)
    }
}

/// Normalized data-type descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataType {
    Void,
    Primitive { primitive: Primitive },
    /// Reference type resolved to a fully qualified name
    Declared(DeclaredType),
    /// Reference type that could not be resolved, kept by the name it was written with
    Opaque(DeclaredType),
    TypeVariable { name: String },
    Array { element: Box<DataType>, dimensions: usize },
}

/// Named reference type with its generic arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<TypeArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeArgument {
    Type { data_type: DataType },
    Wildcard { bound: Option<WildcardBound> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildcardBound {
    Extends(Box<DataType>),
    Super(Box<DataType>),
}

/// Generic type parameter declaration, e.g. `T extends Comparable<T>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedTypeParameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bounds: Vec<DataType>,
}

impl DataType {
    pub fn primitive(primitive: Primitive) -> Self {
        DataType::Primitive { primitive }
    }

    pub fn declared(name: impl Into<String>) -> Self {
        DataType::Declared(DeclaredType {
            name: name.into(),
            arguments: Vec::new(),
        })
    }

    pub fn opaque(name: impl Into<String>) -> Self {
        DataType::Opaque(DeclaredType {
            name: name.into(),
            arguments: Vec::new(),
        })
    }

    pub fn is_void(&self) -> bool {
        matches!(self, DataType::Void)
    }

    /// Name of the referenced type with generic arguments and array dimensions erased
    pub fn erased_name(&self) -> String {
        match self {
            DataType::Void => "void".to_string(),
            DataType::Primitive { primitive } => primitive.keyword().to_string(),
            DataType::Declared(declared) | DataType::Opaque(declared) => declared.name.clone(),
            DataType::TypeVariable { name } => name.clone(),
            DataType::Array { element, .. } => element.erased_name(),
        }
    }

    /// Primitive this type denotes, directly or through its wrapper class
    pub fn unboxed(&self) -> Option<Primitive> {
        match self {
            DataType::Primitive { primitive } => Some(*primitive),
            DataType::Declared(declared) => Primitive::unboxed(&declared.name),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Void => write!(f, "void"),
            DataType::Primitive { primitive } => write!(f, "{}", primitive.keyword()),
            DataType::Declared(declared) | DataType::Opaque(declared) => write!(f, "{}", declared),
            DataType::TypeVariable { name } => write!(f, "{}", name),
            DataType::Array { element, dimensions } => {
                write!(f, "{}{}", element, "[]".repeat(*dimensions))
            }
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.arguments.is_empty() {
            let arguments: Vec<String> = self.arguments.iter().map(|a| a.to_string()).collect();
            write!(f, "<{}>", arguments.join(","))?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeArgument::Type { data_type } => write!(f, "{}", data_type),
            TypeArgument::Wildcard { bound: None } => write!(f, "?"),
            TypeArgument::Wildcard { bound: Some(WildcardBound::Extends(bound)) } => {
                write!(f, "? extends {}", bound)
            }
            TypeArgument::Wildcard { bound: Some(WildcardBound::Super(bound)) } => {
                write!(f, "? super {}", bound)
            }
        }
    }
}
