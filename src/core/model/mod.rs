//! Intermediate, language-neutral model of an analyzed project
//!
//! Extraction accumulates packages and types in a [`ModelBuilder`]; the
//! generator only ever sees the frozen [`IntermediateModel`].

mod data_type;
mod intermediate;
mod members;
mod package;
mod types;

pub use data_type::{DataType, DeclaredType, ExtractedTypeParameter, Primitive, TypeArgument, WildcardBound};
pub use intermediate::{IntermediateModel, ModelBuilder};
pub use members::{AccessLevelModifier, ExtractedField, ExtractedMethod, ExtractedVariable, MethodType};
pub use package::ExtractedPackage;
pub use types::{ExtractedType, TypeInfo};
