// src/core/host/testing.rs
//! In-memory symbol host returning hand-built declarations

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::core::model::AccessLevelModifier;
use crate::error::{EmeError, Result};
use super::{
    CompilationUnit, FieldDeclaration, ImportDeclaration, MethodDeclaration, ParameterDeclaration,
    SymbolHost, TypeDeclaration, TypeKind,
};

#[derive(Default)]
pub struct CannedHost {
    units: Vec<CompilationUnit>,
    broken_units: HashSet<PathBuf>,
    broken_types: HashSet<String>,
}

impl CannedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(mut self, path: &str, package: &str, imports: &[&str], types: Vec<TypeDeclaration>) -> Self {
        let imports = imports
            .iter()
            .map(|import| {
                let on_demand = import.ends_with(".*");
                ImportDeclaration {
                    name: import.trim_end_matches(".*").to_string(),
                    on_demand,
                    is_static: false,
                }
            })
            .collect();
        self.units.push(CompilationUnit {
            path: PathBuf::from(path),
            package: package.to_string(),
            imports,
            types,
        });
        self
    }

    /// Make `type_declarations` fail for this unit
    pub fn with_broken_unit(mut self, path: &str) -> Self {
        self.broken_units.insert(PathBuf::from(path));
        self
    }

    /// Make `methods_of` fail for this type
    pub fn with_broken_type(mut self, full_name: &str) -> Self {
        self.broken_types.insert(full_name.to_string());
        self
    }
}

impl SymbolHost for CannedHost {
    fn compilation_units(&mut self) -> Result<Vec<PathBuf>> {
        let mut paths: Vec<PathBuf> = self.units.iter().map(|u| u.path.clone()).collect();
        paths.extend(self.broken_units.iter().cloned());
        paths.sort();
        paths.dedup();
        Ok(paths)
    }

    fn type_declarations(&mut self, unit: &Path) -> Result<CompilationUnit> {
        if self.broken_units.contains(unit) {
            return Err(EmeError::host(format!("cannot read {}", unit.display())));
        }
        self.units
            .iter()
            .find(|u| u.path == unit)
            .cloned()
            .ok_or_else(|| EmeError::host(format!("unknown unit {}", unit.display())))
    }

    fn methods_of(&self, declaration: &TypeDeclaration) -> Result<Vec<MethodDeclaration>> {
        if self.broken_types.contains(&declaration.full_name) {
            return Err(EmeError::host(format!("inconsistent symbols for {}", declaration.full_name)));
        }
        Ok(declaration.methods.clone())
    }
}

pub fn type_decl(full_name: &str, kind: TypeKind) -> TypeDeclaration {
    TypeDeclaration {
        full_name: full_name.to_string(),
        kind,
        modifier: AccessLevelModifier::Public,
        is_abstract: kind == TypeKind::Interface,
        is_final: false,
        is_static: false,
        super_class: None,
        interfaces: Vec::new(),
        type_parameters: Vec::new(),
        fields: Vec::new(),
        methods: Vec::new(),
    }
}

pub fn field(name: &str, type_signature: &str) -> FieldDeclaration {
    FieldDeclaration {
        name: name.to_string(),
        type_signature: type_signature.to_string(),
        modifier: AccessLevelModifier::Private,
        is_final: false,
        is_static: false,
        is_enum_constant: false,
    }
}

pub fn enum_constant(name: &str, enum_name: &str) -> FieldDeclaration {
    FieldDeclaration {
        modifier: AccessLevelModifier::Public,
        is_final: true,
        is_static: true,
        is_enum_constant: true,
        ..field(name, enum_name)
    }
}

pub fn method(name: &str, return_type: &str, parameters: &[(&str, &str)]) -> MethodDeclaration {
    MethodDeclaration {
        name: name.to_string(),
        return_type: return_type.to_string(),
        parameters: parameters
            .iter()
            .map(|(name, signature)| ParameterDeclaration {
                name: name.to_string(),
                type_signature: signature.to_string(),
            })
            .collect(),
        exception_types: Vec::new(),
        type_parameters: Vec::new(),
        modifier: AccessLevelModifier::Public,
        is_abstract: false,
        is_static: false,
        is_constructor: false,
        is_main: false,
    }
}

pub fn constructor(name: &str, parameters: &[(&str, &str)]) -> MethodDeclaration {
    MethodDeclaration {
        is_constructor: true,
        ..method(name, "void", parameters)
    }
}
