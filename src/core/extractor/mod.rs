// src/core/extractor/mod.rs
//! Extraction of the intermediate model from host declarations

mod data_type;
mod member;

use data_type::{DataTypeExtractor, KnownTypes};
use member::MemberExtractor;

use std::collections::BTreeSet;
use std::path::PathBuf;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::host::{CompilationUnit, SymbolHost, TypeDeclaration, TypeKind};
use crate::core::model::{ExtractedPackage, ExtractedType, IntermediateModel, ModelBuilder, TypeInfo};
use crate::error::{EmeError, Result};

/// Walks every compilation unit of a project and builds its intermediate model
pub struct ProjectExtractor<H: SymbolHost> {
    host: H,
}

#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub model: IntermediateModel,
    pub stats: ExtractionStatistics,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionStatistics {
    pub units_found: usize,
    pub units_skipped: usize,
    pub types_extracted: usize,
    pub types_skipped: usize,
    pub packages_created: usize,
    pub skipped_units: Vec<PathBuf>,
    pub extraction_time_ms: u128,
}

impl<H: SymbolHost> ProjectExtractor<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    /// Extract the model of the whole project.
    ///
    /// A unit whose declarations cannot be read, or any of whose types fails
    /// to extract, contributes nothing; the other units are unaffected.
    pub fn extract(&mut self, project_name: &str) -> Result<ExtractionResult> {
        let start_time = std::time::Instant::now();
        let mut stats = ExtractionStatistics::default();

        let paths = self.host.compilation_units()?;
        stats.units_found = paths.len();
        info!("📖 Reading {} compilation units of {}", paths.len(), project_name);

        let mut units = Vec::with_capacity(paths.len());
        for path in paths {
            match self.host.type_declarations(&path) {
                Ok(unit) => units.push(unit),
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    stats.skipped_units.push(path);
                }
            }
        }

        let known_types = KnownTypes::from_units(&units);
        debug!("Indexed {} declared types", known_types.len());

        let mut builder = ModelBuilder::new(project_name);
        builder.add_package(ExtractedPackage::root())?;
        stats.packages_created = create_packages(&mut builder, &units)?;

        info!("🧩 Extracting types...");
        for unit in &units {
            match self.extract_unit(unit, &known_types) {
                Ok(types) => {
                    for extracted_type in types {
                        let full_name = extracted_type.full_name().to_string();
                        match builder.add_type(extracted_type) {
                            Ok(()) => stats.types_extracted += 1,
                            Err(EmeError::DuplicateType(name)) => {
                                warn!("Type {} is declared more than once, keeping the first declaration", name);
                                stats.types_skipped += 1;
                            }
                            Err(e) => return Err(e),
                        }
                        debug!("Extracted {}", full_name);
                    }
                }
                Err(e) => {
                    warn!("Skipping {}: {}", unit.path.display(), e);
                    stats.types_skipped += unit.types.len();
                    stats.skipped_units.push(unit.path.clone());
                }
            }
        }

        stats.units_skipped = stats.skipped_units.len();
        stats.extraction_time_ms = start_time.elapsed().as_millis();
        info!(
            "✅ Extracted {} types in {} packages ({} units skipped) in {}ms",
            stats.types_extracted,
            stats.packages_created + 1,
            stats.units_skipped,
            stats.extraction_time_ms
        );

        Ok(ExtractionResult {
            model: builder.freeze(),
            stats,
        })
    }

    /// All types of one unit, or the first failure
    fn extract_unit(&self, unit: &CompilationUnit, known_types: &KnownTypes) -> Result<Vec<ExtractedType>> {
        let data_types = DataTypeExtractor::new(unit, known_types);
        let members = MemberExtractor::new(&data_types);
        unit.types
            .iter()
            .map(|declaration| self.extract_type(declaration, &data_types, &members))
            .collect()
    }

    fn extract_type(
        &self,
        declaration: &TypeDeclaration,
        data_types: &DataTypeExtractor<'_>,
        members: &MemberExtractor<'_, '_>,
    ) -> Result<ExtractedType> {
        let scope = data_types.scope_of(declaration);
        let fields = self.host.fields_of(declaration)?;
        let methods = self.host.methods_of(declaration)?;

        let mut info = TypeInfo::new(declaration.full_name.clone(), declaration.modifier);
        info.type_parameters = data_types.extract_type_parameters(&declaration.type_parameters, &scope)?;
        info.interfaces = declaration
            .interfaces
            .iter()
            .map(|signature| data_types.extract_data_type(signature, &scope).map(|t| t.erased_name()))
            .collect::<Result<Vec<_>>>()?;
        info.fields = members.extract_fields(declaration, &fields)?;
        info.methods = members.extract_methods(declaration, &methods, &fields)?;

        Ok(match declaration.kind {
            TypeKind::Class => {
                let super_class = declaration
                    .super_class
                    .as_deref()
                    .map(|signature| data_types.extract_data_type(signature, &scope).map(|t| t.erased_name()))
                    .transpose()?;
                ExtractedType::class(info, declaration.is_abstract, super_class)
            }
            TypeKind::Interface => ExtractedType::interface(info),
            TypeKind::Enum => {
                let enumerals = fields
                    .iter()
                    .filter(|field| field.is_enum_constant)
                    .map(|field| field.name.clone())
                    .collect();
                ExtractedType::enumeration(info, enumerals)
            }
        })
    }
}

/// Add every declared package together with its ancestors, parents first
fn create_packages(builder: &mut ModelBuilder, units: &[CompilationUnit]) -> Result<usize> {
    let mut names = BTreeSet::new();
    for unit in units.iter().filter(|unit| !unit.package.is_empty()) {
        let segments: Vec<&str> = unit.package.split('.').collect();
        for end in 1..=segments.len() {
            names.insert(segments[..end].join("."));
        }
    }

    // "a" sorts before "a.b", so parents are always present first
    for name in &names {
        builder.add_package(ExtractedPackage::new(name.clone()))?;
    }
    Ok(names.len())
}
