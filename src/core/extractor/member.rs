// src/core/extractor/member.rs
use tracing::trace;

use super::data_type::{DataTypeExtractor, TypeScope};
use crate::core::host::{type_parameter_name, FieldDeclaration, MethodDeclaration, TypeDeclaration};
use crate::core::model::{DataType, ExtractedField, ExtractedMethod, ExtractedVariable, MethodType};
use crate::error::Result;

/// Roles in the order they are tested; the first match wins
const ROLE_PRIORITY: [MethodType; 4] = [
    MethodType::Constructor,
    MethodType::Accessor,
    MethodType::Mutator,
    MethodType::Main,
];

const ACCESSOR_PREFIXES: &[&str] = &["get", "is"];
const MUTATOR_PREFIXES: &[&str] = &["set"];

/// Extracts fields and methods of a single type
pub struct MemberExtractor<'e, 'a> {
    data_types: &'e DataTypeExtractor<'a>,
}

impl<'e, 'a> MemberExtractor<'e, 'a> {
    pub fn new(data_types: &'e DataTypeExtractor<'a>) -> Self {
        Self { data_types }
    }

    /// Fields declared by the type. Enum constants are not fields of the model.
    pub fn extract_fields(&self, declaration: &TypeDeclaration, fields: &[FieldDeclaration]) -> Result<Vec<ExtractedField>> {
        let scope = self.data_types.scope_of(declaration);
        fields
            .iter()
            .filter(|field| !field.is_enum_constant)
            .map(|field| {
                Ok(ExtractedField {
                    name: field.name.clone(),
                    owner: declaration.full_name.clone(),
                    data_type: self.data_types.extract_data_type(&field.type_signature, &scope)?,
                    is_final: field.is_final,
                    is_static: field.is_static,
                    modifier: field.modifier,
                })
            })
            .collect()
    }

    /// Methods and constructors declared by the type, with their roles
    pub fn extract_methods(
        &self,
        declaration: &TypeDeclaration,
        methods: &[MethodDeclaration],
        fields: &[FieldDeclaration],
    ) -> Result<Vec<ExtractedMethod>> {
        let type_scope = self.data_types.scope_of(declaration);
        methods
            .iter()
            .map(|method| self.extract_method(declaration, method, fields, &type_scope))
            .collect()
    }

    fn extract_method(
        &self,
        declaration: &TypeDeclaration,
        method: &MethodDeclaration,
        fields: &[FieldDeclaration],
        type_scope: &TypeScope,
    ) -> Result<ExtractedMethod> {
        let names = method.type_parameters.iter().map(|p| type_parameter_name(p)).collect();
        let scope = type_scope.with_method_parameters(names);

        let parameters = method
            .parameters
            .iter()
            .map(|parameter| {
                Ok(ExtractedVariable {
                    name: parameter.name.clone(),
                    data_type: self.data_types.extract_data_type(&parameter.type_signature, &scope)?,
                    is_varargs: parameter.type_signature.trim_end().ends_with("..."),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let throws_declarations = method
            .exception_types
            .iter()
            .map(|exception| self.data_types.extract_data_type(exception, &scope))
            .collect::<Result<Vec<DataType>>>()?;

        Ok(ExtractedMethod {
            name: format!("{}.{}", declaration.full_name, method.name),
            return_type: self.data_types.extract_data_type(&method.return_type, &scope)?,
            parameters,
            throws_declarations,
            type_parameters: self.data_types.extract_type_parameters(&method.type_parameters, &scope)?,
            is_abstract: method.is_abstract,
            is_static: method.is_static,
            method_type: classify_method(method, fields),
            modifier: method.modifier,
        })
    }
}

/// Decide the role of a method from its flags, name and the fields of its type
pub fn classify_method(method: &MethodDeclaration, fields: &[FieldDeclaration]) -> MethodType {
    ROLE_PRIORITY
        .into_iter()
        .find(|role| has_role(*role, method, fields))
        .unwrap_or(MethodType::Normal)
}

fn has_role(role: MethodType, method: &MethodDeclaration, fields: &[FieldDeclaration]) -> bool {
    match role {
        MethodType::Constructor => method.is_constructor,
        MethodType::Accessor => is_accessor(method, fields),
        MethodType::Mutator => is_mutator(method, fields),
        MethodType::Main => method.is_main,
        MethodType::Normal => true,
    }
}

/// No parameters and returns exactly the type of the field its name refers to
fn is_accessor(method: &MethodDeclaration, fields: &[FieldDeclaration]) -> bool {
    if method.number_of_parameters() != 0 || method.returns_void() {
        return false;
    }
    match find_referenced_field(&method.name, fields, ACCESSOR_PREFIXES) {
        Some(field) => {
            trace!(
                "Accessor candidate {}: returns {:?}, field {} is {:?}",
                method.name,
                method.return_type,
                field.name,
                field.type_signature
            );
            method.return_type == field.type_signature
        }
        None => false,
    }
}

/// One parameter of exactly the type of the field its name refers to, void return
fn is_mutator(method: &MethodDeclaration, fields: &[FieldDeclaration]) -> bool {
    if method.number_of_parameters() != 1 || !method.returns_void() {
        return false;
    }
    match (find_referenced_field(&method.name, fields, MUTATOR_PREFIXES), method.parameters.first()) {
        (Some(field), Some(parameter)) => {
            trace!(
                "Mutator candidate {}: takes {:?}, field {} is {:?}",
                method.name,
                parameter.type_signature,
                field.name,
                field.type_signature
            );
            parameter.type_signature == field.type_signature
        }
        _ => false,
    }
}

/// First field whose name, behind one of the prefixes, matches the method name ignoring case.
///
/// Fields are scanned in declaration order, prefixes in the given order for each field.
pub fn find_referenced_field<'f>(
    method_name: &str,
    fields: &'f [FieldDeclaration],
    prefixes: &[&str],
) -> Option<&'f FieldDeclaration> {
    fields.iter().find(|field| {
        prefixes
            .iter()
            .any(|prefix| equals_ignore_case(method_name, &format!("{}{}", prefix, field.name)))
    })
}

fn equals_ignore_case(a: &str, b: &str) -> bool {
    a.chars().count() == b.chars().count()
        && a.chars().zip(b.chars()).all(|(x, y)| {
            x == y || x.to_uppercase().eq(y.to_uppercase()) || x.to_lowercase().eq(y.to_lowercase())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extractor::data_type::KnownTypes;
    use crate::core::host::testing::{constructor, enum_constant, field, method, type_decl};
    use crate::core::host::{CompilationUnit, TypeKind};
    use crate::core::model::Primitive;
    use std::path::PathBuf;

    #[test]
    fn test_accessor_requires_matching_field_and_type() {
        let fields = vec![field("name", "String"), field("active", "boolean")];

        assert_eq!(classify_method(&method("getName", "String", &[]), &fields), MethodType::Accessor);
        assert_eq!(classify_method(&method("isActive", "boolean", &[]), &fields), MethodType::Accessor);
        assert_eq!(classify_method(&method("GETNAME", "String", &[]), &fields), MethodType::Accessor);
        // no field called "default"
        assert_eq!(classify_method(&method("getDefault", "String", &[]), &fields), MethodType::Normal);
        // signature mismatch
        assert_eq!(classify_method(&method("getName", "Object", &[]), &fields), MethodType::Normal);
        assert_eq!(classify_method(&method("getName", "String", &[("x", "int")]), &fields), MethodType::Normal);
    }

    #[test]
    fn test_mutator_rules() {
        let fields = vec![field("name", "String")];

        assert_eq!(classify_method(&method("setName", "void", &[("n", "String")]), &fields), MethodType::Mutator);
        assert_eq!(classify_method(&method("SETNAME", "void", &[("n", "String")]), &fields), MethodType::Mutator);
        // signatures are compared as written
        assert_eq!(classify_method(&method("setName", "void", &[("n", "int")]), &fields), MethodType::Normal);
        assert_eq!(
            classify_method(&method("setName", "void", &[("n", "java.lang.String")]), &fields),
            MethodType::Normal
        );
        assert_eq!(classify_method(&method("setName", "boolean", &[("n", "String")]), &fields), MethodType::Normal);
        assert_eq!(classify_method(&method("setName", "void", &[]), &fields), MethodType::Normal);
        assert_eq!(classify_method(&method("setOther", "void", &[("n", "String")]), &fields), MethodType::Normal);
    }

    #[test]
    fn test_role_priority() {
        let fields = vec![field("value", "int")];

        assert_eq!(classify_method(&constructor("Counter", &[]), &fields), MethodType::Constructor);

        let mut main = method("main", "void", &[("args", "String[]")]);
        main.is_static = true;
        main.is_main = true;
        assert_eq!(classify_method(&main, &fields), MethodType::Main);

        // a constructor never classifies as anything else
        let odd = MethodDeclaration { is_constructor: true, ..method("getValue", "int", &[]) };
        assert_eq!(classify_method(&odd, &fields), MethodType::Constructor);
    }

    #[test]
    fn test_field_lookup_scans_fields_before_prefixes() {
        // "isX" and "getIsX" style names: the first field in declaration order wins
        let fields = vec![field("isOpen", "boolean"), field("open", "boolean")];
        let found = find_referenced_field("isOpen", &fields, ACCESSOR_PREFIXES).unwrap();
        assert_eq!(found.name, "open");

        let found = find_referenced_field("getIsOpen", &fields, ACCESSOR_PREFIXES).unwrap();
        assert_eq!(found.name, "isOpen");
    }

    #[test]
    fn test_enum_constants_are_not_fields() {
        let mut declaration = type_decl("main.Color", TypeKind::Enum);
        declaration.fields = vec![enum_constant("RED", "Color"), enum_constant("GREEN", "Color"), field("rgb", "int")];
        let unit = CompilationUnit {
            path: PathBuf::from("main/Color.java"),
            package: "main".to_string(),
            imports: vec![],
            types: vec![declaration.clone()],
        };
        let known = KnownTypes::from_units([&unit]);
        let data_types = DataTypeExtractor::new(&unit, &known);
        let extractor = MemberExtractor::new(&data_types);

        let fields = extractor.extract_fields(&declaration, &declaration.fields).unwrap();

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "rgb");
        assert_eq!(fields[0].owner, "main.Color");
        assert_eq!(fields[0].data_type, DataType::primitive(Primitive::Int));
    }

    #[test]
    fn test_method_extraction() {
        let mut declaration = type_decl("main.Box", TypeKind::Class);
        declaration.type_parameters = vec!["T".to_string()];
        let mut generic = method("map", "R", &[("values", "T...")]);
        generic.type_parameters = vec!["R".to_string()];
        generic.exception_types = vec!["java.io.IOException".to_string()];
        declaration.methods = vec![generic];

        let unit = CompilationUnit {
            path: PathBuf::from("main/Box.java"),
            package: "main".to_string(),
            imports: vec![],
            types: vec![declaration.clone()],
        };
        let known = KnownTypes::from_units([&unit]);
        let data_types = DataTypeExtractor::new(&unit, &known);
        let extractor = MemberExtractor::new(&data_types);

        let methods = extractor.extract_methods(&declaration, &declaration.methods, &[]).unwrap();
        let map = &methods[0];

        assert_eq!(map.name, "main.Box.map");
        assert_eq!(map.simple_name(), "map");
        assert_eq!(map.return_type, DataType::TypeVariable { name: "R".to_string() });
        assert!(map.parameters[0].is_varargs);
        assert_eq!(
            map.parameters[0].data_type,
            DataType::Array { element: Box::new(DataType::TypeVariable { name: "T".to_string() }), dimensions: 1 }
        );
        assert_eq!(map.throws_declarations, vec![DataType::declared("java.io.IOException")]);
        assert_eq!(map.method_type, MethodType::Normal);
    }
}
