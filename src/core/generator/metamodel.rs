// src/core/generator/metamodel.rs
//! In-memory Ecore metamodel

use serde::Serialize;

use crate::core::model::Primitive;

/// Generated metamodel of one project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metamodel {
    pub project_name: String,
    pub root: EPackage,
}

impl Metamodel {
    /// Number of packages, the root included
    pub fn package_count(&self) -> usize {
        self.root.package_count()
    }

    pub fn classifier_count(&self) -> usize {
        self.root.classifier_count()
    }

    /// Look up a classifier by its path below the root
    #[cfg(test)]
    pub fn classifier(&self, path: &ClassifierPath) -> Option<&EClassifier> {
        let mut package = &self.root;
        for segment in &path.packages {
            package = package.subpackages.iter().find(|p| &p.name == segment)?;
        }
        package.classifiers.iter().find(|c| c.name() == path.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EPackage {
    pub name: String,
    pub ns_prefix: String,
    pub ns_uri: String,
    pub classifiers: Vec<EClassifier>,
    pub subpackages: Vec<EPackage>,
}

impl EPackage {
    pub fn new(name: impl Into<String>, ns_prefix: impl Into<String>, ns_uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ns_prefix: ns_prefix.into(),
            ns_uri: ns_uri.into(),
            classifiers: Vec::new(),
            subpackages: Vec::new(),
        }
    }

    fn package_count(&self) -> usize {
        1 + self.subpackages.iter().map(EPackage::package_count).sum::<usize>()
    }

    fn classifier_count(&self) -> usize {
        self.classifiers.len() + self.subpackages.iter().map(EPackage::classifier_count).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EClassifier {
    Class(EClass),
    Enum(EEnum),
    DataType(EDataType),
}

impl EClassifier {
    pub fn name(&self) -> &str {
        match self {
            EClassifier::Class(class) => &class.name,
            EClassifier::Enum(enumeration) => &enumeration.name,
            EClassifier::DataType(data_type) => &data_type.name,
        }
    }
}

/// Class or interface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EClass {
    pub name: String,
    pub is_abstract: bool,
    pub is_interface: bool,
    pub type_parameters: Vec<ETypeParameter>,
    pub super_types: Vec<ClassifierPath>,
    pub attributes: Vec<EStructuralFeature>,
    pub references: Vec<EStructuralFeature>,
    pub operations: Vec<EOperation>,
}

impl EClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_abstract: false,
            is_interface: false,
            type_parameters: Vec::new(),
            super_types: Vec::new(),
            attributes: Vec::new(),
            references: Vec::new(),
            operations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EEnum {
    pub name: String,
    pub literals: Vec<EEnumLiteral>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EEnumLiteral {
    pub name: String,
    pub value: i32,
}

/// Data type standing in for an external Java type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EDataType {
    pub name: String,
    pub instance_class_name: String,
}

/// Attribute or reference, depending on the list that owns it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EStructuralFeature {
    pub name: String,
    pub e_type: ETypeRef,
    pub lower_bound: i32,
    /// -1 for many-valued features
    pub upper_bound: i32,
    pub changeable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EOperation {
    pub name: String,
    /// `None` for void operations
    pub e_type: Option<ETypeRef>,
    pub upper_bound: i32,
    pub type_parameters: Vec<ETypeParameter>,
    pub parameters: Vec<EParameter>,
    pub exceptions: Vec<ETypeRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EParameter {
    pub name: String,
    pub e_type: ETypeRef,
    pub upper_bound: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ETypeParameter {
    pub name: String,
    pub bounds: Vec<ETypeRef>,
}

/// Location of a classifier: package names below the root, then its own name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ClassifierPath {
    pub packages: Vec<String>,
    pub name: String,
}

impl ClassifierPath {
    pub fn new(packages: Vec<String>, name: impl Into<String>) -> Self {
        Self { packages, name: name.into() }
    }

    /// Fragment `//a/b/Name` used for references inside the document
    pub fn fragment(&self) -> String {
        let mut fragment = String::from("/");
        for segment in self.packages.iter().chain(std::iter::once(&self.name)) {
            fragment.push('/');
            fragment.push_str(segment);
        }
        fragment
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum ETypeRef {
    Ecore(EcoreType),
    Classifier(ClassifierPath),
}

/// Data types predefined by the Ecore package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EcoreType {
    EBoolean,
    EByte,
    EChar,
    EShort,
    EInt,
    ELong,
    EFloat,
    EDouble,
    EBooleanObject,
    EByteObject,
    ECharacterObject,
    EShortObject,
    EIntegerObject,
    ELongObject,
    EFloatObject,
    EDoubleObject,
    EString,
    EDate,
    EBigDecimal,
    EBigInteger,
    EJavaObject,
    EJavaClass,
}

impl EcoreType {
    pub fn name(self) -> &'static str {
        match self {
            EcoreType::EBoolean => "EBoolean",
            EcoreType::EByte => "EByte",
            EcoreType::EChar => "EChar",
            EcoreType::EShort => "EShort",
            EcoreType::EInt => "EInt",
            EcoreType::ELong => "ELong",
            EcoreType::EFloat => "EFloat",
            EcoreType::EDouble => "EDouble",
            EcoreType::EBooleanObject => "EBooleanObject",
            EcoreType::EByteObject => "EByteObject",
            EcoreType::ECharacterObject => "ECharacterObject",
            EcoreType::EShortObject => "EShortObject",
            EcoreType::EIntegerObject => "EIntegerObject",
            EcoreType::ELongObject => "ELongObject",
            EcoreType::EFloatObject => "EFloatObject",
            EcoreType::EDoubleObject => "EDoubleObject",
            EcoreType::EString => "EString",
            EcoreType::EDate => "EDate",
            EcoreType::EBigDecimal => "EBigDecimal",
            EcoreType::EBigInteger => "EBigInteger",
            EcoreType::EJavaObject => "EJavaObject",
            EcoreType::EJavaClass => "EJavaClass",
        }
    }

    /// Ecore type of a primitive
    pub fn of_primitive(primitive: Primitive) -> Self {
        match primitive {
            Primitive::Boolean => EcoreType::EBoolean,
            Primitive::Byte => EcoreType::EByte,
            Primitive::Char => EcoreType::EChar,
            Primitive::Short => EcoreType::EShort,
            Primitive::Int => EcoreType::EInt,
            Primitive::Long => EcoreType::ELong,
            Primitive::Float => EcoreType::EFloat,
            Primitive::Double => EcoreType::EDouble,
        }
    }

    /// Object type wrapping a primitive, e.g. `EIntegerObject`
    pub fn of_wrapper(primitive: Primitive) -> Self {
        match primitive {
            Primitive::Boolean => EcoreType::EBooleanObject,
            Primitive::Byte => EcoreType::EByteObject,
            Primitive::Char => EcoreType::ECharacterObject,
            Primitive::Short => EcoreType::EShortObject,
            Primitive::Int => EcoreType::EIntegerObject,
            Primitive::Long => EcoreType::ELongObject,
            Primitive::Float => EcoreType::EFloatObject,
            Primitive::Double => EcoreType::EDoubleObject,
        }
    }

    /// Ecore type of a non-wrapper Java class, for the classes Ecore predefines
    pub fn of_class(full_name: &str) -> Option<Self> {
        let ecore_type = match full_name {
            "java.lang.String" => EcoreType::EString,
            "java.lang.Object" => EcoreType::EJavaObject,
            "java.lang.Class" => EcoreType::EJavaClass,
            "java.util.Date" => EcoreType::EDate,
            "java.math.BigDecimal" => EcoreType::EBigDecimal,
            "java.math.BigInteger" => EcoreType::EBigInteger,
            _ => return None,
        };
        Some(ecore_type)
    }
}
