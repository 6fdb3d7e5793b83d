// src/core/generator/builder.rs
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::debug;

use super::metamodel::{
    ClassifierPath, EClass, EClassifier, EDataType, EEnum, EEnumLiteral, EOperation, EPackage, EParameter,
    EStructuralFeature, ETypeParameter, ETypeRef, EcoreType, Metamodel,
};
use super::naming::{NameScope, NameSanitizer};
use crate::config::MetamodelConfig;
use crate::core::model::{
    DataType, ExtractedMethod, ExtractedPackage, ExtractedType, ExtractedTypeParameter, IntermediateModel,
    MethodType, TypeArgument, TypeInfo, WildcardBound,
};
use crate::error::Result;

/// Single-valued collection types mapped to many-valued features
const COLLECTIONS: &[&str] = &[
    "java.lang.Iterable",
    "java.util.ArrayDeque",
    "java.util.ArrayList",
    "java.util.Collection",
    "java.util.Deque",
    "java.util.HashSet",
    "java.util.LinkedHashSet",
    "java.util.LinkedList",
    "java.util.List",
    "java.util.Queue",
    "java.util.Set",
    "java.util.SortedSet",
    "java.util.TreeSet",
];

const MAX_ERASURE_DEPTH: usize = 8;

/// How a data type is represented by a feature
#[derive(Debug, Clone)]
struct MappedType {
    e_type: ETypeRef,
    upper_bound: i32,
    is_reference: bool,
}

impl MappedType {
    fn attribute(e_type: ETypeRef) -> Self {
        Self { e_type, upper_bound: 1, is_reference: false }
    }

    fn ecore(ecore_type: EcoreType) -> Self {
        Self::attribute(ETypeRef::Ecore(ecore_type))
    }

    fn many(self) -> Self {
        Self { upper_bound: -1, ..self }
    }
}

/// Kind of classifier created for an external Java type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Placeholder {
    DataType,
    Class,
    Interface,
}

/// Builds one metamodel from one intermediate model.
///
/// Classifier names are assigned for the whole model before any feature is
/// built, so features can reference types regardless of declaration order.
pub(super) struct EcoreBuilder<'m> {
    model: &'m IntermediateModel,
    config: &'m MetamodelConfig,
    names: &'m NameSanitizer,
    type_paths: HashMap<String, ClassifierPath>,
    package_names: HashMap<String, String>,
    root_names: NameScope,
    /// External types by kind and Java name
    placeholders: IndexMap<(Placeholder, String), ClassifierPath>,
    placeholder_classifiers: Vec<EClassifier>,
}

impl<'m> EcoreBuilder<'m> {
    pub fn new(model: &'m IntermediateModel, config: &'m MetamodelConfig, names: &'m NameSanitizer) -> Self {
        Self {
            model,
            config,
            names,
            type_paths: HashMap::new(),
            package_names: HashMap::new(),
            root_names: NameScope::default(),
            placeholders: IndexMap::new(),
            placeholder_classifiers: Vec::new(),
        }
    }

    pub fn build(mut self) -> Result<Metamodel> {
        let model = self.model;
        let root = model.ensure_generatable()?;

        let mut root_names = NameScope::default();
        self.assign_names(root, Vec::new(), &mut root_names);
        self.root_names = root_names;

        let root_package = EPackage::new(
            self.config.default_package_name.clone(),
            self.config.root_namespace_prefix(),
            format!("{}/", model.project_name()),
        );
        let mut root_package = self.build_package(root, root_package);

        debug!("Created {} placeholder classifiers for external types", self.placeholder_classifiers.len());
        root_package.classifiers.append(&mut self.placeholder_classifiers);

        Ok(Metamodel {
            project_name: model.project_name().to_string(),
            root: root_package,
        })
    }

    /// First pass: unique Ecore names for every package and type
    fn assign_names(&mut self, package: &ExtractedPackage, segments: Vec<String>, classifier_names: &mut NameScope) {
        let model = self.model;
        for extracted_type in model.types_of(package) {
            let name = classifier_names.claim(self.names.sanitize(extracted_type.name()));
            self.type_paths
                .insert(extracted_type.full_name().to_string(), ClassifierPath::new(segments.clone(), name));
        }

        let mut package_names = NameScope::default();
        for subpackage in model.subpackages_of(package) {
            let name = package_names.claim(self.names.sanitize(subpackage.simple_name()));
            self.package_names.insert(subpackage.name.clone(), name.clone());
            let mut child_segments = segments.clone();
            child_segments.push(name);
            self.assign_names(subpackage, child_segments, &mut NameScope::default());
        }
    }

    /// Second pass: classifiers and subpackages, mirroring the package tree
    fn build_package(&mut self, package: &ExtractedPackage, mut epackage: EPackage) -> EPackage {
        let model = self.model;
        for extracted_type in model.types_of(package) {
            let classifier = self.build_classifier(extracted_type);
            epackage.classifiers.push(classifier);
        }

        for subpackage in model.subpackages_of(package) {
            let name = self
                .package_names
                .get(&subpackage.name)
                .cloned()
                .unwrap_or_else(|| self.names.sanitize(subpackage.simple_name()));
            let ns_uri = format!("{}{}/", epackage.ns_uri, name);
            let child = EPackage::new(name.clone(), name, ns_uri);
            let child = self.build_package(subpackage, child);
            epackage.subpackages.push(child);
        }
        epackage
    }

    fn classifier_name(&self, extracted_type: &ExtractedType) -> String {
        self.type_paths
            .get(extracted_type.full_name())
            .map(|path| path.name.clone())
            .unwrap_or_else(|| self.names.sanitize(extracted_type.name()))
    }

    fn build_classifier(&mut self, extracted_type: &ExtractedType) -> EClassifier {
        let name = self.classifier_name(extracted_type);
        match extracted_type {
            ExtractedType::Class { info, is_abstract, super_class } => {
                let mut eclass = EClass::new(name);
                eclass.is_abstract = *is_abstract;
                if let Some(super_class) = super_class.as_deref().filter(|s| *s != "java.lang.Object") {
                    let super_type = self.super_type(super_class, Placeholder::Class);
                    eclass.super_types.push(super_type);
                }
                self.fill_class(&mut eclass, info);
                EClassifier::Class(eclass)
            }
            ExtractedType::Interface { info } => {
                let mut eclass = EClass::new(name);
                eclass.is_abstract = true;
                eclass.is_interface = true;
                self.fill_class(&mut eclass, info);
                EClassifier::Class(eclass)
            }
            ExtractedType::Enum { info, enumerals } => {
                if !info.fields.is_empty() || !info.methods.is_empty() {
                    debug!("Enum {} is represented by its literals only", info.full_name);
                }
                let mut literal_names = NameScope::default();
                let literals = enumerals
                    .iter()
                    .enumerate()
                    .map(|(ordinal, literal)| EEnumLiteral {
                        name: literal_names.claim(self.names.sanitize(literal)),
                        value: ordinal as i32,
                    })
                    .collect();
                EClassifier::Enum(EEnum { name, literals })
            }
        }
    }

    fn fill_class(&mut self, eclass: &mut EClass, info: &TypeInfo) {
        let class_scope: &[ExtractedTypeParameter] = &info.type_parameters;
        eclass.type_parameters = self.type_parameters(class_scope, &[class_scope]);

        for interface in &info.interfaces {
            let super_type = self.super_type(interface, Placeholder::Interface);
            eclass.super_types.push(super_type);
        }

        let config = self.config;
        let mut feature_names = NameScope::default();
        for field in info.fields.iter().filter(|f| !f.is_static || config.extract_static_members) {
            let mapped = self.map_type(&field.data_type, &[class_scope]);
            let feature = EStructuralFeature {
                name: feature_names.claim(self.names.sanitize(&field.name)),
                e_type: mapped.e_type,
                lower_bound: 0,
                upper_bound: mapped.upper_bound,
                changeable: !field.is_final,
            };
            if mapped.is_reference {
                eclass.references.push(feature);
            } else {
                eclass.attributes.push(feature);
            }
        }

        for method in info.methods.iter().filter(|m| emits_operation(config, m)) {
            let operation = self.build_operation(method, class_scope);
            eclass.operations.push(operation);
        }
    }

    fn build_operation(&mut self, method: &ExtractedMethod, class_scope: &[ExtractedTypeParameter]) -> EOperation {
        let scopes: [&[ExtractedTypeParameter]; 2] = [&method.type_parameters, class_scope];

        let (e_type, upper_bound) = if method.return_type.is_void() {
            (None, 1)
        } else {
            let mapped = self.map_type(&method.return_type, &scopes);
            (Some(mapped.e_type), mapped.upper_bound)
        };

        let mut parameter_names = NameScope::default();
        let parameters = method
            .parameters
            .iter()
            .map(|parameter| {
                let mapped = self.map_type(&parameter.data_type, &scopes);
                EParameter {
                    name: parameter_names.claim(self.names.sanitize(&parameter.name)),
                    e_type: mapped.e_type,
                    upper_bound: mapped.upper_bound,
                }
            })
            .collect();

        let exceptions = method
            .throws_declarations
            .iter()
            .map(|exception| self.map_single(exception, &scopes, 0).e_type)
            .collect();

        EOperation {
            name: self.names.sanitize(method.simple_name()),
            e_type,
            upper_bound,
            type_parameters: self.type_parameters(&method.type_parameters, &scopes),
            parameters,
            exceptions,
        }
    }

    fn type_parameters(
        &mut self,
        parameters: &[ExtractedTypeParameter],
        scopes: &[&[ExtractedTypeParameter]],
    ) -> Vec<ETypeParameter> {
        parameters
            .iter()
            .map(|parameter| ETypeParameter {
                name: self.names.sanitize(&parameter.name),
                bounds: parameter
                    .bounds
                    .iter()
                    .map(|bound| self.map_single(bound, scopes, 0).e_type)
                    .collect(),
            })
            .collect()
    }

    /// Supertype edge to a model type, or to an abstract placeholder class or interface
    fn super_type(&mut self, name: &str, kind: Placeholder) -> ClassifierPath {
        match self.type_paths.get(name) {
            Some(path) => path.clone(),
            None => self.placeholder(name, kind),
        }
    }

    fn map_type(&mut self, data_type: &DataType, scopes: &[&[ExtractedTypeParameter]]) -> MappedType {
        match data_type {
            DataType::Array { element, dimensions: 1 } => self.map_single(element, scopes, 0).many(),
            DataType::Declared(declared) if declared.arguments.len() == 1 && COLLECTIONS.contains(&declared.name.as_str()) => {
                match &declared.arguments[0] {
                    TypeArgument::Type { data_type } => self.map_single(data_type, scopes, 0).many(),
                    TypeArgument::Wildcard { bound: Some(WildcardBound::Extends(bound)) } => {
                        self.map_single(bound, scopes, 0).many()
                    }
                    TypeArgument::Wildcard { .. } => MappedType::ecore(EcoreType::EJavaObject).many(),
                }
            }
            other => self.map_single(other, scopes, 0),
        }
    }

    fn map_single(&mut self, data_type: &DataType, scopes: &[&[ExtractedTypeParameter]], depth: usize) -> MappedType {
        match data_type {
            DataType::Primitive { primitive } => MappedType::ecore(EcoreType::of_primitive(*primitive)),
            DataType::Declared(declared) => {
                let model = self.model;
                if let Some(extracted_type) = model.get_type(&declared.name) {
                    let path = self.type_paths.get(&declared.name).cloned().unwrap_or_else(|| {
                        ClassifierPath::new(Vec::new(), self.names.sanitize(extracted_type.name()))
                    });
                    return MappedType {
                        e_type: ETypeRef::Classifier(path),
                        upper_bound: 1,
                        // attributes must be typed by data types, which enums are
                        is_reference: !matches!(extracted_type, ExtractedType::Enum { .. }),
                    };
                }
                if let Some(primitive) = data_type.unboxed() {
                    return MappedType::ecore(EcoreType::of_wrapper(primitive));
                }
                match EcoreType::of_class(&declared.name) {
                    Some(ecore_type) => MappedType::ecore(ecore_type),
                    None => MappedType::attribute(ETypeRef::Classifier(self.placeholder(&declared.name, Placeholder::DataType))),
                }
            }
            DataType::Opaque(declared) => {
                MappedType::attribute(ETypeRef::Classifier(self.placeholder(&declared.name, Placeholder::DataType)))
            }
            DataType::TypeVariable { name } => {
                let bound = scopes
                    .iter()
                    .find_map(|scope| scope.iter().find(|p| &p.name == name))
                    .and_then(|parameter| parameter.bounds.first());
                match bound {
                    Some(bound) if depth < MAX_ERASURE_DEPTH => self.map_single(bound, scopes, depth + 1),
                    _ => MappedType::ecore(EcoreType::EJavaObject),
                }
            }
            DataType::Void | DataType::Array { .. } => MappedType::ecore(EcoreType::EJavaObject),
        }
    }

    /// Classifier in the root package standing in for an external Java type
    fn placeholder(&mut self, java_name: &str, kind: Placeholder) -> ClassifierPath {
        let key = (kind, java_name.to_string());
        if let Some(path) = self.placeholders.get(&key) {
            return path.clone();
        }

        let simple_name = java_name.rsplit('.').next().unwrap_or(java_name);
        let name = self.root_names.claim(self.names.sanitize(simple_name));
        let classifier = match kind {
            Placeholder::Class | Placeholder::Interface => {
                let mut eclass = EClass::new(name.clone());
                eclass.is_abstract = true;
                eclass.is_interface = kind == Placeholder::Interface;
                EClassifier::Class(eclass)
            }
            Placeholder::DataType => EClassifier::DataType(EDataType {
                name: name.clone(),
                instance_class_name: java_name.to_string(),
            }),
        };
        debug!("Placeholder {} for external type {}", name, java_name);

        let path = ClassifierPath::new(Vec::new(), name);
        self.placeholder_classifiers.push(classifier);
        self.placeholders.insert(key, path.clone());
        path
    }
}

fn emits_operation(config: &MetamodelConfig, method: &ExtractedMethod) -> bool {
    let by_role = match method.method_type {
        MethodType::Constructor => config.extract_constructors,
        role if role.is_access_method() => config.extract_access_methods,
        _ => true,
    };
    by_role && (!method.is_static || config.extract_static_members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{
        AccessLevelModifier, DeclaredType, ExtractedField, ExtractedPackage, ExtractedVariable, ModelBuilder, Primitive,
    };

    fn field(name: &str, data_type: DataType) -> ExtractedField {
        ExtractedField {
            name: name.to_string(),
            owner: "shop.Order".to_string(),
            data_type,
            is_final: false,
            is_static: false,
            modifier: AccessLevelModifier::Private,
        }
    }

    fn method(name: &str, method_type: MethodType) -> ExtractedMethod {
        ExtractedMethod {
            name: format!("shop.Order.{}", name),
            return_type: DataType::Void,
            parameters: vec![ExtractedVariable {
                name: "items".to_string(),
                data_type: DataType::Array { element: Box::new(DataType::declared("shop.Item")), dimensions: 1 },
                is_varargs: true,
            }],
            throws_declarations: vec![DataType::declared("java.io.IOException")],
            type_parameters: vec![],
            is_abstract: false,
            is_static: false,
            method_type,
            modifier: AccessLevelModifier::Public,
        }
    }

    fn shop_model() -> IntermediateModel {
        let mut builder = ModelBuilder::new("Shop");
        builder.add_package(ExtractedPackage::root()).unwrap();
        builder.add_package(ExtractedPackage::new("shop")).unwrap();

        let mut order = TypeInfo::new("shop.Order", AccessLevelModifier::Public);
        order.type_parameters = vec![ExtractedTypeParameter {
            name: "T".to_string(),
            bounds: vec![DataType::declared("shop.Item")],
        }];
        order.interfaces = vec!["java.io.Serializable".to_string()];
        let mut id = field("id", DataType::primitive(Primitive::Long));
        id.is_final = true;
        let mut counter = field("counter", DataType::primitive(Primitive::Int));
        counter.is_static = true;
        order.fields = vec![
            id,
            counter,
            field("customer", DataType::opaque("Customer")),
            field("status", DataType::declared("shop.Status")),
            field("first", DataType::declared("shop.Item")),
            field(
                "items",
                DataType::Declared(DeclaredType {
                    name: "java.util.List".to_string(),
                    arguments: vec![TypeArgument::Type { data_type: DataType::declared("shop.Item") }],
                }),
            ),
            field("notes", DataType::Array { element: Box::new(DataType::declared("java.lang.String")), dimensions: 1 }),
            field("current", DataType::TypeVariable { name: "T".to_string() }),
            field("created", DataType::declared("java.time.Instant")),
        ];
        order.methods = vec![
            method("Order", MethodType::Constructor),
            method("getId", MethodType::Accessor),
            method("addAll", MethodType::Normal),
        ];

        builder.add_type(ExtractedType::class(order, false, Some("shop.Base".to_string()))).unwrap();
        builder
            .add_type(ExtractedType::class(TypeInfo::new("shop.Item", AccessLevelModifier::Public), false, None))
            .unwrap();
        builder
            .add_type(ExtractedType::enumeration(
                TypeInfo::new("shop.Status", AccessLevelModifier::Public),
                vec!["OPEN".to_string(), "PAID".to_string()],
            ))
            .unwrap();
        builder.freeze()
    }

    fn build(model: &IntermediateModel, config: &MetamodelConfig) -> Metamodel {
        let names = NameSanitizer::new().unwrap();
        EcoreBuilder::new(model, config, &names).build().unwrap()
    }

    fn order(metamodel: &Metamodel) -> &EClass {
        let path = ClassifierPath::new(vec!["shop".to_string()], "Order");
        match metamodel.classifier(&path) {
            Some(EClassifier::Class(class)) => class,
            other => panic!("expected Order class, found {:?}", other),
        }
    }

    fn item() -> ETypeRef {
        ETypeRef::Classifier(ClassifierPath::new(vec!["shop".to_string()], "Item"))
    }

    #[test]
    fn test_attributes_and_references() {
        let model = shop_model();
        let metamodel = build(&model, &MetamodelConfig::default());
        let order = order(&metamodel);

        let attributes: Vec<(&str, &ETypeRef, i32)> =
            order.attributes.iter().map(|a| (a.name.as_str(), &a.e_type, a.upper_bound)).collect();
        let status = ETypeRef::Classifier(ClassifierPath::new(vec!["shop".to_string()], "Status"));
        let customer = ETypeRef::Classifier(ClassifierPath::new(vec![], "Customer"));
        let instant = ETypeRef::Classifier(ClassifierPath::new(vec![], "Instant"));
        assert_eq!(
            attributes,
            vec![
                ("id", &ETypeRef::Ecore(EcoreType::ELong), 1),
                ("customer", &customer, 1),
                ("status", &status, 1),
                ("notes", &ETypeRef::Ecore(EcoreType::EString), -1),
                ("created", &instant, 1),
            ]
        );
        assert!(!order.attributes[0].changeable);

        let references: Vec<(&str, &ETypeRef, i32)> =
            order.references.iter().map(|r| (r.name.as_str(), &r.e_type, r.upper_bound)).collect();
        let item = item();
        assert_eq!(references, vec![("first", &item, 1), ("items", &item, -1), ("current", &item, 1)]);
    }

    #[test]
    fn test_wrapper_classes_map_to_object_types() {
        let mut builder = ModelBuilder::new("Shop");
        builder.add_package(ExtractedPackage::root()).unwrap();
        builder.add_package(ExtractedPackage::new("shop")).unwrap();
        let mut info = TypeInfo::new("shop.Order", AccessLevelModifier::Public);
        info.fields = vec![
            field("quantity", DataType::declared("java.lang.Integer")),
            field("flags", DataType::Array { element: Box::new(DataType::declared("java.lang.Boolean")), dimensions: 1 }),
            field("label", DataType::opaque("Integer")),
        ];
        builder.add_type(ExtractedType::class(info, false, None)).unwrap();
        let model = builder.freeze();

        let metamodel = build(&model, &MetamodelConfig::default());
        let attributes: Vec<(&ETypeRef, i32)> =
            order(&metamodel).attributes.iter().map(|a| (&a.e_type, a.upper_bound)).collect();

        assert_eq!(
            attributes,
            vec![
                (&ETypeRef::Ecore(EcoreType::EIntegerObject), 1),
                (&ETypeRef::Ecore(EcoreType::EBooleanObject), -1),
                // unresolved names are never taken for wrappers
                (&ETypeRef::Classifier(ClassifierPath::new(vec![], "Integer")), 1),
            ]
        );
    }

    #[test]
    fn test_external_types_become_root_placeholders() {
        let model = shop_model();
        let metamodel = build(&model, &MetamodelConfig::default());

        let root_names: Vec<&str> = metamodel.root.classifiers.iter().map(|c| c.name()).collect();
        assert_eq!(root_names, vec!["Base", "Serializable", "Customer", "Instant", "IOException"]);
        assert!(matches!(
            &metamodel.root.classifiers[0],
            EClassifier::Class(class) if class.is_abstract && !class.is_interface
        ));
        assert!(matches!(
            &metamodel.root.classifiers[1],
            EClassifier::Class(class) if class.is_abstract && class.is_interface
        ));
        assert!(matches!(
            &metamodel.root.classifiers[3],
            EClassifier::DataType(data_type) if data_type.instance_class_name == "java.time.Instant"
        ));

        let order = order(&metamodel);
        assert_eq!(
            order.super_types,
            vec![ClassifierPath::new(vec![], "Base"), ClassifierPath::new(vec![], "Serializable")]
        );
        assert_eq!(order.type_parameters[0].bounds, vec![item()]);
    }

    #[test]
    fn test_operations_respect_configuration() {
        let model = shop_model();
        let metamodel = build(&model, &MetamodelConfig::default());
        let operations: Vec<&str> = order(&metamodel).operations.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(operations, vec!["addAll"]);

        let add_all = &order(&metamodel).operations[0];
        assert_eq!(add_all.e_type, None);
        assert_eq!(add_all.parameters[0].e_type, item());
        assert_eq!(add_all.parameters[0].upper_bound, -1);

        let config = MetamodelConfig {
            extract_access_methods: true,
            extract_constructors: true,
            extract_static_members: true,
            ..MetamodelConfig::default()
        };
        let metamodel = build(&model, &config);
        let order = order(&metamodel);
        let operations: Vec<&str> = order.operations.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(operations, vec!["Order", "getId", "addAll"]);
        assert!(order.attributes.iter().any(|a| a.name == "counter"));
    }

    #[test]
    fn test_enum_literals_carry_ordinals() {
        let model = shop_model();
        let metamodel = build(&model, &MetamodelConfig::default());
        let path = ClassifierPath::new(vec!["shop".to_string()], "Status");
        let Some(EClassifier::Enum(status)) = metamodel.classifier(&path) else {
            panic!("Status should be an enum");
        };
        let literals: Vec<(&str, i32)> = status.literals.iter().map(|l| (l.name.as_str(), l.value)).collect();
        assert_eq!(literals, vec![("OPEN", 0), ("PAID", 1)]);
    }

    #[test]
    fn test_colliding_names_get_suffixes() {
        let mut builder = ModelBuilder::new("Clash");
        builder.add_package(ExtractedPackage::root()).unwrap();
        builder.add_package(ExtractedPackage::new("app")).unwrap();
        let mut info = TypeInfo::new("app.Holder", AccessLevelModifier::Public);
        info.fields = vec![field("value", DataType::opaque("Holder")), field("value", DataType::opaque("Value"))];
        builder.add_type(ExtractedType::class(info, false, None)).unwrap();
        builder
            .add_type(ExtractedType::class(TypeInfo::new("Holder", AccessLevelModifier::Package), false, None))
            .unwrap();
        let model = builder.freeze();

        let metamodel = build(&model, &MetamodelConfig::default());

        let root_names: Vec<&str> = metamodel.root.classifiers.iter().map(|c| c.name()).collect();
        assert_eq!(root_names, vec!["Holder", "Holder2", "Value"]);
        let path = ClassifierPath::new(vec!["app".to_string()], "Holder");
        let Some(EClassifier::Class(holder)) = metamodel.classifier(&path) else {
            panic!("app.Holder should be a class");
        };
        let features: Vec<&str> = holder.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(features, vec!["value", "value2"]);
    }
}
