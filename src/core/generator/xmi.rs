// src/core/generator/xmi.rs
//! Ecore XMI serialization

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};

use super::metamodel::{
    EClass, EClassifier, EOperation, EPackage, EStructuralFeature, ETypeParameter, ETypeRef, Metamodel,
};
use crate::error::{EmeError, Result};

mod namespace {
    pub const XMI: &str = "http://www.omg.org/XMI";
    pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
    pub const ECORE: &str = "http://www.eclipse.org/emf/2002/Ecore";
}

/// Serialize a metamodel as an `.ecore` document
pub fn write_ecore(metamodel: &Metamodel) -> Result<String> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = EcoreWriter {
            writer: Writer::new_with_indent(&mut buffer, b' ', 2),
        };
        writer.declaration()?;

        let mut root = BytesStart::new("ecore:EPackage");
        root.push_attribute(("xmi:version", "2.0"));
        root.push_attribute(("xmlns:xmi", namespace::XMI));
        root.push_attribute(("xmlns:xsi", namespace::XSI));
        root.push_attribute(("xmlns:ecore", namespace::ECORE));
        writer.package("ecore:EPackage", root, &metamodel.root)?;
    }

    String::from_utf8(buffer.into_inner()).map_err(|e| EmeError::xml(format!("Invalid UTF-8: {e}")))
}

fn write_error(e: impl std::fmt::Display) -> EmeError {
    EmeError::xml(format!("Write error: {e}"))
}

/// `eType` style reference to a classifier
fn type_reference(e_type: &ETypeRef) -> String {
    match e_type {
        ETypeRef::Ecore(ecore_type) => format!("ecore:EDataType {}#//{}", namespace::ECORE, ecore_type.name()),
        ETypeRef::Classifier(path) => format!("#{}", path.fragment()),
    }
}

struct EcoreWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> EcoreWriter<W> {
    fn declaration(&mut self) -> Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_error)
    }

    fn open(&mut self, start: BytesStart<'_>) -> Result<()> {
        self.writer.write_event(Event::Start(start)).map_err(write_error)
    }

    fn close(&mut self, tag: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(tag))).map_err(write_error)
    }

    fn empty(&mut self, start: BytesStart<'_>) -> Result<()> {
        self.writer.write_event(Event::Empty(start)).map_err(write_error)
    }

    fn package(&mut self, tag: &str, mut start: BytesStart<'_>, package: &EPackage) -> Result<()> {
        start.push_attribute(("name", package.name.as_str()));
        start.push_attribute(("nsURI", package.ns_uri.as_str()));
        start.push_attribute(("nsPrefix", package.ns_prefix.as_str()));

        if package.classifiers.is_empty() && package.subpackages.is_empty() {
            return self.empty(start);
        }

        self.open(start)?;
        for classifier in &package.classifiers {
            self.classifier(classifier)?;
        }
        for subpackage in &package.subpackages {
            self.package("eSubpackages", BytesStart::new("eSubpackages"), subpackage)?;
        }
        self.close(tag)
    }

    fn classifier(&mut self, classifier: &EClassifier) -> Result<()> {
        let mut start = BytesStart::new("eClassifiers");
        match classifier {
            EClassifier::Class(class) => self.class(start, class),
            EClassifier::Enum(enumeration) => {
                start.push_attribute(("xsi:type", "ecore:EEnum"));
                start.push_attribute(("name", enumeration.name.as_str()));
                if enumeration.literals.is_empty() {
                    return self.empty(start);
                }
                self.open(start)?;
                for literal in &enumeration.literals {
                    let mut literal_start = BytesStart::new("eLiterals");
                    literal_start.push_attribute(("name", literal.name.as_str()));
                    if literal.value != 0 {
                        literal_start.push_attribute(("value", literal.value.to_string().as_str()));
                    }
                    self.empty(literal_start)?;
                }
                self.close("eClassifiers")
            }
            EClassifier::DataType(data_type) => {
                start.push_attribute(("xsi:type", "ecore:EDataType"));
                start.push_attribute(("name", data_type.name.as_str()));
                start.push_attribute(("instanceClassName", data_type.instance_class_name.as_str()));
                self.empty(start)
            }
        }
    }

    fn class(&mut self, mut start: BytesStart<'_>, class: &EClass) -> Result<()> {
        start.push_attribute(("xsi:type", "ecore:EClass"));
        start.push_attribute(("name", class.name.as_str()));
        if class.is_abstract {
            start.push_attribute(("abstract", "true"));
        }
        if class.is_interface {
            start.push_attribute(("interface", "true"));
        }
        if !class.super_types.is_empty() {
            let super_types: Vec<String> = class.super_types.iter().map(|p| format!("#{}", p.fragment())).collect();
            start.push_attribute(("eSuperTypes", super_types.join(" ").as_str()));
        }

        let has_content = !class.type_parameters.is_empty()
            || !class.operations.is_empty()
            || !class.attributes.is_empty()
            || !class.references.is_empty();
        if !has_content {
            return self.empty(start);
        }

        self.open(start)?;
        self.type_parameters(&class.type_parameters)?;
        for operation in &class.operations {
            self.operation(operation)?;
        }
        for attribute in &class.attributes {
            self.feature("ecore:EAttribute", attribute)?;
        }
        for reference in &class.references {
            self.feature("ecore:EReference", reference)?;
        }
        self.close("eClassifiers")
    }

    fn type_parameters(&mut self, parameters: &[ETypeParameter]) -> Result<()> {
        for parameter in parameters {
            let mut start = BytesStart::new("eTypeParameters");
            start.push_attribute(("name", parameter.name.as_str()));
            if parameter.bounds.is_empty() {
                self.empty(start)?;
                continue;
            }
            self.open(start)?;
            for bound in &parameter.bounds {
                let mut bound_start = BytesStart::new("eBounds");
                bound_start.push_attribute(("eClassifier", type_reference(bound).as_str()));
                self.empty(bound_start)?;
            }
            self.close("eTypeParameters")?;
        }
        Ok(())
    }

    fn operation(&mut self, operation: &EOperation) -> Result<()> {
        let mut start = BytesStart::new("eOperations");
        start.push_attribute(("name", operation.name.as_str()));
        if let Some(e_type) = &operation.e_type {
            start.push_attribute(("eType", type_reference(e_type).as_str()));
            if operation.upper_bound != 1 {
                start.push_attribute(("upperBound", operation.upper_bound.to_string().as_str()));
            }
        }
        if !operation.exceptions.is_empty() {
            let exceptions: Vec<String> = operation.exceptions.iter().map(type_reference).collect();
            start.push_attribute(("eExceptions", exceptions.join(" ").as_str()));
        }

        if operation.type_parameters.is_empty() && operation.parameters.is_empty() {
            return self.empty(start);
        }

        self.open(start)?;
        self.type_parameters(&operation.type_parameters)?;
        for parameter in &operation.parameters {
            let mut parameter_start = BytesStart::new("eParameters");
            parameter_start.push_attribute(("name", parameter.name.as_str()));
            if parameter.upper_bound != 1 {
                parameter_start.push_attribute(("upperBound", parameter.upper_bound.to_string().as_str()));
            }
            parameter_start.push_attribute(("eType", type_reference(&parameter.e_type).as_str()));
            self.empty(parameter_start)?;
        }
        self.close("eOperations")
    }

    fn feature(&mut self, xsi_type: &str, feature: &EStructuralFeature) -> Result<()> {
        let mut start = BytesStart::new("eStructuralFeatures");
        start.push_attribute(("xsi:type", xsi_type));
        start.push_attribute(("name", feature.name.as_str()));
        if !feature.changeable {
            start.push_attribute(("changeable", "false"));
        }
        if feature.lower_bound != 0 {
            start.push_attribute(("lowerBound", feature.lower_bound.to_string().as_str()));
        }
        if feature.upper_bound != 1 {
            start.push_attribute(("upperBound", feature.upper_bound.to_string().as_str()));
        }
        start.push_attribute(("eType", type_reference(&feature.e_type).as_str()));
        self.empty(start)
    }
}
