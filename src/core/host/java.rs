// src/core/host/java.rs
use std::path::{Path, PathBuf};
use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use tracing::{debug, warn};
use tree_sitter::{Node, Parser};

use crate::config::ParsingConfig;
use crate::core::model::AccessLevelModifier;
use crate::error::{EmeError, Result};
use super::{
    join_signature_tokens, CompilationUnit, FieldDeclaration, ImportDeclaration, MethodDeclaration,
    ParameterDeclaration, SymbolHost, TypeDeclaration, TypeKind,
};

/// Node kinds that denote a type in the Java grammar
const TYPE_KINDS: &[&str] = &[
    "type_identifier",
    "scoped_type_identifier",
    "generic_type",
    "array_type",
    "integral_type",
    "floating_point_type",
    "boolean_type",
    "void_type",
    "annotated_type",
];

/// Symbol host that reads a Java project from disk using Tree-sitter
pub struct JavaSourceHost {
    root: PathBuf,
    parser: Parser,
    config: ParsingConfig,
    ignore_patterns: Vec<String>,
}

impl JavaSourceHost {
    pub fn new(root: impl Into<PathBuf>, config: &ParsingConfig, ignore_patterns: &[String]) -> Result<Self> {
        let mut parser = Parser::new();
        let java_language = tree_sitter_java::language();
        parser.set_language(&java_language)
            .map_err(|e| EmeError::host(format!("Failed to set Java language: {}", e)))?;

        Ok(Self {
            root: root.into(),
            parser,
            config: config.clone(),
            ignore_patterns: ignore_patterns.to_vec(),
        })
    }

    /// Parse Java source text into a compilation unit
    pub fn parse_source(&mut self, content: &str, path: &Path) -> Result<CompilationUnit> {
        let tree = self.parser.parse(content, None)
            .ok_or_else(|| EmeError::host(format!("Failed to parse {}", path.display())))?;

        let root_node = tree.root_node();
        if root_node.has_error() {
            warn!("Syntax errors in {}, extracting what could be recognized", path.display());
        }

        let collector = DeclarationCollector::new(content, package_of(root_node, content));
        let mut imports = Vec::new();
        let mut types = Vec::new();

        let mut cursor = root_node.walk();
        for child in root_node.children(&mut cursor) {
            match child.kind() {
                "import_declaration" => imports.push(collector.import(child)),
                "class_declaration" | "interface_declaration" | "enum_declaration" => {
                    collector.collect_type(child, None, false, &mut types);
                }
                _ => {}
            }
        }

        Ok(CompilationUnit {
            path: path.to_path_buf(),
            package: collector.package,
            imports,
            types,
        })
    }

    fn should_parse_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.config.file_extensions.iter().any(|e| e == ext))
            .unwrap_or(false)
    }
}

impl SymbolHost for JavaSourceHost {
    fn compilation_units(&mut self) -> Result<Vec<PathBuf>> {
        let mut overrides = OverrideBuilder::new(&self.root);
        for pattern in &self.ignore_patterns {
            overrides.add(&format!("!{}", pattern))
                .map_err(|e| EmeError::Config(format!("Invalid ignore pattern {:?}: {}", pattern, e)))?;
        }
        let overrides = overrides.build()
            .map_err(|e| EmeError::Config(e.to_string()))?;

        // Use ignore crate to respect .gitignore and custom patterns
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .overrides(overrides)
            .build();

        let mut units = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| EmeError::FileSystem(e.to_string()))?;
            let path = entry.path();
            if path.is_file() && self.should_parse_file(path) {
                units.push(path.to_path_buf());
            }
        }
        units.sort();

        debug!("Found {} compilation units in {}", units.len(), self.root.display());
        Ok(units)
    }

    fn type_declarations(&mut self, unit: &Path) -> Result<CompilationUnit> {
        let content = std::fs::read_to_string(unit)
            .map_err(|e| EmeError::host(format!("Failed to read {}: {}", unit.display(), e)))?;

        if content.len() > self.config.max_file_size {
            return Err(EmeError::host(
                format!("File {} exceeds maximum size limit", unit.display())
            ));
        }

        self.parse_source(&content, unit)
    }
}

/// Dotted package name of a compilation unit
fn package_of(root_node: Node, source: &str) -> String {
    let mut cursor = root_node.walk();
    let package_node = root_node
        .children(&mut cursor)
        .find(|c| c.kind() == "package_declaration");

    package_node
        .and_then(|node| {
            let mut cursor = node.walk();
            let name = node.named_children(&mut cursor)
                .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"));
            name
        })
        .map(|name| source[name.byte_range()].chars().filter(|c| !c.is_whitespace()).collect())
        .unwrap_or_default()
}

/// Turns the syntax tree of one file into host declarations
struct DeclarationCollector<'a> {
    source: &'a str,
    package: String,
}

impl<'a> DeclarationCollector<'a> {
    fn new(source: &'a str, package: String) -> Self {
        Self { source, package }
    }

    fn import(&self, node: Node) -> ImportDeclaration {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        let name = children
            .iter()
            .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))
            .map(|n| self.signature_of(*n))
            .unwrap_or_default();

        ImportDeclaration {
            name,
            on_demand: children.iter().any(|c| c.kind() == "asterisk"),
            is_static: children.iter().any(|c| c.kind() == "static"),
        }
    }

    /// Collect a type declaration and, after it, its nested types
    fn collect_type(&self, node: Node, outer: Option<&str>, in_interface: bool, types: &mut Vec<TypeDeclaration>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.node_text(name_node);
        let full_name = match outer {
            Some(outer) => format!("{}${}", outer, name),
            None if self.package.is_empty() => name,
            None => format!("{}.{}", self.package, name),
        };

        let kind = match node.kind() {
            "interface_declaration" => TypeKind::Interface,
            "enum_declaration" => TypeKind::Enum,
            _ => TypeKind::Class,
        };
        let modifiers = self.modifiers(node);
        let has = |keyword: &str| modifiers.iter().any(|m| m == keyword);

        let super_class = node
            .child_by_field_name("superclass")
            .and_then(|superclass| first_type_child(superclass))
            .map(|t| self.signature_of(t));

        let interfaces_kind = if kind == TypeKind::Interface { "extends_interfaces" } else { "super_interfaces" };
        let interfaces = find_child_by_kind(node, interfaces_kind)
            .and_then(|clause| find_child_by_kind(clause, "type_list"))
            .map(|list| self.type_list(list))
            .unwrap_or_default();

        let mut declaration = TypeDeclaration {
            full_name,
            kind,
            modifier: self.member_modifier(&modifiers, in_interface),
            is_abstract: kind == TypeKind::Interface || has("abstract"),
            is_final: has("final"),
            // members of interfaces are implicitly static
            is_static: has("static") || (outer.is_some() && in_interface),
            super_class,
            interfaces,
            type_parameters: self.type_parameters(node),
            fields: Vec::new(),
            methods: Vec::new(),
        };

        let mut nested = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            self.collect_members(body, &mut declaration, &mut nested);
        }

        let outer_name = declaration.full_name.clone();
        let body_is_interface = kind == TypeKind::Interface;
        types.push(declaration);

        for nested_node in nested {
            self.collect_type(nested_node, Some(&outer_name), body_is_interface, types);
        }
    }

    fn collect_members<'t>(&self, body: Node<'t>, declaration: &mut TypeDeclaration, nested: &mut Vec<Node<'t>>) {
        let in_interface = declaration.kind == TypeKind::Interface;
        let mut cursor = body.walk();
        for member in body.children(&mut cursor) {
            match member.kind() {
                "field_declaration" | "constant_declaration" => {
                    declaration.fields.extend(self.fields(member, in_interface));
                }
                "method_declaration" => {
                    if let Some(method) = self.method(member, in_interface, false) {
                        declaration.methods.push(method);
                    }
                }
                "constructor_declaration" => {
                    if let Some(method) = self.method(member, in_interface, true) {
                        declaration.methods.push(method);
                    }
                }
                "enum_constant" => {
                    if let Some(name_node) = member.child_by_field_name("name") {
                        declaration.fields.push(FieldDeclaration {
                            name: self.node_text(name_node),
                            type_signature: declaration.simple_name().rsplit('$').next().unwrap_or_default().to_string(),
                            modifier: AccessLevelModifier::Public,
                            is_final: true,
                            is_static: true,
                            is_enum_constant: true,
                        });
                    }
                }
                "enum_body_declarations" => self.collect_members(member, declaration, nested),
                "class_declaration" | "interface_declaration" | "enum_declaration" => nested.push(member),
                _ => {}
            }
        }
    }

    /// One field per variable declarator
    fn fields(&self, node: Node, in_interface: bool) -> Vec<FieldDeclaration> {
        let modifiers = self.modifiers(node);
        let has = |keyword: &str| modifiers.iter().any(|m| m == keyword);
        let base_type = node
            .child_by_field_name("type")
            .map(|t| self.signature_of(t))
            .unwrap_or_default();

        let mut cursor = node.walk();
        node.children(&mut cursor)
            .filter(|c| c.kind() == "variable_declarator")
            .filter_map(|declarator| {
                let name = self.node_text(declarator.child_by_field_name("name")?);
                let dimensions = declarator
                    .child_by_field_name("dimensions")
                    .map(|d| self.signature_of(d))
                    .unwrap_or_default();
                Some(FieldDeclaration {
                    name,
                    type_signature: format!("{}{}", base_type, dimensions),
                    modifier: self.member_modifier(&modifiers, in_interface),
                    is_final: in_interface || has("final"),
                    is_static: in_interface || has("static"),
                    is_enum_constant: false,
                })
            })
            .collect()
    }

    fn method(&self, node: Node, in_interface: bool, is_constructor: bool) -> Option<MethodDeclaration> {
        let name = self.node_text(node.child_by_field_name("name")?);
        let modifiers = self.modifiers(node);
        let has = |keyword: &str| modifiers.iter().any(|m| m == keyword);

        let return_type = if is_constructor {
            "void".to_string()
        } else {
            let base = node
                .child_by_field_name("type")
                .map(|t| self.signature_of(t))
                .unwrap_or_else(|| "void".to_string());
            let dimensions = node
                .child_by_field_name("dimensions")
                .map(|d| self.signature_of(d))
                .unwrap_or_default();
            format!("{}{}", base, dimensions)
        };

        let parameters = node
            .child_by_field_name("parameters")
            .map(|p| self.parameters(p))
            .unwrap_or_default();

        let exception_types = find_child_by_kind(node, "throws")
            .map(|throws| {
                let mut cursor = throws.walk();
                let types: Vec<String> = throws
                    .named_children(&mut cursor)
                    .filter(|c| TYPE_KINDS.contains(&c.kind()))
                    .map(|c| self.signature_of(c))
                    .collect();
                types
            })
            .unwrap_or_default();

        let has_body = node.child_by_field_name("body").is_some();
        let is_static = has("static");
        let is_abstract = has("abstract")
            || (in_interface && !has_body && !has("default") && !is_static && !has("private"));
        let modifier = self.member_modifier(&modifiers, in_interface);

        let is_main = !is_constructor
            && name == "main"
            && is_static
            && modifier == AccessLevelModifier::Public
            && return_type == "void"
            && parameters.len() == 1
            && is_main_parameter(&parameters[0].type_signature);

        Some(MethodDeclaration {
            name,
            return_type,
            parameters,
            exception_types,
            type_parameters: self.type_parameters(node),
            modifier,
            is_abstract,
            is_static,
            is_constructor,
            is_main,
        })
    }

    fn parameters(&self, node: Node) -> Vec<ParameterDeclaration> {
        let mut cursor = node.walk();
        let mut parameters = Vec::new();
        for parameter in node.named_children(&mut cursor) {
            match parameter.kind() {
                "formal_parameter" => {
                    let base = parameter
                        .child_by_field_name("type")
                        .map(|t| self.signature_of(t))
                        .unwrap_or_default();
                    let dimensions = parameter
                        .child_by_field_name("dimensions")
                        .map(|d| self.signature_of(d))
                        .unwrap_or_default();
                    let name = parameter
                        .child_by_field_name("name")
                        .map(|n| self.node_text(n))
                        .unwrap_or_default();
                    parameters.push(ParameterDeclaration {
                        name,
                        type_signature: format!("{}{}", base, dimensions),
                    });
                }
                "spread_parameter" => {
                    let base = first_type_child(parameter)
                        .map(|t| self.signature_of(t))
                        .unwrap_or_default();
                    let name = find_child_by_kind(parameter, "variable_declarator")
                        .and_then(|d| d.child_by_field_name("name"))
                        .map(|n| self.node_text(n))
                        .unwrap_or_default();
                    parameters.push(ParameterDeclaration {
                        name,
                        type_signature: format!("{}...", base),
                    });
                }
                _ => {}
            }
        }
        parameters
    }

    fn type_parameters(&self, node: Node) -> Vec<String> {
        find_child_by_kind(node, "type_parameters")
            .map(|params| {
                let mut cursor = params.walk();
                let declarations: Vec<String> = params
                    .named_children(&mut cursor)
                    .filter(|c| c.kind() == "type_parameter")
                    .map(|c| self.signature_of(c))
                    .collect();
                declarations
            })
            .unwrap_or_default()
    }

    fn type_list(&self, node: Node) -> Vec<String> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|c| TYPE_KINDS.contains(&c.kind()))
            .map(|c| self.signature_of(c))
            .collect()
    }

    /// Modifier keywords, annotations excluded
    fn modifiers(&self, node: Node) -> Vec<String> {
        find_child_by_kind(node, "modifiers")
            .map(|modifiers| {
                let mut cursor = modifiers.walk();
                let keywords: Vec<String> = modifiers
                    .children(&mut cursor)
                    .filter(|c| !matches!(c.kind(), "marker_annotation" | "annotation"))
                    .map(|c| self.node_text(c))
                    .collect();
                keywords
            })
            .unwrap_or_default()
    }

    /// Interface members without an access keyword are implicitly public
    fn member_modifier(&self, modifiers: &[String], in_interface: bool) -> AccessLevelModifier {
        let explicit = modifiers
            .iter()
            .any(|m| matches!(m.as_str(), "public" | "protected" | "private"));
        if in_interface && !explicit {
            AccessLevelModifier::Public
        } else {
            AccessLevelModifier::from_keywords(modifiers)
        }
    }

    /// Canonical signature of a type node, annotations dropped
    fn signature_of(&self, node: Node) -> String {
        let mut tokens = Vec::new();
        self.collect_tokens(node, &mut tokens);
        join_signature_tokens(tokens)
    }

    fn collect_tokens(&self, node: Node, tokens: &mut Vec<&'a str>) {
        if matches!(node.kind(), "marker_annotation" | "annotation" | "line_comment" | "block_comment") {
            return;
        }
        if node.child_count() == 0 {
            tokens.push(&self.source[node.byte_range()]);
            return;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.collect_tokens(child, tokens);
        }
    }

    /// Extract text content of a node
    fn node_text(&self, node: Node) -> String {
        self.source[node.byte_range()].to_string()
    }
}

/// Find a child node by its kind
fn find_child_by_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == kind);
    found
}

fn first_type_child(node: Node) -> Option<Node> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| TYPE_KINDS.contains(&c.kind()));
    found
}

fn is_main_parameter(signature: &str) -> bool {
    matches!(
        signature,
        "String[]" | "java.lang.String[]" | "String..." | "java.lang.String..."
    )
}
