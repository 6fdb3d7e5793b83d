//! Host symbol API
//!
//! The extractors never talk to a parser directly. They consume declarations
//! through the [`SymbolHost`] port, which the tree-sitter backed
//! [`JavaSourceHost`] implements for real projects and canned hosts implement
//! in tests.

mod java;

#[cfg(test)]
pub(crate) mod testing;

pub use java::JavaSourceHost;

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::Result;
use super::model::AccessLevelModifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportDeclaration {
    /// Imported name, without a trailing `.*`
    pub name: String,
    /// `import a.b.*;`
    pub on_demand: bool,
    pub is_static: bool,
}

/// Declarations of one source file
#[derive(Debug, Clone, Serialize)]
pub struct CompilationUnit {
    pub path: PathBuf,
    /// Dotted package name, empty for the default package
    pub package: String,
    pub imports: Vec<ImportDeclaration>,
    pub types: Vec<TypeDeclaration>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeDeclaration {
    /// Qualified name; nested types use `$`, e.g. `a.b.Outer$Inner`
    pub full_name: String,
    pub kind: TypeKind,
    pub modifier: AccessLevelModifier,
    pub is_abstract: bool,
    pub is_final: bool,
    /// Nested type without an enclosing instance (`static`, or implicitly so)
    pub is_static: bool,
    /// Signature of the `extends` clause of a class
    pub super_class: Option<String>,
    /// Signatures of implemented interfaces, or extended ones for interfaces
    pub interfaces: Vec<String>,
    /// Type parameter declarations, e.g. `T extends Comparable<T>`
    pub type_parameters: Vec<String>,
    pub fields: Vec<FieldDeclaration>,
    pub methods: Vec<MethodDeclaration>,
}

impl TypeDeclaration {
    pub fn simple_name(&self) -> &str {
        match self.full_name.rfind('.') {
            Some(idx) => &self.full_name[idx + 1..],
            None => &self.full_name,
        }
    }

    /// Names of the declared type parameters
    pub fn type_parameter_names(&self) -> Vec<String> {
        self.type_parameters.iter().map(|p| type_parameter_name(p)).collect()
    }

    /// Full name of the directly enclosing type of a nested type
    pub fn enclosing_name(&self) -> Option<&str> {
        let simple_start = self.full_name.rfind('.').map_or(0, |idx| idx + 1);
        self.full_name[simple_start..]
            .rfind('$')
            .map(|idx| &self.full_name[..simple_start + idx])
    }

    /// Inner classes see the type variables of their enclosing instance
    pub fn is_inner_class(&self) -> bool {
        self.kind == TypeKind::Class && !self.is_static && self.enclosing_name().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDeclaration {
    pub name: String,
    pub type_signature: String,
    pub modifier: AccessLevelModifier,
    pub is_final: bool,
    pub is_static: bool,
    /// Enum constants are reported as fields, like the compiler does
    pub is_enum_constant: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterDeclaration {
    pub name: String,
    pub type_signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDeclaration {
    pub name: String,
    /// `void` for void methods and constructors
    pub return_type: String,
    pub parameters: Vec<ParameterDeclaration>,
    pub exception_types: Vec<String>,
    pub type_parameters: Vec<String>,
    pub modifier: AccessLevelModifier,
    pub is_abstract: bool,
    pub is_static: bool,
    pub is_constructor: bool,
    pub is_main: bool,
}

impl MethodDeclaration {
    pub fn number_of_parameters(&self) -> usize {
        self.parameters.len()
    }

    pub fn returns_void(&self) -> bool {
        self.return_type == "void"
    }
}

/// Port to the symbol information of the analyzed project
pub trait SymbolHost {
    /// Identifiers of all compilation units of the project
    fn compilation_units(&mut self) -> Result<Vec<PathBuf>>;

    /// Package, imports and type declarations of one compilation unit
    fn type_declarations(&mut self, unit: &Path) -> Result<CompilationUnit>;

    /// Declared fields of a type, enum constants included
    fn fields_of(&self, declaration: &TypeDeclaration) -> Result<Vec<FieldDeclaration>> {
        Ok(declaration.fields.clone())
    }

    /// Declared methods and constructors of a type
    fn methods_of(&self, declaration: &TypeDeclaration) -> Result<Vec<MethodDeclaration>> {
        Ok(declaration.methods.clone())
    }
}

/// Name part of a type parameter declaration (`T` for `T extends Foo`)
pub fn type_parameter_name(declaration: &str) -> String {
    declaration
        .split(|c: char| c.is_whitespace() || c == '&' || c == '<')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Join source tokens into a canonical signature.
///
/// Whitespace is dropped except between two adjacent words, so
/// `Map < String , List<? extends Foo> >` becomes `Map<String,List<? extends Foo>>`.
pub fn join_signature_tokens<'a, I>(tokens: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let is_word = |c: char| c.is_alphanumeric() || c == '_' || c == '$';
    let mut signature = String::new();
    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let previous = signature.chars().last();
        let next = token.chars().next();
        if let (Some(previous), Some(next)) = (previous, next) {
            if (is_word(previous) || previous == '?') && is_word(next) {
                signature.push(' ');
            }
        }
        signature.push_str(token);
    }
    signature
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_signature_tokens() {
        let tokens = ["Map", "<", "String", ",", "List", "<", "?", "extends", "Foo", ">", ">"];
        assert_eq!(join_signature_tokens(tokens), "Map<String,List<? extends Foo>>");
        assert_eq!(join_signature_tokens(["int", "[", "]"]), "int[]");
        assert_eq!(join_signature_tokens(["T", "extends", "A", "&", "B"]), "T extends A&B");
        assert_eq!(join_signature_tokens(["List", "<", "?", ">"]), "List<?>");
    }

    #[test]
    fn test_type_parameter_name() {
        assert_eq!(type_parameter_name("T"), "T");
        assert_eq!(type_parameter_name("E extends Comparable<E>"), "E");
        assert_eq!(type_parameter_name("K extends A&B"), "K");
    }

    #[test]
    fn test_enclosing_name_and_inner_classes() {
        use super::testing::type_decl;

        let top = type_decl("app.Tree", TypeKind::Class);
        assert_eq!(top.enclosing_name(), None);
        assert!(!top.is_inner_class());

        let node = type_decl("app.Tree$Node$Leaf", TypeKind::Class);
        assert_eq!(node.enclosing_name(), Some("app.Tree$Node"));
        assert!(node.is_inner_class());

        let nested = TypeDeclaration { is_static: true, ..type_decl("Tree$Entry", TypeKind::Class) };
        assert_eq!(nested.enclosing_name(), Some("Tree"));
        assert!(!nested.is_inner_class());

        assert!(!type_decl("app.Tree$Kind", TypeKind::Enum).is_inner_class());
    }
}
