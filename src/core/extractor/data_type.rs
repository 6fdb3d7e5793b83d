// src/core/extractor/data_type.rs
use std::collections::HashSet;

use crate::core::host::{CompilationUnit, ImportDeclaration, TypeDeclaration};
use crate::core::model::{
    DataType, DeclaredType, ExtractedTypeParameter, Primitive, TypeArgument, WildcardBound,
};
use crate::error::{EmeError, Result};

/// Types of `java.lang`, visible without import
const JAVA_LANG: &[&str] = &[
    "AutoCloseable", "Boolean", "Byte", "Character", "CharSequence", "Class", "Cloneable",
    "Comparable", "Double", "Enum", "Error", "Exception", "Float", "IllegalArgumentException",
    "IllegalStateException", "IndexOutOfBoundsException", "Integer", "InterruptedException",
    "Iterable", "Long", "Math", "NullPointerException", "Number", "Object", "Record", "Runnable",
    "RuntimeException", "Short", "String", "StringBuilder", "System", "Thread", "Throwable",
    "UnsupportedOperationException", "Void",
];

/// Well-known JDK types, resolved through on-demand imports of their package
const WELL_KNOWN: &[(&str, &[&str])] = &[
    ("java.util", &[
        "ArrayDeque", "ArrayList", "Calendar", "Collection", "Date", "Deque", "HashMap", "HashSet",
        "Iterator", "LinkedHashMap", "LinkedHashSet", "LinkedList", "List", "Locale", "Map",
        "Optional", "Properties", "Queue", "Set", "SortedMap", "SortedSet", "TreeMap", "TreeSet", "UUID",
    ]),
    ("java.math", &["BigDecimal", "BigInteger"]),
    ("java.io", &["File", "IOException", "InputStream", "OutputStream", "Reader", "Serializable", "Writer"]),
    ("java.time", &["Duration", "Instant", "LocalDate", "LocalDateTime", "LocalTime", "ZonedDateTime"]),
];

/// Full names of every type declared in the analyzed project
#[derive(Debug, Clone, Default)]
pub struct KnownTypes {
    full_names: HashSet<String>,
}

impl KnownTypes {
    pub fn from_units<'a, I>(units: I) -> Self
    where
        I: IntoIterator<Item = &'a CompilationUnit>,
    {
        let full_names = units
            .into_iter()
            .flat_map(|unit| unit.types.iter().map(|t| t.full_name.clone()))
            .collect();
        Self { full_names }
    }

    pub fn contains(&self, full_name: &str) -> bool {
        self.full_names.contains(full_name)
    }

    /// Map a dotted source name such as `a.Outer.Inner` to a declared `a.Outer$Inner`
    pub fn lookup_dotted(&self, name: &str) -> Option<String> {
        if self.contains(name) {
            return Some(name.to_string());
        }
        let segments: Vec<&str> = name.split('.').collect();
        (1..segments.len()).rev().find_map(|split_at| {
            let candidate = format!("{}${}", segments[..split_at].join("."), segments[split_at..].join("$"));
            self.contains(&candidate).then_some(candidate)
        })
    }

    pub fn len(&self) -> usize {
        self.full_names.len()
    }
}

/// Generic scope a signature is resolved in
#[derive(Debug, Clone)]
pub struct TypeScope {
    /// Full name of the declaring type
    pub declaring_type: String,
    /// Visible type variables, innermost scope first
    pub type_variables: Vec<String>,
}

impl TypeScope {
    /// Scope of a type declared among `declarations`. Inner classes also see
    /// the type variables of every enclosing instance, innermost first.
    pub fn of_type(declaration: &TypeDeclaration, declarations: &[TypeDeclaration]) -> Self {
        let mut type_variables = declaration.type_parameter_names();
        let mut current = declaration;
        while current.is_inner_class() {
            let Some(outer) = current
                .enclosing_name()
                .and_then(|name| declarations.iter().find(|d| d.full_name == name))
            else {
                break;
            };
            type_variables.extend(outer.type_parameter_names());
            current = outer;
        }

        Self {
            declaring_type: declaration.full_name.clone(),
            type_variables,
        }
    }

    /// Scope of a method: its own type parameters shadow the declaring type's
    pub fn with_method_parameters(&self, names: Vec<String>) -> Self {
        let mut type_variables = names;
        type_variables.extend(self.type_variables.iter().cloned());
        Self {
            declaring_type: self.declaring_type.clone(),
            type_variables,
        }
    }

    fn has_variable(&self, name: &str) -> bool {
        self.type_variables.iter().any(|v| v == name)
    }
}

/// Maps raw type signatures of one compilation unit to data-type descriptors
pub struct DataTypeExtractor<'a> {
    package: &'a str,
    imports: &'a [ImportDeclaration],
    declarations: &'a [TypeDeclaration],
    known_types: &'a KnownTypes,
}

impl<'a> DataTypeExtractor<'a> {
    pub fn new(unit: &'a CompilationUnit, known_types: &'a KnownTypes) -> Self {
        Self {
            package: &unit.package,
            imports: &unit.imports,
            declarations: &unit.types,
            known_types,
        }
    }

    /// Generic scope of a type declared in this unit
    pub fn scope_of(&self, declaration: &TypeDeclaration) -> TypeScope {
        TypeScope::of_type(declaration, self.declarations)
    }

    /// Resolve a signature such as `Map<String,List<? extends Foo>>[]` or `String...`
    pub fn extract_data_type(&self, signature: &str, scope: &TypeScope) -> Result<DataType> {
        let mut parser = SignatureParser::new(signature, self, scope)?;
        let data_type = parser.parse_type(true)?;
        parser.expect_end()?;
        Ok(data_type)
    }

    /// Resolve type parameter declarations such as `T extends Comparable<T>&Serializable`
    pub fn extract_type_parameters(&self, declarations: &[String], scope: &TypeScope) -> Result<Vec<ExtractedTypeParameter>> {
        declarations
            .iter()
            .map(|declaration| {
                let mut parser = SignatureParser::new(declaration, self, scope)?;
                let parameter = parser.parse_type_parameter()?;
                parser.expect_end()?;
                Ok(parameter)
            })
            .collect()
    }

    /// Fully qualified name of a reference type written as `name`, if it can be determined
    pub fn resolve_type_name(&self, name: &str, scope: &TypeScope) -> Option<String> {
        if name.contains('.') {
            return Some(self.resolve_qualified(name, scope));
        }

        // member types of the declaring type and its enclosing types
        let mut enclosing = scope.declaring_type.as_str();
        loop {
            let candidate = format!("{}${}", enclosing, name);
            if self.known_types.contains(&candidate) {
                return Some(candidate);
            }
            match enclosing.rfind('$') {
                Some(idx) => enclosing = &enclosing[..idx],
                None => break,
            }
        }

        for import in self.imports.iter().filter(|i| !i.on_demand && !i.is_static) {
            let imported_simple = import.name.rsplit('.').next().unwrap_or_default();
            if imported_simple == name {
                return Some(self.known_types.lookup_dotted(&import.name).unwrap_or_else(|| import.name.clone()));
            }
        }

        let same_package = self.qualify(self.package, name);
        if self.known_types.contains(&same_package) {
            return Some(same_package);
        }

        for import in self.imports.iter().filter(|i| i.on_demand && !i.is_static) {
            if let Some(found) = self.known_types.lookup_dotted(&format!("{}.{}", import.name, name)) {
                return Some(found);
            }
            let well_known = WELL_KNOWN
                .iter()
                .any(|(package, names)| *package == import.name && names.contains(&name));
            if well_known {
                return Some(format!("{}.{}", import.name, name));
            }
        }

        if JAVA_LANG.contains(&name) {
            return Some(format!("java.lang.{}", name));
        }

        None
    }

    /// Qualified source names are either project types (possibly nested) or external names
    fn resolve_qualified(&self, name: &str, scope: &TypeScope) -> String {
        if let Some(found) = self.known_types.lookup_dotted(name) {
            return found;
        }
        if let Some((first, rest)) = name.split_once('.') {
            if let Some(outer) = self.resolve_type_name(first, scope) {
                let candidate = format!("{}${}", outer, rest.replace('.', "$"));
                if self.known_types.contains(&candidate) {
                    return candidate;
                }
            }
        }
        name.to_string()
    }

    fn qualify(&self, package: &str, name: &str) -> String {
        if package.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", package, name)
        }
    }

    fn reference(&self, name: String, arguments: Vec<TypeArgument>, scope: &TypeScope) -> DataType {
        if !name.contains('.') && arguments.is_empty() && scope.has_variable(&name) {
            return DataType::TypeVariable { name };
        }
        match self.resolve_type_name(&name, scope) {
            Some(full_name) => DataType::Declared(DeclaredType { name: full_name, arguments }),
            None => DataType::Opaque(DeclaredType { name, arguments }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Less,
    Greater,
    Comma,
    Question,
    Dot,
    Ampersand,
    Brackets,
    Ellipsis,
}

fn tokenize(signature: &str) -> Result<Vec<Token>> {
    let malformed = |reason: &str| EmeError::host(format!("malformed signature {:?}: {}", signature, reason));
    let mut tokens = Vec::new();
    let mut chars = signature.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '<' => tokens.push(Token::Less),
            '>' => tokens.push(Token::Greater),
            ',' => tokens.push(Token::Comma),
            '?' => tokens.push(Token::Question),
            '&' => tokens.push(Token::Ampersand),
            '[' => {
                while chars.peek().map_or(false, |c| c.is_whitespace()) {
                    chars.next();
                }
                if chars.next() != Some(']') {
                    return Err(malformed("unclosed '['"));
                }
                tokens.push(Token::Brackets);
            }
            '.' => {
                if chars.peek() == Some(&'.') {
                    chars.next();
                    if chars.next() != Some('.') {
                        return Err(malformed("'..' is not a valid token"));
                    }
                    tokens.push(Token::Ellipsis);
                } else {
                    tokens.push(Token::Dot);
                }
            }
            c if c.is_alphanumeric() || c == '_' || c == '$' => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_alphanumeric() || next == '_' || next == '$' {
                        word.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Word(word));
            }
            other => return Err(malformed(&format!("unexpected character {:?}", other))),
        }
    }

    Ok(tokens)
}

/// Recursive descent over signature tokens
struct SignatureParser<'p, 'a> {
    signature: &'p str,
    tokens: Vec<Token>,
    position: usize,
    extractor: &'p DataTypeExtractor<'a>,
    scope: &'p TypeScope,
}

impl<'p, 'a> SignatureParser<'p, 'a> {
    fn new(signature: &'p str, extractor: &'p DataTypeExtractor<'a>, scope: &'p TypeScope) -> Result<Self> {
        Ok(Self {
            signature,
            tokens: tokenize(signature)?,
            position: 0,
            extractor,
            scope,
        })
    }

    fn malformed(&self, reason: &str) -> EmeError {
        EmeError::host(format!("malformed signature {:?}: {}", self.signature, reason))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn expect_end(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(self.malformed(&format!("unexpected trailing {:?}", token))),
        }
    }

    fn word(&mut self) -> Result<String> {
        match self.next() {
            Some(Token::Word(word)) => Ok(word),
            Some(other) => Err(self.malformed(&format!("expected a name, found {:?}", other))),
            None => Err(self.malformed("unexpected end")),
        }
    }

    /// type := (primitive | void | reference) `[]`* `...`?
    fn parse_type(&mut self, allow_varargs: bool) -> Result<DataType> {
        let first = self.word()?;

        let base = if first == "void" {
            DataType::Void
        } else if let Some(primitive) = Primitive::from_keyword(&first) {
            DataType::primitive(primitive)
        } else {
            self.parse_reference(first)?
        };

        let mut dimensions = 0;
        while self.eat(&Token::Brackets) {
            dimensions += 1;
        }
        if allow_varargs && self.eat(&Token::Ellipsis) {
            dimensions += 1;
        }

        if dimensions == 0 {
            return Ok(base);
        }
        if base.is_void() {
            return Err(self.malformed("array of void"));
        }
        Ok(match base {
            DataType::Array { element, dimensions: inner } => DataType::Array {
                element,
                dimensions: inner + dimensions,
            },
            element => DataType::Array {
                element: Box::new(element),
                dimensions,
            },
        })
    }

    /// reference := name type_args? (`.` name type_args?)*
    fn parse_reference(&mut self, first: String) -> Result<DataType> {
        let mut name = first;
        let mut arguments = self.parse_type_arguments()?;
        while self.eat(&Token::Dot) {
            let segment = self.word()?;
            name.push('.');
            name.push_str(&segment);
            let inner = self.parse_type_arguments()?;
            if !inner.is_empty() {
                arguments = inner;
            }
        }
        Ok(self.extractor.reference(name, arguments, self.scope))
    }

    fn parse_type_arguments(&mut self) -> Result<Vec<TypeArgument>> {
        if !self.eat(&Token::Less) {
            return Ok(Vec::new());
        }
        let mut arguments = Vec::new();
        if self.eat(&Token::Greater) {
            return Ok(arguments);
        }
        loop {
            arguments.push(self.parse_type_argument()?);
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::Greater) => break,
                Some(other) => return Err(self.malformed(&format!("expected ',' or '>', found {:?}", other))),
                None => return Err(self.malformed("unclosed '<'")),
            }
        }
        Ok(arguments)
    }

    fn parse_type_argument(&mut self) -> Result<TypeArgument> {
        if !self.eat(&Token::Question) {
            let data_type = self.parse_type(false)?;
            if data_type.is_void() {
                return Err(self.malformed("void as type argument"));
            }
            return Ok(TypeArgument::Type { data_type });
        }

        let bound = match self.peek() {
            Some(Token::Word(word)) if word == "extends" => {
                self.position += 1;
                Some(WildcardBound::Extends(Box::new(self.parse_type(false)?)))
            }
            Some(Token::Word(word)) if word == "super" => {
                self.position += 1;
                Some(WildcardBound::Super(Box::new(self.parse_type(false)?)))
            }
            _ => None,
        };
        Ok(TypeArgument::Wildcard { bound })
    }

    /// type_parameter := name (`extends` type (`&` type)*)?
    fn parse_type_parameter(&mut self) -> Result<ExtractedTypeParameter> {
        let name = self.word()?;
        let mut bounds = Vec::new();
        if matches!(self.peek(), Some(Token::Word(word)) if word == "extends") {
            self.position += 1;
            bounds.push(self.parse_type(false)?);
            while self.eat(&Token::Ampersand) {
                bounds.push(self.parse_type(false)?);
            }
        }
        Ok(ExtractedTypeParameter { name, bounds })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::testing::type_decl;
    use crate::core::host::TypeKind;
    use std::path::PathBuf;

    fn unit() -> CompilationUnit {
        CompilationUnit {
            path: PathBuf::from("main/model/Shape.java"),
            package: "main.model".to_string(),
            imports: vec![
                ImportDeclaration { name: "main.view.Canvas".to_string(), on_demand: false, is_static: false },
                ImportDeclaration { name: "java.util".to_string(), on_demand: true, is_static: false },
            ],
            types: vec![
                type_decl("main.model.Shape", TypeKind::Class),
                type_decl("main.model.Shape$Corner", TypeKind::Class),
                type_decl("main.model.Point", TypeKind::Class),
            ],
        }
    }

    fn known(unit: &CompilationUnit) -> KnownTypes {
        let mut known = KnownTypes::from_units([unit]);
        known.full_names.insert("main.view.Canvas".to_string());
        known
    }

    fn scope() -> TypeScope {
        TypeScope {
            declaring_type: "main.model.Shape".to_string(),
            type_variables: vec!["T".to_string()],
        }
    }

    fn extract(signature: &str) -> Result<DataType> {
        let unit = unit();
        let known = known(&unit);
        let extractor = DataTypeExtractor::new(&unit, &known);
        extractor.extract_data_type(signature, &scope())
    }

    #[test]
    fn test_primitives_and_void() {
        assert_eq!(extract("int").unwrap(), DataType::primitive(Primitive::Int));
        assert_eq!(extract("void").unwrap(), DataType::Void);
    }

    #[test]
    fn test_name_resolution_order() {
        assert_eq!(extract("Point").unwrap(), DataType::declared("main.model.Point"));
        assert_eq!(extract("Corner").unwrap(), DataType::declared("main.model.Shape$Corner"));
        assert_eq!(extract("Shape.Corner").unwrap(), DataType::declared("main.model.Shape$Corner"));
        assert_eq!(extract("Canvas").unwrap(), DataType::declared("main.view.Canvas"));
        assert_eq!(extract("String").unwrap(), DataType::declared("java.lang.String"));
        assert_eq!(extract("Date").unwrap(), DataType::declared("java.util.Date"));
        assert_eq!(extract("T").unwrap(), DataType::TypeVariable { name: "T".to_string() });
    }

    #[test]
    fn test_unresolvable_names_become_opaque() {
        assert_eq!(extract("Widget").unwrap(), DataType::opaque("Widget"));
        assert_eq!(extract("org.acme.Widget").unwrap(), DataType::declared("org.acme.Widget"));
    }

    #[test]
    fn test_generic_arguments_resolve_recursively() {
        let data_type = extract("Map<String,List<? extends Point>>").unwrap();
        let DataType::Declared(map) = data_type else {
            panic!("expected a declared type");
        };
        assert_eq!(map.name, "java.util.Map");
        assert_eq!(map.arguments.len(), 2);
        assert_eq!(
            map.arguments[1],
            TypeArgument::Type {
                data_type: DataType::Declared(DeclaredType {
                    name: "java.util.List".to_string(),
                    arguments: vec![TypeArgument::Wildcard {
                        bound: Some(WildcardBound::Extends(Box::new(DataType::declared("main.model.Point")))),
                    }],
                }),
            }
        );
    }

    #[test]
    fn test_arrays_track_dimensions_separately() {
        let data_type = extract("List<T>[][]").unwrap();
        let DataType::Array { element, dimensions } = data_type else {
            panic!("expected an array");
        };
        assert_eq!(dimensions, 2);
        assert_eq!(element.erased_name(), "java.util.List");

        let varargs = extract("int[]...").unwrap();
        assert_eq!(
            varargs,
            DataType::Array { element: Box::new(DataType::primitive(Primitive::Int)), dimensions: 2 }
        );
    }

    #[test]
    fn test_malformed_signatures_are_host_failures() {
        for signature in ["", "List<String", "Map<String,>", "int[", "a..b", "void[]", "List<void>", "Foo Bar", "#"] {
            assert!(
                matches!(extract(signature), Err(EmeError::HostApi(_))),
                "{:?} should be rejected",
                signature
            );
        }
    }

    #[test]
    fn test_type_parameters_with_bounds() {
        let unit = unit();
        let known = known(&unit);
        let extractor = DataTypeExtractor::new(&unit, &known);
        let scope = scope().with_method_parameters(vec!["E".to_string()]);

        let parameters = extractor
            .extract_type_parameters(&["E extends Comparable<E>&Serializable".to_string()], &scope)
            .unwrap();

        assert_eq!(parameters[0].name, "E");
        assert_eq!(parameters[0].bounds.len(), 2);
        assert_eq!(
            parameters[0].bounds[0],
            DataType::Declared(DeclaredType {
                name: "java.lang.Comparable".to_string(),
                arguments: vec![TypeArgument::Type { data_type: DataType::TypeVariable { name: "E".to_string() } }],
            })
        );
        assert_eq!(parameters[0].bounds[1], DataType::opaque("Serializable"));
    }
}
