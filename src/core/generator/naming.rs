// src/core/generator/naming.rs
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

use crate::error::Result;

/// Turns source names into valid Ecore names
pub struct NameSanitizer {
    identifier_regex: Regex,
    invalid_char_regex: Regex,
}

impl NameSanitizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            identifier_regex: Regex::new(r"^[\p{L}_$][\p{L}\p{N}_$]*$")?,
            invalid_char_regex: Regex::new(r"[^\p{L}\p{N}_$]")?,
        })
    }

    pub fn is_valid(&self, name: &str) -> bool {
        self.identifier_regex.is_match(name)
    }

    pub fn sanitize(&self, name: &str) -> String {
        if self.is_valid(name) {
            return name.to_string();
        }
        let mut sanitized = self.invalid_char_regex.replace_all(name, "_").into_owned();
        if !sanitized.starts_with(|c: char| c.is_alphabetic() || c == '_' || c == '$') {
            sanitized.insert(0, '_');
        }
        debug!("Renamed {:?} to {:?}", name, sanitized);
        sanitized
    }
}

/// Names already used in one namespace
#[derive(Debug, Default)]
pub struct NameScope {
    taken: HashSet<String>,
}

impl NameScope {
    /// Reserve `name`, appending a numeric suffix if it is taken
    pub fn claim(&mut self, name: String) -> String {
        if self.taken.insert(name.clone()) {
            return name;
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{}{}", name, suffix);
            if self.taken.insert(candidate.clone()) {
                debug!("Name {:?} is taken, using {:?}", name, candidate);
                return candidate;
            }
            suffix += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        let names = NameSanitizer::new().unwrap();
        assert_eq!(names.sanitize("Outer$Inner"), "Outer$Inner");
        assert_eq!(names.sanitize("Größe"), "Größe");
        assert_eq!(names.sanitize("int[]"), "int__");
        assert_eq!(names.sanitize("2d"), "_2d");
        assert_eq!(names.sanitize(""), "_");
        assert!(!names.is_valid("a-b"));
    }

    #[test]
    fn test_claim_appends_suffix() {
        let mut scope = NameScope::default();
        assert_eq!(scope.claim("Shape".to_string()), "Shape");
        assert_eq!(scope.claim("Shape".to_string()), "Shape2");
        assert_eq!(scope.claim("Shape".to_string()), "Shape3");
        assert_eq!(scope.claim("Point".to_string()), "Point");
    }
}
