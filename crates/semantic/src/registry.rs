// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Session-local temp tables and table variables

use std::collections::HashMap;

/// One declared temp table or table variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempObject {
    /// Name as declared (`#t`, `##g` or `@v`)
    pub name: String,
    /// Declared column names in declaration order
    pub columns: Vec<String>,
}

/// Temp objects declared in one document
///
/// Built once by the validator; read-only afterwards. Names are
/// case-insensitive and iteration follows declaration order.
#[derive(Debug, Clone, Default)]
pub struct TempObjectRegistry {
    objects: Vec<TempObject>,
    index: HashMap<String, usize>,
}

impl TempObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a declaration; a repeated name replaces the earlier columns
    pub fn register(&mut self, name: impl Into<String>, columns: Vec<String>) {
        let name = name.into();
        let key = name.to_lowercase();
        match self.index.get(&key) {
            Some(&slot) => self.objects[slot].columns = columns,
            None => {
                self.index.insert(key, self.objects.len());
                self.objects.push(TempObject { name, columns });
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_lowercase())
    }

    pub fn get(&self, name: &str) -> Option<&TempObject> {
        self.index
            .get(&name.to_lowercase())
            .map(|&slot| &self.objects[slot])
    }

    /// Declared columns of `name`
    pub fn columns(&self, name: &str) -> Option<&[String]> {
        self.get(name).map(|object| object.columns.as_slice())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TempObject> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        let mut registry = TempObjectRegistry::new();
        registry.register("#Recent", vec!["OrderId".to_string()]);
        assert!(registry.contains("#recent"));
        assert_eq!(registry.columns("#RECENT").unwrap(), ["OrderId".to_string()]);
        assert_eq!(registry.get("#recent").unwrap().name, "#Recent");
        assert!(!registry.contains("#other"));
    }

    #[test]
    fn test_redeclaration_replaces_columns() {
        let mut registry = TempObjectRegistry::new();
        registry.register("@t", vec!["a".to_string()]);
        registry.register("#x", vec![]);
        registry.register("@T", vec!["b".to_string()]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.columns("@t").unwrap(), ["b".to_string()]);
        let names: Vec<&str> = registry.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["@t", "#x"]);
    }
}
