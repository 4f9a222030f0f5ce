//! Generator Registry - Fixed, Ordered, Read-Only
//!
//! Two addressing schemes over the same ten generators: by position (batch
//! sweeps) and by wire name (single requests). Lookup never falls back.

use serde::Serialize;
use thiserror::Error;

use crate::generators::Generator;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Generator not found: {0}")]
    GeneratorNotFound(String),

    #[error("Generator index {index} out of range (registry holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GeneratorDescriptor {
    pub index: usize,
    pub name: &'static str,
    #[serde(skip)]
    pub generator: Generator,
}

/// Registry of built-in generators. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct Registry {
    descriptors: Vec<GeneratorDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        let descriptors = Generator::ALL
            .iter()
            .enumerate()
            .map(|(index, &generator)| GeneratorDescriptor {
                index,
                name: generator.name(),
                generator,
            })
            .collect();
        Self { descriptors }
    }

    pub fn get(&self, index: usize) -> Result<&GeneratorDescriptor, RegistryError> {
        self.descriptors.get(index).ok_or(RegistryError::IndexOutOfRange {
            index,
            len: self.descriptors.len(),
        })
    }

    /// Exact, case-sensitive lookup by wire name.
    pub fn find(&self, name: &str) -> Result<&GeneratorDescriptor, RegistryError> {
        self.descriptors
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| RegistryError::GeneratorNotFound(name.to_string()))
    }

    pub fn list(&self) -> &[GeneratorDescriptor] {
        &self.descriptors
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.descriptors.iter().map(|d| d.name).collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_order_matches_names() {
        let registry = Registry::new();
        assert_eq!(
            registry.names(),
            vec![
                "gradient", "geometric", "lineArt", "watercolor", "pixel",
                "ornament", "biomorphic", "cosmic", "doodle", "stripe",
            ]
        );
        for (i, d) in registry.list().iter().enumerate() {
            assert_eq!(d.index, i);
            assert_eq!(registry.get(i).unwrap(), d);
        }
    }

    #[test]
    fn test_find_is_case_sensitive() {
        let registry = Registry::new();
        assert_eq!(registry.find("lineArt").unwrap().generator, Generator::LineArt);
        assert_eq!(
            registry.find("lineart"),
            Err(RegistryError::GeneratorNotFound("lineart".to_string()))
        );
    }

    #[test]
    fn test_index_out_of_range() {
        let registry = Registry::new();
        assert_eq!(
            registry.get(10),
            Err(RegistryError::IndexOutOfRange { index: 10, len: 10 })
        );
    }
}
