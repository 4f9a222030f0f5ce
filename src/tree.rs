//! Directory Tree Dump
//!
//! Nested map of entry name to subtree (directories) or `null` (files).
//! Ignore patterns are globs matched against the bare entry name.

use glob::Pattern;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_IGNORE: &[&str] = &[
    ".git",
    "node_modules",
    ".next",
    "__pycache__",
    "*.pyc",
    "*.env*",
    "dist",
    "build",
];

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Invalid ignore pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to resolve root {path}: {source}")]
    Root {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Name-sorted directory listing; `None` marks a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tree(pub BTreeMap<String, Option<Tree>>);

impl Tree {
    pub fn get(&self, name: &str) -> Option<&Option<Tree>> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct IgnoreSet {
    patterns: Vec<Pattern>,
}

impl IgnoreSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, TreeError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p.as_ref()).map_err(|source| TreeError::Pattern {
                    pattern: p.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(name))
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_IGNORE
                .iter()
                .filter_map(|p| Pattern::new(p).ok())
                .collect(),
        }
    }
}

/// Walk `path` recursively. Unreadable directories come back empty and the
/// walk continues with their siblings.
pub fn build_tree(path: &Path, ignore: &IgnoreSet) -> Tree {
    let mut tree = Tree::default();

    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("skipping unreadable directory {}: {}", path.display(), e);
            return tree;
        }
    };

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if ignore.matches(&name) {
            log::trace!("ignored {}", name);
            continue;
        }

        let full = entry.path();
        if full.is_dir() {
            let subtree = build_tree(&full, ignore);
            tree.0.insert(name, Some(subtree));
        } else {
            tree.0.insert(name, None);
        }
    }

    tree
}

/// `{ <root basename>: tree }`
pub fn dump_tree(root: &Path, ignore: &IgnoreSet) -> Result<Tree, TreeError> {
    let root = root.canonicalize().map_err(|source| TreeError::Root {
        path: root.display().to_string(),
        source,
    })?;
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());

    let mut wrapped = Tree::default();
    wrapped.0.insert(name, Some(build_tree(&root, ignore)));
    Ok(wrapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ignores() {
        let ignore = IgnoreSet::default();
        assert!(ignore.matches(".git"));
        assert!(ignore.matches("module.pyc"));
        assert!(ignore.matches(".env.local"));
        assert!(!ignore.matches("src"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = IgnoreSet::new(&["[unclosed"]).unwrap_err();
        assert!(matches!(err, TreeError::Pattern { .. }));
    }

    #[test]
    fn test_tree_json_shape() {
        let mut inner = Tree::default();
        inner.0.insert("a.rs".into(), None);
        let mut tree = Tree::default();
        tree.0.insert("src".into(), Some(inner));
        tree.0.insert("README".into(), None);
        assert_eq!(
            serde_json::to_string(&tree).unwrap(),
            r#"{"README":null,"src":{"a.rs":null}}"#
        );
    }
}
