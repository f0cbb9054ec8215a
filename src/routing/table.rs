//! Declarative route table: path → method token → entry.

use std::collections::BTreeMap;

/// Static mapping of routes, assembled once at startup.
///
/// Method tokens are stored verbatim and checked when the table is compiled,
/// so a bad token surfaces as a startup error rather than being dropped.
#[derive(Debug, Clone)]
pub struct RouteTable<E> {
    paths: BTreeMap<String, BTreeMap<String, E>>,
}

impl<E> Default for RouteTable<E> {
    fn default() -> Self {
        Self {
            paths: BTreeMap::new(),
        }
    }
}

impl<E> RouteTable<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, replacing any entry already under the same path and token.
    pub fn route(mut self, path: impl Into<String>, method: impl Into<String>, entry: E) -> Self {
        self.insert(path, method, entry);
        self
    }

    /// Insert an entry, returning the one it replaced.
    pub fn insert(
        &mut self,
        path: impl Into<String>,
        method: impl Into<String>,
        entry: E,
    ) -> Option<E> {
        self.paths
            .entry(path.into())
            .or_default()
            .insert(method.into(), entry)
    }

    /// Number of `(path, method)` entries.
    pub fn len(&self) -> usize {
        self.paths.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries as `(path, method token, entry)`, ordered by path then token.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &E)> {
        self.paths.iter().flat_map(|(path, methods)| {
            methods
                .iter()
                .map(move |(method, entry)| (path.as_str(), method.as_str(), entry))
        })
    }

    /// `(path, method token)` pairs, useful for comparing table contents.
    pub fn keys(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(path, method, _)| (path.to_string(), method.to_string()))
            .collect()
    }
}
