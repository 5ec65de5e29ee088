//! Table of view renderers.
//!
//! The `ViewTable` maps view names to renderers and resolves tokens to the
//! renderer that should draw them.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{RegistryError, RegistryResult};
use crate::token::{ViewToken, SUFFIX_SEPARATOR};
use crate::view::ViewRenderer;

/// Shared handle to a renderer.
pub type SharedRenderer<T, E> = Arc<dyn ViewRenderer<T, E>>;

/// A table of view renderers keyed by name.
///
/// # Example
///
/// ```rust
/// use overstack::{view_fn, ViewProps, ViewTable};
///
/// let mut views: ViewTable<String, String> = ViewTable::new();
/// views.register(view_fn("alert", |_view: &ViewProps<String, String>| None));
///
/// assert!(views.resolve(&"alert%1".into()).is_some());
/// ```
#[derive(Debug)]
pub struct ViewTable<T, E> {
    views: HashMap<String, SharedRenderer<T, E>>,
    ordered: Vec<String>,
}

impl<T, E> ViewTable<T, E> {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            views: HashMap::new(),
            ordered: Vec::new(),
        }
    }

    /// Register a renderer under its name, replacing any previous one.
    pub fn register(&mut self, view: impl ViewRenderer<T, E> + 'static) {
        self.insert(Arc::new(view));
    }

    /// Register a renderer, returning an error if the name is taken or invalid.
    pub fn register_unique(&mut self, view: impl ViewRenderer<T, E> + 'static) -> RegistryResult<()> {
        let name = view.name();
        if name.is_empty() || name.contains(SUFFIX_SEPARATOR) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        if self.views.contains_key(name) {
            return Err(RegistryError::AlreadyRegistered(name.to_string()));
        }
        self.insert(Arc::new(view));
        Ok(())
    }

    fn insert(&mut self, view: SharedRenderer<T, E>) {
        let name = view.name().to_string();
        if !self.views.contains_key(&name) {
            self.ordered.push(name.clone());
        }
        self.views.insert(name, view);
    }

    /// Get a renderer by name.
    pub fn get(&self, name: &str) -> Option<&SharedRenderer<T, E>> {
        self.views.get(name)
    }

    /// Find the renderer for a token.
    ///
    /// Tries the whole token first, then the token's base, so `alert%7f3a`
    /// renders with the `alert` view.
    pub fn resolve(&self, token: &ViewToken) -> Option<&SharedRenderer<T, E>> {
        self.views
            .get(token.as_str())
            .or_else(|| self.views.get(token.base()))
    }

    /// Check if a view with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.views.contains_key(name)
    }

    /// Get the names of all registered views.
    pub fn names(&self) -> Vec<&str> {
        self.ordered.iter().map(|s| s.as_str()).collect()
    }

    /// Get the number of registered views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl<T, E> Default for ViewTable<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating view tables with fluent API.
pub struct ViewTableBuilder<T, E> {
    table: ViewTable<T, E>,
}

impl<T, E> ViewTableBuilder<T, E> {
    /// Create a new table builder.
    pub fn new() -> Self {
        Self {
            table: ViewTable::new(),
        }
    }

    /// Add a renderer to the table.
    pub fn with(mut self, view: impl ViewRenderer<T, E> + 'static) -> Self {
        self.table.register(view);
        self
    }

    /// Build the table.
    pub fn build(self) -> ViewTable<T, E> {
        self.table
    }
}

impl<T, E> Default for ViewTableBuilder<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{Rendered, ViewProps};

    #[derive(Debug)]
    struct TestView {
        name: &'static str,
        label: &'static str,
    }

    impl ViewRenderer<(), ()> for TestView {
        fn name(&self) -> &str {
            self.name
        }

        fn render(&self, _view: &ViewProps<(), ()>) -> Rendered {
            Some(self.label.to_string())
        }
    }

    fn view(name: &'static str, label: &'static str) -> TestView {
        TestView { name, label }
    }

    #[test]
    fn test_table_register_and_get() {
        let mut table: ViewTable<(), ()> = ViewTable::new();
        table.register(view("alert", "a"));

        assert!(table.get("alert").is_some());
        assert!(table.get("unknown").is_none());
    }

    #[test]
    fn test_register_replaces_and_keeps_order() {
        let mut table: ViewTable<(), ()> = ViewTable::new();
        table.register(view("a", "first"));
        table.register(view("b", "b"));
        table.register(view("a", "second"));

        assert_eq!(table.names(), vec!["a", "b"]);
        assert_eq!(table.len(), 2);
        assert!(table.contains("a"));
    }

    #[test]
    fn test_resolve_falls_back_to_base() {
        let table: ViewTable<(), ()> = ViewTableBuilder::new()
            .with(view("alert", "base"))
            .with(view("alert%special", "exact"))
            .build();

        let exact = table.resolve(&"alert%special".into()).unwrap();
        assert_eq!(exact.name(), "alert%special");

        let base = table.resolve(&ViewToken::compose("alert", "9")).unwrap();
        assert_eq!(base.name(), "alert");

        assert!(table.resolve(&"missing".into()).is_none());
    }

    #[test]
    fn test_register_unique() {
        let mut table: ViewTable<(), ()> = ViewTable::new();
        assert!(table.register_unique(view("alert", "a")).is_ok());
        assert_eq!(
            table.register_unique(view("alert", "b")),
            Err(RegistryError::AlreadyRegistered("alert".to_string()))
        );
        assert_eq!(
            table.register_unique(view("a%b", "c")),
            Err(RegistryError::InvalidName("a%b".to_string()))
        );
        assert!(table.register_unique(view("", "d")).is_err());
    }
}
