//! Per-bundle isolation contexts
//!
//! Every resolved bundle gets its own namespace of loaded symbols. A lookup
//! consults the context's own table first and then, only if one was given,
//! its parent. Sibling contexts never see each other's definitions, so two
//! bundles shipping the same recipe name (or conflicting runtime pieces)
//! cannot collide.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::debug;
use uuid::Uuid;

use super::Bundle;

/// A symbol loaded into an isolation context
pub type Symbol = Arc<dyn Any + Send + Sync>;

/// An isolated loading context owned by one bundle
pub struct IsolationContext {
    id: Uuid,
    bundle: Bundle,
    parent: Option<Arc<IsolationContext>>,
    symbols: RwLock<HashMap<String, Symbol>>,
}

impl IsolationContext {
    pub fn new(bundle: Bundle, parent: Option<Arc<IsolationContext>>) -> Self {
        Self {
            id: Uuid::now_v7(),
            bundle,
            parent,
            symbols: RwLock::new(HashMap::new()),
        }
    }

    /// Unique id of this context
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The bundle that owns this context
    pub fn bundle(&self) -> &Bundle {
        &self.bundle
    }

    /// The context lookups fall back to, if any
    pub fn parent(&self) -> Option<&Arc<IsolationContext>> {
        self.parent.as_ref()
    }

    /// Define a symbol in this context, returning any previous definition
    pub fn define(&self, name: impl Into<String>, symbol: Symbol) -> Option<Symbol> {
        let mut symbols = self.symbols.write().unwrap_or_else(|e| e.into_inner());
        symbols.insert(name.into(), symbol)
    }

    /// Whether `name` is defined in this context itself (ignoring the parent)
    pub fn defines(&self, name: &str) -> bool {
        let symbols = self.symbols.read().unwrap_or_else(|e| e.into_inner());
        symbols.contains_key(name)
    }

    /// Look up a symbol here, then in the parent chain
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        let local = {
            let symbols = self.symbols.read().unwrap_or_else(|e| e.into_inner());
            symbols.get(name).cloned()
        };
        local.or_else(|| self.parent.as_ref().and_then(|parent| parent.lookup(name)))
    }

    /// Look up a symbol and downcast it to `T`
    pub fn lookup_as<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.lookup(name).and_then(|symbol| symbol.downcast::<T>().ok())
    }

    /// Number of symbols defined in this context itself
    pub fn len(&self) -> usize {
        self.symbols.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for IsolationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IsolationContext")
            .field("id", &self.id)
            .field("bundle", &self.bundle)
            .field("parent", &self.parent.as_ref().map(|p| p.id))
            .field("symbols", &self.len())
            .finish()
    }
}

/// Creates isolation contexts for resolved bundles
pub trait IsolationFactory: Send + Sync {
    /// Create a fresh context for `bundle`
    ///
    /// `parent` is set when a recipe implementation delegates to recipes of
    /// another bundle and must see that bundle's symbols.
    fn create(&self, bundle: &Bundle, parent: Option<Arc<IsolationContext>>)
        -> Arc<IsolationContext>;
}

/// Isolation through separate in-process symbol namespaces
#[derive(Debug, Default, Clone, Copy)]
pub struct NamespacedIsolationFactory;

impl IsolationFactory for NamespacedIsolationFactory {
    fn create(
        &self,
        bundle: &Bundle,
        parent: Option<Arc<IsolationContext>>,
    ) -> Arc<IsolationContext> {
        let context = IsolationContext::new(bundle.clone(), parent);
        debug!(bundle = %bundle, context = %context.id(), "Created isolation context");
        Arc::new(context)
    }
}

#[cfg(test)]
mod isolation_tests {
    use super::*;

    #[test]
    fn test_definitions_do_not_leak_between_bundles() {
        let factory = NamespacedIsolationFactory;
        let first = factory.create(&Bundle::new("maven", "org.example:first"), None);
        let second = factory.create(&Bundle::new("maven", "org.example:second"), None);

        first.define("org.example.Shared", Arc::new(1_u32));

        assert!(first.lookup("org.example.Shared").is_some());
        assert!(second.lookup("org.example.Shared").is_none());
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_child_sees_parent_but_not_the_reverse() {
        let factory = NamespacedIsolationFactory;
        let parent = factory.create(&Bundle::new("npm", "base"), None);
        let child = factory.create(&Bundle::new("npm", "composite"), Some(parent.clone()));

        parent.define("base.Recipe", Arc::new("from parent".to_string()));
        child.define("composite.Recipe", Arc::new("from child".to_string()));

        assert_eq!(
            child.lookup_as::<String>("base.Recipe").as_deref(),
            Some(&"from parent".to_string())
        );
        assert!(parent.lookup("composite.Recipe").is_none());
        assert!(!child.defines("base.Recipe"));
    }

    #[test]
    fn test_local_definition_shadows_parent() {
        let parent = Arc::new(IsolationContext::new(Bundle::new("file", "a.yaml"), None));
        let child = IsolationContext::new(Bundle::new("file", "b.yaml"), Some(parent.clone()));

        parent.define("x", Arc::new(1_i32));
        child.define("x", Arc::new(2_i32));

        assert_eq!(child.lookup_as::<i32>("x").as_deref(), Some(&2));
        assert_eq!(parent.lookup_as::<i32>("x").as_deref(), Some(&1));
    }

    #[test]
    fn test_lookup_as_wrong_type_is_none() {
        let context = IsolationContext::new(Bundle::new("file", "a.yaml"), None);
        context.define("x", Arc::new(1_i32));
        assert!(context.lookup_as::<String>("x").is_none());
        assert_eq!(context.len(), 1);
    }
}
