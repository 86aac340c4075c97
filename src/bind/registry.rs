/// Binder registry
///
/// Maps `class` identities to what they bind to: a record model definition or
/// a callable handler. Plain schema type names are tracked too so spec
/// validation can tell "unknown class" apart from "known type of the wrong
/// kind". Injected wherever specs are validated; never a global.

use crate::bind::callable::BindCallable;
use crate::store::ModelDef;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// What a `class` identity resolves to, decided once at spec construction.
#[derive(Clone)]
pub enum BinderTarget {
    Record(Arc<ModelDef>),
    Callable(Arc<dyn BindCallable>),
}

impl fmt::Debug for BinderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinderTarget::Record(model) => f.debug_tuple("Record").field(&model.name).finish(),
            BinderTarget::Callable(_) => f.debug_tuple("Callable").finish(),
        }
    }
}

#[derive(Default)]
pub struct BinderRegistry {
    models: HashMap<String, Arc<ModelDef>>,
    handlers: HashMap<String, Arc<dyn BindCallable>>,
    plain_types: HashSet<String>,
}

impl BinderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_model(&mut self, model: ModelDef) -> Arc<ModelDef> {
        let model = Arc::new(model);
        self.models.insert(model.name.clone(), model.clone());
        model
    }

    pub fn register_handler(&mut self, name: impl Into<String>, handler: Arc<dyn BindCallable>) {
        self.handlers.insert(name.into(), handler);
    }

    /// Record a schema type that exists but cannot be bound to.
    pub fn register_type(&mut self, name: impl Into<String>) {
        self.plain_types.insert(name.into());
    }

    pub fn model(&self, name: &str) -> Option<Arc<ModelDef>> {
        self.models.get(name).cloned()
    }

    pub fn target(&self, name: &str) -> Option<BinderTarget> {
        if let Some(model) = self.models.get(name) {
            return Some(BinderTarget::Record(model.clone()));
        }
        self.handlers
            .get(name)
            .map(|handler| BinderTarget::Callable(handler.clone()))
    }

    /// Whether the name refers to any known type, bindable or not.
    pub fn knows(&self, name: &str) -> bool {
        self.models.contains_key(name)
            || self.handlers.contains_key(name)
            || self.plain_types.contains(name)
    }
}
