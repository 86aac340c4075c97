/// Binding orchestration
///
/// Ties spec, memo, and binders together for one argument occurrence. The
/// validation hook (`check`) and the transform hook (`transform`) both funnel
/// through `resolve`, which memoizes, so whichever phase runs first performs
/// the lookup and the other reuses it. When a required binding fails, the
/// violations are field-path scoped and the field resolver is never entered;
/// ambiguous matches and handler faults propagate as plain errors instead.

use crate::bind::memo::{BindingMemo, Resolution};
use crate::bind::record::RecordBinder;
use crate::bind::registry::BinderTarget;
use crate::bind::spec::BindingSpec;
use crate::error::Result;
use crate::store::RecordStore;

use async_graphql::Value;
use std::sync::Arc;

/// Rule key used for unresolved required bindings.
pub const RULE_EXISTS: &str = "exists";

/// One field-path-scoped validation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingViolation {
    /// Dotted attribute path: `arg`, `arg.N`, `input.field`, ...
    pub path: String,
    pub rule: &'static str,
    pub message: String,
}

impl BindingViolation {
    pub fn exists(path: impl Into<String>) -> Self {
        let path = path.into();
        let message = format!("The selected {} is invalid.", path);
        Self {
            path,
            rule: RULE_EXISTS,
            message,
        }
    }
}

/// One occurrence of a bound argument within one request execution.
///
/// Owns the memo; the spec is shared read-only across all occurrences of the
/// annotation. Instances are never reused across requests.
pub struct ArgumentBinding {
    spec: Arc<BindingSpec>,
    path: String,
    memo: BindingMemo,
}

impl ArgumentBinding {
    pub fn new(spec: Arc<BindingSpec>, path: impl Into<String>) -> Self {
        Self {
            spec,
            path: path.into(),
            memo: BindingMemo::new(),
        }
    }

    pub fn spec(&self) -> &BindingSpec {
        &self.spec
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

pub struct BindingOrchestrator {
    store: Arc<dyn RecordStore>,
}

impl BindingOrchestrator {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Resolve the occurrence, at most once.
    pub async fn resolve(&self, binding: &ArgumentBinding, raw: &Value) -> Result<Resolution> {
        let spec = binding.spec.clone();
        let store = self.store.clone();

        binding
            .memo
            .resolve_with(|| async move {
                match &spec.target {
                    BinderTarget::Record(model) => {
                        let binder = RecordBinder::new(store.as_ref());
                        match raw {
                            Value::List(items) => {
                                Ok(Resolution::List(binder.bind_list(model, &spec, items).await?))
                            }
                            Value::Null => Ok(Resolution::Scalar(None)),
                            scalar => Ok(Resolution::Scalar(
                                binder.bind_scalar(model, &spec, scalar).await?,
                            )),
                        }
                    }
                    BinderTarget::Callable(handler) => {
                        Ok(Resolution::Handler(handler.bind(raw, &spec).await?))
                    }
                }
            })
            .await
    }

    /// Validation hook: resolve and report unresolved required positions.
    ///
    /// Empty result means the field resolver may run. Callable bindings own
    /// their missing-value semantics and never produce violations here.
    pub async fn check(&self, binding: &ArgumentBinding, raw: &Value) -> Result<Vec<BindingViolation>> {
        if !binding.spec.required {
            return Ok(Vec::new());
        }

        let violations = match self.resolve(binding, raw).await? {
            Resolution::Scalar(Some(_)) | Resolution::Handler(_) => Vec::new(),
            Resolution::Scalar(None) => vec![BindingViolation::exists(binding.path())],
            Resolution::List(items) => items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.is_none())
                .map(|(i, _)| BindingViolation::exists(format!("{}.{}", binding.path(), i)))
                .collect(),
        };

        if !violations.is_empty() {
            tracing::debug!(
                "Binding for '{}' failed validation at {} position(s)",
                binding.path(),
                violations.len()
            );
        }

        Ok(violations)
    }

    /// Transform hook: the value handed to the field resolver.
    ///
    /// Reuses the memoized resolution when validation already ran. Optional
    /// bindings collapse misses to `null` (scalar) or drop them from the
    /// collection (list) while keeping the surviving order.
    pub async fn transform(&self, binding: &ArgumentBinding, raw: &Value) -> Result<Value> {
        Ok(match self.resolve(binding, raw).await? {
            Resolution::Scalar(value) => value.unwrap_or(Value::Null),
            Resolution::List(items) => Value::List(items.into_iter().flatten().collect()),
            Resolution::Handler(value) => value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::callable::BindCallable;
    use crate::bind::directive::BindDirectiveArgs;
    use crate::bind::registry::BinderRegistry;
    use crate::bind::spec::SpecValidator;
    use crate::error::GraphbindError;
    use crate::store::{MemoryStore, ModelDef};
    use async_graphql::value;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn user_model() -> ModelDef {
        ModelDef {
            name: "User".to_string(),
            table: "users".to_string(),
            primary_key: "id".to_string(),
            relations: vec![],
        }
    }

    fn store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new().with_table(
            "users",
            vec![
                value!({"id": "1", "name": "Alice", "email": "shared@acme.test"}),
                value!({"id": "2", "name": "Bob", "email": "shared@acme.test"}),
            ],
        ))
    }

    fn record_spec(args: BindDirectiveArgs) -> Arc<BindingSpec> {
        let mut registry = BinderRegistry::new();
        registry.register_model(user_model());
        Arc::new(
            SpecValidator::new(&registry)
                .validate(&args, "id", "user")
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_check_then_transform_looks_up_once() {
        let store = store();
        let orchestrator = BindingOrchestrator::new(store.clone());
        let binding = ArgumentBinding::new(record_spec(BindDirectiveArgs::new("User")), "id");
        let raw = Value::String("1".to_string());

        let violations = orchestrator.check(&binding, &raw).await.unwrap();
        assert!(violations.is_empty());

        let bound = orchestrator.transform(&binding, &raw).await.unwrap();
        let Value::Object(obj) = bound else {
            panic!("Expected bound object");
        };
        assert_eq!(obj.get("name").unwrap(), &Value::String("Alice".to_string()));

        assert_eq!(store.lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_required_miss_reports_argument_path() {
        let store = store();
        let orchestrator = BindingOrchestrator::new(store);
        let binding = ArgumentBinding::new(record_spec(BindDirectiveArgs::new("User")), "id");

        let violations = orchestrator
            .check(&binding, &Value::String("99".to_string()))
            .await
            .unwrap();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "id");
        assert_eq!(violations[0].rule, RULE_EXISTS);
    }

    #[tokio::test]
    async fn test_optional_miss_transforms_to_null_without_check() {
        let store = store();
        let orchestrator = BindingOrchestrator::new(store.clone());
        let binding = ArgumentBinding::new(
            record_spec(BindDirectiveArgs::new("User").optional()),
            "id",
        );
        let raw = Value::String("99".to_string());

        // No validation rule registered for optional bindings.
        let violations = orchestrator.check(&binding, &raw).await.unwrap();
        assert!(violations.is_empty());
        assert_eq!(store.lookup_count(), 0);

        // Transform performs the resolution itself.
        let bound = orchestrator.transform(&binding, &raw).await.unwrap();
        assert_eq!(bound, Value::Null);
        assert_eq!(store.lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_required_list_miss_reports_positions() {
        let store = store();
        let orchestrator = BindingOrchestrator::new(store);
        let binding = ArgumentBinding::new(record_spec(BindDirectiveArgs::new("User")), "ids");
        let raw = Value::List(vec![
            Value::String("1".to_string()),
            Value::String("99".to_string()),
        ]);

        let violations = orchestrator.check(&binding, &raw).await.unwrap();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "ids.1");
    }

    #[tokio::test]
    async fn test_optional_list_drops_misses_in_order() {
        let store = store();
        let orchestrator = BindingOrchestrator::new(store);
        let binding = ArgumentBinding::new(
            record_spec(BindDirectiveArgs::new("User").optional()),
            "ids",
        );
        let raw = Value::List(vec![
            Value::String("99".to_string()),
            Value::String("1".to_string()),
            Value::String("2".to_string()),
        ]);

        let bound = orchestrator.transform(&binding, &raw).await.unwrap();
        let Value::List(items) = bound else {
            panic!("Expected list");
        };
        assert_eq!(items.len(), 2);
        let names: Vec<_> = items
            .iter()
            .map(|item| {
                let Value::Object(obj) = item else {
                    panic!("Expected object");
                };
                obj.get("name").unwrap().clone()
            })
            .collect();
        assert_eq!(
            names,
            vec![
                Value::String("Alice".to_string()),
                Value::String("Bob".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_ambiguous_is_an_error_not_a_violation() {
        let store = store();
        let orchestrator = BindingOrchestrator::new(store);
        let binding = ArgumentBinding::new(
            record_spec(BindDirectiveArgs::new("User").column("email")),
            "email",
        );

        let err = orchestrator
            .check(&binding, &Value::String("shared@acme.test".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphbindError::AmbiguousMatch { count: 2, .. }));
    }

    struct CountingHandler {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl BindCallable for CountingHandler {
        async fn bind(&self, value: &Value, _spec: &BindingSpec) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GraphbindError::Handler {
                    handler: "CountingHandler".to_string(),
                    message: "nope".to_string(),
                });
            }
            Ok(value!({ "echo": value.clone() }))
        }
    }

    fn callable_spec(handler: Arc<CountingHandler>, required: bool) -> Arc<BindingSpec> {
        let mut registry = BinderRegistry::new();
        registry.register_handler("Echo", handler);
        let mut args = BindDirectiveArgs::new("Echo");
        if !required {
            args = args.optional();
        }
        Arc::new(
            SpecValidator::new(&registry)
                .validate(&args, "query", "search")
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_callable_invoked_once_and_unreinterpreted() {
        let handler = Arc::new(CountingHandler {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let store = store();
        let orchestrator = BindingOrchestrator::new(store);
        let binding = ArgumentBinding::new(callable_spec(handler.clone(), true), "query");
        let raw = Value::String("anything".to_string());

        // Required callable binding never emits violations; the handler owns
        // missing-value semantics.
        let violations = orchestrator.check(&binding, &raw).await.unwrap();
        assert!(violations.is_empty());

        let bound = orchestrator.transform(&binding, &raw).await.unwrap();
        let Value::Object(obj) = bound else {
            panic!("Expected handler object");
        };
        assert_eq!(obj.get("echo").unwrap(), &raw);

        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_handler_fault_propagates_unchanged() {
        let handler = Arc::new(CountingHandler {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let store = store();
        let orchestrator = BindingOrchestrator::new(store);
        let binding = ArgumentBinding::new(callable_spec(handler, true), "query");

        let err = orchestrator
            .check(&binding, &Value::String("anything".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphbindError::Handler { .. }));
    }
}
