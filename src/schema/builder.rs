/// GraphQL schema builder
///
/// Generates a dynamic schema from the configured models and bindings. Every
/// `@bind` annotation is validated against the binder registry while the
/// schema is being built; a single bad annotation aborts the build, so no
/// requests are ever served against an invalid schema.

use crate::bind::{
    ArgumentBinding, BindCallable, BinderRegistry, BindDirectiveArgs, BindingOrchestrator,
    BindingSpec, BindingViolation, BinderTarget, SpecValidator,
};
use crate::config::{BindingConfig, ModelConfig};
use crate::error::{GraphbindError, Result};
use crate::schema::scalars::{register_custom_scalars, SCALAR_NAMES};
use crate::schema::type_mapping::arrow_to_graphql_type;
use crate::store::{DataFusionStore, ModelDef, RecordStore, RelationKind};

use async_graphql::dynamic::{
    Field, FieldFuture, FieldValue, InputValue, Object, ResolverContext, Schema, TypeRef,
};
use async_graphql::{ErrorExtensions, Name, Value};
use datafusion::arrow::datatypes::Schema as ArrowSchema;
use indexmap::IndexMap;
use std::sync::Arc;

pub struct SchemaBuilder {
    store: Arc<DataFusionStore>,
    registry: BinderRegistry,
}

impl SchemaBuilder {
    pub fn new(store: Arc<DataFusionStore>) -> Self {
        Self {
            store,
            registry: BinderRegistry::new(),
        }
    }

    /// Register a callable bind handler before building.
    pub fn register_handler(&mut self, name: impl Into<String>, handler: Arc<dyn BindCallable>) {
        self.registry.register_handler(name, handler);
    }

    pub fn registry(&self) -> &BinderRegistry {
        &self.registry
    }

    /// Build the complete GraphQL schema.
    ///
    /// Validates every model and binding, freezes one `BindingSpec` per
    /// annotation, and wires each bound query field to the binding
    /// validation/transform pipeline.
    pub async fn build_schema(
        &mut self,
        models: &[ModelConfig],
        bindings: &[BindingConfig],
    ) -> Result<Schema> {
        if bindings.is_empty() {
            return Err(GraphbindError::SchemaGeneration(
                "No bindings provided; the Query type would be empty".to_string(),
            ));
        }

        let mut defs: Vec<(Arc<ModelDef>, Option<String>)> = Vec::with_capacity(models.len());
        for model in models {
            model.validate().map_err(|e| {
                GraphbindError::Config(format!("Invalid model '{}': {}", model.name, e))
            })?;
            let def = self.registry.register_model(model.to_def(models)?);
            defs.push((def, model.description.clone()));
        }

        self.registry.register_type("Query");
        for scalar in SCALAR_NAMES {
            self.registry.register_type(*scalar);
        }

        // Validate every annotation before touching any table; a bad spec
        // must stop schema activation.
        let mut query = Object::new("Query");
        for binding in bindings {
            binding.validate().map_err(GraphbindError::Config)?;

            let mut directive = BindDirectiveArgs::new(&binding.class)
                .column(&binding.column)
                .with(binding.with.clone());
            if !binding.required {
                directive = directive.optional();
            }

            let spec = SpecValidator::new(&self.registry).validate(
                &directive,
                &binding.argument,
                &binding.field,
            )?;

            let returns = match (&binding.returns, &spec.target) {
                (Some(name), _) => name.clone(),
                (None, BinderTarget::Record(model)) => model.name.clone(),
                (None, BinderTarget::Callable(_)) => {
                    return Err(GraphbindError::SchemaGeneration(format!(
                        "Binding '{}' uses handler '{}' and must declare 'returns'",
                        binding.field, binding.class
                    )))
                }
            };

            tracing::info!(
                "Registering bound field: {}({}: @bind(class: \"{}\"))",
                binding.field,
                binding.argument,
                binding.class
            );

            query = query.field(create_bound_field(
                &binding.field,
                &returns,
                binding.argument.clone(),
                binding.list,
                Arc::new(spec),
                self.store.clone(),
            ));
        }

        let mut schema_builder = Schema::build(query.type_name(), None, None);

        for scalar in register_custom_scalars() {
            schema_builder = schema_builder.register(scalar);
        }

        for (def, description) in &defs {
            let arrow_schema = self.store.table_schema(&def.table).await?;
            let object_type = build_model_type(def, &arrow_schema, description.as_deref());
            schema_builder = schema_builder.register(object_type);
        }

        schema_builder
            .register(query)
            .finish()
            .map_err(|e| GraphbindError::SchemaGeneration(format!("Failed to build schema: {}", e)))
    }
}

/// Query field whose resolver runs the binding pipeline.
///
/// Required bindings are checked first; any violation turns into a
/// field-level validation error and the bound value is never produced.
/// Otherwise the transform result (reusing the check's resolution) becomes
/// the field value.
fn create_bound_field(
    name: &str,
    returns: &str,
    argument: String,
    list: bool,
    spec: Arc<BindingSpec>,
    store: Arc<DataFusionStore>,
) -> Field {
    let type_ref = match (list, spec.required) {
        (true, _) => TypeRef::named_nn_list_nn(returns),
        (false, true) => TypeRef::named_nn(returns),
        (false, false) => TypeRef::named(returns),
    };
    let arg_type = if list {
        TypeRef::named_nn_list_nn(TypeRef::ID)
    } else {
        TypeRef::named_nn(TypeRef::ID)
    };
    let input_name = argument.clone();

    Field::new(name, type_ref, move |ctx: ResolverContext| {
        let spec = spec.clone();
        let store: Arc<dyn RecordStore> = store.clone();
        let argument = argument.clone();

        FieldFuture::new(async move {
            let raw: Value = match ctx.args.try_get(&argument) {
                Ok(accessor) => accessor.deserialize().map_err(|e| {
                    async_graphql::Error::new(format!(
                        "Failed to read argument '{}': {}",
                        argument, e.message
                    ))
                })?,
                Err(_) => Value::Null,
            };

            let binding = ArgumentBinding::new(spec.clone(), argument.clone());
            let orchestrator = BindingOrchestrator::new(store);

            if spec.required {
                let violations = orchestrator
                    .check(&binding, &raw)
                    .await
                    .map_err(|e| async_graphql::Error::new(e.to_string()))?;
                if !violations.is_empty() {
                    return Err(validation_error(violations));
                }
            }

            let bound = orchestrator
                .transform(&binding, &raw)
                .await
                .map_err(|e| async_graphql::Error::new(e.to_string()))?;

            if list {
                match bound {
                    Value::List(items) => Ok(Some(FieldValue::list(
                        items.into_iter().map(FieldValue::owned_any),
                    ))),
                    Value::Null => Ok(Some(FieldValue::list(Vec::<FieldValue>::new()))),
                    _ => Err(async_graphql::Error::new("Bound value is not a list")),
                }
            } else {
                match bound {
                    Value::Null => Ok(None),
                    value => Ok(Some(FieldValue::owned_any(value))),
                }
            }
        })
    })
    .argument(InputValue::new(input_name, arg_type))
}

/// Field error carrying the per-path validation messages.
fn validation_error(violations: Vec<BindingViolation>) -> async_graphql::Error {
    let mut map = IndexMap::new();
    for violation in violations {
        map.insert(
            Name::new(&violation.path),
            Value::List(vec![Value::String(violation.message)]),
        );
    }
    async_graphql::Error::new("Validation failed for the given input.")
        .extend_with(|_, ext| ext.set("validation", Value::Object(map)))
}

/// GraphQL object type for one model: table columns plus relation fields.
fn build_model_type(
    def: &ModelDef,
    arrow_schema: &ArrowSchema,
    description: Option<&str>,
) -> Object {
    let mut object = Object::new(&def.name);

    if let Some(desc) = description {
        object = object.description(desc);
    }

    for field in arrow_schema.fields() {
        if let Some(type_ref) =
            arrow_to_graphql_type(field.name(), field.data_type(), field.is_nullable())
        {
            let field_name = field.name().to_string();
            let field_name_for_closure = field_name.clone();

            object = object.field(Field::new(field_name, type_ref, move |ctx| {
                let field_name = field_name_for_closure.clone();
                FieldFuture::new(async move {
                    let parent = ctx.parent_value.try_downcast_ref::<Value>()?;
                    if let Value::Object(obj) = parent {
                        if let Some(value) = obj.get(field_name.as_str()) {
                            return Ok(Some(FieldValue::value(value.clone())));
                        }
                    }
                    Ok(Some(FieldValue::NULL))
                })
            }));
        }
    }

    // Relation fields read the eager-loaded value; nothing is lazily fetched
    // here, a relation that was not in the binding's `with` list stays null.
    for rel in &def.relations {
        let rel_name = rel.name.clone();
        let rel_name_for_closure = rel_name.clone();

        match rel.kind {
            RelationKind::BelongsTo => {
                object = object.field(Field::new(
                    rel_name,
                    TypeRef::named(&rel.model),
                    move |ctx| {
                        let rel_name = rel_name_for_closure.clone();
                        FieldFuture::new(async move {
                            let parent = ctx.parent_value.try_downcast_ref::<Value>()?;
                            if let Value::Object(obj) = parent {
                                if let Some(value @ Value::Object(_)) = obj.get(rel_name.as_str())
                                {
                                    return Ok(Some(FieldValue::owned_any(value.clone())));
                                }
                            }
                            Ok(None)
                        })
                    },
                ));
            }
            RelationKind::HasMany => {
                object = object.field(Field::new(
                    rel_name,
                    TypeRef::named_nn_list(&rel.model),
                    move |ctx| {
                        let rel_name = rel_name_for_closure.clone();
                        FieldFuture::new(async move {
                            let parent = ctx.parent_value.try_downcast_ref::<Value>()?;
                            if let Value::Object(obj) = parent {
                                if let Some(Value::List(items)) = obj.get(rel_name.as_str()) {
                                    let children: Vec<FieldValue> = items
                                        .iter()
                                        .cloned()
                                        .map(FieldValue::owned_any)
                                        .collect();
                                    return Ok(Some(FieldValue::list(children)));
                                }
                            }
                            Ok(None)
                        })
                    },
                ));
            }
        }
    }

    object
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_model() -> ModelConfig {
        ModelConfig {
            name: "User".to_string(),
            table: "users".to_string(),
            primary_key: "id".to_string(),
            description: None,
            storage_location: None,
            relation: vec![],
        }
    }

    fn binding(class: &str) -> BindingConfig {
        BindingConfig {
            field: "user".to_string(),
            argument: "id".to_string(),
            class: class.to_string(),
            column: "id".to_string(),
            with: vec![],
            required: true,
            list: false,
            returns: None,
        }
    }

    #[tokio::test]
    async fn test_unknown_class_aborts_build() {
        let store = Arc::new(DataFusionStore::new());
        let mut builder = SchemaBuilder::new(store);

        let err = builder
            .build_schema(&[user_model()], &[binding("Ghost")])
            .await
            .unwrap_err();

        assert!(err.is_definition_error());
        assert!(err.to_string().contains("Ghost"));
    }

    #[tokio::test]
    async fn test_scalar_class_is_wrong_kind() {
        let store = Arc::new(DataFusionStore::new());
        let mut builder = SchemaBuilder::new(store);

        let err = builder
            .build_schema(&[user_model()], &[binding("Date")])
            .await
            .unwrap_err();

        assert!(matches!(err, GraphbindError::InvalidBinderClass { .. }));
    }

    #[tokio::test]
    async fn test_empty_bindings_rejected() {
        let store = Arc::new(DataFusionStore::new());
        let mut builder = SchemaBuilder::new(store);

        let err = builder.build_schema(&[user_model()], &[]).await.unwrap_err();
        assert!(matches!(err, GraphbindError::SchemaGeneration(_)));
    }

    #[tokio::test]
    async fn test_handler_binding_requires_returns() {
        use async_trait::async_trait;

        struct NullHandler;

        #[async_trait]
        impl BindCallable for NullHandler {
            async fn bind(&self, _value: &Value, _spec: &BindingSpec) -> Result<Value> {
                Ok(Value::Null)
            }
        }

        let store = Arc::new(DataFusionStore::new());
        let mut builder = SchemaBuilder::new(store);
        builder.register_handler("Finder", Arc::new(NullHandler));

        let err = builder
            .build_schema(&[user_model()], &[binding("Finder")])
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("returns"));
    }
}
