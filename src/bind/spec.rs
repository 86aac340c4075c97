/// Binding spec construction and schema-load validation
///
/// A `BindingSpec` is the frozen form of one `@bind` annotation: directive
/// arguments plus the binder target resolved from the registry. It is built
/// exactly once per annotated schema element, at schema build time, and any
/// failure aborts schema activation before a single request is served.

use crate::bind::directive::BindDirectiveArgs;
use crate::bind::registry::{BinderRegistry, BinderTarget};
use crate::error::{GraphbindError, Result};

/// Immutable configuration for one annotated argument or input field.
#[derive(Debug, Clone)]
pub struct BindingSpec {
    /// The literal `class` string from the directive.
    pub identity: String,
    pub column: String,
    pub eager_load: Vec<String>,
    pub required: bool,
    /// Record model or callable handler, resolved once.
    pub target: BinderTarget,
}

impl BindingSpec {
    pub fn is_record_binding(&self) -> bool {
        matches!(self.target, BinderTarget::Record(_))
    }
}

/// Checks `@bind` annotations against the registry at schema build time.
pub struct SpecValidator<'a> {
    registry: &'a BinderRegistry,
}

impl<'a> SpecValidator<'a> {
    pub fn new(registry: &'a BinderRegistry) -> Self {
        Self { registry }
    }

    /// Validate one annotation and freeze its spec.
    ///
    /// `argument` is the annotated argument or input field, `parent` the
    /// field or input type carrying it; both only feed error messages.
    pub fn validate(
        &self,
        args: &BindDirectiveArgs,
        argument: &str,
        parent: &str,
    ) -> Result<BindingSpec> {
        match self.registry.target(&args.class) {
            Some(target) => Ok(BindingSpec {
                identity: args.class.clone(),
                column: args.column.clone(),
                eager_load: args.with.clone(),
                required: args.required,
                target,
            }),
            None if self.registry.knows(&args.class) => {
                Err(GraphbindError::InvalidBinderClass {
                    class: args.class.clone(),
                    argument: argument.to_string(),
                    parent: parent.to_string(),
                })
            }
            None => Err(GraphbindError::UnknownBinderClass {
                class: args.class.clone(),
                argument: argument.to_string(),
                parent: parent.to_string(),
            }),
        }
    }
}
