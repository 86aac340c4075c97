/// Argument binding engine
///
/// Implements the `@bind` schema directive: resolving a raw argument value
/// (scalar or list) into a record looked up by column, or whatever a
/// registered handler returns. Split into the frozen per-annotation
/// `BindingSpec`, the per-occurrence `BindingMemo`, the record and callable
/// binders, and the `BindingOrchestrator` that unifies the validation and
/// transform phases.

mod callable;
mod directive;
mod memo;
mod orchestrator;
mod record;
mod registry;
mod spec;

pub use callable::BindCallable;
pub use directive::{BindDirectiveArgs, DIRECTIVE_NAME, DIRECTIVE_SDL};
pub use memo::{BindingMemo, Resolution};
pub use orchestrator::{ArgumentBinding, BindingOrchestrator, BindingViolation, RULE_EXISTS};
pub use record::RecordBinder;
pub use registry::{BinderRegistry, BinderTarget};
pub use spec::{BindingSpec, SpecValidator};
