pub mod bind;
pub mod config;
pub mod error;
pub mod schema;
pub mod store;

// Re-export commonly used types
pub use bind::{
    ArgumentBinding, BindCallable, BindDirectiveArgs, BinderRegistry, BinderTarget, BindingMemo,
    BindingOrchestrator, BindingSpec, BindingViolation, RecordBinder, Resolution, SpecValidator,
    DIRECTIVE_NAME, DIRECTIVE_SDL,
};
pub use config::{BindingConfig, Config, ModelConfig, RelationConfig, ServerConfig};
pub use error::{GraphbindError, Result};
pub use schema::SchemaBuilder;
pub use store::{DataFusionStore, MemoryStore, ModelDef, RecordStore, RelationDef, RelationKind};
