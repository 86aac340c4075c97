use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphbindError {
    #[error("@bind on '{argument}' of '{parent}': class '{class}' is not a registered type")]
    UnknownBinderClass {
        class: String,
        argument: String,
        parent: String,
    },

    #[error("@bind on '{argument}' of '{parent}': '{class}' is neither a record model nor a bind handler")]
    InvalidBinderClass {
        class: String,
        argument: String,
        parent: String,
    },

    #[error("@bind directive error: {0}")]
    Directive(String),

    #[error("ambiguous binding: {count} rows match {column} = {value}")]
    AmbiguousMatch {
        column: String,
        value: String,
        count: usize,
    },

    #[error("bind handler '{handler}' failed: {message}")]
    Handler { handler: String, message: String },

    #[error("record store error: {0}")]
    Store(String),

    #[error("Delta table error: {0}")]
    DeltaTable(#[from] deltalake::DeltaTableError),

    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schema generation error: {0}")]
    SchemaGeneration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GraphbindError {
    /// Load-time errors that must abort schema activation.
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self,
            GraphbindError::UnknownBinderClass { .. }
                | GraphbindError::InvalidBinderClass { .. }
                | GraphbindError::Directive(_)
        )
    }
}

impl From<toml::de::Error> for GraphbindError {
    fn from(err: toml::de::Error) -> Self {
        GraphbindError::Config(format!("TOML parse error: {}", err))
    }
}

impl From<toml::ser::Error> for GraphbindError {
    fn from(err: toml::ser::Error) -> Self {
        GraphbindError::Serialization(format!("TOML serialization error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, GraphbindError>;
