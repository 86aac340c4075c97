/// The `@bind` directive surface
///
/// Parses the raw directive arguments a schema parser hands over into a
/// `BindDirectiveArgs`, applying the declared defaults. Spec validation and
/// binder-kind resolution happen later, against the registry.

use crate::error::{GraphbindError, Result};

use async_graphql::{Name, Value};
use indexmap::IndexMap;

pub const DIRECTIVE_NAME: &str = "bind";

/// Canonical SDL definition for hosts that register the directive.
pub const DIRECTIVE_SDL: &str = "directive @bind(class: String!, column: String! = \"id\", \
     with: [String!]! = [], required: Boolean! = true) \
     on ARGUMENT_DEFINITION | INPUT_FIELD_DEFINITION";

#[derive(Debug, Clone)]
pub struct BindDirectiveArgs {
    /// Name of a record model or a registered bind handler.
    pub class: String,
    /// Lookup column, record bindings only.
    pub column: String,
    /// Relation names to eager-load, record bindings only.
    pub with: Vec<String>,
    /// Whether resolution failure is a validation error.
    pub required: bool,
}

impl BindDirectiveArgs {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            column: "id".to_string(),
            with: Vec::new(),
            required: true,
        }
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn with(mut self, relations: Vec<String>) -> Self {
        self.with = relations;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Parse directive arguments as they appear on a schema element.
    pub fn from_args(args: &IndexMap<Name, Value>) -> Result<Self> {
        let class = match args.get("class") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(_) => {
                return Err(GraphbindError::Directive(
                    "'class' must be a non-empty String".to_string(),
                ))
            }
            None => {
                return Err(GraphbindError::Directive(
                    "missing required argument 'class'".to_string(),
                ))
            }
        };

        let mut parsed = Self::new(class);

        match args.get("column") {
            Some(Value::String(s)) => parsed.column = s.clone(),
            Some(_) => {
                return Err(GraphbindError::Directive(
                    "'column' must be a String".to_string(),
                ))
            }
            None => {}
        }

        match args.get("with") {
            Some(Value::List(items)) => {
                let mut with = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => with.push(s.clone()),
                        _ => {
                            return Err(GraphbindError::Directive(
                                "'with' must be a list of Strings".to_string(),
                            ))
                        }
                    }
                }
                parsed.with = with;
            }
            Some(_) => {
                return Err(GraphbindError::Directive(
                    "'with' must be a list of Strings".to_string(),
                ))
            }
            None => {}
        }

        match args.get("required") {
            Some(Value::Boolean(b)) => parsed.required = *b,
            Some(_) => {
                return Err(GraphbindError::Directive(
                    "'required' must be a Boolean".to_string(),
                ))
            }
            None => {}
        }

        Ok(parsed)
    }
}
