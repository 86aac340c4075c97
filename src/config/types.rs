use crate::error::{GraphbindError, Result};
use crate::store::{ModelDef, RelationDef, RelationKind};

use serde::{Deserialize, Serialize};

/// Top-level configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub model: Vec<ModelConfig>,
    #[serde(default)]
    pub binding: Vec<BindingConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to bind the server to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Interface to bind the server to
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_port() -> u16 {
    4000
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

/// One record model backed by a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// GraphQL type name (PascalCase)
    pub name: String,

    /// Backing table name
    pub table: String,

    /// Primary key column name
    #[serde(default = "default_primary_key")]
    pub primary_key: String,

    /// Optional description for GraphQL schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Optional storage location (e.g., s3://bucket/path, ./data/users.csv)
    /// If not provided, the table name is used as the path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_location: Option<String>,

    /// Relations available for eager loading
    #[serde(default)]
    pub relation: Vec<RelationConfig>,
}

fn default_primary_key() -> String {
    "id".to_string()
}

/// One eager-loadable relation on a model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationConfig {
    pub name: String,
    pub kind: RelationKind,

    /// Related model name
    pub model: String,

    pub foreign_key: String,

    /// Column the foreign key references; defaults to the related model's
    /// primary key (belongs_to) or this model's primary key (has_many)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_key: Option<String>,
}

/// One `@bind`-annotated query field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Query field name
    pub field: String,

    /// Annotated argument name
    pub argument: String,

    /// Record model or registered handler name
    pub class: String,

    /// Lookup column, record bindings only
    #[serde(default = "default_primary_key")]
    pub column: String,

    /// Relations to eager-load, record bindings only
    #[serde(default)]
    pub with: Vec<String>,

    #[serde(default = "default_required")]
    pub required: bool,

    /// Whether the argument is a list of values
    #[serde(default)]
    pub list: bool,

    /// GraphQL return type; defaults to the model name for record bindings,
    /// required for handler bindings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
}

fn default_required() -> bool {
    true
}

impl ModelConfig {
    /// Validate model configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.table.is_empty() {
            return Err(format!("Model '{}' has an empty table name", self.name));
        }

        // Validate GraphQL name (PascalCase, alphanumeric)
        if !self.name.chars().all(|c| c.is_alphanumeric()) {
            return Err(format!("Model name '{}' must be alphanumeric", self.name));
        }

        if !self.name.chars().next().unwrap_or('_').is_uppercase() {
            return Err(format!(
                "Model name '{}' must start with uppercase letter (PascalCase)",
                self.name
            ));
        }

        for relation in &self.relation {
            if relation.name.is_empty() || relation.foreign_key.is_empty() {
                return Err(format!(
                    "Model '{}' has a relation with an empty name or foreign key",
                    self.name
                ));
            }
        }

        Ok(())
    }

    /// Resolve into a `ModelDef`, looking related models up by name.
    pub fn to_def(&self, models: &[ModelConfig]) -> Result<ModelDef> {
        let mut relations = Vec::with_capacity(self.relation.len());
        for relation in &self.relation {
            let related = models
                .iter()
                .find(|m| m.name == relation.model)
                .ok_or_else(|| {
                    GraphbindError::Config(format!(
                        "Relation '{}' on model '{}' references unknown model '{}'",
                        relation.name, self.name, relation.model
                    ))
                })?;

            let owner_key = relation.owner_key.clone().unwrap_or_else(|| match relation.kind {
                RelationKind::BelongsTo => related.primary_key.clone(),
                RelationKind::HasMany => self.primary_key.clone(),
            });

            relations.push(RelationDef {
                name: relation.name.clone(),
                kind: relation.kind,
                model: related.name.clone(),
                table: related.table.clone(),
                foreign_key: relation.foreign_key.clone(),
                owner_key,
            });
        }

        Ok(ModelDef {
            name: self.name.clone(),
            table: self.table.clone(),
            primary_key: self.primary_key.clone(),
            relations,
        })
    }
}

impl BindingConfig {
    /// Validate binding configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.field.is_empty() {
            return Err("Binding has an empty field name".to_string());
        }
        if self.argument.is_empty() {
            return Err(format!("Binding '{}' has an empty argument name", self.field));
        }
        if self.class.is_empty() {
            return Err(format!("Binding '{}' has an empty class", self.field));
        }
        Ok(())
    }
}
