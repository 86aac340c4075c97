/// Record store abstraction
///
/// Binding resolution talks to persistent storage through a single narrow
/// contract: `find_by_column`. One call covers scalar and list bindings (the
/// caller passes every candidate value at once) and carries the eager-load
/// list, so an implementation can batch everything into as few queries as
/// possible.

mod datafusion;
mod memory;
mod row;

pub use self::datafusion::DataFusionStore;
pub use memory::MemoryStore;
pub use row::{lookup_key, record_batch_to_value, sql_literal};

use crate::error::Result;
use async_graphql::Value;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// How a relation connects to its parent model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// The parent row holds a foreign key pointing at the related row.
    BelongsTo,
    /// Related rows hold a foreign key pointing back at the parent row.
    HasMany,
}

/// A named relation that can be eager-loaded alongside a lookup.
#[derive(Debug, Clone)]
pub struct RelationDef {
    pub name: String,
    pub kind: RelationKind,
    /// GraphQL type name of the related model.
    pub model: String,
    /// Table holding the related rows.
    pub table: String,
    /// Foreign key column; lives on the parent for `BelongsTo`, on the
    /// related table for `HasMany`.
    pub foreign_key: String,
    /// Column the foreign key references; the related table's key for
    /// `BelongsTo`, the parent's key for `HasMany`.
    pub owner_key: String,
}

/// Storage metadata for one record model.
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// GraphQL type name (PascalCase).
    pub name: String,
    /// Backing table name.
    pub table: String,
    pub primary_key: String,
    pub relations: Vec<RelationDef>,
}

impl ModelDef {
    pub fn relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|r| r.name == name)
    }
}

/// The lookup contract binding resolution depends on.
///
/// Returned rows are `Value::Object`s keyed by column name, with each
/// requested relation attached under its relation name (`Value::Object` for
/// `BelongsTo`, `Value::List` for `HasMany`). Implementations must not issue
/// one query per value or per row; values are batched into a single lookup
/// and eager loads into at most one extra query per relation.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_by_column(
        &self,
        model: &ModelDef,
        column: &str,
        values: &[Value],
        eager: &[String],
    ) -> Result<Vec<Value>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with_relation() -> ModelDef {
        ModelDef {
            name: "User".to_string(),
            table: "users".to_string(),
            primary_key: "id".to_string(),
            relations: vec![RelationDef {
                name: "company".to_string(),
                kind: RelationKind::BelongsTo,
                model: "Company".to_string(),
                table: "companies".to_string(),
                foreign_key: "company_id".to_string(),
                owner_key: "id".to_string(),
            }],
        }
    }

    #[test]
    fn test_relation_lookup_by_name() {
        let model = model_with_relation();
        assert!(model.relation("company").is_some());
        assert!(model.relation("posts").is_none());
    }

    #[test]
    fn test_relation_kind_serde_names() {
        let kind: RelationKind = serde_json::from_str("\"belongs_to\"").unwrap();
        assert_eq!(kind, RelationKind::BelongsTo);
        let kind: RelationKind = serde_json::from_str("\"has_many\"").unwrap();
        assert_eq!(kind, RelationKind::HasMany);
    }
}
