/// DataFusion-backed record store
///
/// Tables (CSV for testing, Delta for production) are registered into a
/// shared `SessionContext`. A binding lookup becomes one `IN`-list query;
/// each eager-loaded relation adds at most one more batched query, never one
/// per row.

use crate::error::{GraphbindError, Result};
use crate::store::row::{lookup_key, record_batch_to_value, sql_literal};
use crate::store::{ModelDef, RecordStore, RelationDef, RelationKind};

use async_graphql::{Name, Value};
use async_trait::async_trait;
use datafusion::arrow::datatypes::Schema as ArrowSchema;
use datafusion::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub struct DataFusionStore {
    ctx: SessionContext,
}

impl DataFusionStore {
    pub fn new() -> Self {
        Self {
            ctx: SessionContext::new(),
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.ctx
    }

    /// Register a table from a file path (CSV for testing, Delta otherwise).
    pub async fn register_table_from_path(&self, name: &str, path: &str) -> Result<()> {
        if path.ends_with(".csv") {
            self.ctx
                .register_csv(name, path, CsvReadOptions::default())
                .await
                .map_err(|e| {
                    GraphbindError::Store(format!("Failed to register CSV '{}': {}", path, e))
                })?;
        } else {
            let delta_table = deltalake::open_table(path).await.map_err(|e| {
                GraphbindError::Store(format!("Failed to open Delta table '{}': {}", path, e))
            })?;

            self.ctx
                .register_table(name, Arc::new(delta_table))
                .map_err(|e| {
                    GraphbindError::Store(format!(
                        "Failed to register Delta table '{}': {}",
                        name, e
                    ))
                })?;
        }

        Ok(())
    }

    /// Arrow schema of a registered table, used for GraphQL type generation.
    pub async fn table_schema(&self, table: &str) -> Result<ArrowSchema> {
        let provider = self.ctx.table_provider(table).await.map_err(|e| {
            GraphbindError::Store(format!("Failed to get table provider for '{}': {}", table, e))
        })?;
        Ok(provider.schema().as_ref().clone())
    }

    async fn query_rows(&self, sql: &str) -> Result<Vec<Value>> {
        tracing::debug!("Executing query: {}", sql);

        let df = self.ctx.sql(sql).await?;
        let batches = df.collect().await?;

        let mut rows = Vec::new();
        for batch in batches {
            for row_idx in 0..batch.num_rows() {
                rows.push(record_batch_to_value(&batch, row_idx)?);
            }
        }
        Ok(rows)
    }

    /// One batched query attaching `rel` to every row in place.
    async fn load_relation(&self, rows: &mut [Value], rel: &RelationDef) -> Result<()> {
        // Column on the parent side whose values drive the relation query.
        let parent_column = match rel.kind {
            RelationKind::BelongsTo => rel.foreign_key.as_str(),
            RelationKind::HasMany => rel.owner_key.as_str(),
        };

        let mut seen = HashSet::new();
        let mut literals = Vec::new();
        for row in rows.iter() {
            let Value::Object(obj) = row else { continue };
            let Some(value) = obj.get(parent_column) else {
                continue;
            };
            if let Some(key) = lookup_key(value) {
                if seen.insert(key) {
                    literals.push(sql_literal(value));
                }
            }
        }

        let related_column = match rel.kind {
            RelationKind::BelongsTo => rel.owner_key.as_str(),
            RelationKind::HasMany => rel.foreign_key.as_str(),
        };

        let related = if literals.is_empty() {
            Vec::new()
        } else {
            let sql = format!(
                "SELECT * FROM \"{}\" WHERE \"{}\" IN ({})",
                rel.table,
                related_column,
                literals.join(", ")
            );
            self.query_rows(&sql).await?
        };

        match rel.kind {
            RelationKind::BelongsTo => {
                let mut by_key: HashMap<String, Value> = HashMap::new();
                for row in related {
                    if let Value::Object(obj) = &row {
                        if let Some(key) = obj.get(related_column).and_then(lookup_key) {
                            by_key.insert(key, row.clone());
                        }
                    }
                }
                for row in rows.iter_mut() {
                    let Value::Object(obj) = row else { continue };
                    let attached = obj
                        .get(parent_column)
                        .and_then(lookup_key)
                        .and_then(|key| by_key.get(&key).cloned())
                        .unwrap_or(Value::Null);
                    obj.insert(Name::new(&rel.name), attached);
                }
            }
            RelationKind::HasMany => {
                let mut by_key: HashMap<String, Vec<Value>> = HashMap::new();
                for row in related {
                    if let Value::Object(obj) = &row {
                        if let Some(key) = obj.get(related_column).and_then(lookup_key) {
                            by_key.entry(key).or_default().push(row.clone());
                        }
                    }
                }
                for row in rows.iter_mut() {
                    let Value::Object(obj) = row else { continue };
                    let children = obj
                        .get(parent_column)
                        .and_then(lookup_key)
                        .and_then(|key| by_key.get(&key).cloned())
                        .unwrap_or_default();
                    obj.insert(Name::new(&rel.name), Value::List(children));
                }
            }
        }

        Ok(())
    }
}

impl Default for DataFusionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for DataFusionStore {
    async fn find_by_column(
        &self,
        model: &ModelDef,
        column: &str,
        values: &[Value],
        eager: &[String],
    ) -> Result<Vec<Value>> {
        let mut seen = HashSet::new();
        let mut literals = Vec::new();
        for value in values {
            if let Some(key) = lookup_key(value) {
                if seen.insert(key) {
                    literals.push(sql_literal(value));
                }
            }
        }

        if literals.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT * FROM \"{}\" WHERE \"{}\" IN ({})",
            model.table,
            column,
            literals.join(", ")
        );
        let mut rows = self.query_rows(&sql).await?;

        for name in eager {
            match model.relation(name) {
                Some(rel) => self.load_relation(&mut rows, rel).await?,
                None => {
                    tracing::warn!(
                        "Model '{}' has no relation '{}', skipping eager load",
                        model.name,
                        name
                    );
                }
            }
        }

        Ok(rows)
    }
}
