/// In-memory record store
///
/// Table fixtures held as plain `Value::Object` rows. Counts `find_by_column`
/// calls so tests can assert a binding was resolved exactly once.

use crate::error::Result;
use crate::store::row::lookup_key;
use crate::store::{ModelDef, RecordStore, RelationKind};

use async_graphql::{Name, Value};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct MemoryStore {
    tables: HashMap<String, Vec<Value>>,
    lookups: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: impl Into<String>, rows: Vec<Value>) -> Self {
        self.tables.insert(name.into(), rows);
        self
    }

    /// Number of `find_by_column` calls served so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn rows_matching(&self, table: &str, column: &str, keys: &[String]) -> Vec<Value> {
        self.tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| {
                        let Value::Object(obj) = row else {
                            return false;
                        };
                        obj.get(column)
                            .and_then(lookup_key)
                            .is_some_and(|key| keys.contains(&key))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_by_column(
        &self,
        model: &ModelDef,
        column: &str,
        values: &[Value],
        eager: &[String],
    ) -> Result<Vec<Value>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        let keys: Vec<String> = values.iter().filter_map(lookup_key).collect();
        let mut rows = self.rows_matching(&model.table, column, &keys);

        for name in eager {
            let Some(rel) = model.relation(name) else {
                tracing::warn!(
                    "Model '{}' has no relation '{}', skipping eager load",
                    model.name,
                    name
                );
                continue;
            };

            for row in rows.iter_mut() {
                let Value::Object(obj) = row else { continue };
                match rel.kind {
                    RelationKind::BelongsTo => {
                        let keys: Vec<String> = obj
                            .get(rel.foreign_key.as_str())
                            .and_then(lookup_key)
                            .into_iter()
                            .collect();
                        let related = self.rows_matching(&rel.table, &rel.owner_key, &keys);
                        let attached = related.into_iter().next().unwrap_or(Value::Null);
                        obj.insert(Name::new(&rel.name), attached);
                    }
                    RelationKind::HasMany => {
                        let keys: Vec<String> = obj
                            .get(rel.owner_key.as_str())
                            .and_then(lookup_key)
                            .into_iter()
                            .collect();
                        let children = self.rows_matching(&rel.table, &rel.foreign_key, &keys);
                        obj.insert(Name::new(&rel.name), Value::List(children));
                    }
                }
            }
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RelationDef;
    use async_graphql::value;

    fn user_model() -> ModelDef {
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

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_table(
                "users",
                vec![
                    value!({"id": "1", "name": "Alice", "company_id": "10"}),
                    value!({"id": "2", "name": "Bob", "company_id": "11"}),
                ],
            )
            .with_table(
                "companies",
                vec![
                    value!({"id": "10", "name": "Acme"}),
                    value!({"id": "11", "name": "Globex"}),
                ],
            )
    }

    #[tokio::test]
    async fn test_find_by_column_filters_and_counts() {
        let store = store();
        let rows = store
            .find_by_column(
                &user_model(),
                "id",
                &[Value::String("1".to_string())],
                &[],
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(store.lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_eager_load_attaches_belongs_to() {
        let store = store();
        let rows = store
            .find_by_column(
                &user_model(),
                "id",
                &[Value::String("1".to_string())],
                &["company".to_string()],
            )
            .await
            .unwrap();

        let Value::Object(obj) = &rows[0] else {
            panic!("Expected Value::Object");
        };
        let Value::Object(company) = obj.get("company").unwrap() else {
            panic!("Expected eager-loaded company object");
        };
        assert_eq!(
            company.get("name").unwrap(),
            &Value::String("Acme".to_string())
        );
    }

    #[tokio::test]
    async fn test_unknown_table_yields_no_rows() {
        let store = MemoryStore::new();
        let rows = store
            .find_by_column(
                &user_model(),
                "id",
                &[Value::String("1".to_string())],
                &[],
            )
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
