/// Record binder
///
/// Built-in resolver for database-record bindings. A scalar binding is one
/// lookup expecting at most one row; a list binding batches every input value
/// into one lookup and maps rows back to input positions. More than one row
/// sharing a single looked-up value is a data-integrity fault, not a
/// validation failure, and aborts the request. Duplicate *input* values
/// resolving to the same row are normal.

use crate::bind::spec::BindingSpec;
use crate::error::{GraphbindError, Result};
use crate::store::{lookup_key, ModelDef, RecordStore};

use async_graphql::Value;
use std::collections::HashMap;

pub struct RecordBinder<'a> {
    store: &'a dyn RecordStore,
}

impl<'a> RecordBinder<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    /// Resolve a single scalar value to at most one record.
    pub async fn bind_scalar(
        &self,
        model: &ModelDef,
        spec: &BindingSpec,
        value: &Value,
    ) -> Result<Option<Value>> {
        if lookup_key(value).is_none() {
            return Ok(None);
        }

        let mut rows = self
            .store
            .find_by_column(
                model,
                &spec.column,
                std::slice::from_ref(value),
                &spec.eager_load,
            )
            .await?;

        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            count => Err(GraphbindError::AmbiguousMatch {
                column: spec.column.clone(),
                value: display_value(value),
                count,
            }),
        }
    }

    /// Resolve an ordered list of scalar values, preserving positions.
    ///
    /// One store lookup covers every distinct value. The output is aligned
    /// with the input: `None` marks a position with no match, and duplicate
    /// inputs each get their own copy of the shared row.
    pub async fn bind_list(
        &self,
        model: &ModelDef,
        spec: &BindingSpec,
        values: &[Value],
    ) -> Result<Vec<Option<Value>>> {
        let rows = self
            .store
            .find_by_column(model, &spec.column, values, &spec.eager_load)
            .await?;

        let mut by_key: HashMap<String, Vec<Value>> = HashMap::new();
        for row in rows {
            if let Value::Object(obj) = &row {
                if let Some(key) = obj.get(spec.column.as_str()).and_then(lookup_key) {
                    by_key.entry(key).or_default().push(row.clone());
                }
            }
        }

        for (key, group) in &by_key {
            if group.len() > 1 {
                return Err(GraphbindError::AmbiguousMatch {
                    column: spec.column.clone(),
                    value: key.clone(),
                    count: group.len(),
                });
            }
        }

        Ok(values
            .iter()
            .map(|value| {
                lookup_key(value)
                    .and_then(|key| by_key.get(&key))
                    .and_then(|group| group.first().cloned())
            })
            .collect())
    }
}

fn display_value(value: &Value) -> String {
    lookup_key(value).unwrap_or_else(|| value.to_string())
}
