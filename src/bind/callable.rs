use crate::bind::spec::BindingSpec;
use crate::error::Result;

use async_graphql::Value;
use async_trait::async_trait;

/// Extension point for non-record bindings.
///
/// A handler receives the raw argument value (scalar or list, whatever the
/// argument's declared type is) and the spec, and returns the bound value.
/// The core treats the result as already resolved: no required/optional
/// reinterpretation is applied, and anything the handler raises propagates
/// unchanged as a request error.
#[async_trait]
pub trait BindCallable: Send + Sync {
    async fn bind(&self, value: &Value, spec: &BindingSpec) -> Result<Value>;
}
