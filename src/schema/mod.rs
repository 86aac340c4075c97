/// GraphQL schema generation
///
/// Builds a dynamic schema from the configured models and `@bind`
/// annotations: object types from table schemas, custom scalars, and query
/// fields whose resolvers run the binding validation/transform pipeline.

mod builder;
mod scalars;
mod type_mapping;

pub use builder::SchemaBuilder;
pub use scalars::register_custom_scalars;
pub use type_mapping::arrow_to_graphql_type;
