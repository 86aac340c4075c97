/// Arrow to GraphQL type mapping
///
/// Integer columns named `id` or `*_id` map to `ID`, dates and timestamps to
/// the custom scalars, unsupported types are skipped with a warning.

use async_graphql::dynamic::TypeRef;
use datafusion::arrow::datatypes::DataType as ArrowDataType;

/// Map an Arrow column to a GraphQL `TypeRef`.
///
/// Returns `None` when the column type has no GraphQL counterpart and the
/// field should be skipped.
pub fn arrow_to_graphql_type(
    field_name: &str,
    data_type: &ArrowDataType,
    nullable: bool,
) -> Option<TypeRef> {
    let is_id = field_name == "id" || field_name.ends_with("_id");

    let type_name: &str = match data_type {
        ArrowDataType::Int8
        | ArrowDataType::Int16
        | ArrowDataType::Int32
        | ArrowDataType::Int64
        | ArrowDataType::UInt8
        | ArrowDataType::UInt16
        | ArrowDataType::UInt32
        | ArrowDataType::UInt64 => {
            if is_id {
                TypeRef::ID
            } else {
                TypeRef::INT
            }
        }

        ArrowDataType::Float16 | ArrowDataType::Float32 | ArrowDataType::Float64 => TypeRef::FLOAT,

        ArrowDataType::Utf8 | ArrowDataType::LargeUtf8 => TypeRef::STRING,

        ArrowDataType::Boolean => TypeRef::BOOLEAN,

        ArrowDataType::Date32 | ArrowDataType::Date64 => "Date",

        ArrowDataType::Timestamp(_, _) => "DateTime",

        other => {
            tracing::warn!(
                "Unsupported Arrow type {:?} for field '{}', skipping field",
                other,
                field_name
            );
            return None;
        }
    };

    Some(if nullable {
        TypeRef::named(type_name)
    } else {
        TypeRef::named_nn(type_name)
    })
}
