use crate::catalog::EnumDef;
use std::collections::BTreeMap;

/// Type expression emitted for catalog types with no entry in [`TYPE_MAP`]
pub const DEFAULT_TYPE_EXPR: &str = "String";

/// Catalog type name → SQLAlchemy column type expression.
///
/// Keys are matched exactly and case-sensitively against
/// `information_schema.columns.data_type`.
pub const TYPE_MAP: &[(&str, &str)] = &[
    ("uuid", "UUID"),
    ("character varying", "String"),
    ("varchar", "String"),
    ("text", "Text"),
    ("char", "CHAR"),
    ("character", "CHAR"),
    ("timestamp with time zone", "DateTime(timezone=True)"),
    ("timestamp without time zone", "DateTime"),
    ("date", "Date"),
    ("integer", "Integer"),
    ("bigint", "BigInteger"),
    ("smallint", "SmallInteger"),
    ("numeric", "Numeric"),
    ("decimal", "Numeric"),
    ("real", "Float"),
    ("double precision", "Float"),
    ("boolean", "Boolean"),
    ("bytea", "LargeBinary"),
    ("json", "JSON"),
    ("jsonb", "JSONB"),
    ("interval", "Interval"),
    ("time without time zone", "Time"),
    ("time with time zone", "Time(timezone=True)"),
    ("array", "ARRAY"),
    ("inet", "INET"),
    ("cidr", "CIDR"),
    ("macaddr", "MACADDR"),
    ("tsvector", "TSVECTOR"),
];

/// Map a column's catalog type to a SQLAlchemy type expression
///
/// A column that appears in `enums` becomes `Enum(<display name>)` whatever
/// its catalog type says; that check runs before the lookup table.
/// Anything else falls back to [`DEFAULT_TYPE_EXPR`].
///
/// # Example
///
/// ```rust,ignore
/// assert_eq!(map_column_type("id", "integer", &enums), "Integer");
/// assert_eq!(map_column_type("status", "USER-DEFINED", &enums), "Enum(User_status)");
/// assert_eq!(map_column_type("geom", "geometry", &enums), "String");
/// ```
pub fn map_column_type(
    column_name: &str,
    catalog_type: &str,
    enums: &BTreeMap<String, EnumDef>,
) -> String {
    // Only USER-DEFINED columns enter the enum map during introspection, so
    // membership alone decides; the map wins over the lookup table.
    if let Some(def) = enums.get(column_name) {
        return format!("Enum({})", def.display_name);
    }
    TYPE_MAP
        .iter()
        .find(|(key, _)| *key == catalog_type)
        .map_or(DEFAULT_TYPE_EXPR, |(_, expr)| *expr)
        .to_string()
}

/// Convert a snake_case string to CamelCase
///
/// Used for class names of generated models, repositories and services.
///
/// # Example
///
/// ```rust,ignore
/// assert_eq!(to_camel_case("order_items"), "OrderItems");
/// ```
pub fn to_camel_case(s: &str) -> String {
    s.split('_')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Identifier used in generated code for a catalog enum type
///
/// Drops a trailing `_enum` and upper-cases the first character; the rest is
/// kept as-is (`user_status_enum` → `User_status`). A name that would become
/// empty is kept whole.
pub fn enum_display_name(catalog_enum_name: &str) -> String {
    let base = match catalog_enum_name.strip_suffix("_enum") {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => catalog_enum_name,
    };
    let mut chars = base.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
