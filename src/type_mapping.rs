//! Type mappings: how a source type is stored and written as a literal in
//!  PostgreSQL.

use std::{collections::HashMap, fmt::Write, sync::LazyLock};

use regex::Regex;

use crate::ast::{SourceType, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum MappingKind {
    Scalar,
    ByteArray,
    /// A PostgreSQL array; holds the element mapping.
    Array(Box<TypeMapping>),
    Json { jsonb: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeMapping {
    pub store_type: String,
    pub clr_type: SourceType,
    pub kind: MappingKind,
}

impl TypeMapping {
    pub fn scalar(store_type: impl Into<String>, clr_type: SourceType) -> Self {
        Self {
            store_type: store_type.into(),
            clr_type,
            kind: MappingKind::Scalar,
        }
    }

    pub fn is_byte_array(&self) -> bool {
        self.kind == MappingKind::ByteArray
    }

    pub fn is_json(&self) -> bool {
        matches!(self.kind, MappingKind::Json { .. })
    }

    pub fn is_jsonb(&self) -> bool {
        self.kind == MappingKind::Json { jsonb: true }
    }

    pub fn element_mapping(&self) -> Option<&TypeMapping> {
        match &self.kind {
            MappingKind::Array(element) => Some(element),
            _ => None,
        }
    }

    /// The literal text for `value` in this mapping's store type.
    pub fn generate_sql_literal(&self, value: &Value) -> String {
        let literal = match value {
            Value::Null => return "NULL".to_string(),
            Value::Bool(b) => String::from(if *b { "TRUE" } else { "FALSE" }),
            Value::Byte(v) => v.to_string(),
            Value::Short(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Long(v) => v.to_string(),
            Value::Double(v) if v.is_nan() => "'NaN'".to_string(),
            Value::Double(v) if v.is_infinite() => {
                String::from(if *v > 0.0 { "'Infinity'" } else { "'-Infinity'" })
            }
            Value::Double(v) => format!("{v:?}"),
            Value::Decimal(v) => v.clone(),
            Value::Char(c) => quote(&c.to_string()),
            Value::String(s) => quote(s),
            Value::Bytes(bytes) => {
                let mut hex = String::with_capacity(bytes.len() * 2 + 4);
                hex.push_str("'\\x");
                for b in bytes {
                    let _ = write!(hex, "{b:02X}");
                }
                hex.push('\'');
                hex
            }
            Value::DateTime(dt) => {
                let text = dt.format("%Y-%m-%dT%H:%M:%S%.f");
                if self.store_type.starts_with("timestamp with time zone") {
                    format!("TIMESTAMPTZ '{text}Z'")
                } else {
                    format!("TIMESTAMP '{text}'")
                }
            }
            Value::Date(d) => format!("DATE '{}'", d.format("%Y-%m-%d")),
            Value::DateTimeKind(kind) => (*kind as i32).to_string(),
            Value::RegexOptions(options) => options.0.to_string(),
            Value::Array(values) => {
                let element = self.element_mapping();
                let items: Vec<String> = values
                    .iter()
                    .map(|v| match element {
                        Some(m) => m.generate_sql_literal(v),
                        None => TypeMapping::scalar("", v.source_type()).generate_sql_literal(v),
                    })
                    .collect();
                format!("ARRAY[{}]::{}", items.join(","), self.store_type)
            }
        };
        if self.store_type == "money" {
            format!("{literal}::money")
        } else {
            literal
        }
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// The catalog consulted for type mappings.
pub trait TypeMappingSource: std::fmt::Debug + Send + Sync {
    /// The default mapping for a source type.
    fn find_mapping(&self, ty: &SourceType) -> Option<TypeMapping>;

    /// The mapping for a store type name, facets allowed (`varchar(20)`).
    fn find_mapping_by_store_type(&self, store_type: &str) -> Option<TypeMapping>;

    /// The mapping for a source type stored as the given store type.
    fn find_mapping_for(&self, ty: &SourceType, store_type: &str) -> Option<TypeMapping> {
        let mut mapping = self.find_mapping_by_store_type(store_type)?;
        mapping.clr_type = ty.unwrap_nullable().clone();
        Some(mapping)
    }
}

// Splits "timestamp(3) with time zone" into "timestamp" and " with time zone".
static FACETS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<base>[^(\[]+)\s*(?:\([^)]*\))?(?P<rest>[^(\[]*)$")
        .expect("facet pattern is valid")
});

/// Store type aliases, resolved to their canonical names.
const ALIASES: &[(&str, &str)] = &[
    ("bool", "boolean"),
    ("int2", "smallint"),
    ("int", "integer"),
    ("int4", "integer"),
    ("int8", "bigint"),
    ("float4", "real"),
    ("float8", "double precision"),
    ("decimal", "numeric"),
    ("varchar", "character varying"),
    ("char", "character"),
    ("timestamp", "timestamp without time zone"),
    ("timestamptz", "timestamp with time zone"),
    ("time", "time without time zone"),
];

/// The default PostgreSQL catalog.
#[derive(Debug, Clone)]
pub struct PgTypeMappingSource {
    store_types: HashMap<&'static str, SourceType>,
}

impl Default for PgTypeMappingSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PgTypeMappingSource {
    pub fn new() -> Self {
        use SourceType as T;
        let store_types = HashMap::from([
            ("boolean", T::Bool),
            ("smallint", T::Short),
            ("integer", T::Int),
            ("bigint", T::Long),
            ("real", T::Float),
            ("double precision", T::Double),
            ("numeric", T::Decimal),
            ("money", T::Decimal),
            ("text", T::String),
            ("character varying", T::String),
            ("character", T::Char),
            ("uuid", T::Guid),
            ("timestamp with time zone", T::DateTime),
            ("timestamp without time zone", T::DateTime),
            ("date", T::DateOnly),
            ("time without time zone", T::TimeOnly),
            ("interval", T::TimeSpan),
            ("bytea", T::byte_array()),
            ("json", T::String),
            ("jsonb", T::String),
            ("geometry", T::Geometry),
            ("geography", T::Geometry),
            ("ltree", T::LTree),
            ("lquery", T::LQuery),
            ("ltxtquery", T::LTxtQuery),
            ("inet", T::IPAddress),
            ("cidr", T::IPAddress),
            ("macaddr", T::PhysicalAddress),
            ("macaddr8", T::PhysicalAddress),
        ]);
        Self { store_types }
    }

    fn default_store_type(ty: &SourceType) -> Option<&'static str> {
        use SourceType as T;
        Some(match ty {
            T::Bool => "boolean",
            T::Byte | T::SByte | T::Short => "smallint",
            T::UShort | T::Int => "integer",
            T::UInt | T::Long => "bigint",
            T::ULong | T::Decimal => "numeric",
            T::Float => "real",
            T::Double => "double precision",
            T::Char => "character(1)",
            T::String => "text",
            T::Guid => "uuid",
            T::DateTime | T::DateTimeOffset => "timestamp with time zone",
            T::DateOnly | T::LocalDate => "date",
            T::TimeOnly => "time without time zone",
            T::TimeSpan | T::Period => "interval",
            T::Geometry => "geometry",
            T::LTree => "ltree",
            T::LQuery => "lquery",
            T::LTxtQuery => "ltxtquery",
            T::IPAddress => "inet",
            T::PhysicalAddress => "macaddr",
            _ => return None,
        })
    }

    fn kind_of(store_type: &str) -> MappingKind {
        match store_type {
            "bytea" => MappingKind::ByteArray,
            "json" => MappingKind::Json { jsonb: false },
            "jsonb" => MappingKind::Json { jsonb: true },
            _ => MappingKind::Scalar,
        }
    }
}

/// Lowercases, strips facets and resolves aliases.
fn normalize(store_type: &str) -> Option<String> {
    let lowered = store_type.trim().to_lowercase();
    let caps = FACETS.captures(&lowered)?;
    let base = caps.name("base").map_or("", |m| m.as_str()).trim();
    let rest = caps.name("rest").map_or("", |m| m.as_str()).trim_end();
    let base = ALIASES
        .iter()
        .find(|(alias, _)| *alias == base)
        .map_or(base, |(_, canonical)| *canonical);
    // "timestamp with time zone" must not become "timestamp without time zone with time zone"
    if !rest.is_empty() && base.starts_with("timestamp") {
        return Some(format!("timestamp{rest}"));
    }
    if !rest.is_empty() && base.starts_with("time") {
        return Some(format!("time{rest}"));
    }
    Some(format!("{base}{rest}"))
}

impl TypeMappingSource for PgTypeMappingSource {
    fn find_mapping(&self, ty: &SourceType) -> Option<TypeMapping> {
        let ty = ty.unwrap_nullable();
        match ty {
            SourceType::Enum { underlying, .. } => {
                let mut mapping = self.find_mapping(underlying)?;
                mapping.clr_type = ty.clone();
                Some(mapping)
            }
            t if t.is_byte_array() => Some(TypeMapping {
                store_type: "bytea".into(),
                clr_type: t.clone(),
                kind: MappingKind::ByteArray,
            }),
            SourceType::Array(element) | SourceType::List(element) => {
                let element = self.find_mapping(element)?;
                Some(TypeMapping {
                    store_type: format!("{}[]", element.store_type),
                    clr_type: ty.clone(),
                    kind: MappingKind::Array(Box::new(element)),
                })
            }
            SourceType::Poco(_) => Some(TypeMapping {
                store_type: "jsonb".into(),
                clr_type: ty.clone(),
                kind: MappingKind::Json { jsonb: true },
            }),
            t => {
                let store_type = Self::default_store_type(t)?;
                Some(TypeMapping {
                    store_type: store_type.to_string(),
                    clr_type: t.clone(),
                    kind: MappingKind::Scalar,
                })
            }
        }
    }

    fn find_mapping_by_store_type(&self, store_type: &str) -> Option<TypeMapping> {
        let trimmed = store_type.trim();
        if let Some(element) = trimmed.strip_suffix("[]") {
            let element = self.find_mapping_by_store_type(element)?;
            let clr_type = SourceType::Array(Box::new(element.clr_type.clone()));
            return Some(TypeMapping {
                store_type: trimmed.to_string(),
                clr_type,
                kind: MappingKind::Array(Box::new(element)),
            });
        }
        let canonical = normalize(trimmed)?;
        let clr_type = self.store_types.get(canonical.as_str())?.clone();
        Some(TypeMapping {
            store_type: trimmed.to_string(),
            clr_type,
            kind: Self::kind_of(&canonical),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn facets_are_stripped() {
        assert_eq!(normalize("varchar(255)").as_deref(), Some("character varying"));
        assert_eq!(
            normalize("timestamp(3) with time zone").as_deref(),
            Some("timestamp with time zone")
        );
        assert_eq!(normalize("geometry(Point,4326)").as_deref(), Some("geometry"));
        assert_eq!(normalize("TIMESTAMPTZ").as_deref(), Some("timestamp with time zone"));
    }

    #[test]
    fn store_type_lookup() {
        let source = PgTypeMappingSource::new();
        let mapping = source.find_mapping_by_store_type("geography(Point,4326)").unwrap();
        assert_eq!(mapping.clr_type, SourceType::Geometry);
        assert_eq!(mapping.store_type, "geography(Point,4326)");

        let ints = source.find_mapping_by_store_type("integer[]").unwrap();
        assert_eq!(ints.element_mapping().unwrap().store_type, "integer");
        assert!(source.find_mapping_by_store_type("no_such_type").is_none());
    }

    #[test]
    fn byte_arrays_are_bytea_not_arrays() {
        let source = PgTypeMappingSource::new();
        assert!(source.find_mapping(&SourceType::byte_array()).unwrap().is_byte_array());

        let shorts = source
            .find_mapping(&SourceType::Array(Box::new(SourceType::Short)))
            .unwrap();
        assert_eq!(shorts.store_type, "smallint[]");
        assert!(!shorts.is_byte_array());
    }

    #[test]
    fn literals() {
        let source = PgTypeMappingSource::new();
        let money = source.find_mapping_by_store_type("money").unwrap();
        assert_eq!(money.generate_sql_literal(&Value::Decimal("12.50".into())), "12.50::money");

        let bytea = source.find_mapping(&SourceType::byte_array()).unwrap();
        assert_eq!(bytea.generate_sql_literal(&Value::Bytes(vec![1, 0xab])), r"'\x01AB'");

        let text = source.find_mapping(&SourceType::String).unwrap();
        assert_eq!(text.generate_sql_literal(&Value::String("it's".into())), "'it''s'");

        let ints = source
            .find_mapping(&SourceType::Array(Box::new(SourceType::Int)))
            .unwrap();
        assert_eq!(
            ints.generate_sql_literal(&Value::Array(vec![Value::Int(1), Value::Int(2)])),
            "ARRAY[1,2]::integer[]"
        );
    }
}
