//! Closed schema representation consumed by the generator.
//!
//! Raw definition documents are decoded into these types once, at the
//! boundary (see [`super::lower`]), so every later stage matches on a
//! closed set of shapes instead of probing for keys.

use indexmap::IndexMap;

/// Scalar type tags understood by every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    String,
    Boolean,
    Timestamp,
    Float32,
    Float64,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
}

impl ScalarType {
    /// Every scalar, in the order they are documented.
    pub const ALL: [ScalarType; 13] = [
        ScalarType::String,
        ScalarType::Boolean,
        ScalarType::Timestamp,
        ScalarType::Float32,
        ScalarType::Float64,
        ScalarType::Int8,
        ScalarType::Uint8,
        ScalarType::Int16,
        ScalarType::Uint16,
        ScalarType::Int32,
        ScalarType::Uint32,
        ScalarType::Int64,
        ScalarType::Uint64,
    ];

    /// Parses a `type` tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|scalar| scalar.tag() == tag)
    }

    /// The `type` tag as written in definition documents.
    pub fn tag(self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Boolean => "boolean",
            ScalarType::Timestamp => "timestamp",
            ScalarType::Float32 => "float32",
            ScalarType::Float64 => "float64",
            ScalarType::Int8 => "int8",
            ScalarType::Uint8 => "uint8",
            ScalarType::Int16 => "int16",
            ScalarType::Uint16 => "uint16",
            ScalarType::Int32 => "int32",
            ScalarType::Uint32 => "uint32",
            ScalarType::Int64 => "int64",
            ScalarType::Uint64 => "uint64",
        }
    }

    /// 64-bit integers travel as JSON strings.
    pub fn is_large_integer(self) -> bool {
        matches!(self, ScalarType::Int64 | ScalarType::Uint64)
    }
}

/// Optional metadata attached to any schema node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    /// Explicit type name.
    pub id: Option<String>,
    pub description: Option<String>,
    pub is_deprecated: bool,
}

/// A schema node.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub shape: SchemaShape,
    pub nullable: bool,
    pub metadata: Metadata,
}

/// The shape of a schema node. Shapes are mutually exclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaShape {
    Scalar(ScalarType),
    Object(ObjectSchema),
    Enum(Vec<String>),
    Array(Box<Schema>),
    Record(Box<Schema>),
    Discriminator(DiscriminatorSchema),
    Ref(String),
    Any,
}

/// Named required and optional properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    pub properties: IndexMap<String, Schema>,
    pub optional_properties: IndexMap<String, Schema>,
}

/// A tagged union: the value of `discriminator` selects a `mapping` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscriminatorSchema {
    pub discriminator: String,
    pub mapping: IndexMap<String, Schema>,
}

impl Schema {
    /// Creates a non-nullable schema without metadata.
    pub fn new(shape: SchemaShape) -> Self {
        Self {
            shape,
            nullable: false,
            metadata: Metadata::default(),
        }
    }

    pub fn scalar(scalar: ScalarType) -> Self {
        Self::new(SchemaShape::Scalar(scalar))
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::new(SchemaShape::Ref(name.into()))
    }

    /// Marks the schema nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the explicit type name.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.id = Some(id.into());
        self
    }

    /// Whether this node produces a named type declaration.
    pub fn is_model(&self) -> bool {
        matches!(
            self.shape,
            SchemaShape::Object(_) | SchemaShape::Enum(_) | SchemaShape::Discriminator(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_tags_round_trip() {
        for scalar in ScalarType::ALL {
            assert_eq!(ScalarType::from_tag(scalar.tag()), Some(scalar));
        }
        assert_eq!(ScalarType::from_tag("float128"), None);
    }

    #[test]
    fn test_large_integers() {
        assert!(ScalarType::Int64.is_large_integer());
        assert!(ScalarType::Uint64.is_large_integer());
        assert!(!ScalarType::Int32.is_large_integer());
    }

    #[test]
    fn test_is_model() {
        assert!(!Schema::scalar(ScalarType::String).is_model());
        assert!(Schema::new(SchemaShape::Enum(vec!["A".to_string()])).is_model());
        assert!(Schema::new(SchemaShape::Object(ObjectSchema::default())).is_model());
        assert!(!Schema::reference("User").is_model());
    }
}
