use crate::model::{ClassId, EnumId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a type in the host object model (e.g. `System.Guid`)
///
/// Convertors are registered against this key, so it must be the same string
/// for every reference to the same host type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostType(String);

impl HostType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HostType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for HostType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A reference to any type node in the model
///
/// Classes and enums are shared entities and are referenced by id. Collections,
/// system types and generic parameters are leaves or wrappers and are held inline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeRef {
    Class(ClassId),
    Enum(EnumId),
    Collection(Box<Collection>),
    System(SystemType),
    GenericParameter(GenericParameter),
}

/// Variant tag of a [`TypeRef`], used to key per-kind formatters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    Class,
    Enum,
    Collection,
    System,
    GenericParameter,
}

/// Array of `items` with the given rank
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub items: TypeRef,
    #[serde(default = "default_dimension")]
    pub dimension: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<HostType>,
}

fn default_dimension() -> u32 {
    1
}

/// Primitive leaf type with a fixed textual mapping
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemType {
    pub kind: SystemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<HostType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SystemKind {
    /// Explicitly dynamic value
    Any,
    /// Placeholder for a host type the model builder could not map
    Unknown,
    Void,
    String,
    Number,
    Boolean,
    Date,
}

impl SystemKind {
    /// Declaration keyword for this primitive
    pub fn keyword(&self) -> &'static str {
        match self {
            SystemKind::Any | SystemKind::Unknown => "any",
            SystemKind::Void => "void",
            SystemKind::String => "string",
            SystemKind::Number => "number",
            SystemKind::Boolean => "boolean",
            SystemKind::Date => "Date",
        }
    }
}

/// Generic parameter whose name is supplied by the declaring class
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenericParameter {
    pub name: String,
}

/// Literal value carried by a constant member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstantValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// Underlying literal of an enum value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumLiteral {
    Number(i64),
    String(String),
}

impl EnumLiteral {
    /// True when the literal does not fit a 32-bit signed integer
    pub fn is_wide(&self) -> bool {
        match self {
            EnumLiteral::Number(n) => i32::try_from(*n).is_err(),
            EnumLiteral::String(_) => false,
        }
    }
}

impl TypeRef {
    pub fn string() -> Self {
        Self::system(SystemKind::String)
    }

    pub fn number() -> Self {
        Self::system(SystemKind::Number)
    }

    pub fn boolean() -> Self {
        Self::system(SystemKind::Boolean)
    }

    pub fn any() -> Self {
        Self::system(SystemKind::Any)
    }

    pub fn system(kind: SystemKind) -> Self {
        TypeRef::System(SystemType { kind, host: None })
    }

    pub fn generic_parameter(name: impl Into<String>) -> Self {
        TypeRef::GenericParameter(GenericParameter { name: name.into() })
    }

    /// Wrap `items` in a collection of the given rank
    pub fn collection(items: TypeRef, dimension: u32) -> Self {
        TypeRef::Collection(Box::new(Collection {
            items,
            dimension,
            host: None,
        }))
    }

    /// Attach a host identity to a collection or system type
    ///
    /// Classes and enums carry their host identity on the entity itself, so
    /// this is a no-op for them.
    pub fn with_host(mut self, host: impl Into<HostType>) -> Self {
        match &mut self {
            TypeRef::Collection(collection) => collection.host = Some(host.into()),
            TypeRef::System(system) => system.host = Some(host.into()),
            _ => {}
        }
        self
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            TypeRef::Class(_) => TypeKind::Class,
            TypeRef::Enum(_) => TypeKind::Enum,
            TypeRef::Collection(_) => TypeKind::Collection,
            TypeRef::System(_) => TypeKind::System,
            TypeRef::GenericParameter(_) => TypeKind::GenericParameter,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            TypeRef::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    /// Innermost non-collection type
    pub fn leaf(&self) -> &TypeRef {
        let mut current = self;
        while let TypeRef::Collection(collection) = current {
            current = &collection.items;
        }
        current
    }

    /// Total array rank through nested collections (0 for non-collections)
    pub fn rank(&self) -> u32 {
        let mut rank = 0;
        let mut current = self;
        while let TypeRef::Collection(collection) = current {
            rank += collection.dimension;
            current = &collection.items;
        }
        rank
    }

    /// Check if this type is, or wraps, the untyped placeholder
    pub fn is_placeholder(&self) -> bool {
        matches!(
            self.leaf(),
            TypeRef::System(SystemType {
                kind: SystemKind::Unknown,
                ..
            })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_sums_nested_dimensions() {
        let inner = TypeRef::collection(TypeRef::string(), 2);
        let outer = TypeRef::collection(inner, 1);
        assert_eq!(outer.rank(), 3);
        assert_eq!(TypeRef::string().rank(), 0);
    }

    #[test]
    fn test_leaf_pierces_collections() {
        let nested = TypeRef::collection(TypeRef::collection(TypeRef::Class(ClassId(4)), 1), 1);
        assert_eq!(nested.leaf(), &TypeRef::Class(ClassId(4)));
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(TypeRef::system(SystemKind::Unknown).is_placeholder());
        assert!(TypeRef::collection(TypeRef::system(SystemKind::Unknown), 1).is_placeholder());
        assert!(!TypeRef::any().is_placeholder());
    }

    #[test]
    fn test_wide_enum_literal() {
        assert!(!EnumLiteral::Number(i32::MAX as i64).is_wide());
        assert!(EnumLiteral::Number(i32::MAX as i64 + 1).is_wide());
        assert!(EnumLiteral::Number(i32::MIN as i64 - 1).is_wide());
        assert!(!EnumLiteral::String("x".to_string()).is_wide());
    }

    #[test]
    fn test_with_host_only_applies_to_inline_nodes() {
        let system = TypeRef::string().with_host("System.Guid");
        assert!(matches!(system, TypeRef::System(SystemType { host: Some(_), .. })));

        let class = TypeRef::Class(ClassId(0)).with_host("Ignored");
        assert_eq!(class, TypeRef::Class(ClassId(0)));
    }

    #[test]
    fn test_type_ref_json_shape() {
        let json = r#"{"collection":{"items":{"class":3},"dimension":2}}"#;
        let parsed: TypeRef = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, TypeRef::collection(TypeRef::Class(ClassId(3)), 2));

        let system: TypeRef = serde_json::from_str(r#"{"system":{"kind":"date"}}"#).unwrap();
        assert_eq!(system, TypeRef::system(SystemKind::Date));
    }
}
