//! # Declgen Type Model
//!
//! The in-memory graph consumed by the declaration generator: modules,
//! classes, enums, members, collections, primitive types and generic
//! parameters.
//!
//! The graph is built once (by hand, by a reflection-driven builder, or by
//! deserializing a persisted `*.model.json`) and is read-only afterwards.
//! Entities live in arenas and reference each other through typed ids, so
//! self-referential shapes such as a tree node holding a list of itself are
//! plain data.
//!
//! ## Example
//!
//! ```rust
//! use declgen_model::{Class, Module, Property, TypeModel, TypeRef};
//!
//! let mut model = TypeModel::new();
//! let shapes = model.add_module(Module::new("Shapes"));
//! let node = model.add_class(Class::new("TreeNode").in_module(shapes));
//! model
//!     .class_mut(node)
//!     .members
//!     .push(Property::new("children", TypeRef::collection(TypeRef::Class(node), 1)));
//!
//! assert!(model.validate().is_ok());
//! ```

pub mod error;
pub mod model;
pub mod types;

pub use error::{ModelError, ModelResult};
pub use model::{
    Class, ClassId, Enum, EnumId, EnumValue, MemberKind, Module, ModuleId, Property, TypeModel,
};
pub use types::{
    Collection, ConstantValue, EnumLiteral, GenericParameter, HostType, SystemKind, SystemType,
    TypeKind, TypeRef,
};
