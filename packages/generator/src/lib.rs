//! # Declgen Generator
//!
//! Renders an immutable type model into TypeScript declaration source.
//!
//! ## Features
//!
//! - **Qualified naming**: references are prefixed with their module, looking
//!   through nested collections to the item type's module
//! - **Pluggable pipeline**: per-kind formatters, per-host-type convertors,
//!   and replaceable member, visibility and module-name formatters
//! - **Output modes**: properties, fields, enums and constants, as ambient
//!   interface declarations or implementation classes
//! - **Deterministic output**: modules, classes, enums and members are
//!   emitted in a total order
//!
//! ## Example
//!
//! ```rust
//! use declgen_generator::TypeScriptGenerator;
//! use declgen_model::{Class, Module, Property, TypeModel, TypeRef};
//!
//! let mut model = TypeModel::new();
//! let shapes = model.add_module(Module::new("Shapes"));
//! model.add_class(
//!     Class::new("Circle")
//!         .in_module(shapes)
//!         .with_member(Property::new("radius", TypeRef::number())),
//! );
//!
//! let output = TypeScriptGenerator::new().render(&model).unwrap();
//! assert!(output.contains("export interface Circle {"));
//! assert!(output.contains("\t\tradius: number;"));
//! ```

pub mod docs;
pub mod error;
pub mod generator;
pub mod observer;
pub mod options;
pub mod pipeline;
mod renderer;
pub mod resolver;
pub mod script;

pub use docs::{DocAppender, NullDocAppender};
pub use error::{GenerateError, GenerateResult};
pub use generator::TypeScriptGenerator;
pub use observer::{NullObserver, RenderEvent, RenderObserver, SkipReason};
pub use options::{EnumStyle, GenerationVariant, GeneratorOptions, OutputMode};
pub use pipeline::{Declaration, FormatterPipeline};
pub use resolver::TypeResolver;
pub use script::{Indented, ScriptBuilder};

// Re-export the model crate for convenience
pub use declgen_model;
