use thiserror::Error;

/// Errors reported when a type model violates its structural invariants
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("{owner} references missing {kind} #{id}")]
    DanglingReference {
        owner: String,
        kind: &'static str,
        id: u32,
    },

    #[error("Module name '{0}' is declared more than once")]
    DuplicateModule(String),

    #[error("Inheritance cycle detected: {}", chain.join(" → "))]
    InheritanceCycle { chain: Vec<String> },

    #[error("Generic argument cycle detected: {}", chain.join(" → "))]
    GenericArgumentCycle { chain: Vec<String> },

    #[error("Module '{module}' lists {kind} '{name}' which belongs to another module")]
    ForeignMember {
        module: String,
        kind: &'static str,
        name: String,
    },

    #[error("{kind} '{name}' is listed by more than one module entry")]
    DuplicateListing { kind: &'static str, name: String },

    #[error("{owner} uses a collection of rank 0")]
    EmptyCollectionRank { owner: String },

    #[error("Class '{class}' lists interface '{interface}' more than once")]
    DuplicateInterface { class: String, interface: String },

    #[error("Enum '{enum_name}' declares value '{value}' more than once")]
    DuplicateEnumValue { enum_name: String, value: String },
}

pub type ModelResult<T> = Result<T, ModelError>;
