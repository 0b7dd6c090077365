use thiserror::Error;

/// Errors that abort a render pass
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerateError {
    #[error("Member '{class}.{member}' has no concrete type and cannot be emitted as a class member")]
    UntypedMember { class: String, member: String },

    #[error("Cannot generate constants together with properties or fields in declarations ({mode})")]
    ConflictingOutputModes { mode: String },
}

pub type GenerateResult<T> = Result<T, GenerateError>;
