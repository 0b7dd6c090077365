use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Member categories and declaration variant requested for one render pass
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct OutputMode: u32 {
        const PROPERTIES = 1;
        const FIELDS = 1 << 1;
        const ENUMS = 1 << 2;
        const CONSTANTS = 1 << 3;
        /// Emit implementation classes instead of interface declarations
        const CLASSES = 1 << 4;
    }
}

impl OutputMode {
    /// True if properties or fields are requested
    pub fn has_members(self) -> bool {
        self.intersects(OutputMode::PROPERTIES | OutputMode::FIELDS)
    }
}

impl std::str::FromStr for OutputMode {
    type Err = bitflags::parser::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        bitflags::parser::from_str::<OutputMode>(s)
    }
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::PROPERTIES | OutputMode::ENUMS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnumStyle {
    /// `Name = 1`
    #[default]
    Number,
    /// `Name = "Name"`
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GenerationVariant {
    /// Ambient interface declarations (`.d.ts`)
    #[default]
    Declarations,
    /// Implementation classes (`.ts`)
    Classes,
}

/// Configuration options for declaration generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorOptions {
    /// One level of indentation
    pub indentation: String,

    /// How enum values are written
    pub enum_style: EnumStyle,

    /// Global `const enum` override
    /// `None` defers to each enum's own flag
    pub const_enums: Option<bool>,

    /// Output mode used by `render`
    pub output: OutputMode,

    pub variant: GenerationVariant,

    /// Fail on contradictory output modes instead of warning
    pub strict: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            indentation: "\t".to_string(),
            enum_style: EnumStyle::Number,
            const_enums: None,
            output: OutputMode::default(),
            variant: GenerationVariant::Declarations,
            strict: false,
        }
    }
}

impl GeneratorOptions {
    /// Interface declarations with properties and enums
    pub fn declarations() -> Self {
        Self::default()
    }

    /// Implementation classes with properties, enums and inline constants
    pub fn classes() -> Self {
        Self {
            output: OutputMode::PROPERTIES | OutputMode::ENUMS | OutputMode::CONSTANTS,
            variant: GenerationVariant::Classes,
            ..Default::default()
        }
    }

    /// Enums only, as real (non-ambient) declarations
    pub fn enums_only() -> Self {
        Self {
            output: OutputMode::ENUMS,
            ..Default::default()
        }
    }

    /// Constant companion blocks only
    pub fn constants() -> Self {
        Self {
            output: OutputMode::CONSTANTS,
            ..Default::default()
        }
    }
}
