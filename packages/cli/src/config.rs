use anyhow::Context;
use declgen_generator::GeneratorOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "declgen.config.json";

/// Declgen configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Source directory containing *.model.json files
    #[serde(default = "default_src_dir")]
    pub src_dir: String,

    /// Directory that receives the generated declaration files
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Reference directives written at the top of every output file
    #[serde(default)]
    pub references: Vec<String>,

    /// Host types rendered as a fixed TypeScript name, e.g. "System.Guid" -> "string"
    #[serde(default)]
    pub type_mappings: BTreeMap<String, String>,

    #[serde(default)]
    pub generator: GeneratorOptions,
}

fn default_src_dir() -> String {
    "models".to_string()
}

fn default_out_dir() -> String {
    "typings".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid config {}", config_path.display()))?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to source directory
    pub fn get_src_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.src_dir)
    }

    pub fn get_out_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.out_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            out_dir: default_out_dir(),
            references: vec![],
            type_mappings: BTreeMap::new(),
            generator: GeneratorOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declgen_generator::{EnumStyle, GenerationVariant, OutputMode};

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "srcDir": "schema",
            "outDir": "types",
            "references": ["lib.d.ts"],
            "typeMappings": { "System.Guid": "string" },
            "generator": {
                "variant": "classes",
                "enumStyle": "string",
                "output": "PROPERTIES | ENUMS | CONSTANTS",
                "strict": true
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.src_dir, "schema");
        assert_eq!(config.out_dir, "types");
        assert_eq!(config.references, vec!["lib.d.ts"]);
        assert_eq!(config.type_mappings["System.Guid"], "string");
        assert_eq!(config.generator.variant, GenerationVariant::Classes);
        assert_eq!(config.generator.enum_style, EnumStyle::String);
        assert_eq!(
            config.generator.output,
            OutputMode::PROPERTIES | OutputMode::ENUMS | OutputMode::CONSTANTS
        );
        assert!(config.generator.strict);
        assert_eq!(config.generator.indentation, "\t");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.src_dir, "models");
        assert_eq!(config.out_dir, "typings");
        assert!(config.references.is_empty());
        assert!(config.type_mappings.is_empty());
        assert_eq!(config.generator.output, OutputMode::default());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.src_dir, "models");
        assert_eq!(config.out_dir, "typings");
        assert_eq!(config.generator.variant, GenerationVariant::Declarations);
    }

    #[test]
    fn test_load_without_config_file() {
        let config = Config::load("/nonexistent/declgen/project").unwrap();
        assert_eq!(config.src_dir, "models");
        assert_eq!(
            config.get_out_dir("/work"),
            PathBuf::from("/work").join("typings")
        );
    }
}
