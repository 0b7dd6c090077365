use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

pub const EXAMPLE_MODEL_NAME: &str = "example.model.json";

const EXAMPLE_MODEL: &str = r#"{
  "modules": [
    { "name": "Shapes", "classes": [0, 1], "enums": [0] }
  ],
  "classes": [
    {
      "name": "Shape",
      "module": 0,
      "members": [
        { "name": "name", "type": { "system": { "kind": "string" } } },
        { "name": "color", "type": { "enum": 0 }, "isOptional": true }
      ]
    },
    {
      "name": "Circle",
      "module": 0,
      "base": 0,
      "members": [
        { "name": "radius", "type": { "system": { "kind": "number" } } }
      ]
    }
  ],
  "enums": [
    {
      "name": "Color",
      "module": 0,
      "values": [
        { "name": "Red", "value": 0 },
        { "name": "Green", "value": 1 }
      ]
    }
  ]
}
"#;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Source directory
    #[arg(short, long, default_value = "models")]
    pub src_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing declgen project...".bright_blue().bold());

    let src_dir = PathBuf::from(cwd).join(&args.src_dir);
    if !src_dir.exists() {
        fs::create_dir_all(&src_dir)?;
        println!("  {} Created {}/", "✓".green(), args.src_dir);
    }

    let example_file = src_dir.join(EXAMPLE_MODEL_NAME);
    if !example_file.exists() {
        fs::write(&example_file, EXAMPLE_MODEL)?;
        println!("  {} Created {}", "✓".green(), EXAMPLE_MODEL_NAME);
    }

    let config = Config {
        src_dir: args.src_dir.clone(),
        ..Config::default()
    };
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}/{}", args.src_dir, EXAMPLE_MODEL_NAME);
    println!("  2. Run: declgen generate");
    println!("  3. Check output in {}/", config.out_dir);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use declgen_generator::TypeScriptGenerator;
    use declgen_model::TypeModel;

    #[test]
    fn test_example_model_is_valid() {
        let model: TypeModel = serde_json::from_str(EXAMPLE_MODEL).unwrap();
        model.validate().unwrap();

        let output = TypeScriptGenerator::new().render(&model).unwrap();
        assert!(output.contains("declare namespace Shapes {"));
        assert!(output.contains("export interface Circle extends Shapes.Shape {"));
        assert!(output.contains("color?: Shapes.Color;"));
    }

    #[test]
    fn test_default_config_round_trips() {
        let json = serde_json::to_string_pretty(&Config::default()).unwrap();
        let config: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.src_dir, "models");
        assert_eq!(config.generator, Config::default().generator);
    }
}
