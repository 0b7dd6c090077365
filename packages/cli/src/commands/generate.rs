use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use declgen_generator::{
    EnumStyle, GenerationVariant, GeneratorOptions, OutputMode, TypeScriptGenerator,
};
use declgen_model::TypeModel;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

pub const MODEL_SUFFIX: &str = ".model.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VariantArg {
    Declarations,
    Classes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EnumStyleArg {
    Number,
    String,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Directory to scan for *.model.json files (defaults to the configured srcDir)
    pub path: Option<String>,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub out_dir: Option<String>,

    /// Declaration variant (overrides config)
    #[arg(long, value_enum)]
    pub variant: Option<VariantArg>,

    /// Output mode flags, e.g. "properties|enums" (overrides config)
    #[arg(short, long, value_parser = parse_mode)]
    pub mode: Option<OutputMode>,

    /// Enum value style (overrides config)
    #[arg(long, value_enum)]
    pub enum_style: Option<EnumStyleArg>,

    /// Fail on contradictory output modes
    #[arg(long)]
    pub strict: bool,
}

/// Parse `properties|enums` or `PROPERTIES, ENUMS` into output flags
pub fn parse_mode(value: &str) -> Result<OutputMode, String> {
    let normalized = value.replace(',', "|").to_uppercase();
    normalized
        .parse::<OutputMode>()
        .map_err(|e| format!("invalid output mode '{}': {}", value, e))
}

impl GenerateArgs {
    /// Command-line flags take precedence over the config file
    fn apply(&self, mut options: GeneratorOptions) -> GeneratorOptions {
        if let Some(variant) = self.variant {
            options.variant = match variant {
                VariantArg::Declarations => GenerationVariant::Declarations,
                VariantArg::Classes => GenerationVariant::Classes,
            };
        }
        if let Some(mode) = self.mode {
            options.output = mode;
        }
        if let Some(style) = self.enum_style {
            options.enum_style = match style {
                EnumStyleArg::Number => EnumStyle::Number,
                EnumStyleArg::String => EnumStyle::String,
            };
        }
        if self.strict {
            options.strict = true;
        }
        options
    }
}

pub fn generate(args: GenerateArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let src_dir = match &args.path {
        Some(path) => PathBuf::from(cwd).join(path),
        None => config.get_src_dir(cwd),
    };
    let out_dir = match &args.out_dir {
        Some(out) => PathBuf::from(cwd).join(out),
        None => config.get_out_dir(cwd),
    };

    if !src_dir.exists() {
        return Err(anyhow!("Source directory does not exist: {:?}", src_dir));
    }

    let generator = build_generator(&config, &args);
    debug!(options = ?generator.options, "generator configured");

    println!("{}", "🔨 Generating declarations...".bright_blue().bold());

    let model_files = find_model_files(&src_dir)?;

    if model_files.is_empty() {
        println!("{}", "⚠️  No *.model.json files found".yellow());
        return Ok(());
    }

    println!("Found {} files", model_files.len());

    let mut success_count = 0;
    let mut error_count = 0;

    for model_file in &model_files {
        let relative_path = model_file.strip_prefix(&src_dir).unwrap_or(model_file);
        match generate_file(model_file, &generator, &args, &src_dir, &out_dir) {
            Ok(output_path) => {
                success_count += 1;
                println!(
                    "  {} {} → {}",
                    "✓".green(),
                    relative_path.display(),
                    output_path
                );
            }
            Err(e) => {
                error_count += 1;
                eprintln!(
                    "  {} {} - {}",
                    "✗".red(),
                    relative_path.display(),
                    format!("{:#}", e).red()
                );
            }
        }
    }

    println!();
    if error_count == 0 {
        println!(
            "{} Generated {} files successfully",
            "✅".green(),
            success_count
        );
        Ok(())
    } else {
        println!(
            "{} Generated {} files, {} errors",
            "⚠️".yellow(),
            success_count,
            error_count
        );
        Err(anyhow!("{} model files failed to generate", error_count))
    }
}

fn build_generator(config: &Config, args: &GenerateArgs) -> TypeScriptGenerator {
    let mut generator = TypeScriptGenerator::with_options(args.apply(config.generator.clone()));
    for (host, name) in &config.type_mappings {
        let name = name.clone();
        generator.register_convertor(host.as_str(), move |_| name.clone());
    }
    for reference in &config.references {
        generator.add_reference(reference.as_str());
    }
    generator
}

fn find_model_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && is_model_file(path) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

fn is_model_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(MODEL_SUFFIX) && name.len() > MODEL_SUFFIX.len())
}

/// `orders.model.json` → `orders.d.ts` (or `orders.ts` for implementation classes)
fn output_file_name(model_file: &Path, variant: GenerationVariant) -> Option<String> {
    let name = model_file.file_name()?.to_str()?;
    let stem = name.strip_suffix(MODEL_SUFFIX)?;
    let extension = match variant {
        GenerationVariant::Declarations => "d.ts",
        GenerationVariant::Classes => "ts",
    };
    Some(format!("{}.{}", stem, extension))
}

fn generate_file(
    model_file: &Path,
    generator: &TypeScriptGenerator,
    args: &GenerateArgs,
    src_dir: &Path,
    out_dir: &Path,
) -> Result<String> {
    let source = fs::read_to_string(model_file)
        .with_context(|| format!("Failed to read {}", model_file.display()))?;
    let model: TypeModel = serde_json::from_str(&source).context("Invalid model JSON")?;
    model.validate().context("Invalid model")?;

    let output = generator.render(&model)?;

    if args.stdout {
        println!("{}", output);
        return Ok("stdout".to_string());
    }

    let variant = if generator.options.output.contains(OutputMode::CLASSES) {
        GenerationVariant::Classes
    } else {
        generator.options.variant
    };
    let file_name = output_file_name(model_file, variant)
        .ok_or_else(|| anyhow!("Not a model file: {}", model_file.display()))?;
    let relative_dir = model_file
        .strip_prefix(src_dir)
        .ok()
        .and_then(Path::parent)
        .unwrap_or_else(|| Path::new(""));
    let output_file = out_dir.join(relative_dir).join(file_name);

    if let Some(parent) = output_file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output_file, output)
        .with_context(|| format!("Failed to write {}", output_file.display()))?;

    Ok(output_file.display().to_string())
}
