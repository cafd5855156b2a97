use anyhow::Result;
use clap::Parser;
use std::path::Path;

use unitext_cli::input::{load_config, read_input, resolve_file_type, to_payload};
use unitext_core::{ExtractionMode, ExtractionResult, NoopOcr, Pipeline};

#[derive(Parser)]
#[command(name = "unitext")]
#[command(about = "Extract per-page, per-paragraph and per-slide content from documents as JSON")]
struct Args {
    /// Path to the document to process ("-" reads stdin)
    #[arg(short, long)]
    input: String,

    /// Format tag: PDF, DOCX, PPTX or TXT (default: from the input extension)
    #[arg(short = 't', long)]
    file_type: Option<String>,

    /// Input contents are base64 text rather than raw document bytes
    #[arg(long)]
    base64: bool,

    /// Return the full per-aspect representation
    #[arg(long)]
    full: bool,

    /// Collapse the per-unit output into a single string
    #[arg(long)]
    collapse: bool,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Enable timing of all pipeline steps
    #[arg(long)]
    profile: bool,

    /// Skip OCR entirely; images read as empty text
    #[arg(long)]
    no_ocr: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("❌ Extraction failed: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    // Status lines go to stderr so stdout stays valid JSON.
    eprintln!("🦀 unitext document extractor");

    let (mut config, config_path) = load_config(args.config.as_deref().map(Path::new));
    match &config_path {
        Some(path) => eprintln!("📋 Loaded config from: {}", path.display()),
        None => eprintln!("📋 Using default config"),
    }

    // Apply CLI overrides to config
    if args.profile {
        config.pipeline.profile = true;
    }

    let pipeline = if args.no_ocr {
        Pipeline::new(config, Box::new(NoopOcr))
    } else {
        Pipeline::from_config(config)
    };

    let file_type = resolve_file_type(args.file_type.as_deref(), &args.input)?;
    let payload = to_payload(&read_input(&args.input)?, args.base64)?;

    if args.full && args.collapse {
        eprintln!("⚠️  --collapse has no effect together with --full");
    }
    let mode = ExtractionMode {
        return_representation: args.full,
        collapse: args.collapse,
    };

    eprintln!("📄 Processing: {} as {}", args.input, file_type.to_uppercase());
    let result = pipeline.extract_information(&file_type, &payload, mode)?;
    eprintln!("✅ Successfully extracted document");

    save_result(&result, args.output.as_deref(), args.pretty)
}

fn save_result(result: &ExtractionResult, output: Option<&str>, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            eprintln!("💾 Results saved to: {path}");
        }
        None => println!("{json}"),
    }
    Ok(())
}
