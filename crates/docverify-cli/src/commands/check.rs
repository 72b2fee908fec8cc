//! Check command: verify a single document outside the input layout.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use console::style;

use docverify_core::{
    DocumentSource, EmbeddedImageRasterizer, RunReport, VerificationPipeline, load_expected_fields,
};

use super::{load_config, load_engine};

/// Output format for the check command.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Document to verify (PDF, PNG or JPEG)
    #[arg(required = true)]
    file: PathBuf,

    /// Metadata JSON with expected fields (defaults to the sibling .json)
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Include recognized fragments in the output
    #[arg(long)]
    fragments: bool,
}

pub async fn run(args: CheckArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    if !args.file.exists() {
        anyhow::bail!("File not found: {}", args.file.display());
    }

    let Some(source) = DocumentSource::from_path(&args.file, None) else {
        anyhow::bail!("Unsupported file format: {}", args.file.display());
    };

    let mut config = load_config(config_path)?;
    if let Some(dir) = args.model_dir {
        config.models.model_dir = dir;
    }
    config.validate()?;

    let engine = load_engine(&config)?;
    let rasterizer = EmbeddedImageRasterizer::new().with_max_pages(config.pdf.max_pages);
    let pipeline = VerificationPipeline::from_config(engine, rasterizer, &config)?;

    let metadata = args.metadata.unwrap_or_else(|| source.metadata_path());
    let fields = load_expected_fields(&metadata);
    if fields.is_empty() {
        eprintln!(
            "{} No expected fields in {}",
            style("⚠").yellow(),
            metadata.display()
        );
    }

    let fragments = pipeline.extract_fragments(&source)?;
    let doc = pipeline
        .verifier()
        .verify(source.document_id.clone(), None, fragments, &fields);

    let report = RunReport::build(std::slice::from_ref(&doc), args.fragments);

    match args.format {
        OutputFormat::Json => {
            let document = report.batches.first().and_then(|b| b.documents.first());
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        OutputFormat::Text => {
            print!("{}", report.to_text());
            if args.fragments {
                println!();
                println!("Fragments:");
                for fragment in &doc.fragments {
                    println!("  {:.2}  {}", fragment.confidence, fragment.text);
                }
            }
        }
    }

    let marker = if doc.found_count() == doc.total_count() {
        style("✓").green()
    } else {
        style("✗").red()
    };
    eprintln!(
        "{} {}/{} fields found in {}",
        marker,
        doc.found_count(),
        doc.total_count(),
        source.document_id
    );

    Ok(())
}
