//! Run command: verify every document under the input root.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use docverify_core::verify::aggregate::batch_name;
use docverify_core::{
    DocumentVerification, EmbeddedImageRasterizer, RunReport, VerificationPipeline,
    discover_documents,
};

use super::{load_config, load_engine};

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Input root (overrides config and INPUT_DIR)
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Directory for report.json and report.txt (JSON goes to stdout if unset)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Minimum fuzzy score (0-100) for a text field to match
    #[arg(long)]
    name_threshold: Option<f64>,

    /// Maximum absolute difference for a numeric field to match
    #[arg(long)]
    value_tolerance: Option<f64>,

    /// Also generate a per-document summary CSV
    #[arg(long)]
    summary: bool,

    /// Embed recognized fragments in the JSON report
    #[arg(long)]
    include_fragments: bool,
}

pub async fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(dir) = args.input_dir {
        config.input.input_dir = dir;
    }
    if let Some(dir) = args.model_dir {
        config.models.model_dir = dir;
    }
    if let Some(threshold) = args.name_threshold {
        config.matching.name_match_threshold = threshold;
    }
    if let Some(tolerance) = args.value_tolerance {
        config.matching.value_tolerance = tolerance;
    }
    if args.include_fragments {
        config.report.include_fragments = true;
    }
    config.validate()?;

    // Status lines move to stderr when stdout carries the JSON report.
    let json_on_stdout = args.output_dir.is_none();

    let sources = discover_documents(&config.input.input_dir)?;
    if sources.is_empty() {
        status(
            json_on_stdout,
            format!(
                "{} No documents found under {}",
                style("ℹ").blue(),
                config.input.input_dir.display()
            ),
        );
    } else {
        status(
            json_on_stdout,
            format!("{} Found {} documents to verify", style("ℹ").blue(), sources.len()),
        );
    }

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let mut documents = Vec::with_capacity(sources.len());
    if !sources.is_empty() {
        // No document is processed without an engine.
        let engine = load_engine(&config)?;
        let rasterizer = EmbeddedImageRasterizer::new().with_max_pages(config.pdf.max_pages);
        let pipeline = VerificationPipeline::from_config(engine, rasterizer, &config)?;

        let pb = ProgressBar::new(sources.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("=>-"),
        );

        for source in &sources {
            pb.set_message(source.document_id.clone());
            documents.push(pipeline.process_document(source));
            pb.inc(1);
        }
        pb.finish_with_message("Complete");
    }

    let report = RunReport::build(&documents, config.report.include_fragments);

    match args.output_dir {
        Some(ref output_dir) => {
            let json_path = output_dir.join("report.json");
            fs::write(&json_path, serde_json::to_string_pretty(&report)?)?;
            fs::write(output_dir.join("report.txt"), report.to_text())?;
            debug!("Wrote report to {}", json_path.display());
            println!(
                "{} Report written to {}",
                style("✓").green(),
                output_dir.display()
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &documents)?;
        status(
            json_on_stdout,
            format!(
                "{} Summary written to {}",
                style("✓").green(),
                summary_path.display()
            ),
        );
    }

    let overall = &report.overall;
    status(json_on_stdout, "");
    status(
        json_on_stdout,
        format!(
            "{} Verified {} documents in {} batches in {:?}",
            style("✓").green(),
            overall.total_documents,
            overall.total_batches,
            start.elapsed()
        ),
    );
    status(
        json_on_stdout,
        format!(
            "   {}/{} fields found ({:.2}%), {} documents failed",
            style(overall.fields_found).green(),
            overall.total_fields,
            overall.success_rate,
            style(overall.failed_documents).red()
        ),
    );

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        status(json_on_stdout, "");
        status(json_on_stdout, style("Failed documents:").red());
        for (batch, doc) in failures {
            status(
                json_on_stdout,
                format!(
                    "  - {}/{}: {}",
                    batch,
                    doc.document_id,
                    doc.error.as_deref().unwrap_or("unknown error")
                ),
            );
        }
    }

    Ok(())
}

fn status(json_on_stdout: bool, line: impl fmt::Display) {
    if json_on_stdout {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

/// One CSV row per document.
fn write_summary(path: &Path, documents: &[DocumentVerification]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "batch",
        "document",
        "status",
        "fields_found",
        "total_fields",
        "fragments",
        "error",
    ])?;

    for doc in documents {
        wtr.write_record([
            batch_name(doc.batch_id.as_deref()),
            &doc.document_id,
            if doc.is_failed() { "error" } else { "ok" },
            &doc.found_count().to_string(),
            &doc.total_count().to_string(),
            &doc.fragments.len().to_string(),
            doc.error.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docverify_core::TextFragment;

    #[test]
    fn test_write_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");

        let docs = vec![
            DocumentVerification::new("a.png", None, vec![TextFragment::new("Total", 0.9)]),
            DocumentVerification::failed("b.pdf", Some("edital-1".to_string()), "PDF has no pages"),
        ];
        write_summary(&path, &docs).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "batch,document,status,fields_found,total_fields,fragments,error");
        assert_eq!(lines[1], "default,a.png,ok,0,0,1,");
        assert_eq!(lines[2], "edital-1,b.pdf,error,0,0,0,PDF has no pages");
    }
}
