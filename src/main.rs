use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use voxmetrics::{analysis, report};

/// voxmetrics - vocal metrics extraction and PDF report generation
///
/// `analyze` turns a recording into a JSON metrics record on stdout;
/// `report` turns a metrics record into a paginated A4 PDF.
#[derive(Parser, Debug)]
#[command(name = "voxmetrics")]
#[command(version = "0.1.0")]
#[command(about = "Vocal analysis and report generation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze an audio recording and print a JSON metrics record.
    Analyze(AnalyzeArgs),
    /// Render a PDF report from a previously produced metrics record.
    Report(ReportArgs),
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Input audio file (WAV or any format symphonia can decode).
    #[arg(value_name = "AUDIO")]
    audio_file: PathBuf,

    /// Exercise the recording was made for (selects the metric set);
    /// unrecognised values fall back to the sustained-vowel set.
    #[arg(long, default_value = "sustained-vowel")]
    exercise: String,

    /// Also write the JSON record to this path.
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Metrics JSON file produced by `analyze`.
    #[arg(value_name = "METRICS_JSON")]
    metrics_file: PathBuf,

    /// Output PDF path; defaults to the metrics file with a .pdf extension.
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,
}

impl AnalyzeArgs {
    fn validate(&self) -> Result<()> {
        if !self.audio_file.is_file() {
            anyhow::bail!("Input audio file not found: {:?}", self.audio_file);
        }
        Ok(())
    }
}

impl ReportArgs {
    fn validate(&self) -> Result<()> {
        if !self.metrics_file.is_file() {
            anyhow::bail!("Metrics file not found: {:?}", self.metrics_file);
        }
        Ok(())
    }

    fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.metrics_file.with_extension("pdf"))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Analyze(args) => run_analyze(&args),
        Command::Report(args) => run_report(&args),
    }
}

fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    args.validate()
        .context("Failed to validate command-line arguments")?;

    let record = analysis::analyze_file(&args.audio_file, &args.exercise)?;
    let json = serde_json::to_string_pretty(&record).context("Failed to serialize metrics")?;

    if let Some(path) = &args.output {
        write_output(path, &json)?;
    }
    println!("{json}");
    Ok(())
}

fn run_report(args: &ReportArgs) -> Result<()> {
    args.validate()
        .context("Failed to validate command-line arguments")?;

    let output = args.output_path();
    report::render_report_file(&args.metrics_file, &output)?;
    println!("{}", output.display());
    Ok(())
}

fn write_output(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {parent:?}"))?;
    }
    std::fs::write(path, json).with_context(|| format!("Failed to write metrics to {path:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_analyze_with_exercise() {
        let cli = Cli::try_parse_from([
            "voxmetrics",
            "analyze",
            "take.wav",
            "--exercise",
            "range-analysis",
        ])
        .unwrap();
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze command");
        };
        assert_eq!(args.audio_file, PathBuf::from("take.wav"));
        assert_eq!(args.exercise, "range-analysis");
        assert!(args.output.is_none());
    }

    #[test]
    fn analyze_requires_an_audio_argument() {
        assert!(Cli::try_parse_from(["voxmetrics", "analyze"]).is_err());
    }

    #[test]
    fn report_output_defaults_to_pdf_extension() {
        let cli = Cli::try_parse_from(["voxmetrics", "report", "client/metrics.json"]).unwrap();
        let Command::Report(args) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.output_path(), PathBuf::from("client/metrics.pdf"));
    }
}
