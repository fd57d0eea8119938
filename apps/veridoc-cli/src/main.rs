//! Command-line entry points for document risk analysis.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doc_pipeline::{build_dataset, AnalyzeOptions, Analyzer, DatasetOptions, MlScorer};
use risk_engine::config::EngineConfig;
use shared_types::DocumentType;

#[derive(Parser)]
#[command(name = "veridoc", version, about = "Vehicle document fraud-risk analysis")]
struct Cli {
    /// Configuration file (YAML); defaults apply when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one document with the heuristic rule catalog
    Analyze {
        path: PathBuf,
        /// Declared document type (TITULO, CEDULA, VTV, SEGURO, INFORME, SERVICIO)
        #[arg(long, default_value = "OTRO")]
        doc_type: String,
        /// OCR language override
        #[arg(long)]
        lang: Option<String>,
        /// Skip OCR; text signals report as absent
        #[arg(long)]
        no_ocr: bool,
        /// Keep the scratch directory with rendered pages
        #[arg(long)]
        keep_temp: bool,
        /// Emit the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Walk a labeled corpus and append feature rows to a training CSV
    BuildDataset {
        /// Root directory of raw documents, one subdirectory per type
        #[arg(long)]
        input: PathBuf,
        /// Output CSV, appended to incrementally
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 4)]
        workers: usize,
        /// Discard the existing CSV and start over
        #[arg(long)]
        rebuild: bool,
        /// OCR language override
        #[arg(long)]
        lang: Option<String>,
    },
    /// Score one document with the trained model
    Predict {
        path: PathBuf,
        /// Declared document type
        #[arg(long, default_value = "OTRO")]
        doc_type: String,
        /// OCR language override
        #[arg(long)]
        lang: Option<String>,
        /// Directory holding feature_spec.json and model.json
        #[arg(long)]
        model: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(p) => {
            EngineConfig::load(p).with_context(|| format!("loading config from {}", p.display()))
        }
        None => Ok(EngineConfig::default()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "veridoc_cli=info,doc_pipeline=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Analyze {
            path,
            doc_type,
            lang,
            no_ocr,
            keep_temp,
            json,
        } => {
            config.paths.keep_temp = keep_temp;
            let analyzer = Analyzer::new(config);
            let options = AnalyzeOptions {
                language: lang,
                ocr_enabled: !no_ocr,
            };
            let result = analyzer.analyze(&path, DocumentType::parse(&doc_type), &options)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", path.display());
                println!(
                    "  score: {}/100 ({:.4})  label: {}",
                    result.risk_score100, result.risk_score01, result.risk_label
                );
                for reason in &result.reasons {
                    println!("  [{:.2}] {}  {}", reason.weight, reason.code, reason.message);
                }
                println!(
                    "  pages: {}  ocr chars: {}  hash: {}",
                    result.ocr_stats.pages, result.ocr_stats.total_chars, result.file_hash
                );
            }
        }

        Command::BuildDataset {
            input,
            out,
            workers,
            rebuild,
            lang,
        } => {
            let analyzer = Analyzer::new(config);
            let summary = build_dataset(
                &analyzer,
                &DatasetOptions {
                    input,
                    out_csv: out,
                    workers,
                    rebuild,
                    language: lang,
                },
            )?;

            println!(
                "found {}  processed {}  skipped {} existing, {} unsupported  errors {}",
                summary.found,
                summary.processed,
                summary.skipped_existing,
                summary.skipped_unsupported,
                summary.errors
            );
            if summary.errors > 0 {
                std::process::exit(1);
            }
        }

        Command::Predict {
            path,
            doc_type,
            lang,
            model,
        } => {
            let scorer = MlScorer::load(&model)
                .with_context(|| format!("loading model artifacts from {}", model.display()))?;
            let analyzer = Analyzer::new(config);
            let options = AnalyzeOptions {
                language: lang,
                ocr_enabled: true,
            };
            let result = scorer.score(&analyzer, &path, DocumentType::parse(&doc_type), &options)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
