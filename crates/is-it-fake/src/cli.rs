use std::{io::Read, net::SocketAddr, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum, builder::RangedU64ValueParser};
use is_it_fake_preprocessing::{DEFAULT_MAX_FEATURES, VectorizerParams};
use tracing::info;

use crate::{
    ClassifierParams, Detector, FAKE_THRESHOLD, RawPosting, ScoreResult,
    config::{DEFAULT_MODEL_PATH, ServiceConfig},
    server,
    training::{self, TrainingConfig, TrainingReport},
};

#[derive(Parser)]
#[command(name = "is-it-fake")]
#[command(about = "Detect fraudulent job postings", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fit the pipeline on a labelled CSV and write the artifact
    Train {
        /// CSV with title, company_profile, description, requirements, benefits, fraudulent
        #[arg(short, long, value_name = "PATH")]
        dataset: PathBuf,

        /// Where to write the fitted pipeline
        #[arg(short, long, value_name = "PATH", default_value = DEFAULT_MODEL_PATH)]
        artifact: PathBuf,

        /// Vocabulary cap
        #[arg(
            long,
            default_value_t = DEFAULT_MAX_FEATURES,
            value_parser = RangedU64ValueParser::<usize>::new().range(1..)
        )]
        max_features: usize,

        /// Optimizer iteration cap
        #[arg(long, default_value_t = 1000)]
        max_iter: usize,

        /// Fraction of rows held out for evaluation
        #[arg(long, default_value_t = 0.2)]
        test_size: f64,

        /// Shuffle seed for the train/test split
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Inverse regularization strength
        #[arg(long, default_value_t = 1.0)]
        c: f64,
    },

    /// Serve POST /predict over HTTP
    Serve {
        /// Pipeline artifact (defaults to MODEL_PATH)
        #[arg(short, long, value_name = "PATH")]
        artifact: Option<PathBuf>,

        /// Bind host (defaults to HOST)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (defaults to PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Score one posting given as a JSON object
    Score {
        /// Pipeline artifact
        #[arg(short, long, value_name = "PATH", default_value = DEFAULT_MODEL_PATH)]
        artifact: PathBuf,

        /// JSON file with the posting (reads stdin if omitted)
        #[arg(short, long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Output format
        #[arg(short = 'o', long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Classification threshold
        #[arg(short = 't', long, default_value_t = FAKE_THRESHOLD)]
        threshold: f64,
    },
}

#[derive(ValueEnum, Clone, Copy)]
pub enum OutputFormat {
    /// Output as JSON
    Json,
    /// Human-readable output with confidence
    Human,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Train {
            dataset,
            artifact,
            max_features,
            max_iter,
            test_size,
            seed,
            c,
        } => {
            let training_config = TrainingConfig {
                test_size,
                seed,
                vectorizer: VectorizerParams::default().with_max_features(max_features),
                classifier: ClassifierParams {
                    c,
                    max_iter,
                    ..ClassifierParams::default()
                },
            };
            let report = training::train(&dataset, &artifact, &training_config)
                .with_context(|| format!("Training on {} failed", dataset.display()))?;
            print_report(&report, &artifact);
            Ok(())
        }
        Command::Serve {
            artifact,
            host,
            port,
        } => {
            let config = ServiceConfig::from_env()?;
            let artifact = artifact.unwrap_or(config.model_path);
            let detector = Detector::load(&artifact).context("Refusing to start without a model")?;
            let host = host.unwrap_or(config.host);
            let port = port.unwrap_or(config.port);
            let addr: SocketAddr = format!("{host}:{port}")
                .parse()
                .with_context(|| format!("Invalid bind address {host}:{port}"))?;
            info!("Starting is-it-fake API v{}", env!("CARGO_PKG_VERSION"));

            let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            runtime.block_on(server::serve(detector, addr))
        }
        Command::Score {
            artifact,
            file,
            format,
            threshold,
        } => {
            let posting = read_posting(file.as_ref())?;
            let detector = Detector::load(&artifact)?.with_threshold(threshold);
            let result = detector.score(posting)?;
            output_result(&result, format)
        }
    }
}

fn read_posting(file: Option<&PathBuf>) -> Result<RawPosting> {
    let contents = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            buffer
        }
    };
    serde_json::from_str(&contents).context("Failed to parse posting JSON")
}

fn output_result(result: &ScoreResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(result)?),
        OutputFormat::Human => {
            println!("Result: {}", result.prediction);
            println!("Fake probability: {:.2}%", result.fake_probability);
            println!("Confidence: {:.2}%", result.confidence);
        }
    }
    Ok(())
}

fn print_report(report: &TrainingReport, artifact: &std::path::Path) {
    println!("Model trained and saved to {}", artifact.display());
    println!(
        "Rows: {} used, {} dropped ({} train / {} test)",
        report.rows_used, report.rows_dropped, report.train_rows, report.test_rows
    );
    println!(
        "Vocabulary: {} terms; optimizer {} after {} iterations",
        report.num_features,
        if report.fit.converged { "converged" } else { "stopped" },
        report.fit.iterations
    );
    if let Some(eval) = &report.evaluation {
        println!(
            "Hold-out at threshold {FAKE_THRESHOLD:.2}: accuracy {:.3}, precision {:.3}, recall {:.3}, f1 {:.3}",
            eval.accuracy(),
            eval.precision(),
            eval.recall(),
            eval.f1()
        );
    }
}
