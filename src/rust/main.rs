use churnlens::{ArtifactStore, ChurnPredictor, PredictionRecord, RawInput, RuntimeConfig, write_records};
use anyhow::{bail, Context, Result};
use log::info;
use clap::Parser;
use serde::Deserialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding churn_model.onnx, standard_scaler.json and label_encoders.json
    #[arg(short, long)]
    artifacts: Option<PathBuf>,

    /// JSON file with one customer record or an array of records
    #[arg(short, long)]
    input: PathBuf,

    /// Write the inputs and their predictions as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Verify the artifacts against artifacts.sha256 before loading
    #[arg(long)]
    verify: bool,

    /// Threads ONNX Runtime may use within one operator (0 lets it decide)
    #[arg(long, default_value_t = 0)]
    intra_threads: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InputFile {
    Many(Vec<RawInput>),
    One(RawInput),
}

fn read_inputs(path: &Path) -> Result<Vec<RawInput>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;
    let inputs = match serde_json::from_str::<InputFile>(&json)
        .with_context(|| format!("Input file {} is not a customer record or a list of them", path.display()))?
    {
        InputFile::Many(inputs) => inputs,
        InputFile::One(input) => vec![input],
    };
    if inputs.is_empty() {
        bail!("Input file {} holds no customer records", path.display());
    }
    Ok(inputs)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    info!("=== Starting Churn Prediction ===");

    let store = match &args.artifacts {
        Some(dir) => ArtifactStore::new(dir),
        None => ArtifactStore::new_default(),
    };
    info!("Using artifacts in {:?}", store.artifacts_dir());

    if args.verify {
        let verified = store.verify_artifacts().context("Artifact verification failed")?;
        if !verified {
            bail!("--verify requested but {:?} has no checksum manifest", store.artifacts_dir());
        }
    }

    let start_time = Instant::now();
    let config = RuntimeConfig {
        intra_threads: args.intra_threads,
        ..RuntimeConfig::default()
    };
    let predictor = ChurnPredictor::builder()
        .with_runtime_config(config)
        .with_artifacts(&store)?
        .build()?;
    info!("=== Predictor Built Successfully (took {:.2?}) ===", start_time.elapsed());
    info!("{:?}", predictor.info());

    let inputs = read_inputs(&args.input)?;
    info!("=== Running Predictions ({} inputs) ===", inputs.len());

    let predict_start = Instant::now();
    let mut records: Vec<PredictionRecord> = Vec::new();
    let mut failures = 0;

    for (i, (input, outcome)) in inputs.iter().zip(predictor.predict_batch(&inputs)).enumerate() {
        match outcome {
            Ok(result) => {
                println!("Customer {}: {} ({:.1}%)", i + 1, result.label, result.probability * 100.0);
                records.push(PredictionRecord::new(input, &result));
            }
            Err(e) => {
                failures += 1;
                eprintln!("Customer {}: {}", i + 1, e);
            }
        }
    }

    info!("Prediction time: {:.2?}", predict_start.elapsed());

    if let Some(path) = &args.csv {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_records(&records, file)?;
        info!("Wrote {} record(s) to {}", records.len(), path.display());
    }

    if failures > 0 {
        bail!("{} of {} customer record(s) could not be scored", failures, inputs.len());
    }
    Ok(())
}
