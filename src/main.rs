//! delcap CLI - deletion-channel capacity estimation via Blahut-Arimoto.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use delcap::{
    store, BaaSolver, Distribution, ExperimentConfig, IterationRecord, ProgressSink, RunSummary,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "delcap")]
#[command(version)]
#[command(about = "Deletion-channel capacity estimation via the Blahut-Arimoto algorithm")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to experiment file
    #[arg(short, long, global = true, default_value = "experiment.toml")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the BAA until convergence and report the achieved rate
    Run {
        /// Initial distribution array; defaults to uniform
        #[arg(long)]
        initial: Option<PathBuf>,
    },

    /// Evaluate the rate of a stored distribution
    Rate {
        /// Path to the distribution array
        #[arg(short, long)]
        distribution: PathBuf,
    },

    /// Validate an experiment file
    Validate,

    /// Show an example experiment file
    Example,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

fn print_example_config() {
    let example = r#"# delcap experiment file

[channel]
# Transmitted words are input_length bits; one representative per complement
# pair is enumerated, so the input alphabet holds 2^(input_length - 1) words.
input_length = 6
max_output_length = 6
deletion_probability = 0.1
# true: received words span every length up to max_output_length
truncate_output = true

[run]
storage_root = "experiments/d01"
worker_count = 4
# BAA bound at which the run is considered converged
tolerance = 0.05
verbose = false
"#;
    println!("{example}");
}

/// Progress sink that drives an indicatif spinner.
struct SpinnerSink {
    bar: ProgressBar,
}

impl ProgressSink for SpinnerSink {
    fn on_iteration(&mut self, record: &IterationRecord) {
        self.bar.set_position(record.index as u64 + 1);
        self.bar
            .set_message(format!("distance: {:.6}", record.distance));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Example => {
            print_example_config();
            return Ok(());
        }

        Commands::Validate => {
            let config = ExperimentConfig::from_file(&cli.config)
                .with_context(|| format!("Failed to load experiment from {:?}", cli.config))?;
            config.validate().context("Invalid experiment file")?;

            info!("Experiment file is valid");
            info!(
                "  Input alphabet:  {} words",
                config.channel.input_alphabet_size()
            );
            info!(
                "  Output alphabet: {} words",
                config.channel.output_alphabet_size()
            );
            info!("  Workers:         {}", config.run.worker_count);
            info!("  Tolerance:       {}", config.run.tolerance);
            return Ok(());
        }

        Commands::Run { initial } => {
            let config = ExperimentConfig::from_file(&cli.config)
                .with_context(|| format!("Failed to load experiment from {:?}", cli.config))?;
            let mut run = config.run.clone();
            if cli.verbose {
                run.verbose = true;
            }

            let solver = BaaSolver::new(config.channel.clone(), run.clone())?;
            let initial_q = match initial {
                Some(path) => Distribution::from_probs(store::load_array(&path)?)?,
                None => Distribution::uniform(config.channel.input_alphabet_size())?,
            };

            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner} [{elapsed_precise}] iteration {pos} {msg}")
                    .unwrap(),
            );
            let mut sink = SpinnerSink { bar: bar.clone() };

            let start = Instant::now();
            let outcome = solver.run(initial_q, &mut sink).await?;
            let runtime_secs = start.elapsed().as_secs_f64();
            bar.finish_and_clear();

            store::save_array(outcome.distribution.as_slice(), &run.final_q_path())?;

            let summary = RunSummary {
                input_length: config.channel.input_length,
                max_output_length: config.channel.max_output_length,
                deletion_probability: config.channel.deletion_probability,
                truncate_output: config.channel.truncate_output,
                worker_count: run.worker_count,
                tolerance: run.tolerance,
                iterations: outcome.iterations,
                final_distance: outcome.distance,
                rate_bits: outcome.rate_bits,
                runtime_secs,
                completed_at: Utc::now(),
            };
            let file =
                File::create(run.summary_path()).context("Failed to create summary file")?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &summary)
                .context("Failed to write summary")?;
            writer.flush().context("Failed to flush summary")?;

            println!("\n=== BAA Run Complete ===");
            println!("Iterations:  {}", outcome.iterations);
            println!("Distance:    {:.6}", outcome.distance);
            println!("Rate:        {:.6} bits", outcome.rate_bits);
            println!("Runtime:     {runtime_secs:.1}s");
            println!("Output:      {:?}", run.storage_root);
        }

        Commands::Rate { distribution } => {
            let config = ExperimentConfig::from_file(&cli.config)
                .with_context(|| format!("Failed to load experiment from {:?}", cli.config))?;

            let solver = BaaSolver::new(config.channel.clone(), config.run.clone())?;
            let q = Distribution::from_probs(store::load_array(&distribution)?)?;
            solver.prepare()?;
            let rate_bits = solver.rate(&q).await?;

            println!("Rate: {rate_bits:.6} bits");
        }
    }

    Ok(())
}
