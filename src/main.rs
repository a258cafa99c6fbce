use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use diachron::config::Config;
use diachron::era::Era;
use diachron::output::terminal;
use diachron::pipeline::{self, Stage, StageOutcome, StageStatus};

/// Diachron: diachronic character datasets from historical Chinese poetry.
///
/// Builds per-era frequency, diversity, entropy and phonology tables, trains
/// one word-vector model per era, and aligns them to measure how each
/// character's usage drifted over time.
#[derive(Parser)]
#[command(name = "diachron", version, about)]
struct Cli {
    /// Reference era for alignment and frequency diversity (overrides
    /// DIACHRON_REFERENCE_ERA)
    #[arg(long, global = true)]
    reference: Option<Era>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Group raw source CSVs into one corpus table per era
    Corpus,

    /// Count character frequencies per era
    Vocab,

    /// Build the cross-era frequency table over the common vocabulary
    Frequencies,

    /// Contextual diversity of the common characters per era
    Diversity,

    /// Pingshui and Guangyun tone/rhyme annotation
    Phonology,

    /// Left/right neighbor entropy per era
    Entropy,

    /// Frequency diversity against the reference era
    FrequencyDiversity,

    /// Bigram co-occurrence matrices per era
    Cooccurrence,

    /// Whole-corpus lexical database (CAPLD.csv)
    Capld,

    /// Train one word-vector model per era
    Train,

    /// Procrustes-align every era model to the reference era
    Align,

    /// Cross-era cosine similarity of aligned characters
    Similarity {
        /// How many of the most changed characters to show (default: 20)
        #[arg(long, default_value = "20")]
        show: usize,
    },

    /// Run every stage in dependency order
    Run,

    /// Show which inputs exist and which outputs are built
    Status,
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("diachron=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(era) = cli.reference {
        config.reference_era = era;
    }

    let stage = match cli.command {
        Commands::Corpus => Stage::Corpus,
        Commands::Vocab => Stage::Vocab,
        Commands::Frequencies => Stage::Frequencies,
        Commands::Diversity => Stage::Diversity,
        Commands::Phonology => Stage::Phonology,
        Commands::Entropy => Stage::Entropy,
        Commands::FrequencyDiversity => Stage::FrequencyDiversity,
        Commands::Cooccurrence => Stage::Cooccurrence,
        Commands::Capld => Stage::Capld,
        Commands::Train => Stage::Train,
        Commands::Align => Stage::Align,

        Commands::Similarity { show } => {
            let outcome = pipeline::run_stage(Stage::Similarity, &config)?;
            terminal::display_stage_outcome(Stage::Similarity, &outcome);
            if show > 0 {
                let table = pipeline::embeddings::similarity_table(&config)?;
                terminal::display_similarity_preview(&table, show);
            }
            return Ok(());
        }

        Commands::Run => {
            info!(
                source = %config.source_dir.display(),
                output = %config.output_dir.display(),
                reference = %config.reference_era,
                "Running full pipeline"
            );
            let report = pipeline::run_all(&config);
            terminal::display_run_report(&report);

            let failed: Vec<&str> = report
                .iter()
                .filter(|(_, s)| matches!(s, StageStatus::Failed { .. }))
                .map(|(stage, _)| stage.name())
                .collect();
            if !failed.is_empty() {
                anyhow::bail!("{} stage(s) failed: {}", failed.len(), failed.join(", "));
            }
            return Ok(());
        }

        Commands::Status => {
            diachron::status::show(&config)?;
            return Ok(());
        }
    };

    let outcome = pipeline::run_stage(stage, &config)?;
    terminal::display_stage_outcome(stage, &outcome);
    if let StageOutcome::Skipped { .. } = outcome {
        println!(
            "{}",
            "Nothing was written; check the warnings above.".dimmed()
        );
    }
    Ok(())
}
