use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use transaction_sequences::{
    load_transactions, ParserConfig, RawTransaction, SequenceParser, SequenceStorage,
};

/// Find recurring transaction sequences in a statement export
#[derive(Parser)]
#[command(name = "sequence-finder", version)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file overriding parser thresholds
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a transactions file and print the storage as JSON
    Parse {
        /// Transactions file (.json or .csv)
        file: PathBuf,
    },

    /// Print the sequence owning one transaction, or null
    Lookup {
        /// Transactions file (.json or .csv)
        file: PathBuf,

        /// MM/DD/YYYY
        #[arg(long)]
        date: String,

        #[arg(long)]
        description: String,

        #[arg(long, allow_hyphen_values = true)]
        amount: String,
    },

    /// One line per sequence found
    Summary {
        /// Transactions file (.json or .csv)
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("transaction_sequences=debug,info")
        } else {
            EnvFilter::new("transaction_sequences=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => ParserConfig::from_file(path)?,
        None => ParserConfig::default(),
    };
    let parser = SequenceParser::with_config(config);

    match cli.command {
        Commands::Parse { file } => {
            let storage = build_storage(&parser, &file)?;
            println!("{}", serde_json::to_string_pretty(&storage)?);
        }
        Commands::Lookup {
            file,
            date,
            description,
            amount,
        } => {
            let storage = build_storage(&parser, &file)?;
            let query = RawTransaction::new(date, description, amount);
            let sequence = storage.lookup_raw(&query)?;
            println!("{}", serde_json::to_string_pretty(&sequence)?);
        }
        Commands::Summary { file } => {
            let storage = build_storage(&parser, &file)?;
            let sequences = storage.sequences();
            println!("Found {} sequences", sequences.len());
            for sequence in sequences {
                let description = sequence
                    .first_transaction()
                    .map(|tx| tx.description())
                    .unwrap_or_default();
                println!(
                    "  every {:>3} days | {:>3} transactions | {}",
                    sequence.interval,
                    sequence.len(),
                    description
                );
            }
        }
    }

    Ok(())
}

fn build_storage(parser: &SequenceParser, file: &Path) -> Result<SequenceStorage> {
    let records = load_transactions(file)?;
    Ok(parser.parse_storage(&records)?)
}
