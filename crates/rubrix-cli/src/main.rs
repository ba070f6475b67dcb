//! rubrix CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "rubrix", version, about = "Rubric-based constrained-text evaluation engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a single answer
    Evaluate {
        /// The question being answered
        #[arg(long)]
        question: String,

        /// The answer text, inline
        #[arg(long, conflicts_with = "answer_file")]
        answer: Option<String>,

        /// Read the answer text from a file
        #[arg(long)]
        answer_file: Option<PathBuf>,

        /// Submission id (generated when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Topic hint for reference retrieval
        #[arg(long)]
        topic: Option<String>,

        /// Expected word limit
        #[arg(long)]
        word_limit: Option<u32>,

        /// Skip AI backends and score heuristically
        #[arg(long)]
        offline: bool,

        /// Persist the evaluation under this directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Evaluate a TOML batch of submissions
    Batch {
        /// Path to the batch .toml file
        #[arg(long)]
        file: PathBuf,

        /// Output directory for persisted evaluations
        #[arg(long)]
        output: Option<PathBuf>,

        /// Max concurrent evaluations
        #[arg(long)]
        parallelism: Option<usize>,

        /// Skip AI backends and score heuristically
        #[arg(long)]
        offline: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example batch file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rubrix=info".parse().expect("valid directive")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Evaluate {
            question,
            answer,
            answer_file,
            id,
            topic,
            word_limit,
            offline,
            output,
            config,
        } => {
            commands::evaluate::execute(
                question,
                answer,
                answer_file,
                id,
                topic,
                word_limit,
                offline,
                output,
                config,
            )
            .await
        }
        Commands::Batch {
            file,
            output,
            parallelism,
            offline,
            config,
        } => commands::batch::execute(file, output, parallelism, offline, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
