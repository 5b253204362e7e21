//! Loan Amount Prediction Backend
//!
//! A machine learning backend that predicts loan amounts from client and
//! loan application records stored in `PostgreSQL`.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use database::{create_pool, run_migrations};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod commands;
mod figures;

/// Loan Amount Prediction Backend
#[derive(Parser)]
#[command(name = "fastia")]
#[command(about = "ML-based loan amount prediction backend")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import clients and loan applications from a CSV file
    Import {
        /// Path to the CSV file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Train the model on stored records as a tracked run
    Train {
        /// Name for the training run
        #[arg(short, long, default_value = "loan_model")]
        name: String,

        /// Number of training epochs
        #[arg(short, long, default_value = "100")]
        epochs: usize,

        /// Batch size for training
        #[arg(short, long, default_value = "32")]
        batch_size: usize,

        /// Learning rate
        #[arg(short, long, default_value = "0.001")]
        learning_rate: f64,

        /// Held-out test fraction
        #[arg(long, default_value_t = preprocessing::DEFAULT_TEST_SIZE)]
        test_size: f64,

        /// Shuffle seed for the train/test split
        #[arg(long, default_value_t = preprocessing::DEFAULT_SEED)]
        seed: u64,
    },

    /// Predict a loan amount for one applicant described by a JSON file
    Predict {
        /// Path to the applicant JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Run to load the model from (latest finished run if omitted)
        #[arg(short, long)]
        run: Option<Uuid>,
    },

    /// List recent training runs with their metrics
    Runs {
        /// Maximum number of runs to show
        #[arg(short, long, default_value = "10")]
        limit: i64,
    },

    /// Run database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let pool = create_pool(&config::CONFIG.database_url).await?;

    match cli.command {
        Commands::Import { file } => {
            commands::import::run(&pool, &file).await?;
        }
        Commands::Train {
            name,
            epochs,
            batch_size,
            learning_rate,
            test_size,
            seed,
        } => {
            commands::train::run(&pool, &name, epochs, batch_size, learning_rate, test_size, seed)
                .await?;
        }
        Commands::Predict { input, run } => {
            commands::predict::run(&pool, &input, run).await?;
        }
        Commands::Runs { limit } => {
            commands::runs::run(&pool, limit).await?;
        }
        Commands::Migrate => {
            run_migrations(&pool).await?;
            info!("Migrations completed successfully");
        }
    }

    Ok(())
}
