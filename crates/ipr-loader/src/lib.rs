//! IPR Loader Library
//!
//! Command-line tooling for moving pipeline data in and out of the IPR
//! database:
//!
//! - **Load**: parse a delimited pipeline output file (TSV/CSV with a header
//!   row), remap pipeline column names to database columns, and bulk-insert
//!   the rows against a report resolved by patient and biopsy (`load`)
//! - **Export**: query the live rows of a report sub-entity, rename columns
//!   back through the same dictionary, and write a delimited file (`export`)

pub mod error;
pub mod export;
pub mod loaders;
pub mod remap;

// Re-export commonly used types
pub use error::{LoaderError, Result};
pub use remap::Entity;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// IPR Loader - pipeline file ingestion and export
#[derive(Parser, Debug)]
#[command(name = "ipr-loader")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database connection string
    #[arg(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,
}

/// Available loader commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a delimited pipeline file and bulk-insert its rows
    Load {
        /// Sub-entity the file contains
        #[arg(value_enum)]
        entity: Entity,

        /// Directory holding the input file
        #[arg(short, long)]
        dir: PathBuf,

        /// Input file name
        #[arg(short, long)]
        file: String,

        /// Patient identifier owning the target report
        #[arg(short, long)]
        patient: String,

        /// Biopsy name resolving the target report
        #[arg(short, long)]
        biopsy: String,

        /// Field delimiter (inferred from the file extension by default)
        #[arg(long)]
        delimiter: Option<char>,
    },

    /// Export live rows of a report sub-entity to a delimited file
    Export {
        /// Sub-entity to export
        #[arg(value_enum)]
        entity: Entity,

        /// Report ident
        #[arg(short, long)]
        report: Uuid,

        /// Output directory
        #[arg(short, long)]
        dir: PathBuf,

        /// Output file name (defaults to `<table>.tsv`)
        #[arg(short, long)]
        file: Option<String>,

        /// Field delimiter (inferred from the file extension by default)
        #[arg(long)]
        delimiter: Option<char>,
    },
}
