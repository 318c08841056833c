//! IPR Loader - Main entry point

use std::process;

use clap::Parser;
use ipr_common::logging::{init_logging, LogConfig};
use ipr_loader::{Cli, Commands};
use sqlx::postgres::PgPoolOptions;
use tracing::error;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        "ipr_loader=debug,sqlx=info"
    } else {
        "ipr_loader=info,sqlx=warn"
    };
    let log_config = LogConfig::from_env()
        .map(|config| config.with_file_prefix("ipr-loader").with_filter(filter));

    // The loader should still work when logging cannot be set up
    if let Ok(config) = log_config {
        let _ = init_logging(&config);
    }

    if let Err(e) = run(cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(database_url) = cli.database_url else {
        anyhow::bail!("DATABASE_URL is not set");
    };

    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&database_url)
        .await?;

    match cli.command {
        Commands::Load {
            entity,
            dir,
            file,
            patient,
            biopsy,
            delimiter,
        } => {
            let path = dir.join(&file);
            let loaded =
                ipr_loader::loaders::load_file(&pool, entity, &path, &patient, &biopsy, delimiter)
                    .await?;
            println!("Loaded {} {} rows from {}", loaded, entity, path.display());
        },
        Commands::Export {
            entity,
            report,
            dir,
            file,
            delimiter,
        } => {
            let file = file.unwrap_or_else(|| format!("{}.tsv", entity.table()));
            let path = dir.join(&file);
            let written =
                ipr_loader::export::export_report(&pool, entity, report, &path, delimiter).await?;
            println!("Wrote {} {} rows to {}", written, entity, path.display());
        },
    }

    Ok(())
}
