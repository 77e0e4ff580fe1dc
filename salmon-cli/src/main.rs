mod cli;
mod config;

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{Level, error, info, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::{
    cli::{Args, Commands, TokenAction},
    config::AppConfig,
};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose, args.quiet) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }

    if let Err(e) = run(args).await {
        error!("Application error: {e:#}");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = AppConfig::load(args.config.as_deref())?;

    // Stored tokens bypass the client so an override never shadows the store.
    let command = match args.command {
        Commands::Token {
            action: TokenAction::Set { token },
        } => {
            config.store_api_token(&token, args.config.as_deref()).await?;
            println!("Api token updated");
            return Ok(());
        }
        command => command,
    };

    let client = config.build_client(args.api_token.as_deref()).await?;

    match command {
        Commands::Result { job_id } => print_json(&client.get_result(job_id).await?)?,

        Commands::Page { page, count } => {
            let count = count.unwrap_or(client.config().page_size);
            print_json(&client.get_results(page, count).await?)?;
        }

        Commands::Range {
            from,
            to,
            best_effort,
        } => {
            if best_effort {
                let fetch = client.get_results_range_partial(from, to).await;
                for (page, e) in &fetch.failures {
                    warn!(page, "Page failed: {e}");
                }
                print_json(&fetch.results)?;
            } else {
                print_json(&client.get_results_range(from, to).await?)?;
            }
        }

        Commands::Upload { job_id } => print_json(&client.upload_result(job_id).await?)?,

        Commands::UploadSince { job_id } => {
            let pairs = client.upload_results(job_id).await?;
            info!(uploaded = pairs.len(), "Upload finished");
            let summary: Vec<_> = pairs
                .iter()
                .map(|(response, result)| {
                    serde_json::json!({
                        "job_id": result.job_id,
                        "salmon_id": response.salmon_id,
                        "created": response.created,
                    })
                })
                .collect();
            print_json(&summary)?;
        }

        Commands::Metadata { nsaid } => print_json(&client.get_metadata(&nsaid).await?)?,

        Commands::Player { nsaid } => print_json(&client.get_player_metadata(&nsaid).await?)?,

        Commands::Token { .. } => match client.api_token().await {
            Some(token) => println!("{}", mask(&token)),
            None => println!("No api token set"),
        },
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// Show only the last four characters of a secret. Short secrets are masked
/// entirely.
fn mask(secret: &str) -> String {
    if secret.chars().count() <= 8 {
        return "********".to_string();
    }
    let visible: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{visible}")
}

fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(verbose)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .context("failed to install logger")?;
    Ok(())
}
