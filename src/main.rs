use std::process::ExitCode;

use config::{load_env_file, Config, RunConfig};
use constants::ENV_FILE_PATH;
use errors::{AppError, BatchError};
use generator::TokenBatchGenerator;
use logger::init_default_logger;
use output::{partial_output_path, write_token_book};
use wallets::{read_wallets, WalletEntry};

mod config;
mod constants;
mod errors;
mod generator;
mod logger;
mod output;
mod token;
mod wallets;

#[tokio::main]
async fn main() -> ExitCode {
    let _guard = init_default_logger();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), AppError> {
    if load_env_file(ENV_FILE_PATH)? {
        tracing::info!("Loaded environment from {ENV_FILE_PATH}");
    }

    let config = Config::read_default().await?;
    let run_config = RunConfig::from_env(config)?;

    tracing::info!(
        "Environment: {} (chain id {}), contract {}, signer {}, endpoint {}",
        run_config.environment,
        run_config
            .environment
            .chain()
            .map_or_else(|| "unknown".to_string(), |chain| (chain as u64).to_string()),
        run_config.contract_address,
        run_config.signer.address(),
        run_config.redacted_endpoint(),
    );

    let wallets = read_wallets(&run_config.wallets_file_path).await?;
    generate_signatures(&run_config, &wallets).await
}

async fn generate_signatures(
    run_config: &RunConfig,
    wallets: &[WalletEntry],
) -> Result<(), AppError> {
    let generator = TokenBatchGenerator::from_config(run_config);

    let book = match generator.run_batch(wallets).await {
        Ok(book) => book,
        Err(BatchError::Signing {
            wallet,
            partial,
            reason,
        }) => {
            if !partial.is_empty() {
                let path = partial_output_path(&run_config.output_path);
                match write_token_book(&partial, &path).await {
                    Ok(()) => tracing::warn!("Flushed {} signatures to {}", partial.len(), path.display()),
                    Err(e) => tracing::error!("Failed to flush partial signatures: {e}"),
                }
            }
            return Err(BatchError::Signing {
                wallet,
                partial,
                reason,
            }
            .into());
        }
    };

    write_token_book(&book, &run_config.output_path).await?;

    Ok(())
}
