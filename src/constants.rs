// FILES
pub const CONFIG_FILE_PATH: &str = "data/config.toml";
pub const ENV_FILE_PATH: &str = ".env";
pub const DEFAULT_WALLETS_FILE_PATH: &str = "data/wallets.txt";
pub const DEFAULT_OUTPUT_DIR: &str = "data";
pub const LOGS_DIR: &str = "logs";
pub const LOG_FILE_NAME: &str = "claim-signer.log";

// ENVIRONMENT VARIABLES
pub const PRIVATE_KEY_VAR: &str = "PRIVATE_KEY";
pub const INFURA_PROJECT_ID_VAR: &str = "INFURA_PROJECT_ID";
pub const CHAIN_ENV_VAR: &str = "CHAIN_ENV";

pub const PRIMARY_ENVIRONMENT: &str = "mainnet";
pub const SIGNATURES_FILE_STEM: &str = "signatures";
pub const DEFAULT_SIGN_TIMEOUT_SECS: u64 = 30;

pub const SALT_LENGTH: usize = 16;
