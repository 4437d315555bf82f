use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use alloy::{
    primitives::Address,
    signers::{local::PrivateKeySigner, Signer},
};
use alloy_chains::NamedChain;
use serde::Deserialize;

use crate::{
    constants::{
        CHAIN_ENV_VAR, CONFIG_FILE_PATH, DEFAULT_OUTPUT_DIR, DEFAULT_SIGN_TIMEOUT_SECS,
        DEFAULT_WALLETS_FILE_PATH, INFURA_PROJECT_ID_VAR, PRIMARY_ENVIRONMENT, PRIVATE_KEY_VAR,
        SIGNATURES_FILE_STEM,
    },
    errors::ConfigError,
};

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    #[serde(default)]
    pub chain_env: Option<String>,
    #[serde(default = "default_wallets_file_path")]
    pub wallets_file_path: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_sign_timeout_secs")]
    pub sign_timeout_secs: u64,
    pub contracts: HashMap<String, Address>,
}

fn default_wallets_file_path() -> PathBuf {
    PathBuf::from(DEFAULT_WALLETS_FILE_PATH)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_sign_timeout_secs() -> u64 {
    DEFAULT_SIGN_TIMEOUT_SECS
}

impl Config {
    pub async fn read_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let cfg_str = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(toml::from_str(&cfg_str)?)
    }

    pub async fn read_default() -> Result<Self, ConfigError> {
        Self::read_from_file(CONFIG_FILE_PATH).await
    }
}

/// Network environment the signatures are produced for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Environment(String);

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_primary(&self) -> bool {
        self.0 == PRIMARY_ENVIRONMENT
    }

    pub fn output_file_name(&self) -> String {
        if self.is_primary() {
            format!("{SIGNATURES_FILE_STEM}.json")
        } else {
            format!("{}_{SIGNATURES_FILE_STEM}.json", self.0)
        }
    }

    pub fn chain(&self) -> Option<NamedChain> {
        NamedChain::from_str(&self.0).ok()
    }

    /// Infura endpoint for known chains, the mainnet one otherwise.
    pub fn endpoint(&self, project_id: &str) -> String {
        let network = match self.chain() {
            Some(_) => self.name(),
            None => PRIMARY_ENVIRONMENT,
        };
        format!("https://{network}.infura.io/v3/{project_id}")
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(PRIMARY_ENVIRONMENT)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Loads variables from an env file without overriding ones already set.
/// Returns whether the file was found.
pub fn load_env_file(path: impl AsRef<Path>) -> Result<bool, ConfigError> {
    let path = path.as_ref();
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(source) => Err(ConfigError::EnvFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[derive(Clone)]
pub struct Secrets {
    pub private_key: String,
    pub infura_project_id: String,
}

impl Secrets {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::MissingSecret(key))
        };

        Ok(Self {
            private_key: required(PRIVATE_KEY_VAR)?,
            infura_project_id: required(INFURA_PROJECT_ID_VAR)?,
        })
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets").finish_non_exhaustive()
    }
}

/// Everything a batch run needs, resolved once at startup.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub environment: Environment,
    pub contract_address: Address,
    pub signer: PrivateKeySigner,
    pub endpoint: String,
    pub wallets_file_path: PathBuf,
    pub output_path: PathBuf,
    pub sign_timeout: Duration,
}

impl RunConfig {
    pub fn resolve(
        config: Config,
        secrets: Secrets,
        env_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let environment = env_override
            .filter(|name| !name.trim().is_empty())
            .or(config.chain_env)
            .map(|name| Environment::new(name.trim()))
            .unwrap_or_default();

        let contract_address = *config
            .contracts
            .get(environment.name())
            .ok_or_else(|| ConfigError::UnknownEnvironment(environment.to_string()))?;
        if contract_address.is_zero() {
            return Err(ConfigError::ZeroContractAddress(environment.to_string()));
        }

        let signer = PrivateKeySigner::from_str(secrets.private_key.trim())
            .map_err(|e| ConfigError::InvalidPrivateKey(e.to_string()))?
            .with_chain_id(environment.chain().map(|chain| chain as u64));

        Ok(Self {
            endpoint: environment.endpoint(&secrets.infura_project_id),
            output_path: config.output_dir.join(environment.output_file_name()),
            wallets_file_path: config.wallets_file_path,
            sign_timeout: Duration::from_secs(config.sign_timeout_secs),
            environment,
            contract_address,
            signer,
        })
    }

    pub fn from_env(config: Config) -> Result<Self, ConfigError> {
        Self::resolve(config, Secrets::from_env()?, std::env::var(CHAIN_ENV_VAR).ok())
    }

    /// Endpoint with the project credential stripped, safe to log.
    pub fn redacted_endpoint(&self) -> String {
        match self.endpoint.rsplit_once('/') {
            Some((base, _)) => format!("{base}/***"),
            None => self.endpoint.clone(),
        }
    }
}
