use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
    time::Duration,
};

use alloy_primitives::{Address, address};
use emission_zk_emission_circuit::EmissionCircuit;
use serde::{Deserialize, Serialize};

use crate::Error;

/// The environment variable overriding the port the service listens on.
pub const ENV_PORT: &str = "PORT";

const DEFAULT_PORT: u16 = 8080;

/// Sepolia.
const DEFAULT_CHAIN_ID: u64 = 11155111;

const DEFAULT_RPC_URL: &str = "https://sepolia.drpc.org";

const DEFAULT_REFUND_ADDRESS: Address = address!("788997cd5b9feac56d4928539dc21c637c61e69a");

const DEFAULT_FEE_TOKEN: Address = address!("bd2f3813637ed399d5ddbc2307d3bf4ab1695b48");

const DEFAULT_GAS_LIMIT: u64 = 500_000;

const DEFAULT_ESTIMATED_EMISSION: u64 = 10_000;

const DEFAULT_SUBMISSION_TIMEOUT_SECS: u64 = 30 * 60;

/// Chain the storage values are read from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainContext {
    pub chain_id: u64,
    pub rpc_url: String,
}

impl Default for ChainContext {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            rpc_url: DEFAULT_RPC_URL.to_string(),
        }
    }
}

/// Directories used by compilation and submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirConfig {
    /// Where submission records are written.
    pub output: PathBuf,
    /// Where compiled circuit artifacts are written.
    pub circuit: PathBuf,
    /// Where the structured reference string is cached.
    pub srs: PathBuf,
}

impl Default for DirConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("./brevis-output"),
            circuit: PathBuf::from("./brevis-circuit"),
            srs: PathBuf::from("./brevis-srs"),
        }
    }
}

/// Parameters of the cross-chain request registered for every proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestParams {
    pub src_chain_id: u64,
    pub dst_chain_id: u64,
    /// Receives the unused part of the fee.
    pub refund_address: Address,
    /// ERC-20 token the fee is paid in.
    pub fee_token: Address,
    pub gas_limit: u64,
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            src_chain_id: DEFAULT_CHAIN_ID,
            dst_chain_id: DEFAULT_CHAIN_ID,
            refund_address: DEFAULT_REFUND_ADDRESS,
            fee_token: DEFAULT_FEE_TOKEN,
            gas_limit: DEFAULT_GAS_LIMIT,
        }
    }
}

/// Configure the [`ProofService`][crate::ProofService].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub port: u16,
    pub chain: ChainContext,
    pub dirs: DirConfig,
    pub request: RequestParams,
    /// Emission every storage slot is expected to hold.
    pub estimated_emission: u64,
    /// Upper bound on a single submission, `0` disables the deadline.
    pub submission_timeout_secs: u64,
    /// Write a [`SubmissionRecord`][crate::SubmissionRecord] to the output directory for every
    /// finalized request.
    pub dump_records: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            chain: ChainContext::default(),
            dirs: DirConfig::default(),
            request: RequestParams::default(),
            estimated_emission: DEFAULT_ESTIMATED_EMISSION,
            submission_timeout_secs: DEFAULT_SUBMISSION_TIMEOUT_SECS,
            dump_records: false,
        }
    }
}

impl ServiceConfig {
    /// A fresh circuit for the configured emission estimate.
    pub fn circuit(&self) -> EmissionCircuit {
        EmissionCircuit::new(self.estimated_emission)
    }

    pub fn submission_timeout(&self) -> Option<Duration> {
        (self.submission_timeout_secs > 0).then(|| Duration::from_secs(self.submission_timeout_secs))
    }

    /// Apply overrides from the process environment.
    ///
    /// An unset or empty `PORT` keeps the configured port.
    pub fn with_env_overrides(mut self) -> Result<Self, Error> {
        match std::env::var(ENV_PORT) {
            Ok(port) if !port.is_empty() => {
                self.port = port.parse().map_err(|e| Error::Config {
                    path: PathBuf::from(format!("${ENV_PORT}")),
                    src: format!("invalid port {port:?}: {e}"),
                })?;
            }
            _ => {}
        }
        Ok(self)
    }
}

/// Read and deserialize [`ServiceConfig`] from the given path to the TOML config.
pub fn read_service_config<P: AsRef<Path>>(path: P) -> Result<ServiceConfig, Error> {
    let toml_str = read_to_string(&path).map_err(|e| Error::Config {
        path: path.as_ref().into(),
        src: e.to_string(),
    })?;

    toml::from_str(&toml_str).map_err(|e| Error::Config {
        path: path.as_ref().into(),
        src: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_sepolia_deployment() {
        let config = ServiceConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.chain.chain_id, 11155111);
        assert_eq!(config.request.gas_limit, 500_000);
        assert_eq!(config.circuit(), EmissionCircuit::new(10_000));
        assert_eq!(
            config.request.fee_token.to_string().to_lowercase(),
            "0xbd2f3813637ed399d5ddbc2307d3bf4ab1695b48"
        );
        assert_eq!(config.submission_timeout(), Some(Duration::from_secs(1800)));
    }

    #[test]
    fn partial_toml_keeps_defaults() -> eyre::Result<()> {
        let config: ServiceConfig = toml::from_str(
            r#"
            estimated_emission = 42
            submission_timeout_secs = 0

            [dirs]
            output = "/tmp/out"

            [request]
            gas_limit = 1000
            "#,
        )?;

        assert_eq!(config.estimated_emission, 42);
        assert_eq!(config.submission_timeout(), None);
        assert_eq!(config.dirs.output, PathBuf::from("/tmp/out"));
        assert_eq!(config.dirs.srs, DirConfig::default().srs);
        assert_eq!(config.request.gas_limit, 1000);
        assert_eq!(config.request.refund_address, DEFAULT_REFUND_ADDRESS);
        assert_eq!(config.chain, ChainContext::default());
        Ok(())
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = read_service_config("/nonexistent/emission.toml").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("/nonexistent/emission.toml"));
    }
}
