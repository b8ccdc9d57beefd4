//! Process configuration, read once at startup from flags or the environment.

use std::convert::Infallible;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use url::Url;
use webacy_mcp_core::Mode;
use webacy_mcp_tools::client::{WebacyConfig, DEFAULT_API_URL};

use crate::error::StartupError;

pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x9f2B42FB651b75CC3db4ef9FEd913A22BA4629Cf";
pub const DEFAULT_CHAIN_ID: u64 = 1223953;
pub const DEFAULT_RPC_URL: &str = "https://rpc.testnet.radiustech.xyz";
pub const DEFAULT_ENDPOINT: &str = "/mcp";

/// How the server talks to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportKind {
    /// Newline-delimited JSON-RPC on stdin/stdout
    #[default]
    Stdio,
    /// JSON-RPC over HTTP POST
    Http,
}

/// Boolean switch from a flag or an environment variable.
///
/// `true`, `1`, `yes` and `on` (any case) enable it. Any other value leaves it
/// off rather than failing startup.
pub fn parse_env_flag(value: &str) -> Result<bool, Infallible> {
    Ok(matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    ))
}

/// Command-line and environment configuration.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "webacy-mcp-server",
    version,
    about = "EVMAuth-gated Webacy risk-analysis tools over MCP"
)]
pub struct ServerConfig {
    /// EVMAuth contract holding the access tokens
    #[arg(long, env = "RADIUS_CONTRACT_ADDRESS", default_value = DEFAULT_CONTRACT_ADDRESS)]
    pub contract_address: String,

    #[arg(long, env = "RADIUS_CHAIN_ID", default_value_t = DEFAULT_CHAIN_ID)]
    pub chain_id: u64,

    #[arg(long, env = "RADIUS_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Proof verification endpoint (required unless demo mode is on)
    #[arg(long, env = "RADIUS_AUTHORITY_URL")]
    pub authority_url: Option<String>,

    /// Timeout for authority requests, in seconds
    #[arg(long, env = "RADIUS_AUTHORITY_TIMEOUT", default_value_t = 30)]
    pub authority_timeout: u64,

    /// Skip authorization for every tool (offline demos only)
    #[arg(long, env = "DEMO_MODE", action = ArgAction::SetTrue, value_parser = parse_env_flag)]
    pub demo_mode: bool,

    #[arg(long, env = "MCP_TRANSPORT", value_enum, default_value_t = TransportKind::Stdio)]
    pub transport: TransportKind,

    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// HTTP path serving JSON-RPC
    #[arg(long, env = "MCP_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    #[arg(long, env = "WEBACY_API_KEY", default_value = "", hide_env_values = true)]
    pub webacy_api_key: String,

    #[arg(long, env = "WEBACY_API_URL", default_value = DEFAULT_API_URL)]
    pub webacy_api_url: String,

    /// Verbose logging
    #[arg(long, env = "DEBUG", action = ArgAction::SetTrue, value_parser = parse_env_flag)]
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT_ADDRESS.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            rpc_url: DEFAULT_RPC_URL.to_string(),
            authority_url: None,
            authority_timeout: 30,
            demo_mode: false,
            transport: TransportKind::default(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            webacy_api_key: String::new(),
            webacy_api_url: DEFAULT_API_URL.to_string(),
            debug: false,
        }
    }
}

/// Settings for the remote proof authority.
#[derive(Debug, Clone)]
pub struct AuthoritySettings {
    pub url: String,
    pub contract_address: String,
    pub chain_id: u64,
    pub rpc_url: String,
    pub timeout: Duration,
}

/// Configuration that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub mode: Mode,
    pub transport: TransportKind,
    pub host: String,
    pub port: u16,
    pub endpoint: String,
    pub contract_address: String,
    pub chain_id: u64,
    /// `None` only in demo mode.
    pub authority: Option<AuthoritySettings>,
    pub webacy: WebacyConfig,
    pub debug: bool,
}

fn is_contract_address(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

fn check_url(url: &str) -> Result<(), StartupError> {
    Url::parse(url).map(|_| ()).map_err(|e| StartupError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

impl ServerConfig {
    /// Check the configuration and resolve it into runtime settings.
    pub fn validate(&self) -> Result<ValidatedConfig, StartupError> {
        if !is_contract_address(&self.contract_address) {
            return Err(StartupError::InvalidContractAddress(
                self.contract_address.clone(),
            ));
        }
        if !self.endpoint.starts_with('/') {
            return Err(StartupError::InvalidEndpoint(self.endpoint.clone()));
        }
        check_url(&self.webacy_api_url)?;
        check_url(&self.rpc_url)?;

        let mode = if self.demo_mode {
            Mode::DemoBypass
        } else {
            Mode::Normal
        };

        let authority_url = self
            .authority_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty());
        let authority = match (authority_url, mode) {
            (Some(url), _) => {
                check_url(url)?;
                Some(AuthoritySettings {
                    url: url.to_string(),
                    contract_address: self.contract_address.clone(),
                    chain_id: self.chain_id,
                    rpc_url: self.rpc_url.clone(),
                    timeout: Duration::from_secs(self.authority_timeout),
                })
            }
            (None, Mode::DemoBypass) => None,
            (None, Mode::Normal) => return Err(StartupError::MissingAuthorityUrl),
        };

        if self.webacy_api_key.is_empty() {
            tracing::warn!("WEBACY_API_KEY is not set; upstream calls will be rejected");
        }

        Ok(ValidatedConfig {
            mode,
            transport: self.transport,
            host: self.host.clone(),
            port: self.port,
            endpoint: self.endpoint.clone(),
            contract_address: self.contract_address.clone(),
            chain_id: self.chain_id,
            authority,
            webacy: WebacyConfig::new(self.webacy_api_key.clone())
                .with_api_url(self.webacy_api_url.clone()),
            debug: self.debug,
        })
    }
}
