use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use rpc_client::RpcCredentials;
use tally::constants::{DEFAULT_FETCH_CONCURRENCY, REGTEST_SIGNAL_WINDOW, RETARGET_INTERVAL, SIGNAL_WINDOW};
use tally::{RetargetSchedule, TallyConfig};
use crate::cli::Args;
use crate::error::{MonitorError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub rpc: RpcConfig,
    pub monitor: MonitorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub network_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    pub host: String,
    pub port: u16,
    /// Empty disables basic auth.
    pub username: String,
    pub password: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub window_size: u64,
    pub retarget_interval: u64,
    pub poll_interval_ms: u64,
    pub fetch_concurrency: usize,
    /// Attempts at the initial window scan before giving up.
    pub init_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Config {
    /// Load configuration from a TOML file. Missing sections and keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| MonitorError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Default configuration for a network preset
    pub fn for_network(network: &str) -> Result<Self> {
        let mut config = Config::default();

        match network {
            "mainnet" => {
                config.rpc.port = 8332;
            }
            "testnet" => {
                config.rpc.port = 18332;
            }
            "regtest" => {
                config.rpc.port = 18443;
                config.monitor.window_size = REGTEST_SIGNAL_WINDOW;
            }
            "litecoin" => {
                config.rpc.port = 9332;
            }
            _ => return Err(MonitorError::Config(format!("Unknown network: {}", network))),
        }
        config.network.network_id = network.to_string();

        Ok(config)
    }

    /// Build the effective configuration: file or preset, then CLI overrides.
    pub fn resolve(args: &Args) -> Result<Self> {
        let mut config = match (&args.config_path, &args.network) {
            (Some(path), _) => Config::load(path)?,
            (None, Some(network)) => Config::for_network(network)?,
            (None, None) => Config::default(),
        };
        config.apply_cli_overrides(args);
        config.validate()?;
        Ok(config)
    }

    /// Override config with CLI arguments
    pub fn apply_cli_overrides(&mut self, args: &Args) {
        if let Some(host) = &args.rpc_host {
            self.rpc.host = host.clone();
        }
        if let Some(port) = args.rpc_port {
            self.rpc.port = port;
        }
        if let Some(user) = &args.rpc_user {
            self.rpc.username = user.clone();
        }
        if let Some(password) = &args.rpc_password {
            self.rpc.password = password.clone();
        }
        if let Some(window_size) = args.window_size {
            self.monitor.window_size = window_size;
        }
        if let Some(interval) = args.retarget_interval {
            self.monitor.retarget_interval = interval;
        }
        if let Some(poll) = args.poll_interval_ms {
            self.monitor.poll_interval_ms = poll;
        }
        if let Some(concurrency) = args.fetch_concurrency {
            self.monitor.fetch_concurrency = concurrency;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let checks = [
            (self.monitor.window_size == 0, "monitor.window_size must be at least 1"),
            (self.monitor.retarget_interval == 0, "monitor.retarget_interval must be at least 1"),
            (self.monitor.poll_interval_ms == 0, "monitor.poll_interval_ms must be at least 1"),
            (self.monitor.fetch_concurrency == 0, "monitor.fetch_concurrency must be at least 1"),
            (self.monitor.init_attempts == 0, "monitor.init_attempts must be at least 1"),
            (self.rpc.port == 0, "rpc.port must be set"),
            (self.rpc.timeout_secs == 0, "rpc.timeout_secs must be at least 1"),
        ];

        match checks.iter().find(|(failed, _)| *failed) {
            Some((_, message)) => Err(MonitorError::Config(message.to_string())),
            None => Ok(()),
        }
    }

    pub fn rpc_url(&self) -> String {
        format!("http://{}:{}/", self.rpc.host, self.rpc.port)
    }

    pub fn credentials(&self) -> Option<RpcCredentials> {
        if self.rpc.username.is_empty() {
            None
        } else {
            Some(RpcCredentials::new(&self.rpc.username, &self.rpc.password))
        }
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc.timeout_secs)
    }

    pub fn tally_config(&self) -> TallyConfig {
        TallyConfig::new(self.monitor.window_size).with_fetch_concurrency(self.monitor.fetch_concurrency)
    }

    pub fn retarget_schedule(&self) -> Result<RetargetSchedule> {
        RetargetSchedule::new(self.monitor.retarget_interval)
            .ok_or_else(|| MonitorError::Config("monitor.retarget_interval must be at least 1".to_string()))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.monitor.poll_interval_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.monitor.retry_delay_ms)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            network_id: "litecoin".to_string(),
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9332,
            username: "user".to_string(),
            password: "pass".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            window_size: SIGNAL_WINDOW,
            retarget_interval: RETARGET_INTERVAL,
            poll_interval_ms: 1000,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            init_attempts: 3,
            retry_delay_ms: 5000,
        }
    }
}
