//! The relayer's configuration file: a single immutable `RelayerConfig` tree
//! deserialized from YAML, every key carrying the documented default so an
//! empty file (or `init-config`'s generated one) is already runnable against
//! a local devnet.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Seconds-precision `Duration`, serialized as a plain integer (e.g.
/// `retry_delay: 10`) rather than a humantime string.
mod duration_secs {
    use super::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}

mod duration_millis {
    use super::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    Console,
    Json,
    YamlConsole,
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::Console
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: LogLevel::default(), format: LogFormat::default() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientSettings {
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
    #[serde(with = "duration_secs")]
    pub do_timeout: Duration,
    #[serde(with = "duration_millis")]
    pub retry_delay: Duration,
}

impl Default for HttpClientSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            do_timeout: Duration::from_secs(30),
            retry_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct XrplRpcSettings {
    pub url: String,
    pub page_limit: u32,
}

impl Default for XrplRpcSettings {
    fn default() -> Self {
        Self { url: "http://localhost:5005".to_string(), page_limit: 100 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerSettings {
    pub recent_scan_enabled: bool,
    pub recent_scan_window: u64,
    pub repeat_recent_scan: bool,
    pub full_scan_enabled: bool,
    pub repeat_full_scan: bool,
    #[serde(with = "duration_secs")]
    pub retry_delay: Duration,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            recent_scan_enabled: true,
            recent_scan_window: 10_000,
            repeat_recent_scan: true,
            full_scan_enabled: true,
            repeat_full_scan: true,
            retry_delay: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct XrplConfig {
    pub multi_signer_key_name: String,
    pub http_client: HttpClientSettings,
    pub rpc: XrplRpcSettings,
    pub scanner: ScannerSettings,
}

impl Default for XrplConfig {
    fn default() -> Self {
        Self {
            multi_signer_key_name: "xrpl-signer".to_string(),
            http_client: HttpClientSettings::default(),
            rpc: XrplRpcSettings::default(),
            scanner: ScannerSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrpcSettings {
    pub url: String,
}

impl Default for GrpcSettings {
    fn default() -> Self {
        Self { url: "http://localhost:9090".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    pub chain_id: String,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self { chain_id: "coreum-mainnet-1".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractSettings {
    pub contract_address: String,
    pub gas_adjustment: f64,
    pub gas_price_adjustment: f64,
    pub page_limit: u32,
    #[serde(with = "duration_secs")]
    pub out_of_gas_retry_delay: Duration,
    pub out_of_gas_retry_attempts: u32,
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
    #[serde(with = "duration_secs")]
    pub tx_timeout: Duration,
    #[serde(with = "duration_millis")]
    pub tx_status_poll_interval: Duration,
}

impl Default for ContractSettings {
    fn default() -> Self {
        Self {
            contract_address: String::new(),
            gas_adjustment: 1.5,
            gas_price_adjustment: 1.2,
            page_limit: 100,
            out_of_gas_retry_delay: Duration::from_secs(1),
            out_of_gas_retry_attempts: 5,
            request_timeout: Duration::from_secs(10),
            tx_timeout: Duration::from_secs(30),
            tx_status_poll_interval: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreumConfig {
    pub relayer_key_name: String,
    pub grpc: GrpcSettings,
    pub network: NetworkSettings,
    pub contract: ContractSettings,
}

impl Default for CoreumConfig {
    fn default() -> Self {
        Self {
            relayer_key_name: "coreum-relayer".to_string(),
            grpc: GrpcSettings::default(),
            network: NetworkSettings::default(),
            contract: ContractSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreumToXrplSettings {
    #[serde(with = "duration_secs")]
    pub repeat_delay: Duration,
}

impl Default for CoreumToXrplSettings {
    fn default() -> Self {
        Self { repeat_delay: Duration::from_secs(5) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessesConfig {
    pub coreum_to_xrpl: CoreumToXrplSettings,
    #[serde(with = "duration_secs")]
    pub retry_delay: Duration,
}

impl Default for ProcessesConfig {
    fn default() -> Self {
        Self { coreum_to_xrpl: CoreumToXrplSettings::default(), retry_delay: Duration::from_secs(10) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsServerSettings {
    pub listen_address: String,
}

impl Default for MetricsServerSettings {
    fn default() -> Self {
        Self { listen_address: "localhost:9090".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodicCollectorSettings {
    #[serde(with = "duration_secs")]
    pub repeat_delay: Duration,
}

impl Default for PeriodicCollectorSettings {
    fn default() -> Self {
        Self { repeat_delay: Duration::from_secs(60) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub server: MetricsServerSettings,
    pub periodic_collector: PeriodicCollectorSettings,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true, server: MetricsServerSettings::default(), periodic_collector: PeriodicCollectorSettings::default() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayerConfig {
    pub version: String,
    pub logging: LoggingConfig,
    pub xrpl: XrplConfig,
    pub coreum: CoreumConfig,
    pub processes: ProcessesConfig,
    pub metrics: MetricsConfig,
}

impl Default for RelayerConfig {
    fn default() -> Self {
        Self {
            version: "v1".to_string(),
            logging: LoggingConfig::default(),
            xrpl: XrplConfig::default(),
            coreum: CoreumConfig::default(),
            processes: ProcessesConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl RelayerConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn load(path: &std::path::Path) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| crate::error::RelayerError::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_yaml_str(&contents).map_err(|e| crate::error::RelayerError::Config(format!("parsing {}: {e}", path.display())))
    }
}
