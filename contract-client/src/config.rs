use std::time::Duration;

/// `coreum.grpc`/`coreum.network`/`coreum.contract` config keys.
#[derive(Debug, Clone)]
pub struct CoreumClientConfig {
    pub grpc_url: String,
    pub chain_id: String,
    pub contract_address: String,
    pub gas_adjustment: f64,
    pub gas_price_adjustment: f64,
    pub gas_price_denom: String,
    pub page_limit: u32,
    pub out_of_gas_retry_delay: Duration,
    pub out_of_gas_retry_attempts: u32,
    pub request_timeout: Duration,
    pub tx_timeout: Duration,
    pub tx_status_poll_interval: Duration,
}

impl Default for CoreumClientConfig {
    fn default() -> Self {
        Self {
            grpc_url: "http://localhost:9090".to_string(),
            chain_id: "coreum-mainnet-1".to_string(),
            contract_address: String::new(),
            gas_adjustment: 1.5,
            gas_price_adjustment: 1.2,
            gas_price_denom: "ucore".to_string(),
            page_limit: 100,
            out_of_gas_retry_delay: Duration::from_secs(1),
            out_of_gas_retry_attempts: 5,
            request_timeout: Duration::from_secs(10),
            tx_timeout: Duration::from_secs(30),
            tx_status_poll_interval: Duration::from_millis(100),
        }
    }
}
