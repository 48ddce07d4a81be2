use std::time::{Duration, Instant};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::engine_result::{classify, EngineResultClass};
use crate::error::{Result, XrplClientError};
use crate::types::*;

/// HTTP request timeout ~5s, overall do-timeout ~30s, bounded retry
/// delay, connection-close to avoid EOF on reused sockets.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub url: String,
    pub request_timeout: Duration,
    pub do_timeout: Duration,
    pub retry_delay: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5005".to_string(),
            request_timeout: Duration::from_secs(5),
            do_timeout: Duration::from_secs(30),
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Retryable JSON-RPC transport over a `rippled` node.
pub struct XrplClient {
    http: reqwest::Client,
    config: HttpClientConfig,
}

impl XrplClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            // Each call opens a fresh connection: reused keep-alive sockets
            // against rippled's JSON-RPC endpoint are prone to silent EOF.
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self { http, config })
    }

    async fn call<P, R>(&self, method: &'static str, params: P) -> Result<R>
    where
        P: Serialize + Clone,
        R: DeserializeOwned,
    {
        let deadline = Instant::now() + self.config.do_timeout;
        loop {
            match self.try_call::<P, R>(method, params.clone()).await {
                Ok(value) => return Ok(value),
                Err(err) if is_retryable(&err) && Instant::now() < deadline => {
                    tracing::warn!(method, error = %err, "xrpl rpc call failed, retrying");
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_call<P, R>(&self, method: &'static str, params: P) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let request = RpcRequest { method, params: [params] };
        let response = self.http.post(&self.config.url).json(&request).send().await?;

        let status = response.status();
        if status.is_client_error() {
            return Err(XrplClientError::HttpStatus { status: status.as_u16() });
        }
        if !status.is_success() {
            return Err(XrplClientError::HttpStatus { status: status.as_u16() });
        }

        let body: Value = response.json().await?;
        let result = body
            .get("result")
            .cloned()
            .ok_or_else(|| XrplClientError::RpcError("missing result field".into()))?;

        if let Some(error) = result.get("error").and_then(Value::as_str) {
            let message = result
                .get("error_message")
                .and_then(Value::as_str)
                .unwrap_or(error)
                .to_string();
            return Err(XrplClientError::RpcError(message));
        }

        Ok(serde_json::from_value(result)?)
    }

    pub async fn account_info(&self, account: &str, ledger_index: Option<&str>) -> Result<AccountInfoResult> {
        self.call("account_info", AccountInfoRequest { account, ledger_index }).await
    }

    pub async fn account_lines(&self, account: &str, marker: Option<Value>) -> Result<AccountLinesResult> {
        self.call("account_lines", AccountLinesRequest { account, peer: None, marker }).await
    }

    /// Paged transaction history, ordered by ledger_index then
    /// meta-index within a page.
    pub async fn account_tx(
        &self,
        account: &str,
        ledger_index_min: i64,
        ledger_index_max: i64,
        marker: Option<Value>,
        limit: u32,
    ) -> Result<AccountTxResult> {
        self.call(
            "account_tx",
            AccountTxRequest { account, ledger_index_min, ledger_index_max, limit, marker, forward: true },
        )
        .await
    }

    /// Submits a signed `tx_blob`. Classifies the engine result: `tes*` is
    /// returned as `Ok`; anything else is a [`XrplClientError::SubmitRejected`].
    pub async fn submit(&self, tx_blob: &str) -> Result<SubmitResult> {
        let result: SubmitResult = self.call("submit", SubmitRequest { tx_blob }).await?;
        match classify(&result.engine_result) {
            EngineResultClass::Success => Ok(result),
            _ => Err(XrplClientError::SubmitRejected {
                code: result.engine_result.clone(),
                message: result.engine_result_message.clone(),
            }),
        }
    }

    pub async fn tx(&self, hash: &str) -> Result<TxResult> {
        self.call("tx", TxRequest { transaction: hash, binary: false }).await
    }

    pub async fn server_state(&self) -> Result<ServerStateResult> {
        self.call("server_state", serde_json::json!({})).await
    }

    pub async fn ledger_current(&self) -> Result<LedgerCurrentResult> {
        self.call("ledger_current", serde_json::json!({})).await
    }
}

fn is_retryable(err: &XrplClientError) -> bool {
    match err {
        XrplClientError::Transport(e) => e.is_timeout() || e.is_connect() || e.status().map(|s| s.is_server_error()).unwrap_or(true),
        XrplClientError::HttpStatus { status } => (500..600).contains(status),
        XrplClientError::RpcError(_) => false,
        _ => false,
    }
}
