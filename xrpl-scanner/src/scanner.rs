use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc::UnboundedSender, Mutex};
use tokio_util::sync::CancellationToken;
use xrpl_client::XrplClient;

use crate::config::ScannerConfig;
use crate::dedup::SeenSet;
use crate::error::ScannerError;
use crate::metrics::ScannerMetrics;

/// One transaction affecting the scanned account, with enough of its
/// metadata for the caller to order and deduplicate it.
#[derive(Debug, Clone)]
pub struct ScannedTx {
    pub tx_hash: String,
    pub ledger_index: u64,
    pub meta_index: u32,
    pub tx: Value,
    pub meta: Value,
}

fn extract_scanned_tx(ledger_index_min: i64, record: &xrpl_client::types::AccountTxRecord) -> Option<ScannedTx> {
    if record.validated != Some(true) {
        return None;
    }
    let tx_hash = record.tx.get("hash")?.as_str()?.to_string();
    let ledger_index = record
        .tx
        .get("ledger_index")
        .and_then(Value::as_u64)
        .unwrap_or(ledger_index_min.max(0) as u64);
    let meta_index = record
        .meta
        .get("TransactionIndex")
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32;
    Some(ScannedTx { tx_hash, ledger_index, meta_index, tx: record.tx.clone(), meta: record.meta.clone() })
}

/// Produces a lazy, at-least-once sequence of confirmed transactions for
/// `account`, combining an optional full historical scan and an optional
/// recent-window tail scan. Both are exposed as standalone async
/// loops so the caller's task supervisor owns restart-on-error policy;
/// transient `XrplClient` errors are instead caught here and turned into a
/// sleep-then-resume so the cursor is never lost to a restart.
pub struct AccountScanner {
    client: Arc<XrplClient>,
    account: String,
    config: ScannerConfig,
    metrics: ScannerMetrics,
    seen: Arc<Mutex<SeenSet>>,
}

impl AccountScanner {
    pub fn new(client: Arc<XrplClient>, account: String, config: ScannerConfig, metrics: ScannerMetrics) -> Self {
        let seen = Arc::new(Mutex::new(SeenSet::new(config.dedup_capacity)));
        Self { client, account, config, metrics, seen }
    }

    async fn emit(&self, sender: &UnboundedSender<ScannedTx>, scanned: ScannedTx) -> Result<(), ScannerError> {
        if !self.seen.lock().await.insert(&scanned.tx_hash) {
            return Ok(());
        }
        sender.send(scanned).map_err(|_| ScannerError::ChannelClosed)
    }

    /// Walks `account_tx` forward from `from_ledger` to `to_ledger` (or "the
    /// current ledger" when `to_ledger` is `None`), paging with `marker`
    /// until exhausted, emitting each page's records in order.
    async fn scan_range(
        &self,
        from_ledger: i64,
        to_ledger: i64,
        sender: &UnboundedSender<ScannedTx>,
    ) -> Result<(), ScannerError> {
        let mut marker = None;
        loop {
            let page = self
                .client
                .account_tx(&self.account, from_ledger, to_ledger, marker.clone(), self.config.page_limit)
                .await?;

            for record in &page.transactions {
                if let Some(scanned) = extract_scanned_tx(from_ledger, record) {
                    self.emit(sender, scanned).await?;
                }
            }

            marker = page.marker;
            if marker.is_none() {
                break;
            }
        }
        Ok(())
    }

    /// Recent-scan loop: starts at `current_ledger - recent_scan_window`,
    /// advances to the tip, then either repeats from the new tip or returns.
    pub async fn run_recent(
        &self,
        sender: UnboundedSender<ScannedTx>,
        shutdown: CancellationToken,
    ) -> Result<(), ScannerError> {
        loop {
            if shutdown.is_cancelled() {
                return Ok(());
            }

            let current = match self.client.ledger_current().await {
                Ok(r) => r.ledger_current_index,
                Err(err) => {
                    tracing::warn!(error = %err, "recent scan: ledger_current failed, retrying");
                    tokio::time::sleep(self.config.retry_delay).await;
                    continue;
                }
            };
            let from_ledger = current.saturating_sub(self.config.recent_scan_window) as i64;

            match self.scan_range(from_ledger, current as i64, &sender).await {
                Ok(()) => {
                    self.metrics.recent_scan_ledger_index.set(current as i64);
                }
                Err(ScannerError::ChannelClosed) => return Err(ScannerError::ChannelClosed),
                Err(err) => {
                    tracing::warn!(error = %err, "recent scan failed, resuming from current cursor");
                    tokio::time::sleep(self.config.retry_delay).await;
                    continue;
                }
            }

            if !self.config.repeat_recent_scan {
                return Ok(());
            }
        }
    }

    /// Full-scan loop: starts at ledger 0, walks forward to the tip, then
    /// either repeats from 0 or returns.
    pub async fn run_full(
        &self,
        sender: UnboundedSender<ScannedTx>,
        shutdown: CancellationToken,
    ) -> Result<(), ScannerError> {
        loop {
            if shutdown.is_cancelled() {
                return Ok(());
            }

            let current = match self.client.ledger_current().await {
                Ok(r) => r.ledger_current_index,
                Err(err) => {
                    tracing::warn!(error = %err, "full scan: ledger_current failed, retrying");
                    tokio::time::sleep(self.config.retry_delay).await;
                    continue;
                }
            };

            match self.scan_range(0, current as i64, &sender).await {
                Ok(()) => {
                    self.metrics.full_scan_ledger_index.set(current as i64);
                }
                Err(ScannerError::ChannelClosed) => return Err(ScannerError::ChannelClosed),
                Err(err) => {
                    tracing::warn!(error = %err, "full scan failed, resuming from current cursor");
                    tokio::time::sleep(self.config.retry_delay).await;
                    continue;
                }
            }

            if !self.config.repeat_full_scan {
                return Ok(());
            }
        }
    }
}
