use prometheus::{IntGauge, Registry};

/// The scanner exports two ledger-index gauges for external
/// observability, one per scan mode.
#[derive(Clone)]
pub struct ScannerMetrics {
    pub recent_scan_ledger_index: IntGauge,
    pub full_scan_ledger_index: IntGauge,
}

impl ScannerMetrics {
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        let recent_scan_ledger_index = IntGauge::new(
            "xrpl_scanner_recent_scan_ledger_index",
            "Last XRPL ledger index fully scanned by the recent-scan cursor",
        )?;
        let full_scan_ledger_index = IntGauge::new(
            "xrpl_scanner_full_scan_ledger_index",
            "Last XRPL ledger index fully scanned by the full-scan cursor",
        )?;
        registry.register(Box::new(recent_scan_ledger_index.clone()))?;
        registry.register(Box::new(full_scan_ledger_index.clone()))?;
        Ok(Self { recent_scan_ledger_index, full_scan_ledger_index })
    }
}
