use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub page_limit: u32,
    pub recent_scan_enabled: bool,
    pub recent_scan_window: u64,
    pub repeat_recent_scan: bool,
    pub full_scan_enabled: bool,
    pub repeat_full_scan: bool,
    pub retry_delay: Duration,
    /// Size of the dedup ring buffer shared by both scan modes.
    pub dedup_capacity: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            page_limit: 100,
            recent_scan_enabled: true,
            recent_scan_window: 10_000,
            repeat_recent_scan: true,
            full_scan_enabled: true,
            repeat_full_scan: true,
            retry_delay: Duration::from_secs(10),
            dedup_capacity: 100_000,
        }
    }
}
