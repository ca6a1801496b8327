use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const UNSET_TS: u64 = 0;

/// Success/failure counter pair for one engine operation class.
#[derive(Debug)]
pub struct OpCounter {
    ok: AtomicU64,
    failed: AtomicU64,
    last_ok_ms: AtomicU64,
    last_failed_ms: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpStats {
    pub ok: u64,
    pub failed: u64,
    pub last_ok_ms: Option<u64>,
    pub last_failed_ms: Option<u64>,
}

impl OpCounter {
    pub const fn new() -> Self {
        Self {
            ok: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            last_ok_ms: AtomicU64::new(UNSET_TS),
            last_failed_ms: AtomicU64::new(UNSET_TS),
        }
    }

    pub fn record_ok(&self) {
        self.ok.fetch_add(1, Ordering::Relaxed);
        self.last_ok_ms.store(current_unix_ms(), Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.last_failed_ms
            .store(current_unix_ms(), Ordering::Relaxed);
    }

    pub fn stats(&self) -> OpStats {
        OpStats {
            ok: self.ok.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            last_ok_ms: ts_to_option(self.last_ok_ms.load(Ordering::Relaxed)),
            last_failed_ms: ts_to_option(self.last_failed_ms.load(Ordering::Relaxed)),
        }
    }
}

impl Default for OpCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
pub struct EngineMetrics {
    pub fetches: OpCounter,
    pub mutations: OpCounter,
    pub snapshot_saves: OpCounter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub fetches: OpStats,
    pub mutations: OpStats,
    pub snapshot_saves: OpStats,
}

impl EngineMetrics {
    pub const fn new() -> Self {
        Self {
            fetches: OpCounter::new(),
            mutations: OpCounter::new(),
            snapshot_saves: OpCounter::new(),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            fetches: self.fetches.stats(),
            mutations: self.mutations.stats(),
            snapshot_saves: self.snapshot_saves.stats(),
        }
    }
}

fn current_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(UNSET_TS)
}

fn ts_to_option(ts: u64) -> Option<u64> {
    if ts == UNSET_TS {
        None
    } else {
        Some(ts)
    }
}
