use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub persistence: PersistenceConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Delay between the first dirtying write and the snapshot save that
    /// flushes it; later writes inside the window coalesce into one save.
    pub save_debounce_ms: u64,
    pub data_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub latency_ms: u64,
    pub jitter_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            persistence: PersistenceConfig {
                save_debounce_ms: 400,
                data_dir: None,
            },
            simulation: SimulationConfig {
                latency_ms: 150,
                jitter_ms: 50,
            },
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("KAGAMI_SAVE_DEBOUNCE_MS") {
            if let Some(value) = parse_u64(&v) {
                cfg.persistence.save_debounce_ms = value;
            }
        }
        if let Ok(v) = std::env::var("KAGAMI_DATA_DIR") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                cfg.persistence.data_dir = Some(trimmed.to_string());
            }
        }
        if let Ok(v) = std::env::var("KAGAMI_SIM_LATENCY_MS") {
            if let Some(value) = parse_u64(&v) {
                cfg.simulation.latency_ms = value;
            }
        }
        if let Ok(v) = std::env::var("KAGAMI_SIM_JITTER_MS") {
            if let Some(value) = parse_u64(&v) {
                cfg.simulation.jitter_ms = value;
            }
        }

        cfg
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}
