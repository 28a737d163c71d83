use serde::{Deserialize, Serialize};

/// Turn processor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Extra attempts after a [`crate::EngineError::PersistenceConflict`].
    pub conflict_retries: u32,

    /// Process the players of a batch on the rayon pool.
    pub parallel_batch: bool,

    /// Log every metric breakdown at debug level while processing turns.
    pub log_breakdowns: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            conflict_retries: 1,
            parallel_batch: true,
            log_breakdowns: false,
        }
    }
}
