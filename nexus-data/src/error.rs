use std::io;
use thiserror::Error;

/// Errors raised while resolving or loading game definitions.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Unknown alliance structure: {0}")]
    UnknownAllianceStructure(String),
    #[error("Unknown armory item: {0}")]
    UnknownItem(String),
    #[error("Unknown edict: {0}")]
    UnknownEdict(String),
    #[error("Edict defined twice: {0}")]
    DuplicateEdict(String),
    #[error("Edict {edict} has invalid {field}: {value}")]
    InvalidEffect {
        edict: String,
        field: &'static str,
        value: f32,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
