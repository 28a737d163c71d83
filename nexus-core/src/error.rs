use crate::fixed::Fixed;
use crate::state::{PlayerId, Resource};
use nexus_data::DataError;
use thiserror::Error;

/// Engine error taxonomy.
///
/// The calculator only ever raises [`EngineError::InvalidInput`]; the turn
/// processor treats [`EngineError::InsufficientResource`] and
/// [`EngineError::PersistenceConflict`] as per-player failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Insufficient {resource}: required {required}, available {available}")]
    InsufficientResource {
        resource: Resource,
        required: Fixed,
        available: Fixed,
    },
    #[error("Concurrent update to player {0}")]
    PersistenceConflict(PlayerId),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl EngineError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        EngineError::InvalidInput(msg.into())
    }

    pub fn insufficient(resource: Resource, required: i64, available: i64) -> Self {
        EngineError::InsufficientResource {
            resource,
            required: Fixed::from_int(required),
            available: Fixed::from_int(available),
        }
    }

    /// Worth retrying at the transaction boundary.
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::PersistenceConflict(_))
    }
}

impl From<DataError> for EngineError {
    fn from(e: DataError) -> Self {
        EngineError::InvalidInput(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_key_becomes_invalid_input() {
        let err: EngineError = DataError::UnknownEdict("free_lunch".into()).into();
        assert_eq!(
            err,
            EngineError::InvalidInput("Unknown edict: free_lunch".into())
        );
    }

    #[test]
    fn test_only_conflicts_are_transient() {
        assert!(EngineError::PersistenceConflict(PlayerId(1)).is_transient());
        assert!(!EngineError::insufficient(Resource::Credits, 10, 5).is_transient());
        assert!(!EngineError::invalid("bad").is_transient());
    }

    #[test]
    fn test_insufficient_message() {
        let err = EngineError::insufficient(Resource::Credits, 10, 5);
        assert_eq!(
            err.to_string(),
            "Insufficient credits: required 10.0000, available 5.0000"
        );
    }
}
