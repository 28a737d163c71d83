//! Validated lookup tables the calculator resolves keys against.

use crate::error::EngineError;
use nexus_data::{AllianceStructureDef, EdictCatalog, EdictDef, ItemDef};

/// Game definitions in effect for a calculation.
///
/// Alliance structures and items come from the static registries in
/// `nexus_data`; edicts can be swapped for a catalog loaded from disk.
#[derive(Debug, Clone)]
pub struct RuleBook {
    edicts: EdictCatalog,
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RuleBook {
    pub fn builtin() -> Self {
        Self {
            edicts: EdictCatalog::builtin(),
        }
    }

    pub fn with_edicts(edicts: EdictCatalog) -> Self {
        Self { edicts }
    }

    pub fn edicts(&self) -> &EdictCatalog {
        &self.edicts
    }

    pub fn edict(&self, key: &str) -> Result<&EdictDef, EngineError> {
        Ok(self.edicts.get(key)?)
    }

    pub fn alliance_structure(&self, key: &str) -> Result<&'static AllianceStructureDef, EngineError> {
        Ok(nexus_data::alliance_structure(key)?)
    }

    pub fn item(&self, key: &str) -> Result<&'static ItemDef, EngineError> {
        Ok(nexus_data::item(key)?)
    }
}
