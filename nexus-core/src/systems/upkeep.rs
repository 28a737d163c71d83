//! Specialist upkeep.
//!
//! Generals cost protoform and scientists cost credits every turn. Upkeep is
//! deducted before income and clamped: a player who cannot pay ends at zero
//! and the unpaid remainder is reported as a shortfall.

use crate::fixed::Fixed;
use crate::state::{ResourceDelta, ResourceLedger, Shortfall, SpecialistRoster};
use nexus_data::SpecialistKind;
use strum::IntoEnumIterator;

/// Total upkeep owed by `roster` as a (negative) delta.
pub fn upkeep_delta(roster: &SpecialistRoster) -> ResourceDelta {
    let mut delta = ResourceDelta::default();
    for kind in SpecialistKind::iter() {
        let count = roster.count(kind);
        let per_head = kind.upkeep();
        delta.credits -= count.saturating_mul(per_head.credits);
        delta.protoform -= Fixed::from_int(count.saturating_mul(per_head.protoform));
    }
    delta
}

/// Deduct upkeep from `ledger`, returning the unpaid shortfall.
pub fn run_upkeep(ledger: &mut ResourceLedger, roster: &SpecialistRoster) -> Shortfall {
    let delta = upkeep_delta(roster);
    if delta.is_zero() {
        return Shortfall::new();
    }
    let shortfall = ledger.apply_clamped(&delta);
    log::debug!(
        "Upkeep: {} credits, {} protoform",
        -delta.credits,
        -delta.protoform
    );
    shortfall
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Resource;

    #[test]
    fn test_general_upkeep_is_protoform() {
        let roster = SpecialistRoster {
            generals: 100,
            scientists: 0,
        };
        let delta = upkeep_delta(&roster);
        assert_eq!(delta.protoform, Fixed::from_int(-50_000));
        assert_eq!(delta.credits, 0);
    }

    #[test]
    fn test_upkeep_clamps_at_zero() {
        let mut ledger = ResourceLedger {
            credits: 1_000,
            protoform: Fixed::from_int(200),
            ..Default::default()
        };
        let roster = SpecialistRoster {
            generals: 1,
            scientists: 2,
        };

        let shortfall = run_upkeep(&mut ledger, &roster);

        assert_eq!(ledger.credits, 500, "Scientists cost 250 credits each");
        assert_eq!(ledger.protoform, Fixed::ZERO);
        assert_eq!(
            shortfall.get(&Resource::Protoform),
            Some(&Fixed::from_int(300))
        );
        assert!(!shortfall.contains_key(&Resource::Credits));
    }

    #[test]
    fn test_no_specialists_no_upkeep() {
        let mut ledger = ResourceLedger::default();
        let shortfall = run_upkeep(&mut ledger, &SpecialistRoster::default());
        assert!(shortfall.is_empty());
        assert_eq!(ledger, ResourceLedger::default());
    }
}
