//! Capped progression counters (energy, attack turns, deposit charges).

use nexus_data::defines::progression as defines;
use serde::{Deserialize, Serialize};

/// An integer clamped to `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundedInt {
    value: i64,
    min: i64,
    max: i64,
}

impl BoundedInt {
    pub const fn new(value: i64, min: i64, max: i64) -> Self {
        let value = if value < min {
            min
        } else if value > max {
            max
        } else {
            value
        };
        Self { value, min, max }
    }

    pub fn get(&self) -> i64 {
        self.value
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// Add `delta`, clamping to bounds. Returns the change actually applied.
    pub fn add(&mut self, delta: i64) -> i64 {
        let before = self.value;
        self.value = before.saturating_add(delta).clamp(self.min, self.max);
        self.value - before
    }

    pub fn is_full(&self) -> bool {
        self.value >= self.max
    }
}

pub const fn energy(value: i64) -> BoundedInt {
    BoundedInt::new(value, 0, defines::MAX_ENERGY)
}

pub const fn attack_turns(value: i64) -> BoundedInt {
    BoundedInt::new(value, 0, defines::MAX_ATTACK_TURNS)
}

pub const fn deposit_charges(value: i64) -> BoundedInt {
    BoundedInt::new(value, 0, defines::MAX_DEPOSIT_CHARGES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_int_clamps() {
        let mut b = BoundedInt::new(0, -5, 5);

        assert_eq!(b.add(3), 3);
        assert_eq!(b.get(), 3);

        assert_eq!(b.add(10), 2);
        assert_eq!(b.get(), 5);
        assert!(b.is_full());

        assert_eq!(b.add(-20), -10);
        assert_eq!(b.get(), -5);
    }

    #[test]
    fn test_constructor_clamps_stored_value() {
        assert_eq!(energy(150).get(), defines::MAX_ENERGY);
        assert_eq!(attack_turns(-4).get(), 0);
        assert_eq!(deposit_charges(2).get(), 2);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_updates_stay_within_bounds(
            initial in -1000..1000i64,
            updates in proptest::collection::vec(-1000..1000i64, 1..20)
        ) {
            let mut b = BoundedInt::new(initial, 0, 100);
            for update in updates {
                b.add(update);
                prop_assert!(b.get() >= b.min());
                prop_assert!(b.get() <= b.max());
            }
        }
    }
}
