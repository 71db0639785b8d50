//! Bidirectional mapping between owners and the units they hold.
//!
//! Owners hold at most one unit at a time, so both directions are
//! single-valued maps. The engine keeps this in lockstep with each
//! unit's occupant field.

use std::collections::HashMap;

use slotgrid_core::{OwnerId, UnitId};

#[derive(Debug, Clone, Default)]
pub struct OwnerIndex {
    /// owner → unit.
    forward: HashMap<OwnerId, UnitId>,
    /// unit → owner.
    reverse: HashMap<UnitId, OwnerId>,
}

impl OwnerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit_of(&self, owner: &str) -> Option<&UnitId> {
        self.forward.get(owner)
    }

    pub fn owner_of(&self, unit: &str) -> Option<&OwnerId> {
        self.reverse.get(unit)
    }

    /// Record `owner → unit`. Returns `false` and leaves the index
    /// untouched if either side is already mapped.
    pub fn insert(&mut self, owner: OwnerId, unit: UnitId) -> bool {
        if self.forward.contains_key(&owner) || self.reverse.contains_key(&unit) {
            return false;
        }
        self.reverse.insert(unit.clone(), owner.clone());
        self.forward.insert(owner, unit);
        true
    }

    /// Remove the entry for `owner`, returning the unit it held.
    pub fn remove(&mut self, owner: &str) -> Option<UnitId> {
        let unit = self.forward.remove(owner)?;
        self.reverse.remove(&unit);
        Some(unit)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OwnerId, &UnitId)> {
        self.forward.iter()
    }

    /// Whether both directions describe the same set of pairs.
    pub fn is_symmetric(&self) -> bool {
        self.forward.len() == self.reverse.len()
            && self
                .forward
                .iter()
                .all(|(owner, unit)| self.reverse.get(unit) == Some(owner))
    }
}
