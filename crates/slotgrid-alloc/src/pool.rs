//! Units, containers and the pool.
//!
//! Pure aggregation: no selection policy lives here. The pool keeps
//! containers in declaration order (first-match depends on it) plus a
//! unit-id → location map so units can be reached without a scan.

use std::collections::HashMap;

use slotgrid_core::{CapacityClass, ContainerId, OwnerId, UnitId, UnitSpec};

use crate::error::{AllocationError, AllocationResult};

/// Position of a unit inside a pool: container index, then unit index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitRef {
    pub container: usize,
    pub slot: usize,
}

/// Smallest allocatable entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    id: UnitId,
    class: CapacityClass,
    cost: u32,
    /// Set iff the unit is occupied. Only the engine writes it.
    pub(crate) occupant: Option<OwnerId>,
}

impl Unit {
    /// A free unit built from its declaration.
    pub fn new(spec: UnitSpec) -> Self {
        Self {
            id: spec.id,
            class: spec.class,
            cost: spec.cost,
            occupant: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn class(&self) -> CapacityClass {
        self.class
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn occupant(&self) -> Option<&str> {
        self.occupant.as_deref()
    }

    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }
}

/// Named group of units (a level or zone).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    id: ContainerId,
    units: Vec<Unit>,
}

impl Container {
    pub fn new(id: impl Into<ContainerId>) -> Self {
        Self {
            id: id.into(),
            units: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Units in declaration order.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn free_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_free()).count()
    }
}

/// Root aggregation of containers.
#[derive(Debug, Clone, Default)]
pub struct Pool {
    containers: Vec<Container>,
    by_id: HashMap<ContainerId, usize>,
    locations: HashMap<UnitId, UnitRef>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a free unit to `container_id`, creating the container on
    /// first reference.
    pub fn provision(&mut self, container_id: &str, spec: UnitSpec) -> AllocationResult<UnitRef> {
        if self.locations.contains_key(&spec.id) {
            return Err(AllocationError::DuplicateUnitId(spec.id));
        }

        let container = match self.by_id.get(container_id) {
            Some(&idx) => idx,
            None => {
                self.containers.push(Container::new(container_id));
                let idx = self.containers.len() - 1;
                self.by_id.insert(container_id.to_string(), idx);
                idx
            }
        };

        let units = &mut self.containers[container].units;
        let unit_ref = UnitRef {
            container,
            slot: units.len(),
        };
        self.locations.insert(spec.id.clone(), unit_ref);
        units.push(Unit::new(spec));
        Ok(unit_ref)
    }

    /// Containers in declaration order.
    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn container(&self, id: &str) -> Option<&Container> {
        self.by_id.get(id).map(|&idx| &self.containers[idx])
    }

    /// Every unit with its location, containers first, then units, both
    /// in declaration order.
    pub fn units(&self) -> impl Iterator<Item = (UnitRef, &Unit)> + '_ {
        self.containers
            .iter()
            .enumerate()
            .flat_map(|(container, c)| {
                c.units
                    .iter()
                    .enumerate()
                    .map(move |(slot, unit)| (UnitRef { container, slot }, unit))
            })
    }

    pub fn locate(&self, unit_id: &str) -> Option<UnitRef> {
        self.locations.get(unit_id).copied()
    }

    pub fn unit(&self, at: UnitRef) -> Option<&Unit> {
        self.containers.get(at.container)?.units.get(at.slot)
    }

    pub(crate) fn unit_mut(&mut self, at: UnitRef) -> Option<&mut Unit> {
        self.containers.get_mut(at.container)?.units.get_mut(at.slot)
    }

    pub fn unit_by_id(&self, unit_id: &str) -> Option<&Unit> {
        self.unit(self.locate(unit_id)?)
    }

    /// Id of the container holding `at`.
    pub fn container_id_of(&self, at: UnitRef) -> Option<&str> {
        self.containers.get(at.container).map(|c| c.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn free_count(&self) -> usize {
        self.units().filter(|(_, u)| u.is_free()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(id: &str, cost: u32) -> UnitSpec {
        UnitSpec::new(id, CapacityClass::Compact, cost)
    }

    #[test]
    fn provision_creates_container_on_first_reference() {
        let mut pool = Pool::new();
        assert!(pool.is_empty());

        let first = pool.provision("L1", compact("A1", 10)).unwrap();
        let second = pool.provision("L1", compact("A2", 5)).unwrap();
        let third = pool.provision("L2", compact("B1", 20)).unwrap();

        assert_eq!(first, UnitRef { container: 0, slot: 0 });
        assert_eq!(second, UnitRef { container: 0, slot: 1 });
        assert_eq!(third, UnitRef { container: 1, slot: 0 });
        assert_eq!(pool.containers().len(), 2);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn provision_rejects_duplicate_unit_id() {
        let mut pool = Pool::new();
        pool.provision("L1", compact("A1", 10)).unwrap();

        let err = pool.provision("L2", compact("A1", 3)).unwrap_err();
        assert_eq!(err, AllocationError::DuplicateUnitId("A1".into()));
        // Rejected provisioning must not create the container either.
        assert!(pool.container("L2").is_none());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn new_units_start_free() {
        let mut pool = Pool::new();
        let at = pool.provision("L1", compact("A1", 10)).unwrap();
        let unit = pool.unit(at).unwrap();
        assert!(unit.is_free());
        assert_eq!(unit.occupant(), None);
        assert_eq!(unit.cost(), 10);
        assert_eq!(pool.free_count(), 1);
    }

    #[test]
    fn units_iterate_in_declaration_order() {
        let mut pool = Pool::new();
        pool.provision("L1", compact("A1", 10)).unwrap();
        pool.provision("L2", compact("B1", 20)).unwrap();
        pool.provision("L1", compact("A2", 5)).unwrap();

        let ids: Vec<&str> = pool.units().map(|(_, u)| u.id()).collect();
        assert_eq!(ids, vec!["A1", "A2", "B1"]);
    }

    #[test]
    fn locate_and_lookup_by_id() {
        let mut pool = Pool::new();
        pool.provision("L1", compact("A1", 10)).unwrap();
        pool.provision("L2", compact("B1", 20)).unwrap();

        let at = pool.locate("B1").unwrap();
        assert_eq!(pool.container_id_of(at), Some("L2"));
        assert_eq!(pool.unit_by_id("B1").map(|u| u.cost()), Some(20));
        assert!(pool.locate("Z9").is_none());
    }
}
