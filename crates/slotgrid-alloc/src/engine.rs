//! Allocation engine — owns the pool and the owner index.
//!
//! All shared state sits behind a single `RwLock`:
//! - `allocate` holds the write lock across strategy selection and the
//!   commit, so two callers can never both claim the same unit
//! - `release`, `release_unit`, `provision` and `set_strategy` take the
//!   write lock
//! - queries take the read lock and may run alongside each other
//!
//! If a commit finds the index and unit occupancy out of step, the
//! engine records the reason and rejects every later mutation with
//! [`AllocationError::Halted`]. Reads keep working so the state can be
//! inspected.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use slotgrid_core::{CapacityClass, LayoutConfig, OwnerId, Request, UnitId, UnitSpec};

use crate::error::{AllocationError, AllocationResult};
use crate::index::OwnerIndex;
use crate::pool::{Pool, UnitRef};
use crate::strategy::Strategy;

/// Everything guarded by the engine lock.
#[derive(Debug, Default)]
pub(crate) struct EngineState {
    pub(crate) pool: Pool,
    pub(crate) index: OwnerIndex,
    pub(crate) strategy: Strategy,
    /// Reason the engine stopped accepting mutations, if it did.
    pub(crate) halted: Option<String>,
}

impl EngineState {
    /// Free → Occupied for the unit at `at`, plus the index insertion.
    fn commit_allocate(&mut self, owner: &OwnerId, at: UnitRef) -> AllocationResult<UnitId> {
        let (unit_id, occupant) = match self.pool.unit(at) {
            Some(unit) => (unit.id().to_string(), unit.occupant().map(str::to_string)),
            None => return Err(self.halt(format!("strategy selected a missing unit at {at:?}"))),
        };
        if let Some(current) = occupant {
            return Err(self.halt(format!(
                "unit {unit_id} selected while occupied by {current}"
            )));
        }
        if let Some(holder) = self.index.owner_of(&unit_id) {
            let holder = holder.clone();
            return Err(self.halt(format!(
                "free unit {unit_id} is still indexed to owner {holder}"
            )));
        }
        if !self.index.insert(owner.clone(), unit_id.clone()) {
            return Err(self.halt(format!("index refused entry {owner} -> {unit_id}")));
        }
        if let Some(unit) = self.pool.unit_mut(at) {
            unit.occupant = Some(owner.clone());
        }
        Ok(unit_id)
    }

    /// Occupied → Free for `unit_id`, plus the index removal.
    fn commit_release(&mut self, owner: &str, unit_id: &str) -> AllocationResult<()> {
        let Some(at) = self.pool.locate(unit_id) else {
            return Err(self.halt(format!("owner {owner} is indexed to unknown unit {unit_id}")));
        };
        let occupant = self.pool.unit(at).and_then(|u| u.occupant().map(str::to_string));
        if occupant.as_deref() != Some(owner) {
            return Err(self.halt(format!(
                "unit {unit_id} occupant {occupant:?} disagrees with index owner {owner}"
            )));
        }
        if self.index.remove(owner).as_deref() != Some(unit_id) {
            return Err(self.halt(format!("index entry for {owner} vanished during release")));
        }
        if let Some(unit) = self.pool.unit_mut(at) {
            unit.occupant = None;
        }
        Ok(())
    }

    /// Stop further mutation and build the error to return.
    fn halt(&mut self, reason: String) -> AllocationError {
        error!(%reason, "invariant violation, halting engine");
        self.halted = Some(reason.clone());
        AllocationError::InvariantViolation(reason)
    }

    /// Check that the index and unit occupants describe the same pairs.
    pub(crate) fn verify(&self) -> Result<(), String> {
        if !self.index.is_symmetric() {
            return Err("owner index directions disagree".to_string());
        }
        let mut occupied = 0;
        for (_, unit) in self.pool.units() {
            let Some(owner) = unit.occupant() else {
                if let Some(holder) = self.index.owner_of(unit.id()) {
                    return Err(format!("free unit {} is indexed to {holder}", unit.id()));
                }
                continue;
            };
            occupied += 1;
            if self.index.unit_of(owner).map(String::as_str) != Some(unit.id()) {
                return Err(format!(
                    "unit {} is occupied by {owner} but the index disagrees",
                    unit.id()
                ));
            }
        }
        if occupied != self.index.len() {
            return Err(format!(
                "{} index entries for {occupied} occupied units",
                self.index.len()
            ));
        }
        Ok(())
    }
}

/// Occupancy counts for one capacity class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassStats {
    pub total: usize,
    pub free: usize,
}

/// Occupancy counts for one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerStats {
    pub id: String,
    pub total: usize,
    pub free: usize,
}

/// Point-in-time occupancy summary of the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub strategy: Strategy,
    pub total: usize,
    pub free: usize,
    pub occupied: usize,
    pub by_class: BTreeMap<CapacityClass, ClassStats>,
    pub containers: Vec<ContainerStats>,
}

/// The allocation engine. Share it between threads behind an `Arc`.
#[derive(Debug, Default)]
pub struct Engine {
    state: RwLock<EngineState>,
}

impl Engine {
    /// Create an engine with an empty pool.
    pub fn new(strategy: Strategy) -> Self {
        Self::from_state(EngineState {
            strategy,
            ..EngineState::default()
        })
    }

    pub(crate) fn from_state(state: EngineState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Build an engine and provision every unit of a layout in order.
    ///
    /// The layout's strategy defaults to first-match when absent.
    pub fn from_layout(layout: &LayoutConfig) -> AllocationResult<Self> {
        layout.validate()?;
        let strategy = match &layout.strategy {
            Some(name) => name.parse::<Strategy>()?,
            None => Strategy::default(),
        };
        let engine = Self::new(strategy);
        for container in &layout.containers {
            for unit in &container.units {
                engine.provision(&container.id, unit.clone())?;
            }
        }
        info!(
            containers = layout.containers.len(),
            units = layout.unit_count(),
            %strategy,
            "engine built from layout"
        );
        Ok(engine)
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Append a free unit to a container, creating the container if new.
    pub fn provision(&self, container_id: &str, spec: UnitSpec) -> AllocationResult<()> {
        let mut state = self.write()?;
        let unit_id = spec.id.clone();
        match state.pool.provision(container_id, spec) {
            Ok(_) => {
                debug!(container = container_id, unit = %unit_id, "unit provisioned");
                Ok(())
            }
            Err(e) => {
                warn!(container = container_id, unit = %unit_id, error = %e, "provisioning rejected");
                Err(e)
            }
        }
    }

    /// Allocate a unit to the request's owner using the active strategy.
    pub fn allocate(&self, request: &Request) -> AllocationResult<UnitId> {
        let mut state = self.write()?;

        // An owner may hold one unit; reject before the strategy runs.
        if let Some(unit) = state.index.unit_of(&request.owner_id) {
            warn!(owner = %request.owner_id, %unit, "owner already holds a unit");
            return Err(AllocationError::DuplicateOwner {
                owner: request.owner_id.clone(),
                unit: unit.clone(),
            });
        }

        let strategy = state.strategy;
        let Some(at) = strategy.select(request.kind, &state.pool) else {
            warn!(
                owner = %request.owner_id,
                kind = %request.kind,
                %strategy,
                "no free compatible unit"
            );
            return Err(AllocationError::NoCapacity(request.kind));
        };

        let unit_id = state.commit_allocate(&request.owner_id, at)?;
        info!(
            owner = %request.owner_id,
            unit = %unit_id,
            container = state.pool.container_id_of(at).unwrap_or_default(),
            %strategy,
            "unit allocated"
        );
        Ok(unit_id)
    }

    /// Free the unit held by `owner` and return its id.
    pub fn release(&self, owner: &str) -> AllocationResult<UnitId> {
        let mut state = self.write()?;
        let Some(unit_id) = state.index.unit_of(owner).cloned() else {
            warn!(%owner, "release for owner without allocation");
            return Err(AllocationError::OwnerNotFound(owner.to_string()));
        };
        state.commit_release(owner, &unit_id)?;
        info!(%owner, unit = %unit_id, "unit released");
        Ok(unit_id)
    }

    /// Free a unit by its id and return the owner that held it.
    pub fn release_unit(&self, unit_id: &str) -> AllocationResult<OwnerId> {
        let mut state = self.write()?;
        let unit = state
            .pool
            .unit_by_id(unit_id)
            .ok_or_else(|| AllocationError::UnitNotFound(unit_id.to_string()))?;
        let Some(owner) = unit.occupant().map(str::to_string) else {
            warn!(unit = unit_id, "release for unit that is already free");
            return Err(AllocationError::UnitNotOccupied(unit_id.to_string()));
        };
        state.commit_release(&owner, unit_id)?;
        info!(%owner, unit = unit_id, "unit released by id");
        Ok(owner)
    }

    /// Replace the active strategy. Applies from the next `allocate`.
    pub fn set_strategy(&self, strategy: Strategy) -> AllocationResult<()> {
        let mut state = self.write()?;
        let previous = std::mem::replace(&mut state.strategy, strategy);
        info!(from = %previous, to = %strategy, "strategy changed");
        Ok(())
    }

    /// Replace the active strategy by name.
    pub fn set_strategy_by_name(&self, name: &str) -> AllocationResult<Strategy> {
        let strategy: Strategy = name.parse()?;
        self.set_strategy(strategy)?;
        Ok(strategy)
    }

    // ── Queries ─────────────────────────────────────────────────────

    pub fn strategy(&self) -> AllocationResult<Strategy> {
        Ok(self.read()?.strategy)
    }

    /// Unit currently held by `owner`.
    pub fn unit_of(&self, owner: &str) -> AllocationResult<Option<UnitId>> {
        Ok(self.read()?.index.unit_of(owner).cloned())
    }

    /// Owner currently occupying `unit_id`.
    pub fn occupant_of(&self, unit_id: &str) -> AllocationResult<Option<OwnerId>> {
        let state = self.read()?;
        let unit = state
            .pool
            .unit_by_id(unit_id)
            .ok_or_else(|| AllocationError::UnitNotFound(unit_id.to_string()))?;
        Ok(unit.occupant().map(str::to_string))
    }

    pub fn is_free(&self, unit_id: &str) -> AllocationResult<bool> {
        Ok(self.occupant_of(unit_id)?.is_none())
    }

    /// All `(owner, unit)` pairs, sorted by owner.
    pub fn active_occupants(&self) -> AllocationResult<Vec<(OwnerId, UnitId)>> {
        let state = self.read()?;
        let mut pairs: Vec<(OwnerId, UnitId)> = state
            .index
            .iter()
            .map(|(owner, unit)| (owner.clone(), unit.clone()))
            .collect();
        pairs.sort();
        Ok(pairs)
    }

    /// Ids of free units in declaration order.
    pub fn free_units(&self) -> AllocationResult<Vec<UnitId>> {
        let state = self.read()?;
        Ok(state
            .pool
            .units()
            .filter(|(_, u)| u.is_free())
            .map(|(_, u)| u.id().to_string())
            .collect())
    }

    pub fn stats(&self) -> AllocationResult<PoolStats> {
        let state = self.read()?;
        let mut by_class: BTreeMap<CapacityClass, ClassStats> = BTreeMap::new();
        for (_, unit) in state.pool.units() {
            let entry = by_class.entry(unit.class()).or_default();
            entry.total += 1;
            if unit.is_free() {
                entry.free += 1;
            }
        }
        let containers = state
            .pool
            .containers()
            .iter()
            .map(|c| ContainerStats {
                id: c.id().to_string(),
                total: c.units().len(),
                free: c.free_count(),
            })
            .collect();
        let total = state.pool.len();
        let free = state.pool.free_count();
        Ok(PoolStats {
            strategy: state.strategy,
            total,
            free,
            occupied: total - free,
            by_class,
            containers,
        })
    }

    /// Verify the index/occupancy invariant, halting the engine if it
    /// does not hold.
    pub fn check_consistency(&self) -> AllocationResult<()> {
        let mut state = self.lock_write()?;
        match state.verify() {
            Ok(()) => Ok(()),
            Err(reason) => Err(state.halt(reason)),
        }
    }

    /// Reason the engine halted, if it has.
    pub fn halted(&self) -> AllocationResult<Option<String>> {
        Ok(self.read()?.halted.clone())
    }

    // ── Locking ─────────────────────────────────────────────────────

    pub(crate) fn read(&self) -> AllocationResult<RwLockReadGuard<'_, EngineState>> {
        self.state.read().map_err(|_| poisoned())
    }

    fn lock_write(&self) -> AllocationResult<RwLockWriteGuard<'_, EngineState>> {
        self.state.write().map_err(|_| poisoned())
    }

    /// Write guard for a mutation; refuses once the engine has halted.
    fn write(&self) -> AllocationResult<RwLockWriteGuard<'_, EngineState>> {
        let state = self.lock_write()?;
        if let Some(reason) = &state.halted {
            return Err(AllocationError::Halted(reason.clone()));
        }
        Ok(state)
    }
}

fn poisoned() -> AllocationError {
    AllocationError::InvariantViolation("engine lock poisoned".to_string())
}
