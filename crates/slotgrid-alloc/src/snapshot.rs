//! Serializable engine state.
//!
//! The engine keeps everything in memory. A `PoolSnapshot` holds the
//! minimum durable record needed to rebuild it exactly: one record per
//! unit (in declaration order) and one per owner index entry.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use slotgrid_core::{CapacityClass, ContainerId, OwnerId, UnitId, UnitSpec};

use crate::engine::{Engine, EngineState};
use crate::error::{AllocationError, AllocationResult};
use crate::strategy::Strategy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub id: UnitId,
    pub container_id: ContainerId,
    pub capacity_class: CapacityClass,
    pub cost: u32,
    pub occupant: Option<OwnerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRecord {
    pub owner_id: OwnerId,
    pub unit_id: UnitId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub strategy: Strategy,
    pub units: Vec<UnitRecord>,
    /// Sorted by owner id.
    pub owners: Vec<OwnerRecord>,
}

impl PoolSnapshot {
    pub fn to_json(&self) -> AllocationResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| AllocationError::Snapshot(e.to_string()))
    }

    pub fn from_json(json: &str) -> AllocationResult<Self> {
        serde_json::from_str(json).map_err(|e| AllocationError::Snapshot(e.to_string()))
    }
}

impl Engine {
    /// Capture the current pool, index and strategy.
    pub fn snapshot(&self) -> AllocationResult<PoolSnapshot> {
        let state = self.read()?;
        let units = state
            .pool
            .units()
            .map(|(at, unit)| UnitRecord {
                id: unit.id().to_string(),
                container_id: state.pool.container_id_of(at).unwrap_or_default().to_string(),
                capacity_class: unit.class(),
                cost: unit.cost(),
                occupant: unit.occupant().map(str::to_string),
            })
            .collect();
        let mut owners: Vec<OwnerRecord> = state
            .index
            .iter()
            .map(|(owner, unit)| OwnerRecord {
                owner_id: owner.clone(),
                unit_id: unit.clone(),
            })
            .collect();
        owners.sort_by(|a, b| a.owner_id.cmp(&b.owner_id));
        Ok(PoolSnapshot {
            strategy: state.strategy,
            units,
            owners,
        })
    }

    /// Rebuild an engine from a snapshot.
    ///
    /// Fails with [`AllocationError::Snapshot`] when the owner records
    /// and unit occupants do not describe the same pairs.
    pub fn restore(snapshot: &PoolSnapshot) -> AllocationResult<Self> {
        let mut state = EngineState {
            strategy: snapshot.strategy,
            ..EngineState::default()
        };

        for record in &snapshot.units {
            let spec = UnitSpec::new(record.id.clone(), record.capacity_class, record.cost);
            let at = state.pool.provision(&record.container_id, spec)?;
            if let Some(owner) = &record.occupant {
                if let Some(unit) = state.pool.unit_mut(at) {
                    unit.occupant = Some(owner.clone());
                }
            }
        }

        let mut owners = HashSet::new();
        for record in &snapshot.owners {
            if !owners.insert(record.owner_id.as_str()) {
                return Err(AllocationError::Snapshot(format!(
                    "owner {} appears more than once",
                    record.owner_id
                )));
            }
            if !state.index.insert(record.owner_id.clone(), record.unit_id.clone()) {
                return Err(AllocationError::Snapshot(format!(
                    "unit {} is claimed by more than one owner",
                    record.unit_id
                )));
            }
        }

        state.verify().map_err(AllocationError::Snapshot)?;

        info!(
            units = snapshot.units.len(),
            owners = snapshot.owners.len(),
            strategy = %snapshot.strategy,
            "engine restored from snapshot"
        );
        Ok(Engine::from_state(state))
    }
}
