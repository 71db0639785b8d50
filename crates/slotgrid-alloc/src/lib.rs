//! slotgrid-alloc — spatial resource allocation engine.
//!
//! Matches requests against a pool of typed units grouped into
//! containers, using a replaceable placement strategy, and tracks which
//! owner holds which unit until it is released.
//!
//! # Components
//!
//! - **`pool`** — Units, containers and the pool that aggregates them
//! - **`compat`** — Request-kind / capacity-class fit predicate
//! - **`strategy`** — Unit selection (first-match, best-fit, closest, most-available)
//! - **`index`** — Owner ↔ unit index
//! - **`engine`** — Allocate / release / provision under one lock
//! - **`snapshot`** — Serializable pool state for external persistence
//!
//! # Architecture
//!
//! ```text
//! Engine
//!   └── RwLock<EngineState>
//!       ├── Pool (containers → units, occupancy)
//!       ├── OwnerIndex (owner ↔ unit)
//!       └── Strategy (active selection policy)
//! ```

pub mod compat;
pub mod engine;
pub mod error;
pub mod index;
pub mod pool;
pub mod snapshot;
pub mod strategy;

pub use compat::fits;
pub use engine::{ClassStats, ContainerStats, Engine, PoolStats};
pub use error::{AllocationError, AllocationResult};
pub use index::OwnerIndex;
pub use pool::{Container, Pool, Unit, UnitRef};
pub use snapshot::{OwnerRecord, PoolSnapshot, UnitRecord};
pub use strategy::Strategy;
