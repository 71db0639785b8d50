//! slotgrid-core — shared types and layout configuration for SlotGrid.
//!
//! Holds the vocabulary every other crate speaks: capacity classes,
//! request kinds, unit declarations, and the `slotgrid.toml` layout
//! that describes which units exist and how they are grouped.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ContainerConfig, LayoutConfig};
pub use error::{CoreError, CoreResult};
pub use types::*;
