//! Shared types used across SlotGrid crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Unique identifier for an allocatable unit (spot, locker slot).
pub type UnitId = String;

/// Unique identifier for a container (level, zone) within a pool.
pub type ContainerId = String;

/// Identity of a requester (license plate, customer id).
pub type OwnerId = String;

// ── Capacity class ───────────────────────────────────────────────

/// Size tier of a unit. Declaration order is the best-fit priority:
/// the earlier the class, the tighter the fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityClass {
    /// Dedicated two-wheeler space.
    Motorcycle,
    Compact,
    Large,
}

impl CapacityClass {
    /// All classes in priority order.
    pub const ALL: [CapacityClass; 3] = [
        CapacityClass::Motorcycle,
        CapacityClass::Compact,
        CapacityClass::Large,
    ];

    /// Best-fit priority (lower = tighter fit).
    pub fn priority(self) -> u8 {
        match self {
            CapacityClass::Motorcycle => 0,
            CapacityClass::Compact => 1,
            CapacityClass::Large => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CapacityClass::Motorcycle => "motorcycle",
            CapacityClass::Compact => "compact",
            CapacityClass::Large => "large",
        }
    }
}

impl fmt::Display for CapacityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CapacityClass {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "motorcycle" => Ok(CapacityClass::Motorcycle),
            "compact" => Ok(CapacityClass::Compact),
            "large" => Ok(CapacityClass::Large),
            _ => Err(CoreError::UnknownCapacityClass(s.to_string())),
        }
    }
}

// ── Request ──────────────────────────────────────────────────────

/// Category of an incoming request; decides which classes it fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Two-wheeled.
    Motorcycle,
    /// Four-wheeled.
    Car,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Motorcycle => "motorcycle",
            RequestKind::Car => "car",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RequestKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "motorcycle" => Ok(RequestKind::Motorcycle),
            "car" => Ok(RequestKind::Car),
            _ => Err(CoreError::UnknownRequestKind(s.to_string())),
        }
    }
}

/// A single allocation request. Lives for one `allocate` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub owner_id: OwnerId,
    pub kind: RequestKind,
}

impl Request {
    pub fn new(owner_id: impl Into<OwnerId>, kind: RequestKind) -> Self {
        Self {
            owner_id: owner_id.into(),
            kind,
        }
    }

    /// Build a request from a textual kind ("car", "motorcycle").
    pub fn parse(kind: &str, owner_id: impl Into<OwnerId>) -> Result<Self, CoreError> {
        Ok(Self::new(owner_id, kind.parse()?))
    }
}

// ── Unit declaration ─────────────────────────────────────────────

/// Immutable description of a unit, as declared in a layout or passed
/// to provisioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub id: UnitId,
    pub class: CapacityClass,
    /// Cost to reach the unit (distance to entrance).
    pub cost: u32,
}

impl UnitSpec {
    pub fn new(id: impl Into<UnitId>, class: CapacityClass, cost: u32) -> Self {
        Self {
            id: id.into(),
            class,
            cost,
        }
    }
}
