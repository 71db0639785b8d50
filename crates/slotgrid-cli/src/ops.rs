//! Textual operations accepted by `slotctl run`.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use slotgrid_core::{CapacityClass, Request, UnitSpec};

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// `park:<kind>:<owner>`
    Park(Request),
    /// `leave:<owner>`
    Leave(String),
    /// `free:<unit>`
    Free(String),
    /// `strategy:<name>`; the name is resolved by the engine.
    Strategy(String),
    /// `provision:<container>:<unit>:<class>:<cost>`
    Provision { container: String, unit: UnitSpec },
}

impl FromStr for Op {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        if parts.iter().any(|p| p.is_empty()) {
            bail!("malformed operation: {s}");
        }
        match parts.as_slice() {
            ["park", kind, owner] => Ok(Op::Park(Request::parse(kind, *owner)?)),
            ["leave", owner] => Ok(Op::Leave(owner.to_string())),
            ["free", unit] => Ok(Op::Free(unit.to_string())),
            ["strategy", name] => Ok(Op::Strategy(name.to_string())),
            ["provision", container, unit, class, cost] => {
                let class: CapacityClass = class.parse()?;
                let cost: u32 = cost
                    .parse()
                    .with_context(|| format!("invalid cost in operation: {s}"))?;
                Ok(Op::Provision {
                    container: container.to_string(),
                    unit: UnitSpec::new(*unit, class, cost),
                })
            }
            _ => Err(anyhow!("unknown operation: {s}")),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Park(req) => write!(f, "park:{}:{}", req.kind, req.owner_id),
            Op::Leave(owner) => write!(f, "leave:{owner}"),
            Op::Free(unit) => write!(f, "free:{unit}"),
            Op::Strategy(name) => write!(f, "strategy:{name}"),
            Op::Provision { container, unit } => write!(
                f,
                "provision:{container}:{}:{}:{}",
                unit.id, unit.class, unit.cost
            ),
        }
    }
}

/// Parse every operation up front so a typo aborts before any state changes.
pub fn parse_all(raw: &[String]) -> anyhow::Result<Vec<Op>> {
    raw.iter().map(|s| s.parse()).collect()
}
