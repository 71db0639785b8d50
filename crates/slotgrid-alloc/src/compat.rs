//! Compatibility between request kinds and capacity classes.
//!
//! Every strategy filters candidates through [`fits`]; none of them
//! carry their own rules.

use slotgrid_core::{CapacityClass, RequestKind};

/// Whether a request of `kind` may occupy a unit of `class`.
///
/// Two-wheelers fit anywhere; cars need a compact or large unit.
pub fn fits(kind: RequestKind, class: CapacityClass) -> bool {
    match kind {
        RequestKind::Motorcycle => true,
        RequestKind::Car => matches!(class, CapacityClass::Compact | CapacityClass::Large),
    }
}

/// Classes a request kind fits, in best-fit priority order.
pub fn compatible_classes(kind: RequestKind) -> impl Iterator<Item = CapacityClass> {
    CapacityClass::ALL.into_iter().filter(move |class| fits(kind, *class))
}
