//! Unit selection strategies.
//!
//! Each strategy is a read-only scan over the pool that returns the
//! location of one free, compatible unit, or `None`. The engine holds
//! its write lock across selection and commit, so a strategy never
//! needs to re-check what it returns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use slotgrid_core::{CapacityClass, RequestKind};

use crate::compat::{compatible_classes, fits};
use crate::error::AllocationError;
use crate::pool::{Pool, Unit, UnitRef};

/// Placement policy applied by the engine on each allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// First free compatible unit in declaration order.
    #[default]
    FirstMatch,
    /// Tightest capacity class; earliest declared on ties.
    BestFit,
    /// Lowest cost to reach; earliest declared on ties.
    Closest,
    /// Compatible class with the most free units, then first match
    /// inside that class.
    MostAvailable,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::FirstMatch,
        Strategy::BestFit,
        Strategy::Closest,
        Strategy::MostAvailable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::FirstMatch => "first-match",
            Strategy::BestFit => "best-fit",
            Strategy::Closest => "closest",
            Strategy::MostAvailable => "most-available",
        }
    }

    /// Pick a unit for a request of `kind`.
    pub fn select(self, kind: RequestKind, pool: &Pool) -> Option<UnitRef> {
        let selected = match self {
            Strategy::FirstMatch => first_match(kind, pool),
            Strategy::BestFit => best_fit(kind, pool),
            Strategy::Closest => closest(kind, pool),
            Strategy::MostAvailable => most_available(kind, pool),
        };
        debug!(strategy = %self, %kind, ?selected, "strategy selection");
        selected
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = AllocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "first-match" | "first-available" => Ok(Strategy::FirstMatch),
            "best-fit" => Ok(Strategy::BestFit),
            "closest" | "closest-to-entrance" => Ok(Strategy::Closest),
            "most-available" => Ok(Strategy::MostAvailable),
            _ => Err(AllocationError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Free units that `kind` fits, in declaration order.
fn candidates(kind: RequestKind, pool: &Pool) -> impl Iterator<Item = (UnitRef, &Unit)> + '_ {
    pool.units()
        .filter(move |(_, unit)| unit.is_free() && fits(kind, unit.class()))
}

fn first_match(kind: RequestKind, pool: &Pool) -> Option<UnitRef> {
    candidates(kind, pool).next().map(|(at, _)| at)
}

fn best_fit(kind: RequestKind, pool: &Pool) -> Option<UnitRef> {
    // min_by_key keeps the first of equal minima.
    candidates(kind, pool)
        .min_by_key(|(_, unit)| unit.class().priority())
        .map(|(at, _)| at)
}

fn closest(kind: RequestKind, pool: &Pool) -> Option<UnitRef> {
    candidates(kind, pool)
        .min_by_key(|(_, unit)| unit.cost())
        .map(|(at, _)| at)
}

fn most_available(kind: RequestKind, pool: &Pool) -> Option<UnitRef> {
    let mut best: Option<(CapacityClass, usize)> = None;
    for class in compatible_classes(kind) {
        let free = candidates(kind, pool)
            .filter(|(_, unit)| unit.class() == class)
            .count();
        // Strictly greater: ties stay with the tighter class.
        if free > 0 && best.is_none_or(|(_, most)| free > most) {
            best = Some((class, free));
        }
    }

    let (class, _) = best?;
    candidates(kind, pool)
        .find(|(_, unit)| unit.class() == class)
        .map(|(at, _)| at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotgrid_core::UnitSpec;

    fn make_pool(layout: &[(&str, &str, CapacityClass, u32)]) -> Pool {
        let mut pool = Pool::new();
        for (container, id, class, cost) in layout {
            pool.provision(container, UnitSpec::new(*id, *class, *cost)).unwrap();
        }
        pool
    }

    fn selected_id(strategy: Strategy, kind: RequestKind, pool: &Pool) -> Option<String> {
        strategy
            .select(kind, pool)
            .and_then(|at| pool.unit(at))
            .map(|u| u.id().to_string())
    }

    fn occupy(pool: &mut Pool, unit_id: &str) {
        let at = pool.locate(unit_id).unwrap();
        pool.unit_mut(at).unwrap().occupant = Some("someone".into());
    }

    use CapacityClass::{Compact, Large, Motorcycle};

    #[test]
    fn first_match_follows_declaration_order_not_cost() {
        let pool = make_pool(&[
            ("L1", "A1", Compact, 10),
            ("L1", "A2", Large, 5),
            ("L2", "B1", Compact, 20),
        ]);
        assert_eq!(selected_id(Strategy::FirstMatch, RequestKind::Car, &pool).as_deref(), Some("A1"));
    }

    #[test]
    fn first_match_skips_incompatible_and_occupied() {
        let mut pool = make_pool(&[
            ("L1", "M1", Motorcycle, 1),
            ("L1", "A1", Compact, 10),
            ("L2", "B1", Large, 20),
        ]);
        assert_eq!(selected_id(Strategy::FirstMatch, RequestKind::Car, &pool).as_deref(), Some("A1"));

        occupy(&mut pool, "A1");
        assert_eq!(selected_id(Strategy::FirstMatch, RequestKind::Car, &pool).as_deref(), Some("B1"));

        assert_eq!(selected_id(Strategy::FirstMatch, RequestKind::Motorcycle, &pool).as_deref(), Some("M1"));
    }

    #[test]
    fn best_fit_prefers_tightest_class() {
        let pool = make_pool(&[
            ("L1", "A1", Large, 1),
            ("L1", "A2", Compact, 50),
            ("L2", "M1", Motorcycle, 99),
        ]);
        assert_eq!(selected_id(Strategy::BestFit, RequestKind::Car, &pool).as_deref(), Some("A2"));
        assert_eq!(selected_id(Strategy::BestFit, RequestKind::Motorcycle, &pool).as_deref(), Some("M1"));
    }

    #[test]
    fn best_fit_tie_breaks_on_declaration_order() {
        let pool = make_pool(&[
            ("L1", "A1", Large, 1),
            ("L1", "A2", Compact, 50),
            ("L2", "B1", Compact, 2),
        ]);
        assert_eq!(selected_id(Strategy::BestFit, RequestKind::Car, &pool).as_deref(), Some("A2"));
    }

    #[test]
    fn closest_picks_minimum_cost() {
        let pool = make_pool(&[
            ("L1", "A1", Compact, 10),
            ("L2", "B1", Compact, 5),
            ("L3", "C1", Compact, 15),
        ]);
        assert_eq!(selected_id(Strategy::Closest, RequestKind::Car, &pool).as_deref(), Some("B1"));
    }

    #[test]
    fn closest_tie_breaks_on_declaration_order() {
        let pool = make_pool(&[
            ("L1", "A1", Large, 7),
            ("L2", "B1", Compact, 7),
        ]);
        assert_eq!(selected_id(Strategy::Closest, RequestKind::Car, &pool).as_deref(), Some("A1"));
    }

    #[test]
    fn closest_ignores_cheaper_incompatible_unit() {
        let pool = make_pool(&[
            ("L1", "M1", Motorcycle, 1),
            ("L1", "A1", Large, 30),
        ]);
        assert_eq!(selected_id(Strategy::Closest, RequestKind::Car, &pool).as_deref(), Some("A1"));
    }

    #[test]
    fn most_available_picks_class_with_most_free_units() {
        let pool = make_pool(&[
            ("L1", "A1", Compact, 1),
            ("L1", "A2", Large, 2),
            ("L2", "B1", Large, 3),
        ]);
        assert_eq!(selected_id(Strategy::MostAvailable, RequestKind::Car, &pool).as_deref(), Some("A2"));
    }

    #[test]
    fn most_available_tie_goes_to_tighter_class() {
        let mut pool = make_pool(&[
            ("L1", "A1", Large, 1),
            ("L1", "A2", Compact, 2),
            ("L2", "B1", Large, 3),
            ("L2", "B2", Compact, 4),
        ]);
        assert_eq!(selected_id(Strategy::MostAvailable, RequestKind::Car, &pool).as_deref(), Some("A2"));

        occupy(&mut pool, "A2");
        assert_eq!(selected_id(Strategy::MostAvailable, RequestKind::Car, &pool).as_deref(), Some("A1"));
    }

    #[test]
    fn every_strategy_reports_none_when_exhausted() {
        let mut pool = make_pool(&[("L1", "M1", Motorcycle, 1), ("L1", "A1", Compact, 2)]);
        occupy(&mut pool, "A1");
        for strategy in Strategy::ALL {
            assert_eq!(strategy.select(RequestKind::Car, &pool), None, "{strategy}");
        }
        assert!(Strategy::FirstMatch.select(RequestKind::Car, &Pool::new()).is_none());
    }

    #[test]
    fn parse_strategy_names() {
        assert_eq!("first-match".parse::<Strategy>().unwrap(), Strategy::FirstMatch);
        assert_eq!("best_fit".parse::<Strategy>().unwrap(), Strategy::BestFit);
        assert_eq!("Closest".parse::<Strategy>().unwrap(), Strategy::Closest);
        assert_eq!("most-available".parse::<Strategy>().unwrap(), Strategy::MostAvailable);
        for strategy in Strategy::ALL {
            assert_eq!(strategy.as_str().parse::<Strategy>().unwrap(), strategy);
        }
        assert_eq!(
            "random".parse::<Strategy>().unwrap_err(),
            AllocationError::UnknownStrategy("random".into())
        );
    }
}
