//! End-to-end allocation scenarios over the demo lot.

use slotgrid_alloc::{AllocationError, Engine, Strategy};
use slotgrid_core::{LayoutConfig, Request, RequestKind};

fn demo_lot(strategy: Strategy) -> Engine {
    let engine = Engine::from_layout(&LayoutConfig::scaffold()).unwrap();
    engine.set_strategy(strategy).unwrap();
    engine
}

fn car(owner: &str) -> Request {
    Request::new(owner, RequestKind::Car)
}

#[test]
fn parking_session_under_first_match() {
    let engine = demo_lot(Strategy::FirstMatch);

    assert_eq!(engine.allocate(&car("ABC123")).unwrap(), "A1");
    assert_eq!(
        engine.allocate(&Request::new("XYZ789", RequestKind::Motorcycle)).unwrap(),
        "A2"
    );
    assert_eq!(engine.allocate(&car("DEF456")).unwrap(), "B1");
    assert_eq!(engine.allocate(&car("GHI789")).unwrap(), "B2");
    assert_eq!(
        engine.allocate(&car("JKL012")),
        Err(AllocationError::NoCapacity(RequestKind::Car))
    );

    // Freeing A1 by unit id makes it the first match again.
    assert_eq!(engine.release_unit("A1").unwrap(), "ABC123");
    assert_eq!(engine.allocate(&car("JKL012")).unwrap(), "A1");

    let stats = engine.stats().unwrap();
    assert_eq!(stats.occupied, 4);
    assert_eq!(stats.free, 1);
    assert_eq!(engine.free_units().unwrap(), vec!["A3".to_string()]);
}

#[test]
fn each_strategy_on_a_fresh_lot() {
    let expected = [
        (Strategy::FirstMatch, "A1"),
        (Strategy::BestFit, "A1"),
        (Strategy::Closest, "A2"),
        // Compact and large both have two free units; compact is tighter.
        (Strategy::MostAvailable, "A1"),
    ];
    for (strategy, unit) in expected {
        let engine = demo_lot(strategy);
        assert_eq!(engine.allocate(&car("ABC123")).unwrap(), unit, "{strategy}");
    }
}

#[test]
fn motorcycle_prefers_dedicated_unit_under_best_fit() {
    let engine = demo_lot(Strategy::BestFit);
    assert_eq!(
        engine.allocate(&Request::new("XYZ789", RequestKind::Motorcycle)).unwrap(),
        "A3"
    );
}

#[test]
fn owner_can_reallocate_after_release() {
    let engine = demo_lot(Strategy::Closest);
    let first = engine.allocate(&car("ABC123")).unwrap();
    assert!(matches!(
        engine.allocate(&car("ABC123")),
        Err(AllocationError::DuplicateOwner { .. })
    ));

    assert_eq!(engine.release("ABC123").unwrap(), first);
    assert_eq!(engine.allocate(&car("ABC123")).unwrap(), first);
    engine.check_consistency().unwrap();
}
