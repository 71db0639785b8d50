//! Allocation error types.

use slotgrid_core::{CoreError, OwnerId, RequestKind, UnitId};
use thiserror::Error;

/// Errors that can occur during allocation operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("no free unit fits a {0} request")]
    NoCapacity(RequestKind),

    #[error("owner {owner} already holds unit {unit}")]
    DuplicateOwner { owner: OwnerId, unit: UnitId },

    #[error("owner has no active allocation: {0}")]
    OwnerNotFound(OwnerId),

    #[error("unit id already provisioned: {0}")]
    DuplicateUnitId(UnitId),

    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("unknown request kind: {0}")]
    UnknownRequestKind(String),

    #[error("unknown capacity class: {0}")]
    UnknownCapacityClass(String),

    #[error("unit not found: {0}")]
    UnitNotFound(UnitId),

    #[error("unit is not occupied: {0}")]
    UnitNotOccupied(UnitId),

    #[error("layout error: {0}")]
    Config(String),

    #[error("invalid snapshot: {0}")]
    Snapshot(String),

    /// The owner index and unit occupancy disagree. The engine refuses
    /// further mutation once this is raised.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("engine halted after invariant violation: {0}")]
    Halted(String),
}

impl AllocationError {
    /// Whether the caller may reasonably retry or adjust the request.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            AllocationError::InvariantViolation(_) | AllocationError::Halted(_)
        )
    }
}

impl From<CoreError> for AllocationError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownRequestKind(kind) => AllocationError::UnknownRequestKind(kind),
            CoreError::UnknownCapacityClass(class) => AllocationError::UnknownCapacityClass(class),
            other => AllocationError::Config(other.to_string()),
        }
    }
}

pub type AllocationResult<T> = Result<T, AllocationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_parse_errors_map_to_matching_variants() {
        let err: AllocationError = CoreError::UnknownRequestKind("truck".into()).into();
        assert_eq!(err, AllocationError::UnknownRequestKind("truck".into()));

        let err: AllocationError = CoreError::Invalid("bad".into()).into();
        assert!(matches!(err, AllocationError::Config(msg) if msg.contains("bad")));
    }

    #[test]
    fn only_invariant_errors_are_fatal() {
        assert!(AllocationError::NoCapacity(RequestKind::Car).is_recoverable());
        assert!(AllocationError::DuplicateUnitId("A1".into()).is_recoverable());
        assert!(!AllocationError::InvariantViolation("x".into()).is_recoverable());
        assert!(!AllocationError::Halted("x".into()).is_recoverable());
    }
}
