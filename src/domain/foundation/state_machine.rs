//! State machine trait for status enums.
//!
//! Gives status enums one vocabulary for "may this record move from here to
//! there", so callers check transitions the same way everywhere.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors list their legal moves; validated transitions come for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for SubscriptionStatus {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!((self, target), (Active, Frozen) | (Frozen, Active) /* ... */)
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             Active => vec![Frozen, Expired, Closed],
///             // ...
///         }
///     }
/// }
///
/// let next = current.transition_to(SubscriptionStatus::Frozen)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "status",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Door {
        Open,
        Shut,
        Bricked,
    }

    impl StateMachine for Door {
        fn can_transition_to(&self, target: &Self) -> bool {
            use Door::*;
            matches!(
                (self, target),
                (Open, Shut) | (Shut, Open) | (Shut, Bricked)
            )
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use Door::*;
            match self {
                Open => vec![Shut],
                Shut => vec![Open, Bricked],
                Bricked => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_valid_transition() {
        assert_eq!(Door::Open.transition_to(Door::Shut), Ok(Door::Shut));
    }

    #[test]
    fn transition_to_fails_for_invalid_transition() {
        let err = Door::Open.transition_to(Door::Bricked).unwrap_err();
        assert_eq!(err.field(), "status");
    }

    #[test]
    fn terminal_state_has_no_moves() {
        assert!(Door::Bricked.is_terminal());
        assert!(!Door::Shut.is_terminal());
    }
}
