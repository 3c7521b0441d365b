//! Closed set of provider readiness states.

use std::fmt::{Display, Formatter};

/// Provider readiness, ordered from least to most advanced.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(u8)]
pub enum ProviderState {
    #[default]
    Uninitialized = 0,
    Initialized = 1,
    Started = 2,
    Closed = 3,
}

impl ProviderState {
    pub(crate) const fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ProviderState::Uninitialized),
            1 => Some(ProviderState::Initialized),
            2 => Some(ProviderState::Started),
            3 => Some(ProviderState::Closed),
            _ => None,
        }
    }

    /// Whether `target` is a legal successor of `self`.
    ///
    /// Closed is reachable from Initialized or Started and is terminal.
    pub fn can_transition_to(self, target: ProviderState) -> bool {
        matches!(
            (self, target),
            (ProviderState::Uninitialized, ProviderState::Initialized)
                | (ProviderState::Initialized, ProviderState::Started)
                | (ProviderState::Initialized, ProviderState::Closed)
                | (ProviderState::Started, ProviderState::Closed)
        )
    }
}

impl Display for ProviderState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProviderState::Uninitialized => "uninitialized",
            ProviderState::Initialized => "initialized",
            ProviderState::Started => "started",
            ProviderState::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::ProviderState;

    const ALL: [ProviderState; 4] = [
        ProviderState::Uninitialized,
        ProviderState::Initialized,
        ProviderState::Started,
        ProviderState::Closed,
    ];

    #[test]
    fn transitions_never_move_backwards() {
        for from in ALL {
            for to in ALL {
                if from.can_transition_to(to) {
                    assert!(to > from, "{from} -> {to} moves backwards");
                }
            }
        }
    }

    #[test]
    fn closed_is_terminal_and_not_reachable_before_init() {
        for to in ALL {
            assert!(!ProviderState::Closed.can_transition_to(to));
        }
        assert!(!ProviderState::Uninitialized.can_transition_to(ProviderState::Closed));
        assert!(!ProviderState::Uninitialized.can_transition_to(ProviderState::Started));
        assert!(ProviderState::Initialized.can_transition_to(ProviderState::Closed));
    }

    #[test]
    fn u8_projection_round_trips_and_rejects_unknown() {
        for state in ALL {
            assert_eq!(ProviderState::from_u8(state.as_u8()), Some(state));
        }
        assert_eq!(ProviderState::from_u8(4), None);
    }
}
