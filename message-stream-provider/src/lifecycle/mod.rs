//! Provider lifecycle layer.
//!
//! Owns the two-phase readiness state machine. A transition is first requested,
//! which reserves it for exactly one caller, and only becomes visible once that
//! caller commits it after its side-effecting setup succeeded.
//!
//! ```
//! use message_stream_provider::{ProviderState, ProviderStateManager};
//!
//! let manager = ProviderStateManager::new();
//!
//! let pending = manager.request_state(ProviderState::Initialized).unwrap();
//! // A second caller cannot reserve the same transition while it is pending.
//! assert!(manager.request_state(ProviderState::Initialized).is_none());
//! pending.commit_state();
//!
//! assert_eq!(manager.state(), ProviderState::Initialized);
//! // Repeating a transition that already happened is denied.
//! assert!(manager.request_state(ProviderState::Initialized).is_none());
//! ```

pub(crate) mod provider_state;
pub(crate) mod state_manager;
