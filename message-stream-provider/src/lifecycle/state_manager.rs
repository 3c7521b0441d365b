/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Two-phase request/commit state machine guarding provider lifecycle calls.

use crate::lifecycle::provider_state::ProviderState;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU8, Ordering};

const NO_PENDING: u8 = u8::MAX;

/// Race-safe lifecycle state holder.
///
/// The committed state only advances through [`PendingState::commit_state`], and at most
/// one [`PendingState`] exists at any time.
pub struct ProviderStateManager {
    committed: AtomicU8,
    pending: AtomicU8,
}

impl ProviderStateManager {
    pub fn new() -> Self {
        Self {
            committed: AtomicU8::new(ProviderState::Uninitialized.as_u8()),
            pending: AtomicU8::new(NO_PENDING),
        }
    }

    /// Currently committed state.
    pub fn state(&self) -> ProviderState {
        ProviderState::from_u8(self.committed.load(Ordering::Acquire))
            .unwrap_or(ProviderState::Closed)
    }

    /// State reserved by an outstanding request, if any.
    pub fn pending_state(&self) -> Option<ProviderState> {
        ProviderState::from_u8(self.pending.load(Ordering::Acquire))
    }

    /// Reserves the transition to `target`.
    ///
    /// Returns `None` when `target` is not the next legal state after the committed
    /// state, or when another caller already holds a reservation. Callers treat `None`
    /// as "nothing to do".
    pub fn request_state(&self, target: ProviderState) -> Option<PendingState<'_>> {
        if !self.state().can_transition_to(target) {
            return None;
        }

        self.pending
            .compare_exchange(
                NO_PENDING,
                target.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .ok()?;

        // The committed state can only move while the pending slot is held, so a
        // re-check here is stable.
        if !self.state().can_transition_to(target) {
            self.pending.store(NO_PENDING, Ordering::Release);
            return None;
        }

        Some(PendingState {
            manager: self,
            target,
            committed: false,
        })
    }
}

impl Default for ProviderStateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for ProviderStateManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderStateManager")
            .field("state", &self.state())
            .field("pending", &self.pending_state())
            .finish()
    }
}

/// A granted but not yet visible transition.
///
/// Dropping it without [`commit_state`](PendingState::commit_state) releases the
/// reservation and leaves the committed state unchanged.
#[must_use = "a pending state is released when dropped without commit_state()"]
pub struct PendingState<'a> {
    manager: &'a ProviderStateManager,
    target: ProviderState,
    committed: bool,
}

impl PendingState<'_> {
    pub fn target(&self) -> ProviderState {
        self.target
    }

    /// Publishes the reserved state as the new committed state.
    pub fn commit_state(mut self) {
        self.manager
            .committed
            .store(self.target.as_u8(), Ordering::Release);
        self.manager.pending.store(NO_PENDING, Ordering::Release);
        self.committed = true;
    }
}

impl Drop for PendingState<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.manager.pending.store(NO_PENDING, Ordering::Release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ProviderStateManager;
    use crate::lifecycle::provider_state::ProviderState;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn full_lifecycle_commits_in_order() {
        let manager = ProviderStateManager::new();

        for target in [
            ProviderState::Initialized,
            ProviderState::Started,
            ProviderState::Closed,
        ] {
            let pending = manager
                .request_state(target)
                .expect("next legal state should be granted");
            assert_eq!(pending.target(), target);
            assert_eq!(manager.pending_state(), Some(target));
            pending.commit_state();
            assert_eq!(manager.state(), target);
            assert_eq!(manager.pending_state(), None);
        }
    }

    #[test]
    fn uncommitted_request_is_invisible_and_retryable() {
        let manager = ProviderStateManager::new();

        let pending = manager.request_state(ProviderState::Initialized).unwrap();
        assert_eq!(manager.state(), ProviderState::Uninitialized);
        drop(pending);

        assert_eq!(manager.state(), ProviderState::Uninitialized);
        assert!(manager.request_state(ProviderState::Initialized).is_some());
    }

    #[test]
    fn out_of_order_and_repeated_requests_are_denied() {
        let manager = ProviderStateManager::new();
        assert!(manager.request_state(ProviderState::Started).is_none());
        assert!(manager.request_state(ProviderState::Closed).is_none());

        manager
            .request_state(ProviderState::Initialized)
            .unwrap()
            .commit_state();
        assert!(manager.request_state(ProviderState::Initialized).is_none());

        manager
            .request_state(ProviderState::Closed)
            .unwrap()
            .commit_state();
        assert!(manager.request_state(ProviderState::Started).is_none());
        assert!(manager.request_state(ProviderState::Initialized).is_none());
        assert_eq!(manager.state(), ProviderState::Closed);
    }

    #[test]
    fn only_one_concurrent_caller_is_granted() {
        const CALLERS: usize = 16;
        let manager = Arc::new(ProviderStateManager::new());
        let barrier = Arc::new(Barrier::new(CALLERS));
        let granted = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..CALLERS)
            .map(|_| {
                let manager = manager.clone();
                let barrier = barrier.clone();
                let granted = granted.clone();
                thread::spawn(move || {
                    barrier.wait();
                    if let Some(pending) = manager.request_state(ProviderState::Initialized) {
                        granted.fetch_add(1, Ordering::SeqCst);
                        pending.commit_state();
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(granted.load(Ordering::SeqCst), 1);
        assert_eq!(manager.state(), ProviderState::Initialized);
    }
}
