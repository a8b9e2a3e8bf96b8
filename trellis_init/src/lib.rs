// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Init: detect "form fully rendered".
//!
//! Field renderers load asynchronously, so the only reliable "everything is
//! on screen" signal is a rendezvous: count "component initialized" events
//! against an expected total. This crate provides that rendezvous in two
//! shapes:
//!
//! - [`InitGate`]: fires exactly once, on the event that brings the
//!   cumulative count to or past the expected total. Never un-fires.
//! - [`DetailedInitGate`]: reports [`InitProgress`] after every single event,
//!   monotonically, continuing past completion (useful for diagnostics and
//!   progress indicators).
//!
//! Both are pure accumulate-and-gate state machines; [`track_initialization`]
//! and [`track_initialization_detailed`] wire them to a
//! [`FormBus`](trellis_bus::FormBus).
//!
//! No component identity is tracked: duplicate or out-of-order initialization
//! events are indistinguishable from distinct ones. The caller computes the
//! expected count (container descriptors plus one for the root form
//! component; see `trellis_schema::expected_init_count`).
//!
//! ## The zero-expectation edge case
//!
//! An expectation of `0` is satisfied by the *first* initialization event,
//! not by zero events: the gate guards a "ready" rendezvous, and there is
//! always at least the root form component itself to wait for.
//!
//! ```
//! use trellis_init::InitGate;
//!
//! let mut gate = InitGate::new(0);
//! assert!(!gate.is_complete()); // nothing recorded yet
//! assert!(gate.record());       // first event fires the gate
//! assert!(!gate.record());      // only once
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use trellis_bus::{EventKind, FormBus, SubscriptionId};

/// One-shot readiness gate over a stream of initialization events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitGate {
    expected: usize,
    count: usize,
    fired: bool,
}

impl InitGate {
    /// Create a gate expecting `expected` initialization events.
    #[must_use]
    pub const fn new(expected: usize) -> Self {
        Self {
            expected,
            count: 0,
            fired: false,
        }
    }

    /// Record one initialization event.
    ///
    /// Returns `true` exactly once: on the event that brings the cumulative
    /// count to `>= expected`. At least one event is always required, so an
    /// expectation of zero fires on the first event.
    pub fn record(&mut self) -> bool {
        self.count += 1;
        if self.fired || self.count < self.expected {
            return false;
        }
        self.fired = true;
        true
    }

    /// Whether the gate has fired.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.fired
    }

    /// Number of events recorded so far.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }
}

/// Running initialization progress, reported after every event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InitProgress {
    /// Events recorded so far, this one included.
    pub current_count: usize,
    /// Expected total.
    pub expected_count: usize,
    /// Whether the expected total has been reached.
    pub is_complete: bool,
}

/// Progress-reporting variant of [`InitGate`].
///
/// Unlike the gate, this keeps reporting past completion, so late or
/// duplicate initializations remain observable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailedInitGate {
    expected: usize,
    count: usize,
}

impl DetailedInitGate {
    /// Create a tracker expecting `expected` initialization events.
    #[must_use]
    pub const fn new(expected: usize) -> Self {
        Self { expected, count: 0 }
    }

    /// Record one initialization event and report the running progress.
    pub fn record(&mut self) -> InitProgress {
        self.count += 1;
        InitProgress {
            current_count: self.count,
            expected_count: self.expected,
            is_complete: self.count >= self.expected,
        }
    }
}

/// Fire `on_ready` once, when `expected` component-initialized events have
/// been seen on `bus`.
///
/// The subscription stays open afterwards (extra events are ignored); callers
/// that want to reclaim it can unsubscribe with the returned id.
pub fn track_initialization(
    bus: &mut FormBus,
    expected: usize,
    mut on_ready: impl FnMut() + 'static,
) -> SubscriptionId {
    let mut gate = InitGate::new(expected);
    bus.subscribe(&[EventKind::ComponentInitialized], move |_envelope, _| {
        if gate.record() {
            on_ready();
        }
        Ok(())
    })
}

/// Report [`InitProgress`] for every component-initialized event on `bus`.
pub fn track_initialization_detailed(
    bus: &mut FormBus,
    expected: usize,
    mut on_progress: impl FnMut(InitProgress) + 'static,
) -> SubscriptionId {
    let mut gate = DetailedInitGate::new(expected);
    bus.subscribe(&[EventKind::ComponentInitialized], move |_envelope, _| {
        on_progress(gate.record());
        Ok(())
    })
}
