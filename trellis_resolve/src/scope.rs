// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-field injection contexts as generational handles.
//!
//! A scope stands for the bundle of per-field resources a host associates
//! with one rendered field (dependency-injection context, subscriptions,
//! renderer-local state). The pipeline only manages identity and lifecycle;
//! the resources themselves live host-side, keyed by [`ScopeId`].

use alloc::string::String;
use alloc::vec::Vec;

/// Generational handle naming one per-field injection context.
///
/// Handles from disposed scopes are never reused with the same generation,
/// so a stale `ScopeId` can be detected via [`Scopes::contains`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ScopeId(pub(crate) u32, pub(crate) u32);

impl ScopeId {
    const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Failure raised by a host disposer.
///
/// Disposal failures are logged by [`Scopes::dispose`] and never propagated;
/// a failing finalizer must not block reconciliation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisposeError {
    message: String,
}

impl DisposeError {
    /// Create an error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl core::fmt::Display for DisposeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.message)
    }
}

impl core::error::Error for DisposeError {}

struct Slot {
    generation: u32,
    alive: bool,
}

/// Table of live injection contexts.
#[derive(Default)]
pub struct Scopes {
    slots: Vec<Slot>,
    free: Vec<u32>,
    /// Optional host finalizer invoked on disposal.
    disposer: Option<fn(ScopeId) -> Result<(), DisposeError>>,
}

impl core::fmt::Debug for Scopes {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scopes")
            .field("live", &self.len())
            .finish_non_exhaustive()
    }
}

impl Scopes {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a finalizer run whenever a scope is disposed.
    ///
    /// A finalizer error is logged and swallowed.
    pub fn set_disposer(&mut self, disposer: fn(ScopeId) -> Result<(), DisposeError>) {
        self.disposer = Some(disposer);
    }

    /// Create a fresh scope.
    pub fn create(&mut self) -> ScopeId {
        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.alive = true;
            ScopeId::new(idx, slot.generation)
        } else {
            let idx = u32::try_from(self.slots.len()).expect("scope table overflow");
            self.slots.push(Slot {
                generation: 0,
                alive: true,
            });
            ScopeId::new(idx, 0)
        }
    }

    /// Dispose a scope, running the host finalizer if one is registered.
    ///
    /// Disposing a stale or unknown id is a logged no-op.
    pub fn dispose(&mut self, id: ScopeId) {
        let Some(slot) = self.slots.get_mut(id.idx()) else {
            log::warn!("scope dispose: unknown scope {id:?}");
            return;
        };
        if !slot.alive || slot.generation != id.1 {
            log::warn!("scope dispose: stale scope {id:?}");
            return;
        }
        slot.alive = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.0);

        if let Some(disposer) = self.disposer
            && let Err(err) = disposer(id)
        {
            // Disposal failure must not block reconciliation.
            log::warn!("scope dispose: finalizer failed for {id:?}: {err}");
        }
    }

    /// Whether `id` names a live scope.
    #[must_use]
    pub fn contains(&self, id: ScopeId) -> bool {
        self.slots
            .get(id.idx())
            .is_some_and(|s| s.alive && s.generation == id.1)
    }

    /// Number of live scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.alive).count()
    }

    /// Returns `true` if no scopes are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_dispose_recycles_slots_with_new_generation() {
        let mut scopes = Scopes::new();
        let a = scopes.create();
        scopes.dispose(a);
        let b = scopes.create();

        // Same slot, different generation: the old handle is dead.
        assert_eq!(a.0, b.0);
        assert_ne!(a, b);
        assert!(!scopes.contains(a));
        assert!(scopes.contains(b));
    }

    #[test]
    fn stale_dispose_is_a_no_op() {
        let mut scopes = Scopes::new();
        let a = scopes.create();
        scopes.dispose(a);
        scopes.dispose(a); // logged, ignored
        assert_eq!(scopes.len(), 0);
    }

    #[test]
    fn failing_disposer_does_not_block() {
        let mut scopes = Scopes::new();
        scopes.set_disposer(|_| Err(DisposeError::new("finalizer failed")));
        let a = scopes.create();
        scopes.dispose(a);
        // The scope is gone despite the finalizer error.
        assert!(!scopes.contains(a));
        let _ = scopes.create();
        assert_eq!(scopes.len(), 1);
    }
}
