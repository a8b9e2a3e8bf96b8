// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batch resolution and key-based reconciliation.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;
use trellis_schema::{FieldDescriptor, Value};

use crate::registry::{Load, Resolution, ResolveError, TypeRegistry};
use crate::scope::{ScopeId, Scopes};

/// One renderable field, produced from a descriptor that resolved
/// successfully.
///
/// The `scope` is stable across reconciliation passes as long as the field's
/// key and type are unchanged; see the crate docs for why that matters.
#[derive(Debug)]
pub struct ResolvedField<H> {
    /// Key of the originating descriptor.
    pub key: String,
    /// Renderer type of the originating descriptor.
    pub type_name: String,
    /// Opaque renderer handle from the registry.
    pub handle: H,
    /// Per-field injection context.
    pub scope: ScopeId,
    /// Render inputs computed by the registry's mapper.
    pub inputs: Value,
}

/// Collaborators for a resolution pass, passed explicitly down the call
/// chain (no ambient lookup).
pub struct ResolveCtx<'a> {
    on_error: Option<&'a mut dyn FnMut(&FieldDescriptor, &ResolveError)>,
}

impl core::fmt::Debug for ResolveCtx<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResolveCtx")
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl<'a> ResolveCtx<'a> {
    /// Context invoking `on_error` once per descriptor that fails to resolve.
    pub fn new(on_error: &'a mut dyn FnMut(&FieldDescriptor, &ResolveError)) -> Self {
        Self {
            on_error: Some(on_error),
        }
    }

    /// Context that only logs failures.
    #[must_use]
    pub fn ignore_errors() -> Self {
        Self { on_error: None }
    }

    fn report(&mut self, descriptor: &FieldDescriptor, err: &ResolveError) {
        log::warn!("field resolution: {:?}: {err}", descriptor.key);
        if let Some(on_error) = self.on_error.as_mut() {
            on_error(descriptor, err);
        }
    }
}

/// Stamped claim on one pending slot of one batch.
///
/// The generation stamp is what makes superseded batches inert: a ticket
/// from a discarded batch no longer matches and its completion is ignored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ticket {
    generation: u64,
    slot: usize,
}

/// A slot the host still has to complete, reported by [`Pipeline::begin`].
#[derive(Debug)]
pub struct PendingLoad {
    /// Claim to pass back to [`Pipeline::fulfill`] / [`Pipeline::fail`].
    pub ticket: Ticket,
    /// Key of the waiting descriptor.
    pub key: String,
    /// Type name the host has to load.
    pub type_name: String,
}

/// Result of starting a batch.
#[derive(Debug)]
pub enum BeginOutcome {
    /// Every slot settled synchronously; the resolved list is committed.
    Committed,
    /// These slots await host completion; nothing is committed yet.
    Pending(Vec<PendingLoad>),
}

/// Result of completing one pending slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FulfillOutcome {
    /// This was the last outstanding slot; the batch committed.
    Committed,
    /// Other slots are still outstanding.
    StillPending,
    /// The ticket belonged to a superseded batch or an already-settled slot;
    /// the completion was ignored.
    Stale,
}

enum SlotState<H> {
    Waiting,
    Ready(Resolution<H>),
    Failed,
}

struct Batch<H> {
    generation: u64,
    descriptors: Vec<FieldDescriptor>,
    slots: Vec<SlotState<H>>,
    outstanding: usize,
}

/// The field resolution and reconciliation pipeline.
///
/// Owns the committed resolved-field list and the scope table. See the crate
/// docs for the batch, cancellation, and reconciliation rules.
pub struct Pipeline<H> {
    generation: u64,
    committed: Vec<ResolvedField<H>>,
    scopes: Scopes,
    in_flight: Option<Batch<H>>,
}

impl<H> core::fmt::Debug for Pipeline<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pipeline")
            .field("generation", &self.generation)
            .field("committed", &self.committed.len())
            .field("in_flight", &self.in_flight.is_some())
            .finish_non_exhaustive()
    }
}

impl<H> Default for Pipeline<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Pipeline<H> {
    /// Create an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            generation: 0,
            committed: Vec::new(),
            scopes: Scopes::new(),
            in_flight: None,
        }
    }

    /// The last committed resolved-field list, in descriptor order.
    #[must_use]
    pub fn resolved(&self) -> &[ResolvedField<H>] {
        &self.committed
    }

    /// The scope table (for stale-handle checks).
    #[must_use]
    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }

    /// Mutable scope table access (to register a disposer).
    pub fn scopes_mut(&mut self) -> &mut Scopes {
        &mut self.scopes
    }

    /// Whether a batch is awaiting host completions.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start resolving a descriptor list, superseding any in-flight batch.
    ///
    /// Descriptors whose type is ready resolve immediately; descriptors whose
    /// lookup fails are reported via `ctx` and omitted. If nothing awaits the
    /// host, the batch commits synchronously; otherwise the returned
    /// [`PendingLoad`]s tell the host what to complete.
    pub fn begin<R>(
        &mut self,
        descriptors: Vec<FieldDescriptor>,
        registry: &mut R,
        ctx: &mut ResolveCtx<'_>,
    ) -> BeginOutcome
    where
        R: TypeRegistry<Handle = H>,
    {
        self.generation += 1;
        if let Some(stale) = self.in_flight.take() {
            log::debug!(
                "field resolution: batch {} superseded by batch {}",
                stale.generation,
                self.generation
            );
        }

        let mut slots = Vec::with_capacity(descriptors.len());
        let mut pending = Vec::new();
        let mut outstanding = 0;
        for (i, descriptor) in descriptors.iter().enumerate() {
            match registry.load(&descriptor.type_name) {
                Load::Ready(resolution) => slots.push(SlotState::Ready(resolution)),
                Load::Pending => {
                    pending.push(PendingLoad {
                        ticket: Ticket {
                            generation: self.generation,
                            slot: i,
                        },
                        key: descriptor.key.clone(),
                        type_name: descriptor.type_name.clone(),
                    });
                    slots.push(SlotState::Waiting);
                    outstanding += 1;
                }
                Load::Failed(err) => {
                    ctx.report(descriptor, &err);
                    slots.push(SlotState::Failed);
                }
            }
        }

        let batch = Batch {
            generation: self.generation,
            descriptors,
            slots,
            outstanding,
        };
        if batch.outstanding == 0 {
            self.commit(batch);
            BeginOutcome::Committed
        } else {
            self.in_flight = Some(batch);
            BeginOutcome::Pending(pending)
        }
    }

    /// Complete a pending slot with a loaded resolution.
    ///
    /// Stale tickets (superseded batch, already-settled slot) are ignored.
    pub fn fulfill(&mut self, ticket: Ticket, resolution: Resolution<H>) -> FulfillOutcome {
        self.settle(ticket, SlotState::Ready(resolution), None)
    }

    /// Complete a pending slot with a failure.
    ///
    /// The failing descriptor is reported via `ctx` and omitted from the
    /// committed list; its siblings are unaffected.
    pub fn fail(
        &mut self,
        ticket: Ticket,
        err: &ResolveError,
        ctx: &mut ResolveCtx<'_>,
    ) -> FulfillOutcome {
        self.settle(ticket, SlotState::Failed, Some((err, ctx)))
    }

    fn settle(
        &mut self,
        ticket: Ticket,
        state: SlotState<H>,
        failure: Option<(&ResolveError, &mut ResolveCtx<'_>)>,
    ) -> FulfillOutcome {
        let Some(batch) = self.in_flight.as_mut() else {
            log::debug!("field resolution: completion for {ticket:?} with no batch in flight");
            return FulfillOutcome::Stale;
        };
        if batch.generation != ticket.generation {
            log::debug!("field resolution: stale completion for {ticket:?}");
            return FulfillOutcome::Stale;
        }
        let Some(slot) = batch.slots.get_mut(ticket.slot) else {
            log::warn!("field resolution: completion for out-of-range {ticket:?}");
            return FulfillOutcome::Stale;
        };
        if !matches!(slot, SlotState::Waiting) {
            log::warn!("field resolution: duplicate completion for {ticket:?}");
            return FulfillOutcome::Stale;
        }

        if let Some((err, ctx)) = failure {
            ctx.report(&batch.descriptors[ticket.slot], err);
        }
        *slot = state;
        batch.outstanding -= 1;

        if batch.outstanding == 0 {
            if let Some(batch) = self.in_flight.take() {
                self.commit(batch);
            }
            FulfillOutcome::Committed
        } else {
            FulfillOutcome::StillPending
        }
    }

    /// Reconcile a fully settled batch against the committed list.
    fn commit(&mut self, batch: Batch<H>) {
        let mut previous: HashMap<String, ResolvedField<H>> = self
            .committed
            .drain(..)
            .map(|field| (field.key.clone(), field))
            .collect();

        let mut next = Vec::with_capacity(batch.slots.len());
        for (descriptor, slot) in batch.descriptors.into_iter().zip(batch.slots) {
            let SlotState::Ready(resolution) = slot else {
                // Failed or omitted field; any previous scope for this key is
                // disposed below with the rest of the leftovers.
                continue;
            };
            let scope = match previous.remove(&descriptor.key) {
                // Key and type survive: keep the injection context so
                // renderer-local state survives with it.
                Some(prev) if prev.type_name == descriptor.type_name => prev.scope,
                Some(prev) => {
                    self.scopes.dispose(prev.scope);
                    self.scopes.create()
                }
                None => self.scopes.create(),
            };
            let inputs = (resolution.mapper)(&descriptor);
            next.push(ResolvedField {
                scope,
                inputs,
                handle: resolution.handle,
                key: descriptor.key,
                type_name: descriptor.type_name,
            });
        }

        // Keys that disappeared from the descriptor list.
        for (_, stale) in previous {
            self.scopes.dispose(stale.scope);
        }
        self.committed = next;
    }
}
