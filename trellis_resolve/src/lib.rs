// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Resolve: turn field descriptors into live, diffable resolved fields.
//!
//! Given a list of [`FieldDescriptor`](trellis_schema::FieldDescriptor)s, the
//! [`Pipeline`] looks each descriptor's `type_name` up in a host-supplied
//! [`TypeRegistry`], producing one [`ResolvedField`] per descriptor that
//! resolved successfully. Renderer modules may load asynchronously, so the
//! registry answers [`Load::Ready`], [`Load::Pending`] (the host completes
//! the load later via [`Pipeline::fulfill`]/[`Pipeline::fail`]), or
//! [`Load::Failed`].
//!
//! Three guarantees shape the design:
//!
//! - **Order-preserving batches.** The combined resolved list follows the
//!   descriptor list's order and is committed only once *every* slot of the
//!   batch has settled. Underlying loads may complete in any order, but no
//!   partial or interleaved lists are ever observable — the batch trades
//!   latency (it waits for the slowest field) for a simple consistency model.
//! - **Superseding cancels.** Starting a new batch while one is in flight
//!   discards the old batch; its late completions are recognized by a stale
//!   generation stamp on the [`Ticket`] and ignored. Stale results can never
//!   overwrite fresher ones.
//! - **Identity-preserving reconciliation.** Each commit diffs against the
//!   previously committed list by key. A field whose key *and* type survive
//!   keeps its [`ScopeId`] — destroying and recreating the per-field scope
//!   would discard renderer-local ephemeral state (focus, partially entered
//!   text) and force a full re-mount. Changed types get a fresh scope,
//!   disappeared keys have theirs disposed.
//!
//! Per-field resolution failures are reported through the
//! [`ResolveCtx::on_error`] callback and the field is omitted; one bad field
//! never aborts its siblings. Scope-disposal failures are logged and do not
//! block progress.
//!
//! The [`schedule`] module provides the deferred-load planner: an explicit,
//! pluggable [`LoadStrategy`](schedule::LoadStrategy) deciding which pages
//! resolve eagerly and which on a low-priority task.
//!
//! ## Minimal example
//!
//! A registry that answers synchronously:
//!
//! ```
//! use trellis_resolve::{BeginOutcome, Load, Pipeline, Resolution, ResolveCtx, TypeRegistry};
//! use trellis_schema::{FieldDescriptor, Value};
//!
//! struct Inputs;
//! impl TypeRegistry for Inputs {
//!     type Handle = &'static str;
//!     fn load(&mut self, type_name: &str) -> Load<&'static str> {
//!         match type_name {
//!             "input" => Load::Ready(Resolution::new("<input>", |d| Value::String(d.key.clone()))),
//!             other => Load::failed_unknown(other),
//!         }
//!     }
//! }
//!
//! let mut pipeline = Pipeline::new();
//! let mut registry = Inputs;
//! let outcome = pipeline.begin(
//!     vec![FieldDescriptor::new("name", "input")],
//!     &mut registry,
//!     &mut ResolveCtx::ignore_errors(),
//! );
//! assert!(matches!(outcome, BeginOutcome::Committed));
//! assert_eq!(pipeline.resolved().len(), 1);
//! assert_eq!(pipeline.resolved()[0].handle, "<input>");
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod pipeline;
mod registry;
mod scope;

pub mod schedule;

pub use pipeline::{
    BeginOutcome, FulfillOutcome, PendingLoad, Pipeline, ResolveCtx, ResolvedField, Ticket,
};
pub use registry::{Load, Resolution, ResolveError, TypeRegistry};
pub use scope::{DisposeError, ScopeId, Scopes};
