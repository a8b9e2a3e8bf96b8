// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Bus: the per-form typed event channel.
//!
//! Everything in a Trellis form communicates through a [`FormBus`] instead of
//! holding direct references: field renderers dispatch intents, orchestration
//! components subscribe to the kinds they care about, and independent forms
//! own independent buses that never see each other's traffic.
//!
//! The core pieces are:
//!
//! - [`FormEvent`]: the stable, tagged event vocabulary (component
//!   initialization, page changes, form reset/clear, and the six array
//!   mutation intents). [`EventKind`] is the payload-free discriminant used
//!   for subscription filters.
//! - [`FormBus`]: synchronous FIFO delivery to matching subscribers. A
//!   subscriber stays registered until explicitly removed via
//!   [`FormBus::unsubscribe`].
//! - [`Envelope`]: what subscribers actually receive — the event plus an
//!   optional snapshot of the aggregate form value, attached at dispatch time
//!   when enabled and non-empty. Wrapping instead of cloning-with-extras keeps
//!   the original event value intact.
//! - [`Followups`]: events enqueued by a handler during delivery; they are
//!   dispatched after the current event finishes, in order, never interleaved.
//!
//! ## Failure semantics
//!
//! Handlers return `Result<(), `[`SubscriberError`]`>`. A failing handler is
//! logged via the `log` facade and isolated: later subscribers still run, and
//! the bus stays usable for future dispatches.
//!
//! ## Minimal example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use trellis_bus::{BusConfig, EventKind, FormBus, FormEvent};
//!
//! let mut bus = FormBus::new(BusConfig::default());
//! let seen = Rc::new(RefCell::new(0));
//! let tap = seen.clone();
//! bus.subscribe(&[EventKind::FormReset], move |_envelope, _followups| {
//!     *tap.borrow_mut() += 1;
//!     Ok(())
//! });
//!
//! bus.dispatch(FormEvent::FormReset);
//! bus.dispatch(FormEvent::FormClear); // filtered out
//! assert_eq!(*seen.borrow(), 1);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod bus;
mod event;

pub use bus::{BusConfig, Envelope, Followups, FormBus, SubscriberError, SubscriptionId};
pub use event::{ARRAY_EVENT_KINDS, EventKind, FormEvent, PageNavigationState};
