// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Wizard: the page-navigation state machine for multi-page forms.
//!
//! A [`Wizard`] owns a list of page descriptors and a single mutable value,
//! the current page index. Everything else — visible-page ordering, first/last
//! flags, page validity — is derived on demand from that index plus the
//! current form value, so reads are always consistent snapshots.
//!
//! ## Visibility and navigation
//!
//! Pages can be conditionally hidden (their `hidden_when` expression,
//! evaluated against the current form value by a host-supplied
//! [`ConditionEvaluator`](trellis_schema::ConditionEvaluator)). Hidden pages
//! keep their slot: the index space never compacts, and the current index may
//! legitimately point at a hidden page. Navigation works on the *visible*
//! ordering:
//!
//! - [`Wizard::navigate_to_next_page`] / [`Wizard::navigate_to_previous_page`]
//!   hop to the adjacent visible slot, skipping any run of hidden pages in a
//!   single hop. At the edge of the visible ordering they fail with a
//!   structured [`NavigationError`] and change nothing.
//! - [`Wizard::navigate_to_page`] is the primitive the others build on. It
//!   bounds-checks the slot but deliberately does *not* consult visibility:
//!   programmatic deep-links may target a hidden page directly. This is
//!   intentional, not an oversight.
//! - [`Wizard::ensure_visible_current`] redirects off a hidden initial page;
//!   with every page hidden it reports the unreachable configuration without
//!   firing anything, and never panics.
//!
//! Every operation returns a [`NavigationResult`] synchronously — errors are
//! values, never panics. Callers (UI buttons) are expected to disable
//! themselves preemptively from [`PageNavigationState`]; the structured error
//! is a defensive backstop.
//!
//! A page-change event fires if and only if the current index actually
//! changes; re-requesting the current page is a successful no-op that fires
//! nothing.
//!
//! ## Validity
//!
//! [`Wizard::current_page_valid`] reports whether every leaf field of the
//! current page validates, via the host's
//! [`ValiditySource`](trellis_schema::ValiditySource). The wizard never
//! enforces it — gating the "next" control is the surrounding button layer's
//! concern.
//!
//! ## Minimal example
//!
//! ```
//! use trellis_bus::{BusConfig, FormBus};
//! use trellis_schema::{ConditionEvaluator, FieldDescriptor, Value, PAGE_TYPE};
//! use trellis_wizard::Wizard;
//!
//! struct NeverHidden;
//! impl ConditionEvaluator for NeverHidden {
//!     fn evaluate(&self, _expr: &str, _form_value: &Value) -> bool {
//!         false
//!     }
//! }
//!
//! let mut bus = FormBus::new(BusConfig::default());
//! let mut wizard = Wizard::new(vec![
//!     FieldDescriptor::new("p1", PAGE_TYPE),
//!     FieldDescriptor::new("p2", PAGE_TYPE),
//! ]);
//!
//! let result = wizard.navigate_to_next_page(&NeverHidden, &mut bus);
//! assert!(result.success);
//! assert_eq!(wizard.current_page_index(), 1);
//!
//! // Already on the last page: structured failure, no state change.
//! let result = wizard.navigate_to_next_page(&NeverHidden, &mut bus);
//! assert!(!result.success);
//! assert_eq!(wizard.current_page_index(), 1);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod wizard;

pub use trellis_bus::PageNavigationState;
pub use wizard::{NavigationError, NavigationResult, Wizard};
