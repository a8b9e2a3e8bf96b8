// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Schema: declarative field and page descriptors.
//!
//! This crate holds the data model shared by the rest of the Trellis workspace:
//!
//! - [`FieldDescriptor`]: one node of the declarative field tree, with a stable
//!   `key`, a renderer `type_name`, [`FieldFlags`], optional select options, an
//!   optional conditional-visibility expression, and child descriptors for
//!   container types (groups, arrays, pages).
//! - [`ItemTemplate`]: the payload of array-mutation events — either a single
//!   descriptor or a group of descriptors to be merged into one object-shaped
//!   array item.
//! - [`OptionSet`] / [`SelectOption`]: select-style choice lists with a
//!   duplicate-value check at construction time.
//! - [`validate_root`] / [`partition_root`]: eager detection of structurally
//!   invalid configuration (a page nested inside a page, mixed page/non-page
//!   siblings at the root). Invalid subtrees are reported and suppressed, never
//!   allowed to crash rendering.
//! - [`ConditionEvaluator`] and [`ValiditySource`]: the two host-supplied
//!   predicates the orchestration layer consumes. Both are pure and
//!   synchronous; Trellis has no opinion on how expressions are written or how
//!   validation rules are evaluated.
//!
//! The aggregate form value and per-field render inputs are represented as
//! [`serde_json::Value`], re-exported here as [`Value`]. With the `serde`
//! feature enabled the descriptor types derive `Serialize`/`Deserialize` so a
//! whole form definition can be loaded from JSON configuration.
//!
//! ## Minimal example
//!
//! ```
//! use trellis_schema::{FieldDescriptor, FieldFlags, PAGE_TYPE};
//!
//! let page = FieldDescriptor::new("p1", PAGE_TYPE).with_children(vec![
//!     FieldDescriptor::new("name", "input").with_flags(FieldFlags::REQUIRED),
//!     FieldDescriptor::new("email", "input"),
//! ]);
//!
//! assert!(page.is_page());
//! let leaves: Vec<&str> = page.leaf_keys().collect();
//! assert_eq!(leaves, ["name", "email"]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod descriptor;
mod validate;

pub use descriptor::{
    FieldDescriptor, FieldFlags, ItemTemplate, OptionSet, PAGE_TYPE, SelectOption,
    expected_init_count,
};
pub use validate::{ConfigIssue, RootLayout, partition_root, validate_root};

/// Aggregate form values and render inputs.
///
/// Re-exported so downstream crates do not need a direct `serde_json`
/// dependency for the common case.
pub use serde_json::Value;

/// Host-supplied conditional-visibility evaluator.
///
/// `evaluate` must be pure, synchronous, and side-effect free. The expression
/// is the opaque string stored in [`FieldDescriptor::hidden_when`]; the context
/// is the current aggregate form value.
pub trait ConditionEvaluator {
    /// Evaluate `expr` against `form_value`. A `true` result means the guarded
    /// descriptor is hidden.
    fn evaluate(&self, expr: &str, form_value: &Value) -> bool;
}

/// Host-supplied validity predicate over a field subtree.
///
/// The orchestration layer only ever needs "is this field valid" as a boolean;
/// rule evaluation and schema adapters live outside the engine.
pub trait ValiditySource {
    /// Returns `true` if `field` is valid under the current `form_value`.
    fn is_valid(&self, field: &FieldDescriptor, form_value: &Value) -> bool;
}
