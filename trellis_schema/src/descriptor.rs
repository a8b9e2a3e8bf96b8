// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Field descriptors: the declarative tree a form is built from.

use alloc::string::String;
use alloc::vec::Vec;

use serde_json::Value;

/// Reserved `type_name` marking a descriptor as a wizard page.
pub const PAGE_TYPE: &str = "page";

bitflags::bitflags! {
    /// Per-field behavior flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u8 {
        /// Field must hold a non-empty value for its subtree to validate.
        const REQUIRED = 0b0000_0001;
        /// Field renders inert and is skipped by interaction.
        const DISABLED = 0b0000_0010;
    }
}

impl Default for FieldFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// One node of the declarative field tree.
///
/// A descriptor is plain data: the engine turns lists of these into live
/// resolved fields (see `trellis_resolve`) and wizard pages (see
/// `trellis_wizard`). Identity across reconciliation passes is the pair of
/// [`FieldDescriptor::key`] and [`FieldDescriptor::type_name`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldDescriptor {
    /// Stable key identifying this field within its parent.
    pub key: String,
    /// Renderer type looked up in the host's type registry.
    pub type_name: String,
    /// Optional human-readable label.
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: Option<String>,
    /// Behavior flags.
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: FieldFlags,
    /// Choice list for select-style fields.
    #[cfg_attr(feature = "serde", serde(default))]
    pub options: Option<OptionSet>,
    /// Conditional-visibility expression; hidden while it evaluates to `true`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub hidden_when: Option<String>,
    /// Initial value applied when the field first materializes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub default_value: Option<Value>,
    /// Child descriptors for container types (groups, arrays, pages).
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<FieldDescriptor>,
}

impl FieldDescriptor {
    /// Create a leaf descriptor with the given key and renderer type.
    pub fn new(key: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            type_name: type_name.into(),
            label: None,
            flags: FieldFlags::empty(),
            options: None,
            hidden_when: None,
            default_value: None,
            children: Vec::new(),
        }
    }

    /// Set child descriptors, making this a container.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }

    /// Set behavior flags.
    #[must_use]
    pub fn with_flags(mut self, flags: FieldFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the conditional-visibility expression.
    #[must_use]
    pub fn with_hidden_when(mut self, expr: impl Into<String>) -> Self {
        self.hidden_when = Some(expr.into());
        self
    }

    /// Set the human-readable label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the choice list.
    #[must_use]
    pub fn with_options(mut self, options: OptionSet) -> Self {
        self.options = Some(options);
        self
    }

    /// Returns `true` if this descriptor is a wizard page.
    #[must_use]
    pub fn is_page(&self) -> bool {
        self.type_name == PAGE_TYPE
    }

    /// Returns `true` if this descriptor has child descriptors.
    #[must_use]
    pub fn is_container(&self) -> bool {
        !self.children.is_empty()
    }

    /// Iterate the keys of all leaf descriptors in this subtree, depth first.
    ///
    /// A childless descriptor is its own (single) leaf.
    pub fn leaf_keys(&self) -> impl Iterator<Item = &str> {
        let mut out: Vec<&str> = Vec::new();
        collect_leaf_keys(self, &mut out);
        out.into_iter()
    }

    /// Walk all leaf descriptors in this subtree, depth first.
    pub fn for_each_leaf<'a>(&'a self, f: &mut impl FnMut(&'a Self)) {
        if self.children.is_empty() {
            f(self);
        } else {
            for child in &self.children {
                child.for_each_leaf(f);
            }
        }
    }
}

fn collect_leaf_keys<'a>(field: &'a FieldDescriptor, out: &mut Vec<&'a str>) {
    if field.children.is_empty() {
        out.push(&field.key);
    } else {
        for child in &field.children {
            collect_leaf_keys(child, out);
        }
    }
}

/// Number of "component initialized" events a fully rendered form produces.
///
/// One per container descriptor, plus one for the root form component itself.
/// This is the `expected` argument for the `trellis_init` trackers; the
/// trackers do not track component identity, so getting this count right is
/// the caller's responsibility.
#[must_use]
pub fn expected_init_count(fields: &[FieldDescriptor]) -> usize {
    fn containers(field: &FieldDescriptor) -> usize {
        if field.children.is_empty() {
            0
        } else {
            1 + field.children.iter().map(containers).sum::<usize>()
        }
    }
    1 + fields.iter().map(containers).sum::<usize>()
}

/// Template describing the item appended/inserted by an array mutation.
///
/// A [`ItemTemplate::Group`] merges several descriptors into one object-shaped
/// array item; [`ItemTemplate::Single`] materializes one descriptor per item.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemTemplate {
    /// One descriptor per array item.
    Single(FieldDescriptor),
    /// Several descriptors merged into one object-shaped item.
    Group(Vec<FieldDescriptor>),
}

impl ItemTemplate {
    /// The descriptors this template materializes.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        match self {
            Self::Single(field) => core::slice::from_ref(field),
            Self::Group(fields) => fields,
        }
    }
}

/// One entry of a select-style choice list.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectOption {
    /// Stored value; unique within an [`OptionSet`].
    pub value: String,
    /// Display label.
    pub label: String,
}

impl SelectOption {
    /// Create an option whose label equals its value.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }

    /// Create an option with distinct value and label.
    pub fn with_label(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Choice list with unique option values.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct OptionSet {
    options: Vec<SelectOption>,
}

impl OptionSet {
    /// Create an option set.
    ///
    /// # Panics
    ///
    /// Panics if two options share the same `value`. Duplicate option values
    /// are a programmer error in static configuration, not a runtime event,
    /// and are the one misuse the engine rejects eagerly instead of degrading.
    #[must_use]
    pub fn new(options: Vec<SelectOption>) -> Self {
        for (i, a) in options.iter().enumerate() {
            for b in &options[i + 1..] {
                assert!(
                    a.value != b.value,
                    "duplicate option value {:?} in option set",
                    a.value
                );
            }
        }
        Self { options }
    }

    /// The options in declaration order.
    #[must_use]
    pub fn as_slice(&self) -> &[SelectOption] {
        &self.options
    }

    /// Number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns `true` if the set has no options.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
