// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The field-type registry seam: how a descriptor's `type_name` becomes a
//! renderer handle plus a mapper.

use alloc::string::String;

use trellis_schema::{FieldDescriptor, Value};

/// Why a field type failed to resolve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveError {
    /// No renderer is registered under this type name.
    UnknownType {
        /// The unresolvable type name.
        type_name: String,
    },
    /// The renderer module was found but failed to load.
    LoadFailed {
        /// The failing type name.
        type_name: String,
        /// Host-provided failure detail.
        message: String,
    },
}

impl core::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownType { type_name } => {
                write!(f, "no renderer registered for field type {type_name:?}")
            }
            Self::LoadFailed { type_name, message } => {
                write!(f, "renderer for field type {type_name:?} failed to load: {message}")
            }
        }
    }
}

impl core::error::Error for ResolveError {}

/// A successfully loaded field type: the renderer handle and the mapper that
/// turns a descriptor into render inputs.
pub struct Resolution<H> {
    /// Opaque renderer handle owned by the host.
    pub handle: H,
    /// Maps a field descriptor to the inputs its renderer consumes.
    pub mapper: fn(&FieldDescriptor) -> Value,
}

impl<H> Resolution<H> {
    /// Bundle a handle with its mapper.
    pub const fn new(handle: H, mapper: fn(&FieldDescriptor) -> Value) -> Self {
        Self { handle, mapper }
    }
}

impl<H: core::fmt::Debug> core::fmt::Debug for Resolution<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Resolution")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// Answer of a [`TypeRegistry`] lookup.
///
/// A registry must answer one of the three; silently producing nothing is not
/// an option the pipeline accepts.
#[derive(Debug)]
pub enum Load<H> {
    /// The renderer is available now.
    Ready(Resolution<H>),
    /// The renderer module is still loading; the host completes the slot
    /// later via `Pipeline::fulfill` or `Pipeline::fail`.
    Pending,
    /// The lookup failed.
    Failed(ResolveError),
}

impl<H> Load<H> {
    /// Shorthand for failing with [`ResolveError::UnknownType`].
    #[must_use]
    pub fn failed_unknown(type_name: &str) -> Self {
        Self::Failed(ResolveError::UnknownType {
            type_name: String::from(type_name),
        })
    }
}

/// Host-supplied lookup from field type names to renderer resolutions.
///
/// The registry is consulted once per descriptor per batch; it may answer
/// from a cache, kick off a module load and answer [`Load::Pending`], or
/// reject the type name outright.
pub trait TypeRegistry {
    /// Opaque renderer handle type.
    type Handle;

    /// Look up the renderer for `type_name`.
    fn load(&mut self, type_name: &str) -> Load<Self::Handle>;
}
