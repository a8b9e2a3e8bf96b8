// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The stable event vocabulary other layers may subscribe to.

use alloc::string::String;

use trellis_schema::ItemTemplate;

/// Derived page-navigation state, carried by
/// [`FormEvent::PageNavigationStateChange`].
///
/// `is_first_page`/`is_last_page` are relative to the currently *visible*
/// page ordering, not raw slot indices. `navigation_disabled` is `true` when
/// no page is visible at all.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageNavigationState {
    /// Slot index of the current page.
    pub current_page_index: usize,
    /// Total number of page slots, hidden ones included.
    pub total_pages: usize,
    /// Current page is the first visible page.
    pub is_first_page: bool,
    /// Current page is the last visible page.
    pub is_last_page: bool,
    /// No page is visible; navigation has nowhere to go.
    pub navigation_disabled: bool,
}

/// A typed form event.
///
/// Events are plain immutable values. Subscribers receive them wrapped in an
/// [`Envelope`](crate::Envelope), which may additionally carry a form-value
/// snapshot attached by the bus at dispatch time.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormEvent {
    /// A form component finished initializing.
    ComponentInitialized {
        /// Renderer type of the component (for example `"page"` or `"group"`).
        component_type: String,
        /// Key of the component's descriptor.
        component_id: String,
    },
    /// The wizard moved to another page.
    PageChange {
        /// Slot index of the page now current.
        current_page_index: usize,
        /// Total number of page slots.
        total_pages: usize,
        /// Slot index of the previously current page, if any.
        previous_page_index: Option<usize>,
    },
    /// Derived navigation state was recomputed after a page change.
    PageNavigationStateChange {
        /// The new derived state.
        state: PageNavigationState,
    },
    /// The form was reset to its default values.
    FormReset,
    /// The form was cleared.
    FormClear,
    /// Append an item at the end of an array field.
    ArrayAppend {
        /// Key of the target array field.
        array_key: String,
        /// Template for the new item.
        template: ItemTemplate,
    },
    /// Insert an item at the front of an array field.
    ArrayPrepend {
        /// Key of the target array field.
        array_key: String,
        /// Template for the new item.
        template: ItemTemplate,
    },
    /// Insert an item at a specific position of an array field.
    ArrayInsertAt {
        /// Key of the target array field.
        array_key: String,
        /// Position of the new item.
        index: usize,
        /// Template for the new item.
        template: ItemTemplate,
    },
    /// Remove the last item of an array field.
    ArrayPop {
        /// Key of the target array field.
        array_key: String,
    },
    /// Remove the first item of an array field.
    ArrayShift {
        /// Key of the target array field.
        array_key: String,
    },
    /// Remove the item at a specific position of an array field.
    ArrayRemoveAt {
        /// Key of the target array field.
        array_key: String,
        /// Position of the removed item.
        index: usize,
    },
}

/// Payload-free discriminant of a [`FormEvent`], used for subscription filters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`FormEvent::ComponentInitialized`].
    ComponentInitialized,
    /// [`FormEvent::PageChange`].
    PageChange,
    /// [`FormEvent::PageNavigationStateChange`].
    PageNavigationStateChange,
    /// [`FormEvent::FormReset`].
    FormReset,
    /// [`FormEvent::FormClear`].
    FormClear,
    /// [`FormEvent::ArrayAppend`].
    ArrayAppend,
    /// [`FormEvent::ArrayPrepend`].
    ArrayPrepend,
    /// [`FormEvent::ArrayInsertAt`].
    ArrayInsertAt,
    /// [`FormEvent::ArrayPop`].
    ArrayPop,
    /// [`FormEvent::ArrayShift`].
    ArrayShift,
    /// [`FormEvent::ArrayRemoveAt`].
    ArrayRemoveAt,
}

/// The six array-mutation intent kinds, in protocol order.
pub const ARRAY_EVENT_KINDS: [EventKind; 6] = [
    EventKind::ArrayAppend,
    EventKind::ArrayPrepend,
    EventKind::ArrayInsertAt,
    EventKind::ArrayPop,
    EventKind::ArrayShift,
    EventKind::ArrayRemoveAt,
];

impl FormEvent {
    /// The discriminant of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::ComponentInitialized { .. } => EventKind::ComponentInitialized,
            Self::PageChange { .. } => EventKind::PageChange,
            Self::PageNavigationStateChange { .. } => EventKind::PageNavigationStateChange,
            Self::FormReset => EventKind::FormReset,
            Self::FormClear => EventKind::FormClear,
            Self::ArrayAppend { .. } => EventKind::ArrayAppend,
            Self::ArrayPrepend { .. } => EventKind::ArrayPrepend,
            Self::ArrayInsertAt { .. } => EventKind::ArrayInsertAt,
            Self::ArrayPop { .. } => EventKind::ArrayPop,
            Self::ArrayShift { .. } => EventKind::ArrayShift,
            Self::ArrayRemoveAt { .. } => EventKind::ArrayRemoveAt,
        }
    }

    /// The target array key, for the six array-mutation intents.
    #[must_use]
    pub fn array_key(&self) -> Option<&str> {
        match self {
            Self::ArrayAppend { array_key, .. }
            | Self::ArrayPrepend { array_key, .. }
            | Self::ArrayInsertAt { array_key, .. }
            | Self::ArrayPop { array_key }
            | Self::ArrayShift { array_key }
            | Self::ArrayRemoveAt { array_key, .. } => Some(array_key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn kind_matches_variant() {
        let ev = FormEvent::ArrayPop {
            array_key: "tags".to_string(),
        };
        assert_eq!(ev.kind(), EventKind::ArrayPop);
        assert_eq!(FormEvent::FormReset.kind(), EventKind::FormReset);
    }

    #[test]
    fn array_key_only_on_array_events() {
        let ev = FormEvent::ArrayShift {
            array_key: "tags".to_string(),
        };
        assert_eq!(ev.array_key(), Some("tags"));
        assert_eq!(FormEvent::FormClear.array_key(), None);
    }
}
