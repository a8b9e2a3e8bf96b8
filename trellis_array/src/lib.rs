// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Array: the array mutation protocol.
//!
//! Array-backed fields receive user intents in six flavors (append, prepend,
//! insert-at, pop, shift, remove-at) but only ever need to *do* two things:
//! add an item from a template at some position, or remove an item at some
//! position. This crate normalizes the six intent events into those two
//! primitive [`ArrayAction`]s:
//!
//! | intent        | action                    |
//! |---------------|---------------------------|
//! | append        | add, no index (at end)    |
//! | prepend       | add, index 0              |
//! | insert-at(i)  | add, index i              |
//! | pop           | remove, no index (last)   |
//! | shift         | remove, index 0           |
//! | remove-at(i)  | remove, index i           |
//!
//! The mapping is total and pure: it depends only on the event itself, never
//! on the current state of the target array. `prepend` always yields
//! `add, index 0` regardless of array length.
//!
//! [`observe_array_actions`] wires the normalizer to a
//! [`FormBus`](trellis_bus::FormBus): it subscribes to the six intent kinds,
//! filters to events whose `array_key` matches the *current* result of a key
//! function (re-evaluated per event, so a field whose key changes identity
//! keeps filtering correctly), and forwards each surviving action to a sink.
//!
//! The consumer (the array-field renderer) materializes the template on
//! `add` and deletes the item on `remove`. Whether the target array exists
//! is the consumer's concern; the protocol only guarantees exactly-once
//! normalization per event.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::string::String;

use trellis_bus::{ARRAY_EVENT_KINDS, FormBus, FormEvent, SubscriptionId};
use trellis_schema::ItemTemplate;

/// A primitive array mutation, normalized from one of the six intents.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayAction {
    /// Materialize `template` as a new item.
    Add {
        /// Template for the new item.
        template: ItemTemplate,
        /// Position of the new item; `None` appends at the end.
        index: Option<usize>,
    },
    /// Delete an item.
    Remove {
        /// Position of the removed item; `None` removes the last item.
        index: Option<usize>,
    },
}

/// Normalize an array-mutation intent into its primitive action.
///
/// Returns the target array key together with the action, or `None` for
/// events that are not array intents. Pure and total over the six intents;
/// no field state is consulted.
#[must_use]
pub fn normalize(event: &FormEvent) -> Option<(&str, ArrayAction)> {
    match event {
        FormEvent::ArrayAppend {
            array_key,
            template,
        } => Some((
            array_key,
            ArrayAction::Add {
                template: template.clone(),
                index: None,
            },
        )),
        FormEvent::ArrayPrepend {
            array_key,
            template,
        } => Some((
            array_key,
            ArrayAction::Add {
                template: template.clone(),
                index: Some(0),
            },
        )),
        FormEvent::ArrayInsertAt {
            array_key,
            index,
            template,
        } => Some((
            array_key,
            ArrayAction::Add {
                template: template.clone(),
                index: Some(*index),
            },
        )),
        FormEvent::ArrayPop { array_key } => Some((array_key, ArrayAction::Remove { index: None })),
        FormEvent::ArrayShift { array_key } => {
            Some((array_key, ArrayAction::Remove { index: Some(0) }))
        }
        FormEvent::ArrayRemoveAt { array_key, index } => Some((
            array_key,
            ArrayAction::Remove {
                index: Some(*index),
            },
        )),
        _ => None,
    }
}

/// Subscribe an array-field consumer to its normalized actions.
///
/// `key_fn` supplies the field's current array key and is re-evaluated for
/// every event; `sink` receives exactly one [`ArrayAction`] per matching
/// intent event, in bus-delivery order. Returns the subscription id so the
/// consumer can detach when the field is disposed.
pub fn observe_array_actions<K, S>(bus: &mut FormBus, key_fn: K, mut sink: S) -> SubscriptionId
where
    K: Fn() -> String + 'static,
    S: FnMut(ArrayAction) + 'static,
{
    bus.subscribe(&ARRAY_EVENT_KINDS, move |envelope, _followups| {
        if let Some((array_key, action)) = normalize(&envelope.event)
            && array_key == key_fn()
        {
            sink(action);
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use trellis_bus::BusConfig;
    use trellis_schema::FieldDescriptor;

    fn template() -> ItemTemplate {
        ItemTemplate::Single(FieldDescriptor::new("item", "input"))
    }

    #[test]
    fn normalization_table_is_fixed() {
        let cases = [
            (
                FormEvent::ArrayAppend {
                    array_key: "tags".to_string(),
                    template: template(),
                },
                ArrayAction::Add {
                    template: template(),
                    index: None,
                },
            ),
            (
                FormEvent::ArrayPrepend {
                    array_key: "tags".to_string(),
                    template: template(),
                },
                ArrayAction::Add {
                    template: template(),
                    index: Some(0),
                },
            ),
            (
                FormEvent::ArrayInsertAt {
                    array_key: "tags".to_string(),
                    index: 3,
                    template: template(),
                },
                ArrayAction::Add {
                    template: template(),
                    index: Some(3),
                },
            ),
            (
                FormEvent::ArrayPop {
                    array_key: "tags".to_string(),
                },
                ArrayAction::Remove { index: None },
            ),
            (
                FormEvent::ArrayShift {
                    array_key: "tags".to_string(),
                },
                ArrayAction::Remove { index: Some(0) },
            ),
            (
                FormEvent::ArrayRemoveAt {
                    array_key: "tags".to_string(),
                    index: 2,
                },
                ArrayAction::Remove { index: Some(2) },
            ),
        ];

        for (event, expected) in cases {
            let (key, action) = normalize(&event).expect("array intent");
            assert_eq!(key, "tags");
            assert_eq!(action, expected);
        }
    }

    #[test]
    fn non_array_events_do_not_normalize() {
        assert_eq!(normalize(&FormEvent::FormReset), None);
        assert_eq!(normalize(&FormEvent::FormClear), None);
    }

    #[test]
    fn observer_filters_by_current_key() {
        let mut bus = FormBus::new(BusConfig::default());
        let seen: Rc<RefCell<Vec<ArrayAction>>> = Rc::new(RefCell::new(Vec::new()));
        let tap = seen.clone();
        observe_array_actions(
            &mut bus,
            || "tags".to_string(),
            move |action| tap.borrow_mut().push(action),
        );

        bus.dispatch(FormEvent::ArrayPop {
            array_key: "tags".to_string(),
        });
        bus.dispatch(FormEvent::ArrayPop {
            array_key: "other".to_string(),
        });

        assert_eq!(*seen.borrow(), [ArrayAction::Remove { index: None }]);
    }

    #[test]
    fn key_fn_is_reevaluated_per_event() {
        let mut bus = FormBus::new(BusConfig::default());
        // The field's key changes identity between events.
        let current_key = Rc::new(RefCell::new("old".to_string()));
        let seen: Rc<RefCell<Vec<ArrayAction>>> = Rc::new(RefCell::new(Vec::new()));

        let key = current_key.clone();
        let tap = seen.clone();
        observe_array_actions(
            &mut bus,
            move || key.borrow().clone(),
            move |action| tap.borrow_mut().push(action),
        );

        bus.dispatch(FormEvent::ArrayShift {
            array_key: "new".to_string(),
        });
        assert!(seen.borrow().is_empty());

        *current_key.borrow_mut() = "new".to_string();
        bus.dispatch(FormEvent::ArrayShift {
            array_key: "new".to_string(),
        });
        assert_eq!(*seen.borrow(), [ArrayAction::Remove { index: Some(0) }]);
    }

    #[test]
    fn each_event_normalizes_exactly_once() {
        let mut bus = FormBus::new(BusConfig::default());
        let count = Rc::new(RefCell::new(0));
        let tap = count.clone();
        observe_array_actions(
            &mut bus,
            || "tags".to_string(),
            move |_| *tap.borrow_mut() += 1,
        );

        bus.dispatch(FormEvent::ArrayAppend {
            array_key: "tags".to_string(),
            template: template(),
        });
        assert_eq!(*count.borrow(), 1);
    }
}
