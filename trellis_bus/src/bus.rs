// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-form bus: FIFO delivery, subscription filters, form-value
//! attachment, and handler-error isolation.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::string::String;

use smallvec::SmallVec;
use trellis_schema::Value;

use crate::event::{EventKind, FormEvent};

/// What a subscriber receives: the dispatched event plus an optional snapshot
/// of the aggregate form value.
///
/// The snapshot is attached at dispatch time when form-value attachment is
/// enabled for this bus *and* the current value is non-empty (not `null`, not
/// `{}`), so trivial events are not polluted with empty objects. The event
/// itself is delivered unchanged inside the envelope.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    /// The dispatched event.
    pub event: FormEvent,
    /// Snapshot of the aggregate form value, when attachment applies.
    pub form_value: Option<Value>,
}

/// Error reported by a subscriber handler.
///
/// Handler failures are logged and isolated by the bus; they never prevent
/// delivery to other subscribers or poison future dispatches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriberError {
    message: String,
}

impl SubscriberError {
    /// Create an error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl core::fmt::Display for SubscriberError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.message)
    }
}

impl core::error::Error for SubscriberError {}

/// Identifier of a live subscription, used to unsubscribe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Events enqueued by a handler during delivery.
///
/// Handlers cannot re-enter the bus while it is delivering; instead they
/// enqueue follow-up events here, and the bus dispatches them after the
/// current event finishes, in enqueue order. This is what keeps two mutations
/// targeting the same array sequential rather than interleaved.
#[derive(Debug, Default)]
pub struct Followups {
    queue: VecDeque<FormEvent>,
}

impl Followups {
    /// Enqueue an event to be dispatched after the current delivery finishes.
    pub fn enqueue(&mut self, event: FormEvent) {
        self.queue.push_back(event);
    }
}

/// Static configuration for a [`FormBus`].
///
/// Form-value attachment can be enabled engine-wide and overridden per form;
/// the per-form setting wins whenever it is present.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BusConfig {
    /// Engine-wide default for form-value attachment.
    pub attach_form_value_default: bool,
    /// Per-form override; `None` falls back to the engine-wide default.
    pub attach_form_value: Option<bool>,
}

type Handler = Box<dyn FnMut(&Envelope, &mut Followups) -> Result<(), SubscriberError>>;

struct Subscriber {
    id: SubscriptionId,
    /// `None` subscribes to every kind.
    filter: Option<SmallVec<[EventKind; 4]>>,
    handler: Handler,
}

impl Subscriber {
    fn matches(&self, kind: EventKind) -> bool {
        match &self.filter {
            None => true,
            Some(kinds) => kinds.contains(&kind),
        }
    }
}

/// Publish/subscribe channel exclusively owned by one form instance.
///
/// Delivery is synchronous and FIFO: subscribers see events in dispatch
/// order, and each event is delivered to subscribers in subscription order.
/// Separate bus values never share traffic.
pub struct FormBus {
    config: BusConfig,
    subscribers: SmallVec<[Subscriber; 4]>,
    next_id: u64,
    form_value: Value,
    pending: VecDeque<FormEvent>,
}

impl core::fmt::Debug for FormBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FormBus")
            .field("config", &self.config)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl FormBus {
    /// Create a bus with the given configuration.
    #[must_use]
    pub fn new(config: BusConfig) -> Self {
        Self {
            config,
            subscribers: SmallVec::new(),
            next_id: 0,
            form_value: Value::Null,
            pending: VecDeque::new(),
        }
    }

    /// Replace the aggregate form-value snapshot used for attachment.
    pub fn set_form_value(&mut self, value: Value) {
        self.form_value = value;
    }

    /// The current aggregate form-value snapshot.
    #[must_use]
    pub fn form_value(&self) -> &Value {
        &self.form_value
    }

    /// Subscribe to the given event kinds.
    ///
    /// The subscription stays open until [`FormBus::unsubscribe`] is called
    /// with the returned id.
    pub fn subscribe<F>(&mut self, kinds: &[EventKind], handler: F) -> SubscriptionId
    where
        F: FnMut(&Envelope, &mut Followups) -> Result<(), SubscriberError> + 'static,
    {
        self.register(Some(SmallVec::from_slice(kinds)), Box::new(handler))
    }

    /// Subscribe to every event kind.
    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&Envelope, &mut Followups) -> Result<(), SubscriberError> + 'static,
    {
        self.register(None, Box::new(handler))
    }

    fn register(
        &mut self,
        filter: Option<SmallVec<[EventKind; 4]>>,
        handler: Handler,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            filter,
            handler,
        });
        id
    }

    /// Remove a subscription. Returns `false` if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Dispatch an event to all matching subscribers, then drain any
    /// follow-up events they enqueued, FIFO.
    ///
    /// A handler error is logged and does not stop delivery to the remaining
    /// subscribers.
    pub fn dispatch(&mut self, event: FormEvent) {
        self.pending.push_back(event);
        while let Some(event) = self.pending.pop_front() {
            let envelope = self.envelope(event);
            let mut followups = Followups::default();
            for sub in &mut self.subscribers {
                if !sub.matches(envelope.event.kind()) {
                    continue;
                }
                if let Err(err) = (sub.handler)(&envelope, &mut followups) {
                    log::warn!(
                        "form bus: subscriber failed on {:?}: {err}",
                        envelope.event.kind()
                    );
                }
            }
            // Follow-ups run after the current event, behind anything already
            // queued, preserving bus-delivery order.
            self.pending.extend(followups.queue);
        }
    }

    fn envelope(&self, event: FormEvent) -> Envelope {
        let attach = self
            .config
            .attach_form_value
            .unwrap_or(self.config.attach_form_value_default);
        let form_value = (attach && !is_empty_value(&self.form_value))
            .then(|| self.form_value.clone());
        Envelope { event, form_value }
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
