// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The page orchestrator.

use alloc::vec::Vec;

use smallvec::SmallVec;
use trellis_bus::{FormBus, FormEvent, PageNavigationState};
use trellis_schema::{ConditionEvaluator, FieldDescriptor, ValiditySource, Value};

/// Why a navigation operation failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationError {
    /// The requested slot does not exist.
    OutOfRange {
        /// Requested page slot.
        requested: usize,
        /// Number of page slots.
        total_pages: usize,
    },
    /// The current page is the last visible page.
    NoNextPage {
        /// Slot index of the current page.
        current_page_index: usize,
    },
    /// The current page is the first visible page.
    NoPreviousPage {
        /// Slot index of the current page.
        current_page_index: usize,
    },
    /// The current page is hidden, so it has no position in the visible
    /// ordering to step from.
    CurrentPageHidden {
        /// Slot index of the current page.
        current_page_index: usize,
    },
    /// Every page is hidden; there is nowhere to navigate.
    NoVisiblePages,
}

impl core::fmt::Display for NavigationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfRange {
                requested,
                total_pages,
            } => write!(
                f,
                "page index {requested} out of range (form has {total_pages} pages)"
            ),
            Self::NoNextPage { current_page_index } => write!(
                f,
                "no visible page after page {current_page_index}"
            ),
            Self::NoPreviousPage { current_page_index } => write!(
                f,
                "no visible page before page {current_page_index}"
            ),
            Self::CurrentPageHidden { current_page_index } => write!(
                f,
                "current page {current_page_index} is hidden and has no visible position"
            ),
            Self::NoVisiblePages => f.write_str("no page is visible"),
        }
    }
}

impl core::error::Error for NavigationError {}

/// Synchronous outcome of a navigation operation. Never panics, never thrown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationResult {
    /// Whether the operation succeeded (a no-op re-request counts as success).
    pub success: bool,
    /// The current page slot after the operation.
    pub new_page_index: usize,
    /// Failure detail when `success` is `false`.
    pub error: Option<NavigationError>,
}

impl NavigationResult {
    const fn succeeded(new_page_index: usize) -> Self {
        Self {
            success: true,
            new_page_index,
            error: None,
        }
    }

    const fn failed(current: usize, error: NavigationError) -> Self {
        Self {
            success: false,
            new_page_index: current,
            error: Some(error),
        }
    }
}

/// Navigation state machine over a list of page descriptors.
///
/// The only mutable state is the current page index; see the crate docs for
/// the derived-state and event rules.
#[derive(Clone, Debug)]
pub struct Wizard {
    pages: Vec<FieldDescriptor>,
    current_page_index: usize,
}

impl Wizard {
    /// Create a wizard over page descriptors, starting at slot 0.
    ///
    /// Callers typically obtain `pages` from
    /// [`trellis_schema::partition_root`], which has already suppressed
    /// structurally invalid subtrees.
    #[must_use]
    pub fn new(pages: Vec<FieldDescriptor>) -> Self {
        Self {
            pages,
            current_page_index: 0,
        }
    }

    /// Number of page slots, hidden pages included.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    /// Slot index of the current page.
    ///
    /// Always a valid slot while the form has pages, though it may point at a
    /// hidden page (hidden pages are skipped during navigation, not removed
    /// from the slot list).
    #[must_use]
    pub fn current_page_index(&self) -> usize {
        self.current_page_index
    }

    /// The current page descriptor, if the form has pages.
    #[must_use]
    pub fn current_page(&self) -> Option<&FieldDescriptor> {
        self.pages.get(self.current_page_index)
    }

    /// Whether the page at `index` is currently hidden.
    #[must_use]
    pub fn page_hidden(
        &self,
        index: usize,
        evaluator: &impl ConditionEvaluator,
        form_value: &Value,
    ) -> bool {
        self.pages.get(index).is_some_and(|page| {
            page.hidden_when
                .as_deref()
                .is_some_and(|expr| evaluator.evaluate(expr, form_value))
        })
    }

    /// Ordered slot indices of the currently visible pages.
    #[must_use]
    pub fn visible_page_indices(
        &self,
        evaluator: &impl ConditionEvaluator,
        form_value: &Value,
    ) -> SmallVec<[usize; 8]> {
        (0..self.pages.len())
            .filter(|&i| !self.page_hidden(i, evaluator, form_value))
            .collect()
    }

    /// Derived navigation state for the current form value.
    #[must_use]
    pub fn state(
        &self,
        evaluator: &impl ConditionEvaluator,
        form_value: &Value,
    ) -> PageNavigationState {
        let visible = self.visible_page_indices(evaluator, form_value);
        let position = visible.iter().position(|&i| i == self.current_page_index);
        PageNavigationState {
            current_page_index: self.current_page_index,
            total_pages: self.pages.len(),
            is_first_page: position == Some(0),
            is_last_page: position.is_some() && position == Some(visible.len() - 1),
            navigation_disabled: visible.is_empty(),
        }
    }

    /// True iff every leaf field of the current page validates.
    ///
    /// An empty or missing current page is vacuously valid. Navigation is
    /// never gated on this here; "next" buttons consult it to disable
    /// themselves.
    #[must_use]
    pub fn current_page_valid(
        &self,
        validity: &impl ValiditySource,
        form_value: &Value,
    ) -> bool {
        let Some(page) = self.current_page() else {
            return true;
        };
        let mut all_valid = true;
        for child in &page.children {
            child.for_each_leaf(&mut |leaf| {
                if !validity.is_valid(leaf, form_value) {
                    all_valid = false;
                }
            });
        }
        all_valid
    }

    /// Jump directly to a page slot.
    ///
    /// This is the primitive `next`/`previous` build on. It validates the
    /// bounds but deliberately does not consult visibility, so programmatic
    /// deep-links may target a hidden page. Re-requesting the current page is
    /// a successful no-op that fires no event.
    pub fn navigate_to_page(
        &mut self,
        index: usize,
        evaluator: &impl ConditionEvaluator,
        bus: &mut FormBus,
    ) -> NavigationResult {
        if index >= self.pages.len() {
            return NavigationResult::failed(
                self.current_page_index,
                NavigationError::OutOfRange {
                    requested: index,
                    total_pages: self.pages.len(),
                },
            );
        }
        if index == self.current_page_index {
            return NavigationResult::succeeded(index);
        }

        let previous = self.current_page_index;
        self.current_page_index = index;
        let state = self.state(evaluator, bus.form_value());
        bus.dispatch(FormEvent::PageChange {
            current_page_index: index,
            total_pages: self.pages.len(),
            previous_page_index: Some(previous),
        });
        bus.dispatch(FormEvent::PageNavigationStateChange { state });
        NavigationResult::succeeded(index)
    }

    /// Move to the next visible page, skipping hidden slots in one hop.
    pub fn navigate_to_next_page(
        &mut self,
        evaluator: &impl ConditionEvaluator,
        bus: &mut FormBus,
    ) -> NavigationResult {
        self.step(evaluator, bus, Step::Forward)
    }

    /// Move to the previous visible page, skipping hidden slots in one hop.
    pub fn navigate_to_previous_page(
        &mut self,
        evaluator: &impl ConditionEvaluator,
        bus: &mut FormBus,
    ) -> NavigationResult {
        self.step(evaluator, bus, Step::Backward)
    }

    fn step(
        &mut self,
        evaluator: &impl ConditionEvaluator,
        bus: &mut FormBus,
        step: Step,
    ) -> NavigationResult {
        let current = self.current_page_index;
        let visible = self.visible_page_indices(evaluator, bus.form_value());
        if visible.is_empty() {
            return NavigationResult::failed(current, NavigationError::NoVisiblePages);
        }
        let Some(position) = visible.iter().position(|&i| i == current) else {
            return NavigationResult::failed(
                current,
                NavigationError::CurrentPageHidden {
                    current_page_index: current,
                },
            );
        };
        let target = match step {
            Step::Forward => {
                if position + 1 >= visible.len() {
                    return NavigationResult::failed(
                        current,
                        NavigationError::NoNextPage {
                            current_page_index: current,
                        },
                    );
                }
                visible[position + 1]
            }
            Step::Backward => {
                if position == 0 {
                    return NavigationResult::failed(
                        current,
                        NavigationError::NoPreviousPage {
                            current_page_index: current,
                        },
                    );
                }
                visible[position - 1]
            }
        };
        self.navigate_to_page(target, evaluator, bus)
    }

    /// Redirect off a hidden current page without user action.
    ///
    /// If the current page is visible this is a successful no-op. If it is
    /// hidden, the wizard moves to the first visible page (firing the usual
    /// page-change event). If no page is visible at all, nothing fires and
    /// the unreachable configuration is reported in the result.
    pub fn ensure_visible_current(
        &mut self,
        evaluator: &impl ConditionEvaluator,
        bus: &mut FormBus,
    ) -> NavigationResult {
        let visible = self.visible_page_indices(evaluator, bus.form_value());
        if visible.iter().any(|&i| i == self.current_page_index) {
            return NavigationResult::succeeded(self.current_page_index);
        }
        match visible.first() {
            Some(&first) => self.navigate_to_page(first, evaluator, bus),
            None => {
                log::warn!("page orchestrator: every page is hidden; nowhere to navigate");
                NavigationResult::failed(self.current_page_index, NavigationError::NoVisiblePages)
            }
        }
    }

    /// Return to the first visible page (used when handling a form reset).
    pub fn reset(
        &mut self,
        evaluator: &impl ConditionEvaluator,
        bus: &mut FormBus,
    ) -> NavigationResult {
        let visible = self.visible_page_indices(evaluator, bus.form_value());
        match visible.first() {
            Some(&first) => self.navigate_to_page(first, evaluator, bus),
            None => {
                NavigationResult::failed(self.current_page_index, NavigationError::NoVisiblePages)
            }
        }
    }
}

#[derive(Copy, Clone)]
enum Step {
    Forward,
    Backward,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;
    use serde_json::json;
    use trellis_bus::{BusConfig, EventKind};
    use trellis_schema::{FieldFlags, PAGE_TYPE};

    /// Treats the literal expression `"hide"` as hidden; anything else is
    /// visible.
    struct LiteralEval;
    impl ConditionEvaluator for LiteralEval {
        fn evaluate(&self, expr: &str, _form_value: &Value) -> bool {
            expr == "hide"
        }
    }

    /// Required leaves must map to a non-empty string in the form value.
    struct RequiredNonEmpty;
    impl ValiditySource for RequiredNonEmpty {
        fn is_valid(&self, field: &FieldDescriptor, form_value: &Value) -> bool {
            if !field.flags.contains(FieldFlags::REQUIRED) {
                return true;
            }
            form_value
                .get(&field.key)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty())
        }
    }

    fn page(key: &str) -> FieldDescriptor {
        FieldDescriptor::new(key, PAGE_TYPE)
    }

    fn hidden_page(key: &str) -> FieldDescriptor {
        page(key).with_hidden_when("hide")
    }

    fn page_changes(bus: &mut FormBus) -> Rc<RefCell<Vec<FormEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let tap = log.clone();
        bus.subscribe(&[EventKind::PageChange], move |env, _| {
            tap.borrow_mut().push(env.event.clone());
            Ok(())
        });
        log
    }

    #[test]
    fn next_skips_a_run_of_hidden_pages_in_one_hop() {
        let mut bus = FormBus::new(BusConfig::default());
        let events = page_changes(&mut bus);
        let mut wizard = Wizard::new(vec![page("p1"), hidden_page("p2"), page("p3")]);

        let result = wizard.navigate_to_next_page(&LiteralEval, &mut bus);

        assert!(result.success);
        assert_eq!(result.new_page_index, 2);
        assert_eq!(
            *events.borrow(),
            [FormEvent::PageChange {
                current_page_index: 2,
                total_pages: 3,
                previous_page_index: Some(0),
            }]
        );
    }

    #[test]
    fn next_on_last_visible_page_fails_without_state_change() {
        let mut bus = FormBus::new(BusConfig::default());
        let events = page_changes(&mut bus);
        let mut wizard = Wizard::new(vec![page("p1"), hidden_page("p2")]);

        let result = wizard.navigate_to_next_page(&LiteralEval, &mut bus);

        assert!(!result.success);
        assert_eq!(result.new_page_index, 0);
        assert_eq!(
            result.error,
            Some(NavigationError::NoNextPage {
                current_page_index: 0
            })
        );
        assert_eq!(wizard.current_page_index(), 0);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn previous_skips_hidden_pages_backwards() {
        let mut bus = FormBus::new(BusConfig::default());
        let mut wizard = Wizard::new(vec![page("p1"), hidden_page("p2"), page("p3")]);
        wizard.navigate_to_page(2, &LiteralEval, &mut bus);

        let result = wizard.navigate_to_previous_page(&LiteralEval, &mut bus);
        assert!(result.success);
        assert_eq!(result.new_page_index, 0);

        let result = wizard.navigate_to_previous_page(&LiteralEval, &mut bus);
        assert!(!result.success);
        assert_eq!(
            result.error,
            Some(NavigationError::NoPreviousPage {
                current_page_index: 0
            })
        );
    }

    #[test]
    fn renavigating_to_current_page_is_a_silent_no_op() {
        let mut bus = FormBus::new(BusConfig::default());
        let events = page_changes(&mut bus);
        let mut wizard = Wizard::new(vec![page("p1"), page("p2")]);

        let result = wizard.navigate_to_page(0, &LiteralEval, &mut bus);

        assert!(result.success);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn deep_link_may_target_a_hidden_page() {
        let mut bus = FormBus::new(BusConfig::default());
        let mut wizard = Wizard::new(vec![page("p1"), hidden_page("p2")]);

        // Visibility is deliberately not consulted by the primitive.
        let result = wizard.navigate_to_page(1, &LiteralEval, &mut bus);
        assert!(result.success);
        assert_eq!(wizard.current_page_index(), 1);
    }

    #[test]
    fn out_of_range_is_a_structured_error() {
        let mut bus = FormBus::new(BusConfig::default());
        let mut wizard = Wizard::new(vec![page("p1")]);

        let result = wizard.navigate_to_page(5, &LiteralEval, &mut bus);
        assert!(!result.success);
        assert_eq!(
            result.error,
            Some(NavigationError::OutOfRange {
                requested: 5,
                total_pages: 1
            })
        );
        assert_eq!(wizard.current_page_index(), 0);
    }

    #[test]
    fn hidden_first_page_auto_redirects_to_first_visible() {
        let mut bus = FormBus::new(BusConfig::default());
        let events = page_changes(&mut bus);
        let mut wizard = Wizard::new(vec![hidden_page("p1"), hidden_page("p2"), page("p3")]);

        let result = wizard.ensure_visible_current(&LiteralEval, &mut bus);

        assert!(result.success);
        assert_eq!(wizard.current_page_index(), 2);
        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn all_pages_hidden_fires_nothing_and_never_panics() {
        let mut bus = FormBus::new(BusConfig::default());
        let events = page_changes(&mut bus);
        let mut wizard = Wizard::new(vec![hidden_page("p1"), hidden_page("p2")]);

        let result = wizard.ensure_visible_current(&LiteralEval, &mut bus);
        assert!(!result.success);
        assert_eq!(result.error, Some(NavigationError::NoVisiblePages));
        assert!(events.borrow().is_empty());

        // Derived state stays computable in the unreachable configuration.
        let state = wizard.state(&LiteralEval, bus.form_value());
        assert!(state.navigation_disabled);
        assert!(!state.is_first_page);
        assert!(!state.is_last_page);
        assert!(wizard.current_page_valid(&RequiredNonEmpty, bus.form_value()));
    }

    #[test]
    fn state_reflects_visible_ordering() {
        let mut bus = FormBus::new(BusConfig::default());
        let mut wizard = Wizard::new(vec![hidden_page("p1"), page("p2"), page("p3")]);

        // Slot 0 is hidden, so slot 1 is the first *visible* page.
        wizard.navigate_to_page(1, &LiteralEval, &mut bus);
        let state = wizard.state(&LiteralEval, bus.form_value());
        assert!(state.is_first_page);
        assert!(!state.is_last_page);
        assert_eq!(state.total_pages, 3);
    }

    #[test]
    fn state_change_event_follows_page_change() {
        let mut bus = FormBus::new(BusConfig::default());
        let order = Rc::new(RefCell::new(Vec::new()));
        let tap = order.clone();
        bus.subscribe(
            &[EventKind::PageChange, EventKind::PageNavigationStateChange],
            move |env, _| {
                tap.borrow_mut().push(env.event.kind());
                Ok(())
            },
        );
        let mut wizard = Wizard::new(vec![page("p1"), page("p2")]);

        wizard.navigate_to_next_page(&LiteralEval, &mut bus);
        assert_eq!(
            *order.borrow(),
            [EventKind::PageChange, EventKind::PageNavigationStateChange]
        );
    }

    #[test]
    fn required_field_gates_next_until_filled() {
        // pages = [p1: required name, p2: email]; the button layer consults
        // current_page_valid before asking for the next page.
        let mut bus = FormBus::new(BusConfig::default());
        let events = page_changes(&mut bus);
        let mut wizard = Wizard::new(vec![
            page("p1").with_children(vec![
                FieldDescriptor::new("name", "input").with_flags(FieldFlags::REQUIRED),
            ]),
            page("p2").with_children(vec![FieldDescriptor::new("email", "input")]),
        ]);

        bus.set_form_value(json!({ "name": "" }));
        let mut try_next = |wizard: &mut Wizard, bus: &mut FormBus| {
            if wizard.current_page_valid(&RequiredNonEmpty, bus.form_value()) {
                wizard.navigate_to_next_page(&LiteralEval, bus);
            }
        };

        try_next(&mut wizard, &mut bus);
        assert!(events.borrow().is_empty());
        assert_eq!(wizard.current_page_index(), 0);

        bus.set_form_value(json!({ "name": "Alice" }));
        try_next(&mut wizard, &mut bus);
        assert_eq!(events.borrow().len(), 1);
        assert_eq!(
            events.borrow()[0],
            FormEvent::PageChange {
                current_page_index: 1,
                total_pages: 2,
                previous_page_index: Some(0),
            }
        );
    }

    #[test]
    fn reset_returns_to_first_visible_page() {
        let mut bus = FormBus::new(BusConfig::default());
        let mut wizard = Wizard::new(vec![hidden_page("p1"), page("p2"), page("p3")]);
        wizard.navigate_to_page(2, &LiteralEval, &mut bus);

        let result = wizard.reset(&LiteralEval, &mut bus);
        assert!(result.success);
        assert_eq!(wizard.current_page_index(), 1);
    }

    #[test]
    fn visibility_reacts_to_form_value_changes() {
        struct ValueEval;
        impl ConditionEvaluator for ValueEval {
            // Hide while the named flag is truthy in the form value.
            fn evaluate(&self, expr: &str, form_value: &Value) -> bool {
                form_value.get(expr).and_then(Value::as_bool) == Some(true)
            }
        }

        let mut bus = FormBus::new(BusConfig::default());
        let mut wizard = Wizard::new(vec![
            page("p1"),
            page("p2").with_hidden_when("skip_details"),
            page("p3"),
        ]);

        bus.set_form_value(json!({ "skip_details": true }));
        let result = wizard.navigate_to_next_page(&ValueEval, &mut bus);
        assert_eq!(result.new_page_index, 2);

        wizard.navigate_to_page(0, &ValueEval, &mut bus);
        bus.set_form_value(json!({ "skip_details": false }));
        let result = wizard.navigate_to_next_page(&ValueEval, &mut bus);
        assert_eq!(result.new_page_index, 1);
    }
}
