// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred-load planning for wizard pages.
//!
//! Distant pages do not need their renderers immediately: the plan marks
//! pages near the current one as [`LoadPriority::Eager`] and the rest as
//! [`LoadPriority::Deferred`], for the host to schedule on a low-priority
//! task. The policy is a pluggable [`LoadStrategy`] rather than a hard-coded
//! window; [`WindowStrategy`] is the default current-±radius policy.

use alloc::vec::Vec;

/// When a page's fields should be resolved.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LoadPriority {
    /// Resolve now.
    Eager,
    /// Resolve on a low-priority task.
    Deferred,
}

/// Policy deciding load priority from a page's distance to the current page.
pub trait LoadStrategy {
    /// Priority for a page `page_distance` slots away from the current page.
    fn priority(&self, page_distance: usize) -> LoadPriority;
}

/// Eagerly load the current page and its neighbors within `radius`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WindowStrategy {
    /// Maximum distance (in page slots) still loaded eagerly.
    pub radius: usize,
}

impl Default for WindowStrategy {
    fn default() -> Self {
        Self { radius: 1 }
    }
}

impl LoadStrategy for WindowStrategy {
    fn priority(&self, page_distance: usize) -> LoadPriority {
        if page_distance <= self.radius {
            LoadPriority::Eager
        } else {
            LoadPriority::Deferred
        }
    }
}

/// Plan the load priority of every page slot relative to `current`.
///
/// The returned vector is indexed by page slot.
#[must_use]
pub fn plan_page_loads(
    current: usize,
    total_pages: usize,
    strategy: &impl LoadStrategy,
) -> Vec<LoadPriority> {
    (0..total_pages)
        .map(|i| strategy.priority(current.abs_diff(i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_covers_current_and_neighbors() {
        let plan = plan_page_loads(2, 5, &WindowStrategy::default());
        assert_eq!(
            plan,
            [
                LoadPriority::Deferred,
                LoadPriority::Eager,
                LoadPriority::Eager,
                LoadPriority::Eager,
                LoadPriority::Deferred,
            ]
        );
    }

    #[test]
    fn custom_strategy_is_honored() {
        struct EverythingNow;
        impl LoadStrategy for EverythingNow {
            fn priority(&self, _: usize) -> LoadPriority {
                LoadPriority::Eager
            }
        }
        let plan = plan_page_loads(0, 3, &EverythingNow);
        assert!(plan.iter().all(|p| *p == LoadPriority::Eager));
    }

    #[test]
    fn zero_radius_only_loads_the_current_page() {
        let plan = plan_page_loads(1, 3, &WindowStrategy { radius: 0 });
        assert_eq!(
            plan,
            [
                LoadPriority::Deferred,
                LoadPriority::Eager,
                LoadPriority::Deferred,
            ]
        );
    }
}
