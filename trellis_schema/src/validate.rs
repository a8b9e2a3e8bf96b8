// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Eager detection of structurally invalid form configuration.
//!
//! Two shapes are rejected: a page nested inside another page, and a root
//! list that mixes page and non-page siblings. Both are reported with the
//! offending key and the offending subtree is suppressed; rendering proceeds
//! with the remainder (degrade, never crash).

use alloc::string::String;
use alloc::vec::Vec;

use crate::descriptor::FieldDescriptor;

/// A structural configuration problem, with enough context to find the
/// offending descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigIssue {
    /// The root list mixes page and non-page descriptors.
    MixedRootSiblings {
        /// Key of the stray non-page root descriptor that was suppressed.
        stray_key: String,
    },
    /// A page descriptor appeared inside another page's subtree.
    NestedPage {
        /// Key of the enclosing page.
        parent_key: String,
        /// Key of the suppressed nested page.
        page_key: String,
    },
}

impl core::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MixedRootSiblings { stray_key } => write!(
                f,
                "root mixes page and non-page descriptors; suppressed non-page field {stray_key:?}"
            ),
            Self::NestedPage {
                parent_key,
                page_key,
            } => write!(
                f,
                "page {page_key:?} nested inside page {parent_key:?}; nested page suppressed"
            ),
        }
    }
}

impl core::error::Error for ConfigIssue {}

/// How the root of a form is laid out after suppression of invalid subtrees.
#[derive(Clone, Debug, PartialEq)]
pub enum RootLayout {
    /// No descriptors at all.
    Empty,
    /// Wizard form: every surviving root descriptor is a page.
    Paged(Vec<FieldDescriptor>),
    /// Single-page form: no root descriptor is a page.
    Flat(Vec<FieldDescriptor>),
}

/// Check the root descriptor list without consuming it.
///
/// Returns every detected [`ConfigIssue`]; an empty result means the
/// configuration is structurally sound.
#[must_use]
pub fn validate_root(fields: &[FieldDescriptor]) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    let has_pages = fields.iter().any(FieldDescriptor::is_page);
    if has_pages {
        for field in fields {
            if !field.is_page() {
                issues.push(ConfigIssue::MixedRootSiblings {
                    stray_key: field.key.clone(),
                });
            }
        }
        for page in fields.iter().filter(|f| f.is_page()) {
            collect_nested_pages(&page.key, &page.children, &mut issues);
        }
    }

    issues
}

fn collect_nested_pages(
    page_key: &str,
    children: &[FieldDescriptor],
    issues: &mut Vec<ConfigIssue>,
) {
    for child in children {
        if child.is_page() {
            issues.push(ConfigIssue::NestedPage {
                parent_key: String::from(page_key),
                page_key: child.key.clone(),
            });
            // The nested subtree is suppressed wholesale; no point descending.
            continue;
        }
        collect_nested_pages(page_key, &child.children, issues);
    }
}

/// Split a root descriptor list into a usable [`RootLayout`], suppressing and
/// logging invalid subtrees.
///
/// When pages are present, stray non-page roots are dropped and pages are kept
/// with any nested pages pruned from their subtrees. Every suppression is
/// logged via `log::warn!` and returned as a [`ConfigIssue`].
#[must_use]
pub fn partition_root(fields: Vec<FieldDescriptor>) -> (RootLayout, Vec<ConfigIssue>) {
    let issues = validate_root(&fields);
    for issue in &issues {
        log::warn!("form configuration: {issue}");
    }

    if fields.is_empty() {
        return (RootLayout::Empty, issues);
    }

    let has_pages = fields.iter().any(FieldDescriptor::is_page);
    if !has_pages {
        return (RootLayout::Flat(fields), issues);
    }

    let pages = fields
        .into_iter()
        .filter(FieldDescriptor::is_page)
        .map(prune_nested_pages)
        .collect();
    (RootLayout::Paged(pages), issues)
}

fn prune_nested_pages(mut page: FieldDescriptor) -> FieldDescriptor {
    fn prune(children: &mut Vec<FieldDescriptor>) {
        children.retain(|c| !c.is_page());
        for child in children {
            prune(&mut child.children);
        }
    }
    prune(&mut page.children);
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::PAGE_TYPE;
    use alloc::vec;

    fn page(key: &str, children: Vec<FieldDescriptor>) -> FieldDescriptor {
        FieldDescriptor::new(key, PAGE_TYPE).with_children(children)
    }

    #[test]
    fn clean_paged_root_has_no_issues() {
        let fields = vec![
            page("p1", vec![FieldDescriptor::new("name", "input")]),
            page("p2", vec![FieldDescriptor::new("email", "input")]),
        ];
        assert!(validate_root(&fields).is_empty());

        let (layout, issues) = partition_root(fields);
        assert!(issues.is_empty());
        assert!(matches!(layout, RootLayout::Paged(pages) if pages.len() == 2));
    }

    #[test]
    fn flat_root_passes_through() {
        let fields = vec![
            FieldDescriptor::new("name", "input"),
            FieldDescriptor::new("email", "input"),
        ];
        let (layout, issues) = partition_root(fields);
        assert!(issues.is_empty());
        assert!(matches!(layout, RootLayout::Flat(f) if f.len() == 2));
    }

    #[test]
    fn mixed_root_suppresses_stray_fields() {
        let fields = vec![
            page("p1", vec![]),
            FieldDescriptor::new("stray", "input"),
            page("p2", vec![]),
        ];
        let (layout, issues) = partition_root(fields);
        assert_eq!(
            issues,
            vec![ConfigIssue::MixedRootSiblings {
                stray_key: "stray".into()
            }]
        );
        let RootLayout::Paged(pages) = layout else {
            panic!("expected paged layout");
        };
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn nested_page_is_reported_and_pruned() {
        let fields = vec![page(
            "outer",
            vec![
                FieldDescriptor::new("name", "input"),
                page("inner", vec![FieldDescriptor::new("email", "input")]),
            ],
        )];
        let (layout, issues) = partition_root(fields);
        assert_eq!(
            issues,
            vec![ConfigIssue::NestedPage {
                parent_key: "outer".into(),
                page_key: "inner".into()
            }]
        );
        let RootLayout::Paged(pages) = layout else {
            panic!("expected paged layout");
        };
        assert_eq!(pages[0].children.len(), 1);
        assert_eq!(pages[0].children[0].key, "name");
    }

    #[test]
    fn nested_page_below_group_is_detected() {
        let fields = vec![page(
            "outer",
            vec![
                FieldDescriptor::new("wrap", "group").with_children(vec![page("deep", vec![])]),
            ],
        )];
        let issues = validate_root(&fields);
        assert_eq!(
            issues,
            vec![ConfigIssue::NestedPage {
                parent_key: "outer".into(),
                page_key: "deep".into()
            }]
        );
    }

    #[test]
    fn empty_root_is_empty_layout() {
        let (layout, issues) = partition_root(Vec::new());
        assert!(issues.is_empty());
        assert_eq!(layout, RootLayout::Empty);
    }
}
