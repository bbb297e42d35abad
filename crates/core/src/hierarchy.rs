//! Page tree rules: slugs, titles, parent assignment, root-only hostnames,
//! and chain walking (breadcrumbs, absolute URLs).
//!
//! A *chain* is a page followed by its ancestors, nearest first, ending at the
//! root. The db layer loads chains with one recursive query; everything here
//! works on the loaded slice.

use serde::Serialize;

use crate::error::CoreError;
use crate::hostname::parse_hostnames;
use crate::publication::validate_date_order;
use crate::types::{DbId, Timestamp};

/// Deepest tree a chain walk will follow before treating the tree as corrupt.
pub const MAX_TREE_DEPTH: usize = 64;

/// Longest accepted page title.
pub const MAX_TITLE_LEN: usize = 255;

/// Longest accepted slug.
pub const MAX_SLUG_LEN: usize = 255;

/// Read access to the tree-relevant fields of a page row.
pub trait TreeNode {
    fn node_id(&self) -> DbId;
    fn node_parent_id(&self) -> Option<DbId>;
    fn node_slug(&self) -> &str;
    fn node_title(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Slugs and titles
// ---------------------------------------------------------------------------

/// Generate a URL-safe slug from a page title.
///
/// Lowercases, replaces anything outside `[a-z0-9]` with hyphens, collapses
/// runs of hyphens, and trims them from both ends.
pub fn generate_slug(title: &str) -> String {
    let mut result = String::with_capacity(title.len());
    let mut prev_hyphen = false;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_hyphen = false;
        } else if !prev_hyphen {
            result.push('-');
            prev_hyphen = true;
        }
    }
    result.trim_matches('-').to_string()
}

pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Slugs are non-empty and contain only lowercase alphanumerics and hyphens.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() {
        return Err(CoreError::Validation("Slug must not be empty".into()));
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(CoreError::Validation(format!(
            "Slug must be at most {MAX_SLUG_LEN} characters"
        )));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(CoreError::Validation(
            "Slug must contain only lowercase alphanumeric characters and hyphens".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Structural validation
// ---------------------------------------------------------------------------

/// Reject a parent assignment that would create a cycle.
///
/// `new_parent_chain` is the chain of the proposed parent (parent first, root
/// last). The assignment is a cycle if the page itself appears in it, which
/// covers both "parent is self" and "parent is a descendant".
pub fn check_parent_assignment(
    page_id: DbId,
    new_parent_chain: &[DbId],
) -> Result<(), CoreError> {
    if new_parent_chain.first() == Some(&page_id) {
        return Err(CoreError::Validation(
            "A page cannot be its own parent".into(),
        ));
    }
    if new_parent_chain.contains(&page_id) {
        return Err(CoreError::Validation(
            "Cannot move a page under one of its own descendants".into(),
        ));
    }
    if new_parent_chain.len() >= MAX_TREE_DEPTH {
        return Err(CoreError::Validation(format!(
            "Page tree may not be deeper than {MAX_TREE_DEPTH} levels"
        )));
    }
    Ok(())
}

/// Hostnames may only be held by root pages.
pub fn validate_hostnames_on_root(
    parent_id: Option<DbId>,
    hostnames: &[String],
) -> Result<(), CoreError> {
    if parent_id.is_some() && !hostnames.is_empty() {
        return Err(CoreError::Validation(
            "Hostnames can only be assigned to root pages".into(),
        ));
    }
    Ok(())
}

/// The fields of a page that the persist-time rules look at.
#[derive(Debug, Clone)]
pub struct PageStructure<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub parent_id: Option<DbId>,
    pub hostnames: &'a [String],
    pub effective_date: Option<Timestamp>,
    pub expiry_date: Option<Timestamp>,
}

/// Run every local (non-database) rule on a page about to be persisted.
///
/// Returns the normalized hostname set. Cycle and uniqueness checks need
/// database state and are run by the caller alongside this.
pub fn validate_page_structure(page: &PageStructure<'_>) -> Result<Vec<String>, CoreError> {
    validate_title(page.title)?;
    validate_slug(page.slug)?;
    validate_date_order(page.effective_date, page.expiry_date)?;
    let hostnames = parse_hostnames(page.hostnames)?;
    validate_hostnames_on_root(page.parent_id, &hostnames)?;
    Ok(hostnames)
}

// ---------------------------------------------------------------------------
// Chain walking
// ---------------------------------------------------------------------------

/// Verify that `chain` is a well-formed walk: each node's parent is the next
/// node, the last node is a root, and no id repeats.
pub fn validate_chain<N: TreeNode>(chain: &[N]) -> Result<(), CoreError> {
    if chain.len() > MAX_TREE_DEPTH {
        return Err(CoreError::Validation(format!(
            "Page tree may not be deeper than {MAX_TREE_DEPTH} levels"
        )));
    }
    for (i, node) in chain.iter().enumerate() {
        let expected_parent = chain.get(i + 1).map(TreeNode::node_id);
        if node.node_parent_id() != expected_parent {
            return Err(CoreError::Internal(format!(
                "Broken ancestor chain at page {}",
                node.node_id()
            )));
        }
        if chain[..i].iter().any(|n| n.node_id() == node.node_id()) {
            return Err(CoreError::Internal(format!(
                "Cycle detected in ancestor chain at page {}",
                node.node_id()
            )));
        }
    }
    Ok(())
}

/// One entry of a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub page_id: DbId,
    pub title: String,
    pub slug: String,
    pub url: String,
}

/// Breadcrumbs root -> page from a target-first chain.
pub fn breadcrumbs<N: TreeNode>(chain: &[N]) -> Vec<Breadcrumb> {
    let mut trail = Vec::with_capacity(chain.len());
    let mut url = String::new();
    for node in chain.iter().rev() {
        url.push('/');
        url.push_str(node.node_slug());
        trail.push(Breadcrumb {
            page_id: node.node_id(),
            title: node.node_title().to_string(),
            slug: node.node_slug().to_string(),
            url: url.clone(),
        });
    }
    trail
}

/// Ancestor slugs root -> page joined by `/`, with a leading `/`.
pub fn absolute_url<N: TreeNode>(chain: &[N]) -> String {
    let segments: Vec<&str> = chain.iter().rev().map(TreeNode::node_slug).collect();
    format!("/{}", segments.join("/"))
}

/// Split a request path into slug segments, ignoring empty segments.
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split(['?', '#'])
        .next()
        .unwrap_or_default()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}
