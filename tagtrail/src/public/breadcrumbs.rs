// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::content::{ContentId, ContentNode, ContentTree, SourceRecord};
use std::collections::HashSet;
use std::fmt;

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// One ancestor in a trail, paired with the source record that made it visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub node: ContentNode,
    pub source: SourceRecord,
}

/// Strict ancestors of a node, root first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreadcrumbTrail {
    crumbs: Vec<Crumb>,
}

impl BreadcrumbTrail {
    pub fn crumbs(&self) -> &[Crumb] {
        &self.crumbs
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ContentNode> {
        self.crumbs.iter().map(|crumb| &crumb.node)
    }

    pub fn titles(&self) -> Vec<&str> {
        self.crumbs
            .iter()
            .map(|crumb| crumb.source.title.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.crumbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crumbs.is_empty()
    }
}

#[derive(Debug)]
pub enum BreadcrumbError<E> {
    Tree(E),
    Cycle(ContentId),
    DepthExceeded { start: ContentId, max_depth: usize },
}

impl<E: fmt::Display> fmt::Display for BreadcrumbError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreadcrumbError::Tree(err) => write!(f, "content tree lookup failed: {}", err),
            BreadcrumbError::Cycle(id) => {
                write!(f, "content node {} appears twice in its own ancestry", id)
            }
            BreadcrumbError::DepthExceeded { start, max_depth } => write!(
                f,
                "ancestry of content node {} is deeper than {} levels",
                start, max_depth
            ),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for BreadcrumbError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BreadcrumbError::Tree(err) => Some(err),
            _ => None,
        }
    }
}

pub struct BreadcrumbResolver<'a, T: ?Sized> {
    tree: &'a T,
    max_depth: usize,
}

impl<'a, T: ContentTree + ?Sized> BreadcrumbResolver<'a, T> {
    pub fn new(tree: &'a T) -> Self {
        Self {
            tree,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Builds the trail above `start`.
    ///
    /// Returns `Ok(None)` when there is no start node or it is not reachable.
    /// Ancestors without a source record, or whose source owner is hidden, are
    /// left out of the trail but the walk continues past them.
    pub fn resolve(
        &self,
        start: Option<&ContentNode>,
    ) -> Result<Option<BreadcrumbTrail>, BreadcrumbError<T::Error>> {
        let Some(start) = start else {
            return Ok(None);
        };
        if !self
            .tree
            .is_reachable(start)
            .map_err(BreadcrumbError::Tree)?
        {
            log::debug!("No breadcrumbs for unreachable content {}", start.id);
            return Ok(None);
        }

        let mut visited = HashSet::from([start.id]);
        let mut crumbs = Vec::new();
        let mut current = start.clone();
        let mut depth = 0usize;

        while let Some(parent_id) = current.parent {
            if !visited.insert(parent_id) {
                return Err(BreadcrumbError::Cycle(parent_id));
            }
            let Some(parent) = self.tree.parent(&current).map_err(BreadcrumbError::Tree)? else {
                log::warn!(
                    "Parent {} of content {} not found, treating it as root",
                    parent_id,
                    current.id
                );
                break;
            };
            depth += 1;
            if depth > self.max_depth {
                return Err(BreadcrumbError::DepthExceeded {
                    start: start.id,
                    max_depth: self.max_depth,
                });
            }
            if let Some(source) = self
                .tree
                .source_record(&parent)
                .map_err(BreadcrumbError::Tree)?
                && self
                    .tree
                    .is_visible(source.owner)
                    .map_err(BreadcrumbError::Tree)?
            {
                crumbs.push(Crumb {
                    node: parent.clone(),
                    source,
                });
            }
            current = parent;
        }

        crumbs.reverse();
        log::debug!(
            "Resolved {} breadcrumbs for content {} over {} ancestors",
            crumbs.len(),
            start.id,
            depth
        );
        Ok(Some(BreadcrumbTrail { crumbs }))
    }

    pub fn resolve_id(
        &self,
        id: ContentId,
    ) -> Result<Option<BreadcrumbTrail>, BreadcrumbError<T::Error>> {
        let node = self.tree.node(id).map_err(BreadcrumbError::Tree)?;
        self.resolve(node.as_ref())
    }
}
