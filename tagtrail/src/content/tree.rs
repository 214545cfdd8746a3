// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::node::{ContentId, ContentNode, SourceRecord};
use crate::management::yaml_store;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::path::Path;

const MAX_CONTENT_NODES: usize = 100_000;

/// Read access to the content tree, as seen by breadcrumb resolution.
///
/// Implementations own the nodes; callers only borrow the tree and receive
/// owned copies of the nodes they ask for.
pub trait ContentTree {
    type Error: std::error::Error + 'static;

    fn node(&self, id: ContentId) -> Result<Option<ContentNode>, Self::Error>;

    /// Returns `None` for a root node and for a parent id the tree does not know.
    fn parent(&self, node: &ContentNode) -> Result<Option<ContentNode>, Self::Error> {
        match node.parent {
            Some(parent_id) => self.node(parent_id),
            None => Ok(None),
        }
    }

    fn source_record(&self, node: &ContentNode) -> Result<Option<SourceRecord>, Self::Error> {
        Ok(node.source.clone())
    }

    fn is_visible(&self, owner: ContentId) -> Result<bool, Self::Error>;

    fn is_reachable(&self, node: &ContentNode) -> Result<bool, Self::Error> {
        Ok(node.reachable)
    }
}

#[derive(Debug)]
pub struct ContentTreeError {
    message: String,
}

impl ContentTreeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ContentTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ContentTreeError {}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ContentTreeDocument {
    #[serde(default)]
    nodes: Vec<ContentNode>,
}

/// Content nodes indexed by id.
#[derive(Debug, Clone, Default)]
pub struct ContentTreeStore {
    nodes: HashMap<ContentId, ContentNode>,
}

impl ContentTreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(
        nodes: impl IntoIterator<Item = ContentNode>,
    ) -> Result<Self, ContentTreeError> {
        let mut store = Self::new();
        for node in nodes {
            let id = node.id;
            if store.insert(node).is_some() {
                return Err(ContentTreeError::new(format!(
                    "Duplicate content node {}",
                    id
                )));
            }
            if store.len() > MAX_CONTENT_NODES {
                return Err(ContentTreeError::new(format!(
                    "Content tree must be at most {} nodes",
                    MAX_CONTENT_NODES
                )));
            }
        }
        Ok(store)
    }

    pub fn load(path: &Path) -> Result<Self, ContentTreeError> {
        let document: Option<ContentTreeDocument> =
            yaml_store::read_yaml_file(path, "content tree")
                .map_err(|err| ContentTreeError::new(err.to_string()))?;
        match document {
            Some(document) => Self::from_nodes(document.nodes),
            None => Ok(Self::new()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ContentTreeError> {
        let mut nodes: Vec<ContentNode> = self.nodes.values().cloned().collect();
        nodes.sort_by_key(|node| node.id);
        yaml_store::write_yaml_file(path, "content tree", &ContentTreeDocument { nodes })
            .map_err(|err| ContentTreeError::new(err.to_string()))
    }

    pub fn insert(&mut self, node: ContentNode) -> Option<ContentNode> {
        self.nodes.insert(node.id, node)
    }

    pub fn get(&self, id: ContentId) -> Option<&ContentNode> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl ContentTree for ContentTreeStore {
    type Error = Infallible;

    fn node(&self, id: ContentId) -> Result<Option<ContentNode>, Self::Error> {
        Ok(self.nodes.get(&id).cloned())
    }

    fn is_visible(&self, owner: ContentId) -> Result<bool, Self::Error> {
        Ok(self.nodes.get(&owner).is_some_and(|node| node.visible))
    }
}
