//! Tree Models
//!
//! Data structures shared with the backend menu API (nested shape) and the
//! drag-and-drop tree UI (flat shape).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{TreeError, TreeResult};

/// Flat id of the synthetic root that parents all top-level menus
pub const ROOT_ID: &str = "0";

/// A menu node as persisted and returned by the backend
///
/// `children` is ordered by `sort_seq` (1-based, contiguous among
/// siblings). `data` carries the domain payload (name, url, icon, ...),
/// which the tree logic never inspects; serde flattening keeps those
/// fields inline in the JSON object, so the wire shape is
/// `{ id, parentId, sortSeq, level, isChecked, children, ...payload }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    /// Unique identifier within the whole forest
    pub id: u32,
    /// Parent menu id (None = top level)
    #[serde(default)]
    pub parent_id: Option<u32>,
    /// Position within siblings, 1-based
    #[serde(default)]
    pub sort_seq: i32,
    /// Depth; top-level menus are level 1
    #[serde(default)]
    pub level: i32,
    /// Checkbox selection flag
    #[serde(default)]
    pub is_checked: bool,
    /// Child menus ordered by `sort_seq`
    #[serde(default)]
    pub children: Vec<MenuNode>,
    /// Opaque domain payload, carried through untouched
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl MenuNode {
    /// Create a new top-level node with default values
    pub fn new(id: u32) -> Self {
        Self {
            id,
            parent_id: None,
            sort_seq: 0,
            level: 0,
            is_checked: false,
            children: Vec::new(),
            data: Map::new(),
        }
    }

    /// Create a new child node under a parent
    pub fn new_child(id: u32, parent_id: u32, sort_seq: i32) -> Self {
        Self {
            id,
            parent_id: Some(parent_id),
            sort_seq,
            level: 0,
            is_checked: false,
            children: Vec::new(),
            data: Map::new(),
        }
    }

    /// Add a child node
    #[must_use]
    pub fn child(mut self, node: MenuNode) -> Self {
        self.children.push(node);
        self
    }

    /// Check if this is a top-level node (no parent)
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Copy of this node with `children` emptied
    ///
    /// While flattened, structure lives in the flat map rather than in the
    /// payload; this is also the shallow shape emitted by move diffs.
    pub(crate) fn without_children(&self) -> Self {
        Self {
            children: Vec::new(),
            ..self.clone()
        }
    }
}

/// A node of the flat tree consumed by the drag-and-drop UI
///
/// `id` concatenates ancestor id segments (`"0-3-17"`), so the string
/// itself encodes lineage and descendant tests are a prefix check.
/// `children` holds flat ids and is the only ordering authority while the
/// tree is flattened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatNode {
    pub id: String,
    pub children: Vec<String>,
    pub has_children: bool,
    pub is_expanded: bool,
    /// Numeric back-reference to the menu's parent id; convenience only,
    /// not authoritative for reconstruction
    #[serde(default)]
    pub parent_id: Option<u32>,
    /// Original menu payload with its own `children` emptied
    pub data: MenuNode,
}

/// Flat tree: a synthetic root plus an id-keyed node map
///
/// Derived from the backend forest on demand, mutated during a drag
/// gesture, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatTree {
    pub root_id: String,
    pub items: HashMap<String, FlatNode>,
}

impl FlatTree {
    /// Empty tree containing only the synthetic root
    ///
    /// The root's `data` is a zeroed menu (id 0) that is never sent to the
    /// backend.
    pub fn new() -> Self {
        let mut items = HashMap::new();
        items.insert(
            ROOT_ID.to_string(),
            FlatNode {
                id: ROOT_ID.to_string(),
                children: Vec::new(),
                has_children: false,
                is_expanded: true,
                parent_id: None,
                data: MenuNode::new(0),
            },
        );
        Self {
            root_id: ROOT_ID.to_string(),
            items,
        }
    }

    /// Look up a node by flat id
    pub fn get(&self, flat_id: &str) -> Option<&FlatNode> {
        self.items.get(flat_id)
    }

    pub(crate) fn get_mut(&mut self, flat_id: &str) -> Option<&mut FlatNode> {
        self.items.get_mut(flat_id)
    }

    /// Top-level flat ids in sibling order
    pub fn top_level_ids(&self) -> &[String] {
        self.items
            .get(&self.root_id)
            .map(|root| root.children.as_slice())
            .unwrap_or(&[])
    }

    /// Number of nodes, excluding the synthetic root
    pub fn len(&self) -> usize {
        self.items.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set whether a node's children are shown in the UI
    ///
    /// A display flag only; conversion algorithms ignore it.
    pub fn set_expanded(&mut self, flat_id: &str, expanded: bool) -> TreeResult<()> {
        match self.items.get_mut(flat_id) {
            Some(node) => {
                node.is_expanded = expanded;
                Ok(())
            }
            None => Err(TreeError::NodeNotFound(format!(
                "flat node {} not found",
                flat_id
            ))),
        }
    }
}

impl Default for FlatTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Flat id of a child directly under `parent_flat_id`
pub(crate) fn child_flat_id(parent_flat_id: &str, id: u32) -> String {
    format!("{}-{}", parent_flat_id, id)
}

/// Check whether `candidate` lies inside `ancestor`'s subtree
///
/// Pure string check thanks to the path-encoded id scheme.
pub(crate) fn is_descendant_id(ancestor: &str, candidate: &str) -> bool {
    candidate.len() > ancestor.len()
        && candidate.starts_with(ancestor)
        && candidate.as_bytes()[ancestor.len()] == b'-'
}
