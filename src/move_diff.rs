//! Move-Diff Engine
//!
//! Applies a drag move to the flat tree and derives the minimal
//! persistence payload: only the sibling groups whose membership or order
//! changed. Menu trees can be arbitrarily large, and a single drag only
//! ever touches one or two parent scopes, so the whole forest is never
//! re-sent.

use serde::{Deserialize, Serialize};

use crate::error::{TreeError, TreeResult};
use crate::models::{is_descendant_id, FlatTree, MenuNode};

/// One end of a drag gesture as emitted by the tree UI
///
/// `parent_id` is the flat id of the parent whose children list is
/// addressed; `index` is the position within it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePosition {
    pub parent_id: String,
    pub index: usize,
}

impl MovePosition {
    pub fn new(parent_id: impl Into<String>, index: usize) -> Self {
        Self {
            parent_id: parent_id.into(),
            index,
        }
    }
}

/// Apply a drag move to the flat tree, returning the mutated copy
///
/// Mirrors what the drag library does to the map: children arrays are
/// edited, flat ids are left alone (the Rehierarchizer derives lineage
/// from the children arrays, never from id prefixes). The destination
/// index is interpreted after the source entry is detached and clamped to
/// the target sibling count.
pub fn move_node(
    tree: &FlatTree,
    source: &MovePosition,
    destination: &MovePosition,
) -> TreeResult<FlatTree> {
    let moved_id = tree
        .get(&source.parent_id)
        .ok_or_else(|| {
            TreeError::InvalidDropTarget(format!("source parent {} not found", source.parent_id))
        })?
        .children
        .get(source.index)
        .cloned()
        .ok_or_else(|| {
            TreeError::InvalidDropTarget(format!(
                "no child at {}[{}]",
                source.parent_id, source.index
            ))
        })?;

    if tree.get(&destination.parent_id).is_none() {
        return Err(TreeError::InvalidDropTarget(format!(
            "destination parent {} not found",
            destination.parent_id
        )));
    }
    if destination.parent_id == moved_id || is_descendant_id(&moved_id, &destination.parent_id) {
        return Err(TreeError::InvalidDropTarget(format!(
            "cannot drop {} inside its own subtree",
            moved_id
        )));
    }

    let new_parent_menu_id = if destination.parent_id == tree.root_id {
        None
    } else {
        tree.get(&destination.parent_id).map(|p| p.data.id)
    };

    let mut next = tree.clone();
    if let Some(src) = next.get_mut(&source.parent_id) {
        src.children.remove(source.index);
        src.has_children = !src.children.is_empty();
    }
    if let Some(dst) = next.get_mut(&destination.parent_id) {
        let idx = destination.index.min(dst.children.len());
        dst.children.insert(idx, moved_id.clone());
        dst.has_children = true;
        dst.is_expanded = true;
    }
    if let Some(moved) = next.get_mut(&moved_id) {
        moved.parent_id = new_parent_menu_id;
        moved.data.parent_id = new_parent_menu_id;
    }
    log::debug!(
        "moved {} from {}[{}] to {}[{}]",
        moved_id,
        source.parent_id,
        source.index,
        destination.parent_id,
        destination.index
    );
    Ok(next)
}

/// Derive the minimal persistence payload from the post-move tree
///
/// Same-parent reorders emit one scope; cross-parent moves emit the
/// source scope followed by the destination scope. A scope under the
/// virtual root is the flat top-level array itself; any other scope is a
/// single parent entry carrying its rebuilt immediate children.
pub fn compute_move_diff(
    moved: &FlatTree,
    source: &MovePosition,
    destination: &MovePosition,
) -> TreeResult<Vec<MenuNode>> {
    if moved.get(&destination.parent_id).is_none() {
        return Err(TreeError::InvalidDropTarget(format!(
            "destination parent {} not found",
            destination.parent_id
        )));
    }
    let mut out = rebuild_scope(moved, &source.parent_id)?;
    if source.parent_id != destination.parent_id {
        out.extend(rebuild_scope(moved, &destination.parent_id)?);
    }
    log::debug!(
        "move diff for {} -> {} touches {} entries",
        source.parent_id,
        destination.parent_id,
        out.len()
    );
    Ok(out)
}

/// Rebuild one parent's immediate children as shallow persistence entries
fn rebuild_scope(tree: &FlatTree, parent_flat_id: &str) -> TreeResult<Vec<MenuNode>> {
    let parent = tree.get(parent_flat_id).ok_or_else(|| {
        TreeError::InvalidDropTarget(format!("parent {} not found", parent_flat_id))
    })?;
    let is_root = parent_flat_id == tree.root_id;
    let (parent_menu_id, child_level) = if is_root {
        (None, 1)
    } else {
        (Some(parent.data.id), parent.data.level + 1)
    };

    let mut siblings = Vec::with_capacity(parent.children.len());
    for (i, cid) in parent.children.iter().enumerate() {
        let child = tree.get(cid).ok_or_else(|| {
            TreeError::MalformedHierarchy(format!(
                "children reference unresolvable flat node {}",
                cid
            ))
        })?;
        let mut node = child.data.without_children();
        node.sort_seq = i as i32 + 1;
        node.parent_id = parent_menu_id;
        node.level = child_level;
        siblings.push(node);
    }

    if is_root {
        Ok(siblings)
    } else {
        let mut entry = parent.data.without_children();
        entry.children = siblings;
        Ok(vec![entry])
    }
}
