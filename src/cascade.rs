//! Checked-State Cascade Engine
//!
//! Keeps the `is_checked` invariant across the forest when a single node
//! is toggled. Checking marks the whole subtree and every ancestor.
//! Unchecking clears the subtree, then walks upward clearing each
//! ancestor that has no checked child left; an ancestor with another
//! checked child stops the walk. The sibling rule applies at every
//! ancestor level, not just the topmost one.

use crate::error::{TreeError, TreeResult};
use crate::models::MenuNode;

/// Toggle one node and cascade the result through the forest
///
/// Pure: returns a new forest, the input is left untouched. Nothing is
/// persisted here; the caller sends the result to the backend.
pub fn toggle(forest: &[MenuNode], node_id: u32, checked: bool) -> TreeResult<Vec<MenuNode>> {
    let path = find_path(forest, node_id)
        .ok_or_else(|| TreeError::NodeNotFound(format!("menu {} not found", node_id)))?;

    let mut next = forest.to_vec();

    // Down: the toggled subtree takes the new value unconditionally
    if let Some(target) = node_at_mut(&mut next, &path) {
        set_subtree(target, checked);
    }

    // Up: ancestors are the proper prefixes of the path
    if checked {
        for depth in 1..path.len() {
            if let Some(ancestor) = node_at_mut(&mut next, &path[..depth]) {
                ancestor.is_checked = true;
            }
        }
    } else {
        for depth in (1..path.len()).rev() {
            if let Some(ancestor) = node_at_mut(&mut next, &path[..depth]) {
                if ancestor.children.iter().any(|c| c.is_checked) {
                    break;
                }
                ancestor.is_checked = false;
            }
        }
    }

    log::debug!("toggled menu {} to checked={}", node_id, checked);
    Ok(next)
}

/// Set every node in the forest to the given value
///
/// Backs "select all" / "clear all"; no sibling rules apply.
pub fn set_all(forest: &[MenuNode], checked: bool) -> Vec<MenuNode> {
    let mut next = forest.to_vec();
    for node in &mut next {
        set_subtree(node, checked);
    }
    next
}

fn set_subtree(node: &mut MenuNode, checked: bool) {
    node.is_checked = checked;
    for child in &mut node.children {
        set_subtree(child, checked);
    }
}

/// Index path from the forest roots to the node with the given id
fn find_path(forest: &[MenuNode], node_id: u32) -> Option<Vec<usize>> {
    fn walk(nodes: &[MenuNode], node_id: u32, path: &mut Vec<usize>) -> bool {
        for (i, node) in nodes.iter().enumerate() {
            path.push(i);
            if node.id == node_id || walk(&node.children, node_id, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = Vec::new();
    if walk(forest, node_id, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn node_at_mut<'a>(forest: &'a mut [MenuNode], path: &[usize]) -> Option<&'a mut MenuNode> {
    let (&first, rest) = path.split_first()?;
    let mut current = forest.get_mut(first)?;
    for &idx in rest {
        current = current.children.get_mut(idx)?;
    }
    Some(current)
}
