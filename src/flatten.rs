//! Flattener
//!
//! Converts a nested menu forest into the flat, string-addressable tree
//! required by the drag-and-drop UI. Flat ids concatenate ancestor id
//! segments, which keeps every id globally unique without a counter and
//! lets independently flattened trees be grafted by an O(subtree) id
//! remap.

use std::collections::HashSet;

use crate::error::{TreeError, TreeResult};
use crate::models::{child_flat_id, FlatNode, FlatTree, MenuNode, ROOT_ID};

/// Convert a menu forest into a flat tree
///
/// Fails fast on malformed input before producing any output. All nodes
/// flatten expanded; `has_children` mirrors the child count.
pub fn flatten(forest: &[MenuNode]) -> TreeResult<FlatTree> {
    validate(forest)?;
    let mut tree = FlatTree::new();
    for node in forest {
        insert_subtree(&mut tree, ROOT_ID, node);
    }
    log::debug!(
        "flattened {} top-level menus into {} flat nodes",
        forest.len(),
        tree.len()
    );
    Ok(tree)
}

/// Reject forests that violate the backend data contract
///
/// In the nested shape a cyclic parent reference can only manifest as a
/// `parent_id` that contradicts the node's actual position, so parent
/// links are checked against the nesting itself.
fn validate(forest: &[MenuNode]) -> TreeResult<()> {
    let mut seen = HashSet::new();
    let mut stack: Vec<(&MenuNode, Option<u32>)> = forest.iter().map(|n| (n, None)).collect();
    while let Some((node, parent)) = stack.pop() {
        if !seen.insert(node.id) {
            return Err(TreeError::MalformedHierarchy(format!(
                "duplicate id {}",
                node.id
            )));
        }
        if node.parent_id == Some(node.id) {
            return Err(TreeError::MalformedHierarchy(format!(
                "menu {} is its own parent",
                node.id
            )));
        }
        if node.parent_id != parent {
            return Err(TreeError::MalformedHierarchy(format!(
                "menu {} lists parent {:?} but is nested under {:?}",
                node.id, node.parent_id, parent
            )));
        }
        for child in &node.children {
            stack.push((child, Some(node.id)));
        }
    }
    Ok(())
}

fn insert_subtree(tree: &mut FlatTree, parent_flat_id: &str, node: &MenuNode) {
    let flat_id = child_flat_id(parent_flat_id, node.id);
    tree.items.insert(
        flat_id.clone(),
        FlatNode {
            id: flat_id.clone(),
            children: Vec::new(),
            has_children: !node.children.is_empty(),
            is_expanded: true,
            parent_id: node.parent_id,
            data: node.without_children(),
        },
    );
    if let Some(parent) = tree.get_mut(parent_flat_id) {
        parent.children.push(flat_id.clone());
        parent.has_children = true;
    }
    for child in &node.children {
        insert_subtree(tree, &flat_id, child);
    }
}

/// Incremental composition: attach leaves and whole subtrees to an
/// existing flat tree without rebuilding it.
impl FlatTree {
    /// Attach a single childless menu under an existing flat node
    #[must_use = "composition returns the updated tree"]
    pub fn with_leaf(mut self, parent_flat_id: &str, node: &MenuNode) -> TreeResult<Self> {
        if !node.children.is_empty() {
            return Err(TreeError::MalformedHierarchy(format!(
                "menu {} is not a leaf",
                node.id
            )));
        }
        let parent_menu_id = self.menu_id_of(parent_flat_id)?;
        let flat_id = child_flat_id(parent_flat_id, node.id);
        if self.items.contains_key(&flat_id) {
            return Err(TreeError::MalformedHierarchy(format!(
                "flat id {} already present",
                flat_id
            )));
        }
        let mut data = node.without_children();
        data.parent_id = parent_menu_id;
        self.items.insert(
            flat_id.clone(),
            FlatNode {
                id: flat_id.clone(),
                children: Vec::new(),
                has_children: false,
                is_expanded: true,
                parent_id: parent_menu_id,
                data,
            },
        );
        if let Some(parent) = self.items.get_mut(parent_flat_id) {
            parent.children.push(flat_id);
            parent.has_children = true;
        }
        Ok(self)
    }

    /// Graft an independently flattened tree under an existing flat node
    ///
    /// Every id in the subtree map is re-prefixed with the parent's flat
    /// id, an O(subtree size) remap. The parent adopts the subtree's
    /// top-level ids at the end of its children and expands to show them.
    /// Id collisions are rejected before anything is inserted.
    #[must_use = "composition returns the updated tree"]
    pub fn with_subtree(mut self, parent_flat_id: &str, sub: FlatTree) -> TreeResult<Self> {
        let parent_menu_id = self.menu_id_of(parent_flat_id)?;
        for old_id in sub.items.keys() {
            if *old_id == sub.root_id {
                continue;
            }
            let new_id = remap_flat_id(old_id, &sub.root_id, parent_flat_id);
            if self.items.contains_key(&new_id) {
                return Err(TreeError::MalformedHierarchy(format!(
                    "flat id {} already present",
                    new_id
                )));
            }
        }

        let sub_root = sub.root_id.clone();
        let adopted: Vec<String> = sub
            .top_level_ids()
            .iter()
            .map(|c| remap_flat_id(c, &sub_root, parent_flat_id))
            .collect();

        for (old_id, mut node) in sub.items {
            if old_id == sub_root {
                continue;
            }
            node.id = remap_flat_id(&old_id, &sub_root, parent_flat_id);
            node.children = node
                .children
                .iter()
                .map(|c| remap_flat_id(c, &sub_root, parent_flat_id))
                .collect();
            self.items.insert(node.id.clone(), node);
        }

        // The grafted top-level menus now hang off the new parent
        for new_id in &adopted {
            if let Some(top) = self.items.get_mut(new_id) {
                top.parent_id = parent_menu_id;
                top.data.parent_id = parent_menu_id;
            }
        }
        if let Some(parent) = self.items.get_mut(parent_flat_id) {
            parent.children.extend(adopted);
            parent.has_children = true;
            parent.is_expanded = true;
        }
        Ok(self)
    }

    /// Numeric menu id a new child of `parent_flat_id` should reference
    fn menu_id_of(&self, parent_flat_id: &str) -> TreeResult<Option<u32>> {
        match self.get(parent_flat_id) {
            Some(_) if parent_flat_id == self.root_id => Ok(None),
            Some(parent) => Ok(Some(parent.data.id)),
            None => Err(TreeError::NodeNotFound(format!(
                "flat node {} not found",
                parent_flat_id
            ))),
        }
    }
}

/// Swap the subtree's root prefix for the new ancestor prefix
fn remap_flat_id(old_id: &str, old_root: &str, new_prefix: &str) -> String {
    format!("{}{}", new_prefix, &old_id[old_root.len()..])
}
