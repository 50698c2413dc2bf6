//! Rehierarchizer
//!
//! Rebuilds the nested menu forest from a (possibly drag-mutated) flat
//! tree. After a drag the map's iteration order guarantees nothing and a
//! node's flat id prefix can be stale, so resolution runs as a worklist
//! over the `children` arrays — the sole linkage authority — instead of a
//! top-down walk that assumes parents are visited first.

use std::collections::HashMap;

use crate::error::{TreeError, TreeResult};
use crate::models::{FlatNode, FlatTree, MenuNode};

struct Resolved<'a> {
    /// Index of the resolving parent in the worklist; None = top level
    parent_index: Option<usize>,
    /// Payload with recomputed `sort_seq`/`parent_id`/`level`, children
    /// attached during assembly
    node: MenuNode,
    /// Ordered flat ids of this node's children
    children: &'a [String],
}

/// Convert a flat tree back into a menu forest
///
/// Recomputes `sort_seq`, `parent_id` and `level` throughout from the
/// flat map's `children` order; payload fields pass through untouched.
pub fn rehierarchize(tree: &FlatTree) -> TreeResult<Vec<MenuNode>> {
    let root = tree.get(&tree.root_id).ok_or_else(|| {
        TreeError::MalformedHierarchy(format!("flat tree has no root {}", tree.root_id))
    })?;

    // Everything except the synthetic root starts unresolved
    let mut pending: HashMap<&str, &FlatNode> = tree
        .items
        .iter()
        .filter(|(id, _)| *id != &tree.root_id)
        .map(|(id, node)| (id.as_str(), node))
        .collect();

    let mut order: Vec<Resolved> = Vec::new();
    let mut index_of: HashMap<&str, usize> = HashMap::new();

    // Seed with the root's direct children, then expand: each resolved
    // node's children list claims nodes out of the pending pool, and newly
    // resolved nodes are scanned in turn.
    claim_children(
        &root.children,
        None,
        None,
        1,
        &mut pending,
        &mut order,
        &mut index_of,
    )?;
    let mut r_idx = 0;
    while r_idx < order.len() {
        let children = order[r_idx].children;
        let parent_menu_id = order[r_idx].node.id;
        let child_level = order[r_idx].node.level + 1;
        claim_children(
            children,
            Some(r_idx),
            Some(parent_menu_id),
            child_level,
            &mut pending,
            &mut order,
            &mut index_of,
        )?;
        r_idx += 1;
    }

    if !pending.is_empty() {
        let mut ids: Vec<String> = pending.keys().map(|s| s.to_string()).collect();
        ids.sort();
        log::warn!("rehierarchize stranded {} flat nodes: {:?}", ids.len(), ids);
        return Err(TreeError::OrphanNodes(ids));
    }

    // Children always resolve after their parent, so a reverse pass sees
    // every node complete before attaching it upward. Iterative, so depth
    // is not bounded by the call stack.
    let parents: Vec<Option<usize>> = order.iter().map(|r| r.parent_index).collect();
    let mut slots: Vec<Option<MenuNode>> = order.into_iter().map(|r| Some(r.node)).collect();
    let mut roots: Vec<MenuNode> = Vec::new();
    for i in (0..slots.len()).rev() {
        if let Some(mut node) = slots[i].take() {
            node.children.sort_by_key(|c| c.sort_seq);
            match parents[i] {
                Some(p) => {
                    if let Some(parent) = slots[p].as_mut() {
                        parent.children.push(node);
                    }
                }
                None => roots.push(node),
            }
        }
    }
    roots.sort_by_key(|n| n.sort_seq);
    Ok(roots)
}

/// Claim every child in `children` out of the pending pool
///
/// A child already claimed by a different parent, or referencing no map
/// entry at all, breaks the flat contract outright — that is neither a
/// placeable node nor an orphan.
fn claim_children<'a>(
    children: &'a [String],
    parent_index: Option<usize>,
    parent_menu_id: Option<u32>,
    level: i32,
    pending: &mut HashMap<&'a str, &'a FlatNode>,
    order: &mut Vec<Resolved<'a>>,
    index_of: &mut HashMap<&'a str, usize>,
) -> TreeResult<()> {
    for (pos, cid) in children.iter().enumerate() {
        match pending.remove(cid.as_str()) {
            Some(flat) => {
                let mut node = flat.data.clone();
                node.children = Vec::new();
                node.sort_seq = pos as i32 + 1;
                node.parent_id = parent_menu_id;
                node.level = level;
                index_of.insert(flat.id.as_str(), order.len());
                order.push(Resolved {
                    parent_index,
                    node,
                    children: &flat.children,
                });
            }
            None => match index_of.get(cid.as_str()) {
                Some(&i) => {
                    let prev = &order[i];
                    if prev.parent_index != parent_index || prev.node.sort_seq != pos as i32 + 1 {
                        return Err(TreeError::MalformedHierarchy(format!(
                            "flat node {} is claimed by more than one parent",
                            cid
                        )));
                    }
                }
                None => {
                    return Err(TreeError::MalformedHierarchy(format!(
                        "children reference unresolvable flat node {}",
                        cid
                    )));
                }
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;

    fn node(id: u32, parent_id: Option<u32>, sort_seq: i32, level: i32) -> MenuNode {
        let mut n = MenuNode::new(id);
        n.parent_id = parent_id;
        n.sort_seq = sort_seq;
        n.level = level;
        n
    }

    fn sample_forest() -> Vec<MenuNode> {
        // 1            4
        // ├── 2
        // └── 3
        vec![
            node(1, None, 1, 1)
                .child(node(2, Some(1), 1, 2))
                .child(node(3, Some(1), 2, 2)),
            node(4, None, 2, 1),
        ]
    }

    #[test]
    fn test_round_trip_identity() {
        let forest = sample_forest();
        let rebuilt = rehierarchize(&flatten(&forest).expect("flatten")).expect("rehierarchize");
        assert_eq!(rebuilt, forest);
    }

    #[test]
    fn test_empty_tree() {
        let rebuilt = rehierarchize(&FlatTree::new()).expect("rehierarchize");
        assert!(rebuilt.is_empty());
    }

    #[test]
    fn test_recomputes_order_from_children_arrays() {
        let mut tree = flatten(&sample_forest()).expect("flatten");
        // Simulate a drag library reordering the top level: 4 before 1
        if let Some(root) = tree.items.get_mut("0") {
            root.children = vec!["0-4".to_string(), "0-1".to_string()];
        }
        let rebuilt = rehierarchize(&tree).expect("rehierarchize");
        assert_eq!(rebuilt[0].id, 4);
        assert_eq!(rebuilt[0].sort_seq, 1);
        assert_eq!(rebuilt[1].id, 1);
        assert_eq!(rebuilt[1].sort_seq, 2);
    }

    #[test]
    fn test_tolerates_stale_flat_id_prefix_after_reparent() {
        let mut tree = flatten(&sample_forest()).expect("flatten");
        // Drag "0-1-3" under menu 4; the library edits children arrays
        // only, leaving the flat id prefix stale
        if let Some(old_parent) = tree.items.get_mut("0-1") {
            old_parent.children.retain(|c| c != "0-1-3");
        }
        if let Some(new_parent) = tree.items.get_mut("0-4") {
            new_parent.children.push("0-1-3".to_string());
        }
        let rebuilt = rehierarchize(&tree).expect("rehierarchize");

        let menu1 = rebuilt.iter().find(|n| n.id == 1).expect("menu 1");
        assert_eq!(menu1.children.len(), 1);
        assert_eq!(menu1.children[0].id, 2);
        assert_eq!(menu1.children[0].sort_seq, 1);

        let menu4 = rebuilt.iter().find(|n| n.id == 4).expect("menu 4");
        assert_eq!(menu4.children.len(), 1);
        assert_eq!(menu4.children[0].id, 3);
        assert_eq!(menu4.children[0].parent_id, Some(4));
        assert_eq!(menu4.children[0].level, 2);
        assert_eq!(menu4.children[0].sort_seq, 1);
    }

    #[test]
    fn test_orphan_nodes_error() {
        let mut tree = flatten(&sample_forest()).expect("flatten");
        // Detach menu 3 without re-attaching it anywhere
        if let Some(parent) = tree.items.get_mut("0-1") {
            parent.children.retain(|c| c != "0-1-3");
        }
        let err = rehierarchize(&tree).unwrap_err();
        assert_eq!(err, TreeError::OrphanNodes(vec!["0-1-3".to_string()]));
    }

    #[test]
    fn test_dangling_child_reference() {
        let mut tree = flatten(&sample_forest()).expect("flatten");
        if let Some(parent) = tree.items.get_mut("0-1") {
            parent.children.push("0-1-99".to_string());
        }
        let err = rehierarchize(&tree).unwrap_err();
        assert!(matches!(err, TreeError::MalformedHierarchy(_)));
    }

    #[test]
    fn test_child_claimed_twice() {
        let mut tree = flatten(&sample_forest()).expect("flatten");
        if let Some(other) = tree.items.get_mut("0-4") {
            other.children.push("0-1-2".to_string());
        }
        let err = rehierarchize(&tree).unwrap_err();
        assert!(matches!(err, TreeError::MalformedHierarchy(_)));
    }

    #[test]
    fn test_deep_chain() {
        // Depth d carries id 201 - d, so the deepest node is id 1
        let mut chain = node(1, Some(2), 1, 200);
        for d in (1..200u32).rev() {
            let parent_id = if d == 1 { None } else { Some(202 - d) };
            chain = node(201 - d, parent_id, 1, d as i32).child(chain);
        }
        let forest = vec![chain];

        let rebuilt = rehierarchize(&flatten(&forest).expect("flatten")).expect("rehierarchize");
        assert_eq!(rebuilt, forest);

        let mut deepest = &rebuilt[0];
        while !deepest.children.is_empty() {
            deepest = &deepest.children[0];
        }
        assert_eq!(deepest.level, 200);
    }
}
