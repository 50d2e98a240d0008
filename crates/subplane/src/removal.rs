//! Removing live nodes from the canvas.

use log::debug;

use crate::canvas::{Canvas, NodeId, NodeKind};

/// Removes every node reachable from `roots`, children before their parent.
///
/// Connections and shapes are removed with their own canvas calls. Labels
/// go with their owner. Nodes that are not attached are skipped, so deleting
/// an already deleted subtree is a no-op. Returns the removed nodes in
/// removal order.
pub fn delete_subtree(canvas: &mut Canvas, roots: &[NodeId]) -> Vec<NodeId> {
    let mut removed = Vec::new();
    for &root in roots {
        delete_node(canvas, root, &mut removed);
    }

    debug!(count = removed.len(); "Deleted nodes");
    removed
}

fn delete_node(canvas: &mut Canvas, node: NodeId, removed: &mut Vec<NodeId>) {
    if !canvas.is_attached(node) {
        return;
    }

    let children = canvas.children(node).to_vec();
    for child in children {
        delete_node(canvas, child, removed);
    }

    let deleted = match canvas.node(node).map(|n| n.kind()) {
        Some(NodeKind::Connection) => canvas.remove_connection(node),
        Some(NodeKind::Shape) => canvas.remove_shape(node),
        _ => false,
    };
    if deleted {
        removed.push(node);
    }
}
