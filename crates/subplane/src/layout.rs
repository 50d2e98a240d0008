//! Geometry helpers over canvas nodes.
//!
//! Moving nodes keeps the canvas and the diagram-interchange records in
//! step: every translated shape, connection and label also updates the DI
//! element bound to its semantic element.

use indexmap::IndexSet;
use log::debug;

use subplane_core::{
    definitions::Definitions,
    geometry::{Bounds, Point},
};

use crate::canvas::{Canvas, NodeId};

/// Returns the box around `nodes`, or `None` if `nodes` is empty.
pub fn bounding_box(canvas: &Canvas, nodes: &[NodeId]) -> Option<Bounds> {
    nodes
        .iter()
        .filter_map(|&node| canvas.node(node))
        .map(|node| node.bounds())
        .reduce(|acc, bounds| acc.merge(&bounds))
}

/// Returns the children of `parent` that are not hidden.
pub fn visible_children(canvas: &Canvas, parent: NodeId) -> Vec<NodeId> {
    canvas
        .children(parent)
        .iter()
        .copied()
        .filter(|&child| canvas.node(child).is_some_and(|node| !node.is_hidden()))
        .collect()
}

/// Moves `nodes`, their descendants and their labels by `delta`.
pub fn translate(definitions: &mut Definitions, canvas: &mut Canvas, nodes: &[NodeId], delta: Point) {
    if delta.is_zero() {
        return;
    }

    let mut closure = IndexSet::new();
    let mut stack: Vec<NodeId> = nodes.iter().rev().copied().collect();
    while let Some(node) = stack.pop() {
        if closure.insert(node) {
            stack.extend(canvas.children(node).iter().rev().copied());
        }
    }

    for &node in &closure {
        translate_node(definitions, canvas, node, delta);
    }
    debug!(count = closure.len(), dx = delta.x(), dy = delta.y(); "Translated nodes");
}

fn translate_node(definitions: &mut Definitions, canvas: &mut Canvas, node: NodeId, delta: Point) {
    let Some(n) = canvas.node(node) else {
        return;
    };
    let business_object = n.business_object();
    let label = n.label();
    let di = definitions.element(business_object).and_then(|e| e.di());

    if n.is_connection() {
        let waypoints: Vec<Point> = n.waypoints().iter().map(|p| p.add_point(delta)).collect();
        if let Some(di) = di {
            definitions.set_di_waypoints(di, waypoints.clone());
        }
        canvas.set_waypoints(node, waypoints);
    } else {
        let bounds = n.bounds().translate(delta);
        if let Some(di) = di {
            definitions.set_di_bounds(di, bounds);
        }
        canvas.set_bounds(node, bounds);
    }

    if let Some(label) = label
        && let Some(bounds) = canvas.node(label).map(|l| l.bounds().translate(delta))
    {
        canvas.set_bounds(label, bounds);
        if let Some(di) = di
            && definitions.di(di).label().is_some()
        {
            definitions.set_di_label(di, Some(bounds));
        }
    }
}

/// Moves the children of `shape` so that the box around its visible
/// children is centered in the shape.
///
/// Returns the applied offset, or `None` if nothing was moved.
pub fn recenter_children(
    definitions: &mut Definitions,
    canvas: &mut Canvas,
    shape: NodeId,
) -> Option<Point> {
    let center = canvas.node(shape)?.bounds().center();
    let content = bounding_box(canvas, &visible_children(canvas, shape))?;
    let delta = center.sub_point(content.center());
    if delta.is_zero() {
        return None;
    }

    let children = canvas.children(shape).to_vec();
    translate(definitions, canvas, &children, delta);
    Some(delta)
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use subplane_core::{identifier::Id, semantic::ElementKind};

    use super::*;

    #[test]
    fn test_recenter_children_moves_canvas_and_di() {
        let mut definitions = Definitions::new("Definitions_1");
        let process = definitions.add_process("Process_1").unwrap();
        let sub = definitions
            .add_element(ElementKind::SubProcess, "SubProcess_1", process)
            .unwrap();
        let task = definitions.add_element(ElementKind::Task, "Task_1", sub).unwrap();
        let diagram = definitions.create_diagram(process);
        definitions.add_diagram(diagram);
        let di = definitions
            .add_shape_di(diagram, task, Bounds::new(0.0, 0.0, 50.0, 50.0))
            .unwrap();
        definitions.bind_di(di).unwrap();

        let mut canvas = Canvas::new(process);
        let root = canvas.root_element();
        let shape = canvas.create_shape(sub, Bounds::new(100.0, 100.0, 200.0, 200.0));
        canvas.add_shape(shape, root).unwrap();
        let child = canvas.create_shape(task, Bounds::new(0.0, 0.0, 50.0, 50.0));
        canvas.add_shape(child, shape).unwrap();

        let offset = recenter_children(&mut definitions, &mut canvas, shape).unwrap();

        assert!(approx_eq!(f32, offset.x(), 175.0));
        let center = canvas.node(child).unwrap().bounds().center();
        assert!(approx_eq!(f32, center.x(), 200.0, ulps = 2));
        assert!(approx_eq!(f32, center.y(), 200.0, ulps = 2));
        assert_eq!(definitions.di(di).bounds(), Some(canvas.node(child).unwrap().bounds()));

        translate(&mut definitions, &mut canvas, &[child], offset.negate());
        assert_eq!(definitions.di(di).bounds(), Some(Bounds::new(0.0, 0.0, 50.0, 50.0)));
    }

    #[test]
    fn test_translate_includes_descendants_once() {
        let mut definitions = Definitions::new("Definitions_1");
        let mut canvas = Canvas::new(Id::new("Process_1"));
        let root = canvas.root_element();
        let outer = canvas.create_shape(Id::new("Outer"), Bounds::new(0.0, 0.0, 100.0, 100.0));
        canvas.add_shape(outer, root).unwrap();
        let inner = canvas.create_shape(Id::new("Inner"), Bounds::new(10.0, 10.0, 10.0, 10.0));
        canvas.add_shape(inner, outer).unwrap();

        translate(&mut definitions, &mut canvas, &[outer, inner], Point::new(5.0, 0.0));

        assert_eq!(canvas.node(inner).unwrap().bounds().min_x(), 15.0);
        assert_eq!(canvas.node(outer).unwrap().bounds().min_x(), 5.0);
    }

    #[test]
    fn test_hidden_children_do_not_count() {
        let mut canvas = Canvas::new(Id::new("Process_1"));
        let root = canvas.root_element();
        let a = canvas.create_shape(Id::new("A"), Bounds::new(0.0, 0.0, 10.0, 10.0));
        let b = canvas.create_shape(Id::new("B"), Bounds::new(90.0, 90.0, 10.0, 10.0));
        canvas.add_shape(a, root).unwrap();
        canvas.add_shape(b, root).unwrap();
        canvas.set_hidden(b, true);

        let visible = visible_children(&canvas, root);

        assert_eq!(visible, vec![a]);
        assert_eq!(bounding_box(&canvas, &visible), Some(Bounds::new(0.0, 0.0, 10.0, 10.0)));
        assert_eq!(bounding_box(&canvas, &[]), None);
    }
}
