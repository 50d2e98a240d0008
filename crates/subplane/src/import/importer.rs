//! Creates canvas nodes for semantic elements.

use log::trace;
use thiserror::Error;

use subplane_core::{
    definitions::Definitions,
    di::{DiElement, DiGeometry},
    geometry::{Bounds, Point, Size},
    identifier::Id,
    semantic::{ElementKind, SemanticElement},
};

use crate::canvas::{Canvas, NodeId, SurfaceError};

/// Size of an external label without DI label bounds.
const DEFAULT_LABEL_SIZE: Size = Size::new(90.0, 20.0);

/// Per-element import failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("no DI bound to {element}")]
    MissingDi { element: String },

    #[error("unknown di {di} for element {element}")]
    UnsupportedDi { di: String, element: String },

    #[error("invalid bounds in {di}")]
    InvalidBounds { di: String },

    #[error("{element}#{side} Ref not specified")]
    EndNotSpecified { element: String, side: &'static str },

    #[error("element {reference} referenced by {element}#{side}Ref not yet drawn")]
    NotYetDrawn {
        reference: String,
        element: String,
        side: &'static str,
    },

    #[error("missing {element}#attachedToRef")]
    MissingHost { element: String },

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Creates and attaches the canvas node for one semantic element.
pub trait ElementImporter {
    /// Draws `element` under `parent` from its bound DI.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] if the DI is missing or malformed, or a
    /// referenced element is not on the canvas.
    fn add(
        &self,
        element: &SemanticElement,
        parent: NodeId,
        definitions: &Definitions,
        canvas: &mut Canvas,
    ) -> Result<NodeId, ImportError>;
}

/// The default importer: shapes from `BPMNShape`, connections from
/// `BPMNEdge`, plus external labels for named events, gateways and flows.
///
/// A node is hidden if its parent is hidden or collapsed. A sub-process is
/// collapsed unless its DI says `isExpanded="true"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurfaceImporter;

impl ElementImporter for SurfaceImporter {
    fn add(
        &self,
        element: &SemanticElement,
        parent: NodeId,
        definitions: &Definitions,
        canvas: &mut Canvas,
    ) -> Result<NodeId, ImportError> {
        let di = element
            .di()
            .map(|di| definitions.di(di))
            .ok_or_else(|| ImportError::MissingDi {
                element: element.to_string(),
            })?;

        let hidden = canvas
            .node(parent)
            .is_some_and(|p| p.is_hidden() || p.is_collapsed());

        let labeled = element.kind().has_external_label() && element.name().is_some();

        let node = match (di.geometry(), element.kind()) {
            (DiGeometry::Shape { bounds, is_expanded }, kind) if kind.is_flow_node() => {
                if !bounds.is_valid() {
                    return Err(ImportError::InvalidBounds { di: di.to_string() });
                }
                let host = if kind == ElementKind::BoundaryEvent {
                    Some(attached_host(element, canvas)?)
                } else {
                    None
                };

                let node = canvas.create_shape(element.id(), round_bounds(*bounds));
                let collapsed = kind == ElementKind::SubProcess && !is_expanded.unwrap_or(false);
                canvas.set_collapsed(node, collapsed);
                canvas.set_hidden(node, hidden);
                if let Some(host) = host {
                    canvas.set_host(node, host);
                }
                if labeled {
                    create_label(canvas, node, di);
                }
                canvas.add_shape(node, parent)?;
                node
            }
            (DiGeometry::Edge { waypoints }, ElementKind::SequenceFlow) => {
                let source =
                    connection_end(element, "source", element.source_ref(), definitions, canvas)?;
                let target =
                    connection_end(element, "target", element.target_ref(), definitions, canvas)?;
                let node =
                    canvas.create_connection(element.id(), waypoints.clone(), source, target);
                canvas.set_hidden(node, hidden);

                if labeled {
                    create_label(canvas, node, di);
                }
                canvas.add_connection(node, parent)?;
                node
            }
            _ => {
                return Err(ImportError::UnsupportedDi {
                    di: di.to_string(),
                    element: element.to_string(),
                });
            }
        };

        trace!(element:% = element.id(), hidden = hidden; "Imported element");
        Ok(node)
    }
}

fn round_bounds(bounds: Bounds) -> Bounds {
    Bounds::new(
        bounds.min_x().round(),
        bounds.min_y().round(),
        bounds.width().round(),
        bounds.height().round(),
    )
}

fn attached_host(element: &SemanticElement, canvas: &Canvas) -> Result<NodeId, ImportError> {
    element
        .attached_to_ref()
        .and_then(|host| canvas.get(host))
        .ok_or_else(|| ImportError::MissingHost {
            element: element.to_string(),
        })
}

fn connection_end(
    element: &SemanticElement,
    side: &'static str,
    reference: Option<Id>,
    definitions: &Definitions,
    canvas: &Canvas,
) -> Result<NodeId, ImportError> {
    let Some(reference) = reference else {
        return Err(ImportError::EndNotSpecified {
            element: element.to_string(),
            side,
        });
    };

    canvas.get(reference).ok_or_else(|| ImportError::NotYetDrawn {
        reference: definitions
            .element(reference)
            .map_or_else(|| format!("<{reference}>"), ToString::to_string),
        element: element.to_string(),
        side,
    })
}

/// Creates the label of `owner` from the DI label bounds, or centered below
/// a shape and on the middle of a connection.
fn create_label(canvas: &mut Canvas, owner: NodeId, di: &DiElement) {
    let bounds = match (di.label(), canvas.node(owner)) {
        (Some(bounds), _) => bounds,
        (None, Some(node)) if node.is_connection() => {
            let mid = waypoints_mid(node.waypoints()).unwrap_or_else(|| node.bounds().center());
            Bounds::new_from_center(mid, DEFAULT_LABEL_SIZE)
        }
        (None, Some(node)) => {
            let bounds = node.bounds();
            let mid = Point::new(
                bounds.center().x(),
                bounds.max_y() + DEFAULT_LABEL_SIZE.height() / 2.0,
            );
            Bounds::new_from_center(mid, DEFAULT_LABEL_SIZE)
        }
        (None, None) => return,
    };

    canvas.create_label(owner, bounds);
}

fn waypoints_mid(waypoints: &[Point]) -> Option<Point> {
    let middle = waypoints.len() / 2;
    match waypoints {
        [] => None,
        [single] => Some(*single),
        _ => Some(waypoints[middle - 1].midpoint(waypoints[middle])),
    }
}

#[cfg(test)]
mod tests {
    use subplane_core::di::DiagramId;

    use super::*;

    fn document() -> (Definitions, DiagramId, Canvas) {
        let mut definitions = Definitions::new("Definitions_1");
        let process = definitions.add_process("Process_1").unwrap();
        let diagram = definitions.create_diagram(process);
        definitions.add_diagram(diagram);
        (definitions, diagram, Canvas::new(process))
    }

    fn import(
        definitions: &Definitions,
        canvas: &mut Canvas,
        id: Id,
        parent: NodeId,
    ) -> Result<NodeId, ImportError> {
        let element = definitions.element(id).unwrap();
        SurfaceImporter.add(element, parent, definitions, canvas)
    }

    #[test]
    fn test_shape_with_default_label() {
        let (mut definitions, diagram, mut canvas) = document();
        let start = definitions
            .add_element(ElementKind::StartEvent, "Start_1", Id::new("Process_1"))
            .unwrap();
        definitions.set_name(start, "Begin").unwrap();
        let di = definitions
            .add_shape_di(diagram, start, Bounds::new(100.4, 100.0, 36.0, 36.0))
            .unwrap();
        definitions.bind_di(di).unwrap();
        let root = canvas.root_element();

        let node = import(&definitions, &mut canvas, start, root).unwrap();

        let shape = canvas.node(node).unwrap();
        assert_eq!(shape.bounds(), Bounds::new(100.0, 100.0, 36.0, 36.0));
        let label = canvas.get(Id::new("Start_1_label")).unwrap();
        assert_eq!(shape.label(), Some(label));
        assert_eq!(
            canvas.node(label).unwrap().bounds().center(),
            Point::new(118.0, 146.0)
        );
    }

    #[test]
    fn test_collapsed_sub_process_hides_children() {
        let (mut definitions, diagram, mut canvas) = document();
        let sub = definitions
            .add_element(ElementKind::SubProcess, "SubProcess_1", Id::new("Process_1"))
            .unwrap();
        let task = definitions
            .add_element(ElementKind::Task, "Task_1", sub)
            .unwrap();
        let sub_di = definitions
            .add_shape_di(diagram, sub, Bounds::new(0.0, 0.0, 100.0, 80.0))
            .unwrap();
        let task_di = definitions
            .add_shape_di(diagram, task, Bounds::new(10.0, 10.0, 20.0, 20.0))
            .unwrap();
        definitions.bind_di(sub_di).unwrap();
        definitions.bind_di(task_di).unwrap();
        let root = canvas.root_element();

        let sub_node = import(&definitions, &mut canvas, sub, root).unwrap();
        let task_node = import(&definitions, &mut canvas, task, sub_node).unwrap();

        assert!(canvas.node(sub_node).unwrap().is_collapsed());
        assert!(!canvas.node(sub_node).unwrap().is_hidden());
        assert!(canvas.node(task_node).unwrap().is_hidden());
        assert_eq!(canvas.children(sub_node), &[task_node]);
    }

    #[test]
    fn test_expanded_sub_process_shows_children() {
        let (mut definitions, diagram, mut canvas) = document();
        let sub = definitions
            .add_element(ElementKind::SubProcess, "SubProcess_1", Id::new("Process_1"))
            .unwrap();
        let record = DiElement::shape(
            Id::new("SubProcess_1_di"),
            Some(sub),
            Bounds::new(0.0, 0.0, 350.0, 200.0),
        )
        .with_expanded(true);
        let di = definitions.add_plane_element(diagram, record);
        definitions.bind_di(di).unwrap();
        let root = canvas.root_element();

        let node = import(&definitions, &mut canvas, sub, root).unwrap();

        assert!(!canvas.node(node).unwrap().is_collapsed());
    }

    #[test]
    fn test_connection_end_errors() {
        let (mut definitions, diagram, mut canvas) = document();
        let process = Id::new("Process_1");
        let task = definitions
            .add_element(ElementKind::Task, "Task_1", process)
            .unwrap();
        let dangling = definitions
            .add_sequence_flow("Flow_Dangling", process, None, Some(task))
            .unwrap();
        let early = definitions
            .add_sequence_flow("Flow_Early", process, Some(task), Some(task))
            .unwrap();
        for flow in [dangling, early] {
            let di = definitions
                .add_edge_di(diagram, flow, vec![Point::default(); 2])
                .unwrap();
            definitions.bind_di(di).unwrap();
        }
        let root = canvas.root_element();

        let err = import(&definitions, &mut canvas, dangling, root).unwrap_err();
        assert_eq!(
            err.to_string(),
            "<bpmn:SequenceFlow id=\"Flow_Dangling\" />#source Ref not specified"
        );

        let err = import(&definitions, &mut canvas, early, root).unwrap_err();
        assert_eq!(
            err.to_string(),
            "element <bpmn:Task id=\"Task_1\" /> referenced by \
             <bpmn:SequenceFlow id=\"Flow_Early\" />#sourceRef not yet drawn"
        );
    }

    #[test]
    fn test_missing_di_and_host() {
        let (mut definitions, diagram, mut canvas) = document();
        let process = Id::new("Process_1");
        let boundary = definitions
            .add_boundary_event("Boundary_1", process, None)
            .unwrap();
        let task = definitions
            .add_element(ElementKind::Task, "Task_1", process)
            .unwrap();
        let di = definitions
            .add_shape_di(diagram, boundary, Bounds::new(0.0, 0.0, 36.0, 36.0))
            .unwrap();
        definitions.bind_di(di).unwrap();
        let root = canvas.root_element();
        let allocated = canvas.allocated();

        let err = import(&definitions, &mut canvas, boundary, root).unwrap_err();
        assert!(matches!(err, ImportError::MissingHost { .. }));
        assert_eq!(canvas.get(boundary), None);
        assert_eq!(canvas.allocated(), allocated);

        let err = import(&definitions, &mut canvas, task, root).unwrap_err();
        assert!(matches!(err, ImportError::MissingDi { .. }));
    }

    #[test]
    fn test_waypoints_mid() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
        ];

        assert_eq!(waypoints_mid(&points), Some(Point::new(50.0, 0.0)));
        assert_eq!(waypoints_mid(&points[..2]), Some(Point::new(50.0, 0.0)));
        assert_eq!(waypoints_mid(&[]), None);
    }
}
