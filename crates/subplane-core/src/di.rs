//! Diagram-interchange (DI) records.
//!
//! A [`DiElement`] is a drawing record (`bpmndi:BPMNShape` or
//! `bpmndi:BPMNEdge`) for exactly one semantic element. Every DI element is a
//! member of exactly one [`Plane`]'s ordered element collection and carries a
//! `$parent` back-reference to that plane. A [`Diagram`] wraps one plane; the
//! plane's root element decides which process or sub-process it draws.
//!
//! Records are stored in arenas inside
//! [`Definitions`](crate::definitions::Definitions) and addressed by the
//! handle types [`DiId`], [`PlaneId`] and [`DiagramId`]. Handles stay valid
//! for the life of the document, so a record keeps its identity while it
//! moves between planes or while a diagram is removed from and re-added to
//! the document.

use std::fmt;

use indexmap::IndexSet;

use crate::{
    geometry::{Bounds, Point},
    identifier::Id,
};

/// Handle of a DI element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiId(pub(crate) usize);

/// Handle of a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaneId(pub(crate) usize);

/// Handle of a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiagramId(pub(crate) usize);

/// Geometry of a DI element.
#[derive(Debug, Clone, PartialEq)]
pub enum DiGeometry {
    /// A `bpmndi:BPMNShape`.
    Shape {
        bounds: Bounds,
        /// The `isExpanded` attribute; only meaningful for sub-processes.
        is_expanded: Option<bool>,
    },
    /// A `bpmndi:BPMNEdge`.
    Edge { waypoints: Vec<Point> },
}

/// A drawing record referencing one semantic element.
#[derive(Debug, Clone)]
pub struct DiElement {
    id: Id,
    bpmn_element: Option<Id>,
    parent: Option<PlaneId>,
    geometry: DiGeometry,
    label: Option<Bounds>,
}

impl DiElement {
    /// Creates a shape record for `bpmn_element`.
    ///
    /// `bpmn_element` is `None` when the reference in the source document
    /// could not be resolved.
    pub fn shape(id: Id, bpmn_element: Option<Id>, bounds: Bounds) -> Self {
        Self {
            id,
            bpmn_element,
            parent: None,
            geometry: DiGeometry::Shape {
                bounds,
                is_expanded: None,
            },
            label: None,
        }
    }

    /// Creates an edge record for `bpmn_element`.
    pub fn edge(id: Id, bpmn_element: Option<Id>, waypoints: Vec<Point>) -> Self {
        Self {
            id,
            bpmn_element,
            parent: None,
            geometry: DiGeometry::Edge { waypoints },
            label: None,
        }
    }

    /// Sets the `isExpanded` attribute. Has no effect on edges.
    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.set_expanded(expanded);
        self
    }

    /// Sets the `bpmndi:BPMNLabel` bounds.
    pub fn with_label(mut self, label: Bounds) -> Self {
        self.label = Some(label);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// Returns the semantic element this record draws.
    pub fn bpmn_element(&self) -> Option<Id> {
        self.bpmn_element
    }

    /// Returns the plane this record currently belongs to (`$parent`).
    pub fn parent(&self) -> Option<PlaneId> {
        self.parent
    }

    pub fn geometry(&self) -> &DiGeometry {
        &self.geometry
    }

    pub fn label(&self) -> Option<Bounds> {
        self.label
    }

    /// Returns the shape bounds, or `None` for edges.
    pub fn bounds(&self) -> Option<Bounds> {
        match &self.geometry {
            DiGeometry::Shape { bounds, .. } => Some(*bounds),
            DiGeometry::Edge { .. } => None,
        }
    }

    /// Returns the edge waypoints, or `None` for shapes.
    pub fn waypoints(&self) -> Option<&[Point]> {
        match &self.geometry {
            DiGeometry::Shape { .. } => None,
            DiGeometry::Edge { waypoints } => Some(waypoints),
        }
    }

    /// Returns the `isExpanded` attribute, or `None` when absent or an edge.
    pub fn is_expanded(&self) -> Option<bool> {
        match &self.geometry {
            DiGeometry::Shape { is_expanded, .. } => *is_expanded,
            DiGeometry::Edge { .. } => None,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<PlaneId>) {
        self.parent = parent;
    }

    pub(crate) fn set_expanded(&mut self, expanded: bool) {
        if let DiGeometry::Shape { is_expanded, .. } = &mut self.geometry {
            *is_expanded = Some(expanded);
        }
    }

    pub(crate) fn set_bounds(&mut self, new_bounds: Bounds) {
        if let DiGeometry::Shape { bounds, .. } = &mut self.geometry {
            *bounds = new_bounds;
        }
    }

    pub(crate) fn set_waypoints(&mut self, new_waypoints: Vec<Point>) {
        if let DiGeometry::Edge { waypoints } = &mut self.geometry {
            *waypoints = new_waypoints;
        }
    }

    pub(crate) fn set_label(&mut self, label: Option<Bounds>) {
        self.label = label;
    }
}

impl fmt::Display for DiElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.geometry {
            DiGeometry::Shape { .. } => "bpmndi:BPMNShape",
            DiGeometry::Edge { .. } => "bpmndi:BPMNEdge",
        };
        write!(f, "<{tag} id=\"{}\" />", self.id)
    }
}

/// A `bpmndi:BPMNPlane`: the ordered set of DI elements drawn for one root.
#[derive(Debug, Clone)]
pub struct Plane {
    id: Id,
    bpmn_element: Id,
    plane_elements: IndexSet<DiId>,
}

impl Plane {
    pub(crate) fn new(id: Id, bpmn_element: Id) -> Self {
        Self {
            id,
            bpmn_element,
            plane_elements: IndexSet::new(),
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// Returns the process or sub-process this plane draws.
    pub fn bpmn_element(&self) -> Id {
        self.bpmn_element
    }

    /// Returns the member DI elements in insertion order.
    pub fn plane_elements(&self) -> &IndexSet<DiId> {
        &self.plane_elements
    }

    pub fn contains(&self, di: DiId) -> bool {
        self.plane_elements.contains(&di)
    }

    pub(crate) fn insert(&mut self, di: DiId) -> bool {
        self.plane_elements.insert(di)
    }

    pub(crate) fn remove(&mut self, di: DiId) -> bool {
        self.plane_elements.shift_remove(&di)
    }
}

/// A `bpmndi:BPMNDiagram`.
#[derive(Debug, Clone)]
pub struct Diagram {
    id: Id,
    plane: PlaneId,
}

impl Diagram {
    pub(crate) fn new(id: Id, plane: PlaneId) -> Self {
        Self { id, plane }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn plane(&self) -> PlaneId {
        self.plane
    }
}
