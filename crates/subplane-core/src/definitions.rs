//! The document root.
//!
//! [`Definitions`] owns every semantic element, DI element, plane and diagram
//! of one BPMN document. Records refer to each other by [`Id`] (semantic side)
//! or by arena handle (DI side), and every relation that has a back-reference
//! is maintained here so the two sides cannot drift apart:
//!
//! - plane membership and the DI element's `$parent` are changed together by
//!   [`Definitions::add_plane_element`] and [`Definitions::detach_plane_element`];
//! - a semantic element's `di` is set by [`Definitions::bind_di`] and reset by
//!   [`Definitions::clear_di`];
//! - the ordered diagram collection only holds diagrams created by this
//!   document, so a removed diagram can be re-added with the same identity.

use indexmap::{IndexMap, IndexSet};
use log::trace;

use crate::{
    di::{DiElement, DiId, Diagram, DiagramId, Plane, PlaneId},
    error::{BindError, ModelError},
    geometry::{Bounds, Point},
    identifier::Id,
    semantic::{ElementKind, SemanticElement},
};

/// A reference to a diagram that is either already resolved or still needs a
/// lookup by the id of its root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramRef {
    Resolved(DiagramId),
    Lookup(Id),
}

impl DiagramRef {
    /// Resolves the reference against `definitions`.
    ///
    /// A [`DiagramRef::Lookup`] only finds diagrams that are currently part
    /// of the document's diagram collection.
    pub fn resolve(&self, definitions: &Definitions) -> Option<DiagramId> {
        match *self {
            Self::Resolved(diagram) => Some(diagram),
            Self::Lookup(root) => definitions.find_diagram(root),
        }
    }
}

impl From<DiagramId> for DiagramRef {
    fn from(diagram: DiagramId) -> Self {
        Self::Resolved(diagram)
    }
}

/// A parsed BPMN document: semantic tree plus diagram interchange.
#[derive(Debug, Clone)]
pub struct Definitions {
    id: Id,
    attributes: IndexMap<String, String>,
    elements: IndexMap<Id, SemanticElement>,
    root_elements: Vec<Id>,
    di_elements: Vec<DiElement>,
    planes: Vec<Plane>,
    diagram_store: Vec<Diagram>,
    diagrams: IndexSet<DiagramId>,
}

impl Definitions {
    /// Creates an empty document.
    pub fn new(id: &str) -> Self {
        Self {
            id: Id::new(id),
            attributes: IndexMap::new(),
            elements: IndexMap::new(),
            root_elements: Vec::new(),
            di_elements: Vec::new(),
            planes: Vec::new(),
            diagram_store: Vec::new(),
            diagrams: IndexSet::new(),
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// Sets an attribute (including namespace declarations) on the root.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Returns `true` if any root attribute carries `value`.
    ///
    /// Vendor namespaces are declared under arbitrary prefixes, so markers
    /// are matched on the value rather than the attribute name.
    pub fn has_attribute_value(&self, value: &str) -> bool {
        self.attributes.values().any(|v| v == value)
    }

    // Semantic elements

    /// Adds a top-level process.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateId`] if the id is taken.
    pub fn add_process(&mut self, id: &str) -> Result<Id, ModelError> {
        let id = Id::new(id);
        self.ensure_free(id)?;
        self.elements
            .insert(id, SemanticElement::new(id, ElementKind::Process, None));
        self.root_elements.push(id);
        Ok(id)
    }

    /// Adds a flow element of `kind` to the container `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is taken, `parent` is unknown or not a
    /// container, or `kind` is a process.
    pub fn add_element(
        &mut self,
        kind: ElementKind,
        id: &str,
        parent: Id,
    ) -> Result<Id, ModelError> {
        let id = Id::new(id);
        if kind == ElementKind::Process {
            return Err(ModelError::NotAFlowElement(id));
        }
        self.ensure_free(id)?;

        let container = self
            .elements
            .get_mut(&parent)
            .ok_or(ModelError::UnknownElement(parent))?;
        if !container.kind().is_container() {
            return Err(ModelError::NotAContainer(parent));
        }
        container.push_flow_element(id);

        self.elements
            .insert(id, SemanticElement::new(id, kind, Some(parent)));
        Ok(id)
    }

    /// Adds a sequence flow. Either end may be left unspecified.
    ///
    /// # Errors
    ///
    /// See [`Definitions::add_element`].
    pub fn add_sequence_flow(
        &mut self,
        id: &str,
        parent: Id,
        source: Option<Id>,
        target: Option<Id>,
    ) -> Result<Id, ModelError> {
        let id = self.add_element(ElementKind::SequenceFlow, id, parent)?;
        self.element_mut(id)?.set_refs(source, target);
        Ok(id)
    }

    /// Adds a boundary event attached to `attached_to`.
    ///
    /// # Errors
    ///
    /// See [`Definitions::add_element`].
    pub fn add_boundary_event(
        &mut self,
        id: &str,
        parent: Id,
        attached_to: Option<Id>,
    ) -> Result<Id, ModelError> {
        let id = self.add_element(ElementKind::BoundaryEvent, id, parent)?;
        self.element_mut(id)?.set_attached_to(attached_to);
        Ok(id)
    }

    /// Sets the `name` attribute of an element.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownElement`] if the element does not exist.
    pub fn set_name(&mut self, element: Id, name: &str) -> Result<(), ModelError> {
        self.element_mut(element)?.set_name(Some(name.to_string()));
        Ok(())
    }

    pub fn element(&self, id: Id) -> Option<&SemanticElement> {
        self.elements.get(&id)
    }

    /// Returns every semantic element in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &SemanticElement> {
        self.elements.values()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Returns the top-level processes.
    pub fn root_elements(&self) -> &[Id] {
        &self.root_elements
    }

    /// Returns `true` if `ancestor` appears on the `$parent` chain of `element`.
    ///
    /// An element is not its own ancestor. A malformed, cyclic chain is cut
    /// off after visiting every element once.
    pub fn has_ancestor(&self, element: Id, ancestor: Id) -> bool {
        let mut current = self.element(element).and_then(SemanticElement::parent);
        let mut steps = 0;

        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.elements.len() {
                return false;
            }
            current = self.element(parent).and_then(SemanticElement::parent);
        }

        false
    }

    fn ensure_free(&self, id: Id) -> Result<(), ModelError> {
        if self.elements.contains_key(&id) {
            return Err(ModelError::DuplicateId(id));
        }
        Ok(())
    }

    fn element_mut(&mut self, id: Id) -> Result<&mut SemanticElement, ModelError> {
        self.elements
            .get_mut(&id)
            .ok_or(ModelError::UnknownElement(id))
    }

    // Diagrams and planes

    /// Creates a plane drawing `root`. The plane starts empty.
    pub fn create_plane(&mut self, root: Id) -> PlaneId {
        let id = root.with_prefix("BPMNPlane_");
        self.planes.push(Plane::new(id, root));
        PlaneId(self.planes.len() - 1)
    }

    /// Creates a diagram with a fresh plane drawing `root`.
    ///
    /// The diagram is not part of the document until passed to
    /// [`Definitions::add_diagram`].
    pub fn create_diagram(&mut self, root: Id) -> DiagramId {
        let plane = self.create_plane(root);
        let id = root.with_prefix("BPMNDiagram_");
        self.diagram_store.push(Diagram::new(id, plane));
        let diagram = DiagramId(self.diagram_store.len() - 1);
        trace!(diagram:% = id, root:% = root; "Created diagram");
        diagram
    }

    /// Adds a diagram to the document's diagram collection.
    ///
    /// Returns `false` if it was already present.
    pub fn add_diagram(&mut self, diagram: DiagramId) -> bool {
        self.diagrams.insert(diagram)
    }

    /// Removes a diagram from the collection, preserving the order of the rest.
    ///
    /// Returns `false` if it was not present. The diagram and its plane
    /// remain valid handles and can be added again.
    pub fn remove_diagram(&mut self, diagram: DiagramId) -> bool {
        self.diagrams.shift_remove(&diagram)
    }

    /// Returns the diagrams currently in the document, in order.
    pub fn diagrams(&self) -> impl Iterator<Item = DiagramId> + '_ {
        self.diagrams.iter().copied()
    }

    pub fn contains_diagram(&self, diagram: DiagramId) -> bool {
        self.diagrams.contains(&diagram)
    }

    /// Returns a diagram record.
    ///
    /// # Panics
    ///
    /// Panics if the handle was not created by this document.
    pub fn diagram(&self, diagram: DiagramId) -> &Diagram {
        &self.diagram_store[diagram.0]
    }

    /// Returns a plane record.
    ///
    /// # Panics
    ///
    /// Panics if the handle was not created by this document.
    pub fn plane(&self, plane: PlaneId) -> &Plane {
        &self.planes[plane.0]
    }

    /// Returns the plane of a diagram.
    pub fn diagram_plane(&self, diagram: DiagramId) -> &Plane {
        self.plane(self.diagram(diagram).plane())
    }

    /// Finds the diagram in the collection whose plane draws `root`.
    pub fn find_diagram(&self, root: Id) -> Option<DiagramId> {
        self.diagrams()
            .find(|&diagram| self.diagram_plane(diagram).bpmn_element() == root)
    }

    // DI elements

    /// Returns a DI record.
    ///
    /// # Panics
    ///
    /// Panics if the handle was not created by this document.
    pub fn di(&self, di: DiId) -> &DiElement {
        &self.di_elements[di.0]
    }

    /// Adds a DI element to the plane of `diagram`.
    pub fn add_plane_element(&mut self, diagram: DiagramId, mut element: DiElement) -> DiId {
        let plane = self.diagram(diagram).plane();
        element.set_parent(Some(plane));
        self.di_elements.push(element);
        let di = DiId(self.di_elements.len() - 1);
        self.planes[plane.0].insert(di);
        di
    }

    /// Adds a `BPMNShape` for `element` to the plane of `diagram`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownElement`] if `element` does not exist.
    pub fn add_shape_di(
        &mut self,
        diagram: DiagramId,
        element: Id,
        bounds: Bounds,
    ) -> Result<DiId, ModelError> {
        self.element(element)
            .ok_or(ModelError::UnknownElement(element))?;
        let record = DiElement::shape(element.with_suffix("_di"), Some(element), bounds);
        Ok(self.add_plane_element(diagram, record))
    }

    /// Adds a `BPMNEdge` for `element` to the plane of `diagram`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownElement`] if `element` does not exist.
    pub fn add_edge_di(
        &mut self,
        diagram: DiagramId,
        element: Id,
        waypoints: Vec<Point>,
    ) -> Result<DiId, ModelError> {
        self.element(element)
            .ok_or(ModelError::UnknownElement(element))?;
        let record = DiElement::edge(element.with_suffix("_di"), Some(element), waypoints);
        Ok(self.add_plane_element(diagram, record))
    }

    /// Appends `di` to the element collection of `plane`.
    ///
    /// Appending a member is a no-op and returns `false`. The DI element's
    /// `$parent` is left untouched; pair with
    /// [`Definitions::detach_plane_element`] on the old plane.
    pub fn append_plane_element(&mut self, plane: PlaneId, di: DiId) -> bool {
        self.planes[plane.0].insert(di)
    }

    /// Removes `di` from `plane` and points its `$parent` at `new_parent`.
    ///
    /// Returns `false` if `di` was not a member of `plane`; the `$parent` is
    /// rewritten either way.
    pub fn detach_plane_element(&mut self, plane: PlaneId, di: DiId, new_parent: PlaneId) -> bool {
        let removed = self.planes[plane.0].remove(di);
        self.di_elements[di.0].set_parent(Some(new_parent));
        removed
    }

    /// Binds `di` as the visual record of the semantic element it references.
    ///
    /// Binding the record an element already holds is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::Unreferenced`] if the DI element references no
    /// known element and [`BindError::AlreadyBound`] if the element is bound
    /// to a different DI element.
    pub fn bind_di(&mut self, di: DiId) -> Result<Id, BindError> {
        let element_id = self.di_elements[di.0]
            .bpmn_element()
            .ok_or(BindError::Unreferenced)?;
        let element = self
            .elements
            .get_mut(&element_id)
            .ok_or(BindError::Unreferenced)?;

        match element.di() {
            Some(existing) if existing != di => Err(BindError::AlreadyBound {
                element: element_id,
                existing,
            }),
            _ => {
                element.set_di(Some(di));
                Ok(element_id)
            }
        }
    }

    /// Clears the `di` back-reference of `element`, returning the old value.
    pub fn clear_di(&mut self, element: Id) -> Option<DiId> {
        let element = self.elements.get_mut(&element)?;
        let previous = element.di();
        element.set_di(None);
        previous
    }

    /// Updates the bounds of a shape record. No effect on edges.
    pub fn set_di_bounds(&mut self, di: DiId, bounds: Bounds) {
        self.di_elements[di.0].set_bounds(bounds);
    }

    /// Updates the waypoints of an edge record. No effect on shapes.
    pub fn set_di_waypoints(&mut self, di: DiId, waypoints: Vec<Point>) {
        self.di_elements[di.0].set_waypoints(waypoints);
    }

    pub fn set_di_label(&mut self, di: DiId, label: Option<Bounds>) {
        self.di_elements[di.0].set_label(label);
    }

    /// Sets the `isExpanded` attribute of a shape record.
    pub fn set_di_expanded(&mut self, di: DiId, expanded: bool) {
        self.di_elements[di.0].set_expanded(expanded);
    }
}
