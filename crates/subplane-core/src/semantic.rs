//! Semantic BPMN elements.
//!
//! A [`SemanticElement`] is one node of the process tree: a process, a
//! sub-process, a task, an event, a gateway or a sequence flow. Elements are
//! owned by [`Definitions`](crate::definitions::Definitions) and refer to each
//! other by [`Id`]; the containment parent and the back-reference to the
//! element's diagram-interchange record are explicit fields.

use std::fmt;

use crate::{di::DiId, identifier::Id};

/// The BPMN type of a semantic element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Process,
    SubProcess,
    Task,
    StartEvent,
    IntermediateEvent,
    EndEvent,
    BoundaryEvent,
    Gateway,
    SequenceFlow,
    /// A data object: a flow element that is never drawn itself.
    DataObject,
}

impl ElementKind {
    /// Returns the qualified BPMN type name, e.g. `bpmn:SubProcess`.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Process => "bpmn:Process",
            Self::SubProcess => "bpmn:SubProcess",
            Self::Task => "bpmn:Task",
            Self::StartEvent => "bpmn:StartEvent",
            Self::IntermediateEvent => "bpmn:IntermediateThrowEvent",
            Self::EndEvent => "bpmn:EndEvent",
            Self::BoundaryEvent => "bpmn:BoundaryEvent",
            Self::Gateway => "bpmn:ExclusiveGateway",
            Self::SequenceFlow => "bpmn:SequenceFlow",
            Self::DataObject => "bpmn:DataObject",
        }
    }

    /// Returns `true` for elements that own flow elements.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Process | Self::SubProcess)
    }

    /// Returns `true` for elements rendered as shapes inside a container.
    pub fn is_flow_node(self) -> bool {
        matches!(
            self,
            Self::SubProcess
                | Self::Task
                | Self::StartEvent
                | Self::IntermediateEvent
                | Self::EndEvent
                | Self::BoundaryEvent
                | Self::Gateway
        )
    }

    /// Returns `true` for elements rendered as connections.
    pub fn is_connection(self) -> bool {
        matches!(self, Self::SequenceFlow)
    }

    /// Returns `true` for elements whose name is drawn as a separate label.
    pub fn has_external_label(self) -> bool {
        matches!(
            self,
            Self::StartEvent
                | Self::IntermediateEvent
                | Self::EndEvent
                | Self::BoundaryEvent
                | Self::Gateway
                | Self::SequenceFlow
        )
    }
}

/// A node of the semantic process tree.
#[derive(Debug, Clone)]
pub struct SemanticElement {
    id: Id,
    kind: ElementKind,
    name: Option<String>,
    parent: Option<Id>,
    flow_elements: Vec<Id>,
    source_ref: Option<Id>,
    target_ref: Option<Id>,
    attached_to_ref: Option<Id>,
    di: Option<DiId>,
}

impl SemanticElement {
    pub(crate) fn new(id: Id, kind: ElementKind, parent: Option<Id>) -> Self {
        Self {
            id,
            kind,
            name: None,
            parent,
            flow_elements: Vec::new(),
            source_ref: None,
            target_ref: None,
            attached_to_ref: None,
            di: None,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the containing element (`$parent`), if any.
    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    /// Returns the contained flow elements in document order.
    pub fn flow_elements(&self) -> &[Id] {
        &self.flow_elements
    }

    pub fn source_ref(&self) -> Option<Id> {
        self.source_ref
    }

    pub fn target_ref(&self) -> Option<Id> {
        self.target_ref
    }

    /// Returns the element a boundary event is attached to.
    pub fn attached_to_ref(&self) -> Option<Id> {
        self.attached_to_ref
    }

    /// Returns the diagram-interchange record currently bound to this element.
    pub fn di(&self) -> Option<DiId> {
        self.di
    }

    pub(crate) fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub(crate) fn push_flow_element(&mut self, child: Id) {
        self.flow_elements.push(child);
    }

    pub(crate) fn set_refs(&mut self, source: Option<Id>, target: Option<Id>) {
        self.source_ref = source;
        self.target_ref = target;
    }

    pub(crate) fn set_attached_to(&mut self, host: Option<Id>) {
        self.attached_to_ref = host;
    }

    pub(crate) fn set_di(&mut self, di: Option<DiId>) {
        self.di = di;
    }
}

impl fmt::Display for SemanticElement {
    /// Formats the element the way diagnostics quote it: `<bpmn:Task id="Task_1" />`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} id=\"{}\" />", self.kind.type_name(), self.id)
    }
}
