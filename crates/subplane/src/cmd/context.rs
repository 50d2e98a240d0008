use std::collections::HashMap;

use subplane_core::{
    definitions::{Definitions, DiagramRef},
    di::{DiId, DiagramId},
    geometry::Point,
    identifier::Id,
};

use crate::canvas::NodeId;

/// State of one expand or collapse invocation.
#[derive(Debug, Clone)]
pub struct SubProcessContext {
    sub_process: NodeId,
    sub_process_diagram: Option<DiagramRef>,
    created: bool,
    cached: HashMap<Id, NodeId>,
    offset: Option<Point>,
    moved: Vec<DiId>,
}

impl SubProcessContext {
    /// Creates the context for the sub-process drawn by `sub_process`.
    ///
    /// `sub_process_diagram` is its private diagram, if known.
    pub fn new(sub_process: NodeId, sub_process_diagram: Option<DiagramRef>) -> Self {
        Self {
            sub_process,
            sub_process_diagram,
            created: false,
            cached: HashMap::new(),
            offset: None,
            moved: Vec::new(),
        }
    }

    pub fn sub_process(&self) -> NodeId {
        self.sub_process
    }

    pub fn sub_process_diagram(&self) -> Option<DiagramRef> {
        self.sub_process_diagram
    }

    /// Whether the private diagram was created by this invocation.
    pub fn created(&self) -> bool {
        self.created
    }

    /// Nodes drawn for each element, reused on redo.
    pub fn cached(&self) -> &HashMap<Id, NodeId> {
        &self.cached
    }

    /// Offset applied by recentering, if any.
    pub fn offset(&self) -> Option<Point> {
        self.offset
    }

    /// DI elements relocated by the last execution, in their original order.
    pub fn moved(&self) -> &[DiId] {
        &self.moved
    }

    /// Resolves the diagram reference once and keeps the resolved handle.
    pub(super) fn resolve_diagram(&mut self, definitions: &Definitions) -> Option<DiagramId> {
        let diagram = self.sub_process_diagram?.resolve(definitions)?;
        self.sub_process_diagram = Some(DiagramRef::Resolved(diagram));
        Some(diagram)
    }

    pub(super) fn set_diagram(&mut self, diagram: DiagramId) {
        self.sub_process_diagram = Some(DiagramRef::Resolved(diagram));
    }

    pub(super) fn set_created(&mut self, created: bool) {
        self.created = created;
    }

    pub(super) fn cached_mut(&mut self) -> &mut HashMap<Id, NodeId> {
        &mut self.cached
    }

    pub(super) fn set_offset(&mut self, offset: Option<Point>) {
        self.offset = offset;
    }

    pub(super) fn set_moved(&mut self, moved: Vec<DiId>) {
        self.moved = moved;
    }
}
