//! Visitor-driven walk over the semantic tree.
//!
//! The walker works in two phases. First, every DI element of the plane
//! being imported is registered with [`TreeWalker::register_di`], which binds
//! it to its semantic element. Then [`TreeWalker::handle_container`] visits
//! the flow elements of a process or sub-process depth first and hands each
//! element that has a DI to the [`Visitor`]. Elements without DI are skipped.
//!
//! Sequence flows are deferred to the back of a queue and boundary events to
//! its front, so both are visited after the shapes they reference. The queue
//! is drained by [`TreeWalker::handle_deferred`], which must run after the
//! main walk.
//!
//! Per-element failures are reported through [`Visitor::error`] and never
//! stop the walk. Only structural defects of the tree abort it with a
//! [`WalkError`].

use std::collections::{HashSet, VecDeque};

use log::trace;
use thiserror::Error;

use subplane_core::{
    BindError,
    definitions::Definitions,
    di::DiId,
    identifier::Id,
    semantic::{ElementKind, SemanticElement},
};

use super::{ImportError, ImportWarning};
use crate::canvas::{Canvas, NodeId};

/// Structural failures that abort a walk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalkError {
    #[error("unknown element <{0}>")]
    UnknownElement(Id),

    #[error("element <{0}> has no flow elements")]
    NotAContainer(Id),

    #[error("containment cycle through <{0}>")]
    CyclicContainment(Id),
}

/// Receives the elements a [`TreeWalker`] visits.
pub trait Visitor {
    /// Materializes `element` under `parent` and returns its node.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] if the element cannot be drawn. The walker
    /// turns it into a warning and continues.
    fn element(
        &mut self,
        element: &SemanticElement,
        parent: NodeId,
        definitions: &Definitions,
        canvas: &mut Canvas,
    ) -> Result<NodeId, ImportError>;

    /// Records a per-element failure.
    fn error(&mut self, warning: ImportWarning);
}

#[derive(Debug, Clone, Copy)]
enum Deferred {
    SequenceFlow { element: Id, parent: NodeId },
    BoundaryEvent { element: Id, parent: NodeId },
}

/// Walks a semantic subtree, reporting each drawable element to `V`.
#[derive(Debug)]
pub struct TreeWalker<V> {
    visitor: V,
    deferred: VecDeque<Deferred>,
    active: HashSet<Id>,
}

impl<V: Visitor> TreeWalker<V> {
    pub fn new(visitor: V) -> Self {
        Self {
            visitor,
            deferred: VecDeque::new(),
            active: HashSet::new(),
        }
    }

    pub fn visitor(&self) -> &V {
        &self.visitor
    }

    pub fn into_visitor(self) -> V {
        self.visitor
    }

    /// Binds a DI element to the semantic element it references.
    pub fn register_di(&mut self, definitions: &mut Definitions, di: DiId) {
        match definitions.bind_di(di) {
            Ok(element) => {
                trace!(element:% = element, di:% = definitions.di(di).id(); "Registered DI");
            }
            Err(BindError::Unreferenced) => {
                let message = format!("no bpmnElement referenced in {}", definitions.di(di));
                self.visitor.error(ImportWarning::new(message).with_di(di));
            }
            Err(BindError::AlreadyBound { element, .. }) => {
                let message = match definitions.element(element) {
                    Some(semantic) => format!("multiple DI elements defined for {semantic}"),
                    None => format!("multiple DI elements defined for <{element}>"),
                };
                self.visitor
                    .error(ImportWarning::new(message).with_element(element).with_di(di));
            }
        }
    }

    /// Visits the flow elements of `container`, drawing them under `host`.
    ///
    /// # Errors
    ///
    /// Returns a [`WalkError`] if `container` is unknown, cannot contain flow
    /// elements, or the containment tree below it is malformed.
    pub fn handle_container(
        &mut self,
        definitions: &Definitions,
        canvas: &mut Canvas,
        container: Id,
        host: NodeId,
    ) -> Result<(), WalkError> {
        let element = definitions
            .element(container)
            .ok_or(WalkError::UnknownElement(container))?;
        if !element.kind().is_container() {
            return Err(WalkError::NotAContainer(container));
        }
        if !self.active.insert(container) {
            return Err(WalkError::CyclicContainment(container));
        }

        let result = self.handle_flow_elements(definitions, canvas, element, host);
        self.active.remove(&container);
        result
    }

    /// Drains the deferred queue.
    ///
    /// # Errors
    ///
    /// Propagates structural failures from deferred boundary events.
    pub fn handle_deferred(
        &mut self,
        definitions: &Definitions,
        canvas: &mut Canvas,
    ) -> Result<(), WalkError> {
        while let Some(deferred) = self.deferred.pop_front() {
            match deferred {
                Deferred::SequenceFlow { element, parent } => {
                    let element = definitions
                        .element(element)
                        .ok_or(WalkError::UnknownElement(element))?;
                    self.visit_if_di(definitions, canvas, element, parent);
                }
                Deferred::BoundaryEvent { element, parent } => {
                    let element = definitions
                        .element(element)
                        .ok_or(WalkError::UnknownElement(element))?;
                    self.handle_flow_node(definitions, canvas, element, parent)?;
                }
            }
        }
        Ok(())
    }

    fn handle_flow_elements(
        &mut self,
        definitions: &Definitions,
        canvas: &mut Canvas,
        container: &SemanticElement,
        host: NodeId,
    ) -> Result<(), WalkError> {
        for &child in container.flow_elements() {
            let element = definitions
                .element(child)
                .ok_or(WalkError::UnknownElement(child))?;

            match element.kind() {
                ElementKind::SequenceFlow => self.deferred.push_back(Deferred::SequenceFlow {
                    element: child,
                    parent: host,
                }),
                ElementKind::BoundaryEvent => self.deferred.push_front(Deferred::BoundaryEvent {
                    element: child,
                    parent: host,
                }),
                kind if kind.is_flow_node() => {
                    self.handle_flow_node(definitions, canvas, element, host)?;
                }
                _ => trace!(element:% = child; "Skipped element without visual"),
            }
        }
        Ok(())
    }

    fn handle_flow_node(
        &mut self,
        definitions: &Definitions,
        canvas: &mut Canvas,
        element: &SemanticElement,
        parent: NodeId,
    ) -> Result<(), WalkError> {
        let node = self.visit_if_di(definitions, canvas, element, parent);

        if element.kind() == ElementKind::SubProcess {
            self.handle_container(definitions, canvas, element.id(), node.unwrap_or(parent))?;
        }
        Ok(())
    }

    fn visit_if_di(
        &mut self,
        definitions: &Definitions,
        canvas: &mut Canvas,
        element: &SemanticElement,
        parent: NodeId,
    ) -> Option<NodeId> {
        let di = element.di()?;

        if canvas.get(element.id()).is_some() {
            let warning = ImportWarning::new(format!("already rendered {element}"))
                .with_element(element.id())
                .with_di(di);
            self.visitor.error(warning);
            return None;
        }

        match self.visitor.element(element, parent, definitions, canvas) {
            Ok(node) => {
                trace!(element:% = element.id(); "Visited element");
                Some(node)
            }
            Err(err) => {
                let warning = ImportWarning::new(err.to_string())
                    .with_element(element.id())
                    .with_di(di);
                self.visitor.error(warning);
                None
            }
        }
    }
}
