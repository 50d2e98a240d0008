//! The live editing surface.
//!
//! The canvas holds the rendering-side projection of a document: one
//! [`Node`] per materialized DI element, linked into a parent/child tree and
//! a source/target connection graph. Nodes are allocated in an arena and
//! never freed, so a [`NodeId`] keeps naming the same node instance after it
//! has been removed from the surface and while it is re-added later.
//!
//! # Attachment
//!
//! A node is *attached* while it is registered under its id. Only attached
//! nodes are returned by [`Canvas::get`]; removed nodes keep their own links
//! (source, target, host, label) so that re-adding them restores the same
//! relations.
//!
//! Labels are not part of their parent's child list. They follow their
//! owner: adding or removing a shape or connection adds or removes its label.

use std::collections::HashMap;

use log::trace;
use thiserror::Error;

use subplane_core::{
    geometry::{Bounds, Point},
    identifier::Id,
};

/// Handle of a node on a [`Canvas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// What a node renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The canvas root, standing for the process being drawn.
    Root,
    Shape,
    /// An external label owned by a shape or connection.
    Label,
    Connection,
}

/// Rejected surface mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("element <{0}> already exists")]
    AlreadyRegistered(Id),

    #[error("parent of <{0}> is not on the canvas")]
    DetachedParent(Id),

    #[error("connection <{0}> has an end that is not on the canvas")]
    DetachedEnd(Id),

    #[error("<{0}> cannot be added this way")]
    WrongKind(Id),
}

/// A shape, label or connection on the canvas.
#[derive(Debug, Clone)]
pub struct Node {
    id: Id,
    business_object: Id,
    kind: NodeKind,
    bounds: Bounds,
    waypoints: Vec<Point>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    label: Option<NodeId>,
    label_target: Option<NodeId>,
    source: Option<NodeId>,
    target: Option<NodeId>,
    incoming: Vec<NodeId>,
    outgoing: Vec<NodeId>,
    host: Option<NodeId>,
    attachers: Vec<NodeId>,
    collapsed: bool,
    hidden: bool,
}

impl Node {
    fn new(id: Id, business_object: Id, kind: NodeKind, bounds: Bounds) -> Self {
        Self {
            id,
            business_object,
            kind,
            bounds,
            waypoints: Vec::new(),
            parent: None,
            children: Vec::new(),
            label: None,
            label_target: None,
            source: None,
            target: None,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            host: None,
            attachers: Vec::new(),
            collapsed: false,
            hidden: false,
        }
    }

    /// Returns the registry id. Labels use `<element>_label`.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Returns the semantic element this node renders.
    pub fn business_object(&self) -> Id {
        self.business_object
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns the node bounds. For connections this is the box around the
    /// waypoints.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn label(&self) -> Option<NodeId> {
        self.label
    }

    /// Returns the owner of a label node.
    pub fn label_target(&self) -> Option<NodeId> {
        self.label_target
    }

    pub fn source(&self) -> Option<NodeId> {
        self.source
    }

    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn incoming(&self) -> &[NodeId] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[NodeId] {
        &self.outgoing
    }

    /// Returns the shape a boundary event is attached to.
    pub fn host(&self) -> Option<NodeId> {
        self.host
    }

    /// Returns the boundary events attached to this shape.
    pub fn attachers(&self) -> &[NodeId] {
        &self.attachers
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_connection(&self) -> bool {
        self.kind == NodeKind::Connection
    }
}

/// The editing surface: a node arena plus the registry of attached nodes.
#[derive(Debug, Clone)]
pub struct Canvas {
    nodes: Vec<Node>,
    registry: HashMap<Id, NodeId>,
    root: NodeId,
}

impl Canvas {
    /// Creates a canvas whose root stands for `root_business_object`.
    pub fn new(root_business_object: Id) -> Self {
        let root = Node::new(
            root_business_object,
            root_business_object,
            NodeKind::Root,
            Bounds::default(),
        );
        let mut registry = HashMap::new();
        registry.insert(root_business_object, NodeId(0));

        Self {
            nodes: vec![root],
            registry,
            root: NodeId(0),
        }
    }

    pub fn root_element(&self) -> NodeId {
        self.root
    }

    /// Returns the id of the process the canvas draws.
    pub fn root_business_object(&self) -> Id {
        self.nodes[self.root.0].business_object
    }

    /// Returns the attached node registered under `id`.
    pub fn get(&self, id: Id) -> Option<NodeId> {
        self.registry.get(&id).copied()
    }

    /// Returns a node, attached or not.
    pub fn node(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node.0)
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        self.nodes
            .get(node.0)
            .is_some_and(|n| self.registry.get(&n.id) == Some(&node))
    }

    /// Returns the children of `node`, or an empty slice for unknown handles.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Returns every attached node except the root.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.registry
            .values()
            .copied()
            .filter(move |&node| node != self.root)
    }

    /// Returns the number of nodes ever allocated on this canvas.
    pub fn allocated(&self) -> usize {
        self.nodes.len()
    }

    /// Allocates a detached shape.
    pub fn create_shape(&mut self, business_object: Id, bounds: Bounds) -> NodeId {
        self.allocate(Node::new(
            business_object,
            business_object,
            NodeKind::Shape,
            bounds,
        ))
    }

    /// Allocates a detached connection between `source` and `target`.
    pub fn create_connection(
        &mut self,
        business_object: Id,
        waypoints: Vec<Point>,
        source: NodeId,
        target: NodeId,
    ) -> NodeId {
        let bounds = Bounds::from_points(waypoints.iter().copied()).unwrap_or_default();
        let mut node = Node::new(business_object, business_object, NodeKind::Connection, bounds);
        node.waypoints = waypoints;
        node.source = Some(source);
        node.target = Some(target);
        self.allocate(node)
    }

    /// Allocates the label of `target`. It is attached together with its owner.
    pub fn create_label(&mut self, target: NodeId, bounds: Bounds) -> Option<NodeId> {
        let owner = self.nodes.get(target.0)?;
        let mut label = Node::new(
            owner.business_object.with_suffix("_label"),
            owner.business_object,
            NodeKind::Label,
            bounds,
        );
        label.label_target = Some(target);
        label.hidden = owner.hidden;

        let label = self.allocate(label);
        self.nodes[target.0].label = Some(label);
        Some(label)
    }

    /// Attaches a shape under `parent`.
    ///
    /// # Errors
    ///
    /// Fails if the node is not a shape, its id is already registered, or
    /// `parent` is not attached.
    pub fn add_shape(&mut self, node: NodeId, parent: NodeId) -> Result<(), SurfaceError> {
        self.ensure_addable(node, NodeKind::Shape, parent)?;

        self.link_child(node, parent);
        if let Some(host) = self.nodes[node.0].host
            && !self.nodes[host.0].attachers.contains(&node)
        {
            self.nodes[host.0].attachers.push(node);
        }
        self.attach_label(node, parent);

        trace!(element:% = self.nodes[node.0].id; "Added shape");
        Ok(())
    }

    /// Attaches a connection under `parent` and links it to its ends.
    ///
    /// # Errors
    ///
    /// Fails like [`Canvas::add_shape`], or if an end is not attached.
    pub fn add_connection(&mut self, node: NodeId, parent: NodeId) -> Result<(), SurfaceError> {
        self.ensure_addable(node, NodeKind::Connection, parent)?;

        let Node { source, target, .. } = self.nodes[node.0];
        let ends_attached = [source, target]
            .into_iter()
            .all(|end| end.is_some_and(|end| self.is_attached(end)));
        if !ends_attached {
            return Err(SurfaceError::DetachedEnd(self.nodes[node.0].id));
        }

        self.link_child(node, parent);
        if let Some(source) = source
            && !self.nodes[source.0].outgoing.contains(&node)
        {
            self.nodes[source.0].outgoing.push(node);
        }
        if let Some(target) = target
            && !self.nodes[target.0].incoming.contains(&node)
        {
            self.nodes[target.0].incoming.push(node);
        }
        self.attach_label(node, parent);

        trace!(element:% = self.nodes[node.0].id; "Added connection");
        Ok(())
    }

    /// Detaches a shape and its label.
    ///
    /// Returns `false` if the node was not attached. Children are left in
    /// place; remove them first.
    pub fn remove_shape(&mut self, node: NodeId) -> bool {
        if !self.is_attached(node) || self.nodes[node.0].kind != NodeKind::Shape {
            return false;
        }

        if let Some(host) = self.nodes[node.0].host {
            self.nodes[host.0].attachers.retain(|&n| n != node);
        }
        self.unlink(node);

        trace!(element:% = self.nodes[node.0].id; "Removed shape");
        true
    }

    /// Detaches a connection and its label, unlinking it from its ends.
    ///
    /// Returns `false` if the node was not attached.
    pub fn remove_connection(&mut self, node: NodeId) -> bool {
        if !self.is_attached(node) || self.nodes[node.0].kind != NodeKind::Connection {
            return false;
        }

        let Node { source, target, .. } = self.nodes[node.0];
        if let Some(source) = source {
            self.nodes[source.0].outgoing.retain(|&n| n != node);
        }
        if let Some(target) = target {
            self.nodes[target.0].incoming.retain(|&n| n != node);
        }
        self.unlink(node);

        trace!(element:% = self.nodes[node.0].id; "Removed connection");
        true
    }

    pub fn set_collapsed(&mut self, node: NodeId, collapsed: bool) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.collapsed = collapsed;
        }
    }

    /// Shows or hides a node together with its label.
    pub fn set_hidden(&mut self, node: NodeId, hidden: bool) {
        let Some(n) = self.nodes.get_mut(node.0) else {
            return;
        };
        n.hidden = hidden;
        if let Some(label) = n.label {
            self.nodes[label.0].hidden = hidden;
        }
    }

    /// Sets the host of a boundary event. Takes effect when the node is added.
    pub fn set_host(&mut self, node: NodeId, host: NodeId) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.host = Some(host);
        }
    }

    pub fn set_bounds(&mut self, node: NodeId, bounds: Bounds) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.bounds = bounds;
        }
    }

    /// Replaces the waypoints of a connection and refreshes its bounds.
    pub fn set_waypoints(&mut self, node: NodeId, waypoints: Vec<Point>) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.bounds = Bounds::from_points(waypoints.iter().copied()).unwrap_or_default();
            n.waypoints = waypoints;
        }
    }

    fn allocate(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn ensure_addable(
        &self,
        node: NodeId,
        kind: NodeKind,
        parent: NodeId,
    ) -> Result<(), SurfaceError> {
        let n = &self.nodes[node.0];
        if n.kind != kind {
            return Err(SurfaceError::WrongKind(n.id));
        }
        if self.registry.contains_key(&n.id) {
            return Err(SurfaceError::AlreadyRegistered(n.id));
        }
        if !self.is_attached(parent) {
            return Err(SurfaceError::DetachedParent(n.id));
        }
        Ok(())
    }

    fn link_child(&mut self, node: NodeId, parent: NodeId) {
        self.nodes[node.0].parent = Some(parent);
        self.nodes[parent.0].children.push(node);
        self.registry.insert(self.nodes[node.0].id, node);
    }

    fn attach_label(&mut self, owner: NodeId, parent: NodeId) {
        if let Some(label) = self.nodes[owner.0].label
            && !self.registry.contains_key(&self.nodes[label.0].id)
        {
            self.nodes[label.0].parent = Some(parent);
            self.registry.insert(self.nodes[label.0].id, label);
        }
    }

    fn unlink(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&n| n != node);
        }
        self.registry.remove(&self.nodes[node.0].id);

        if let Some(label) = self.nodes[node.0].label {
            self.nodes[label.0].parent = None;
            if self.registry.get(&self.nodes[label.0].id) == Some(&label) {
                self.registry.remove(&self.nodes[label.0].id);
            }
        }
    }
}
