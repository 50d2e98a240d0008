//! The host's collapse/expand toggle.
//!
//! Toggling flips a shape's collapsed flag, mirrors it into the
//! `isExpanded` attribute of the shape's DI, and hides or shows its
//! descendants. A descendant of a nested collapsed shape stays hidden when
//! the outer shape is expanded.

use std::collections::HashMap;

use log::info;

use crate::{
    canvas::{Canvas, NodeId},
    command::{CommandContext, CommandHandler},
    error::SubplaneError,
    modeler::Modeler,
};

/// Name of the toggle command.
pub const TOGGLE_COLLAPSE: &str = "shape.toggle-collapse";

/// Context of one toggle.
#[derive(Debug, Clone)]
pub struct ToggleCollapseContext {
    shape: NodeId,
    previous_visibility: HashMap<NodeId, bool>,
}

impl ToggleCollapseContext {
    pub fn new(shape: NodeId) -> Self {
        Self {
            shape,
            previous_visibility: HashMap::new(),
        }
    }

    /// Returns the toggled shape.
    pub fn shape(&self) -> NodeId {
        self.shape
    }
}

/// Handler of [`TOGGLE_COLLAPSE`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ToggleCollapseHandler;

impl CommandHandler for ToggleCollapseHandler {
    fn execute(
        &self,
        context: &mut CommandContext,
        modeler: &mut Modeler,
    ) -> Result<(), SubplaneError> {
        let context = context.toggle_mut(TOGGLE_COLLAPSE)?;
        let (definitions, canvas, _) = modeler.parts_mut();
        let shape = canvas
            .node(context.shape)
            .ok_or(SubplaneError::UnknownNode(context.shape))?;
        let collapsed = !shape.is_collapsed();
        let business_object = shape.business_object();

        let children = canvas.children(context.shape).to_vec();
        context.previous_visibility = visibility(canvas, &children);

        canvas.set_collapsed(context.shape, collapsed);
        if let Some(di) = definitions.element(business_object).and_then(|e| e.di()) {
            definitions.set_di_expanded(di, !collapsed);
        }
        set_hidden_recursive(canvas, &children, collapsed);

        info!(element:% = business_object, collapsed; "Toggled shape");
        Ok(())
    }

    fn revert(
        &self,
        context: &mut CommandContext,
        modeler: &mut Modeler,
    ) -> Result<(), SubplaneError> {
        let context = context.toggle_mut(TOGGLE_COLLAPSE)?;
        let (definitions, canvas, _) = modeler.parts_mut();
        let shape = canvas
            .node(context.shape)
            .ok_or(SubplaneError::UnknownNode(context.shape))?;
        let collapsed = !shape.is_collapsed();
        let business_object = shape.business_object();

        canvas.set_collapsed(context.shape, collapsed);
        if let Some(di) = definitions.element(business_object).and_then(|e| e.di()) {
            definitions.set_di_expanded(di, !collapsed);
        }
        for (&node, &hidden) in &context.previous_visibility {
            canvas.set_hidden(node, hidden);
        }

        info!(element:% = business_object, collapsed; "Reverted toggle");
        Ok(())
    }
}

fn visibility(canvas: &Canvas, nodes: &[NodeId]) -> HashMap<NodeId, bool> {
    let mut result = HashMap::new();
    let mut stack = nodes.to_vec();
    while let Some(node) = stack.pop() {
        if let Some(n) = canvas.node(node) {
            result.insert(node, n.is_hidden());
            stack.extend_from_slice(n.children());
        }
    }
    result
}

fn set_hidden_recursive(canvas: &mut Canvas, nodes: &[NodeId], hidden: bool) {
    for &node in nodes {
        canvas.set_hidden(node, hidden);

        let collapsed = canvas.node(node).is_some_and(|n| n.is_collapsed());
        let children = canvas.children(node).to_vec();
        set_hidden_recursive(canvas, &children, hidden || collapsed);
    }
}
