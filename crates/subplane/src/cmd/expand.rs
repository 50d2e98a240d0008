use std::rc::Rc;

use log::{debug, info};

use subplane_core::{
    definitions::Definitions,
    di::{DiId, DiagramId, PlaneId},
    identifier::Id,
};

use super::SubProcessContext;
use crate::{
    canvas::{Canvas, NodeId},
    command::{CommandContext, CommandHandler},
    error::SubplaneError,
    import::{ElementImporter, TreeImport},
    layout::{recenter_children, translate},
    modeler::Modeler,
    relocate::{descendant_visual_elements, move_visual_elements, unbind_visual_elements},
    removal::delete_subtree,
};

/// Name of the expand command.
pub const EXPAND_SUBPROCESS: &str = "subplane.expand-subprocess";

/// Moves a sub-process's private diagram onto the process plane and draws
/// its content.
///
/// Without a private diagram the command does nothing. Import problems never
/// fail the command; they are reported through the import events.
pub struct ExpandSubProcessHandler {
    importer: Rc<dyn ElementImporter>,
    recenter: bool,
}

impl ExpandSubProcessHandler {
    /// Creates the handler. With `recenter`, expanded content is moved so
    /// that it is centered in the sub-process shape.
    pub fn new(importer: Rc<dyn ElementImporter>, recenter: bool) -> Self {
        Self { importer, recenter }
    }
}

impl CommandHandler for ExpandSubProcessHandler {
    fn execute(
        &self,
        context: &mut CommandContext,
        modeler: &mut Modeler,
    ) -> Result<(), SubplaneError> {
        let context = context.sub_process_mut(EXPAND_SUBPROCESS)?;
        let (definitions, canvas, events) = modeler.parts_mut();
        let Some(private) = context.resolve_diagram(definitions) else {
            debug!("No private diagram, nothing to expand");
            return Ok(());
        };
        let shape = context.sub_process();
        let sub_process = business_object(canvas, shape)?;
        let process = process_diagram(definitions, canvas)?;

        let source = definitions.diagram(private).plane();
        let target = definitions.diagram(process).plane();
        let elements: Vec<_> = definitions
            .plane(source)
            .plane_elements()
            .iter()
            .copied()
            .collect();

        let mut import = TreeImport::new(self.importer.as_ref(), context.cached_mut());
        import.register(definitions, &elements);
        let moved = move_visual_elements(definitions, source, target, None);
        let report = import.run_with_events(definitions, canvas, events, sub_process, shape);
        context.set_moved(moved);

        let offset = if self.recenter {
            recenter_children(definitions, canvas, shape)
        } else {
            None
        };
        context.set_offset(offset);

        info!(
            sub_process:% = sub_process,
            elements = elements.len(),
            warnings = report.warnings().len(),
            failed = report.error().is_some();
            "Expanded sub-process"
        );
        Ok(())
    }

    fn revert(
        &self,
        context: &mut CommandContext,
        modeler: &mut Modeler,
    ) -> Result<(), SubplaneError> {
        let context = context.sub_process_mut(EXPAND_SUBPROCESS)?;
        let (definitions, canvas, _) = modeler.parts_mut();
        let Some(private) = context.resolve_diagram(definitions) else {
            return Ok(());
        };
        let shape = context.sub_process();
        let sub_process = business_object(canvas, shape)?;
        let process = process_diagram(definitions, canvas)?;

        if let Some(offset) = context.offset() {
            let children = canvas.children(shape).to_vec();
            translate(definitions, canvas, &children, offset.negate());
        }

        let source = definitions.diagram(process).plane();
        let target = definitions.diagram(private).plane();
        let elements = restored_elements(definitions, source, context.moved(), sub_process);
        unbind_visual_elements(definitions, &elements);
        move_visual_elements(definitions, source, target, Some(&elements));

        let children = canvas.children(shape).to_vec();
        let removed = delete_subtree(canvas, &children);

        info!(
            sub_process:% = sub_process,
            elements = elements.len(),
            nodes = removed.len();
            "Reverted expand"
        );
        Ok(())
    }
}

pub(super) fn business_object(canvas: &Canvas, shape: NodeId) -> Result<Id, SubplaneError> {
    canvas
        .node(shape)
        .map(|node| node.business_object())
        .ok_or(SubplaneError::UnknownNode(shape))
}

/// Returns the elements to move back out of `source` when reverting: the
/// recorded `moved` list still found there, followed by any other
/// descendant of `sub_process` in plane order.
///
/// Reusing the recorded list keeps records that the containment filter
/// cannot attribute, such as ones without a `bpmnElement`.
pub(super) fn restored_elements(
    definitions: &Definitions,
    source: PlaneId,
    moved: &[DiId],
    sub_process: Id,
) -> Vec<DiId> {
    let plane = definitions.plane(source);
    let mut elements: Vec<DiId> = moved
        .iter()
        .copied()
        .filter(|&di| plane.contains(di))
        .collect();
    for di in descendant_visual_elements(definitions, source, sub_process) {
        if !elements.contains(&di) {
            elements.push(di);
        }
    }
    elements
}

/// Returns the diagram drawing the canvas's process.
pub(super) fn process_diagram(
    definitions: &Definitions,
    canvas: &Canvas,
) -> Result<DiagramId, SubplaneError> {
    let root = canvas.root_business_object();
    definitions
        .find_diagram(root)
        .ok_or(SubplaneError::MissingDiagram(root))
}
