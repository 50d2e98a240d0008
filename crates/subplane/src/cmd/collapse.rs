use std::rc::Rc;

use log::{info, warn};

use super::{
    SubProcessContext,
    expand::{business_object, process_diagram, restored_elements},
};
use crate::{
    command::{CommandContext, CommandHandler},
    error::SubplaneError,
    import::{ElementImporter, TreeImport},
    modeler::Modeler,
    relocate::{descendant_visual_elements, move_visual_elements, unbind_visual_elements},
    removal::delete_subtree,
};

/// Name of the collapse command.
pub const COLLAPSE_SUBPROCESS: &str = "subplane.collapse-subprocess";

/// Moves the drawn content of a sub-process into its private diagram and
/// removes it from the canvas.
///
/// The private diagram is created on first use and removed again when that
/// collapse is undone. Removed nodes are cached so that undo re-attaches the
/// same instances.
pub struct CollapseSubProcessHandler {
    importer: Rc<dyn ElementImporter>,
}

impl CollapseSubProcessHandler {
    pub fn new(importer: Rc<dyn ElementImporter>) -> Self {
        Self { importer }
    }
}

impl CommandHandler for CollapseSubProcessHandler {
    fn execute(
        &self,
        context: &mut CommandContext,
        modeler: &mut Modeler,
    ) -> Result<(), SubplaneError> {
        let context = context.sub_process_mut(COLLAPSE_SUBPROCESS)?;
        let (definitions, canvas, _) = modeler.parts_mut();
        let shape = context.sub_process();
        let sub_process = business_object(canvas, shape)?;
        let process = process_diagram(definitions, canvas)?;

        let private = match context.resolve_diagram(definitions) {
            Some(diagram) => diagram,
            None => definitions
                .find_diagram(sub_process)
                .unwrap_or_else(|| definitions.create_diagram(sub_process)),
        };
        context.set_diagram(private);
        if definitions.add_diagram(private) {
            context.set_created(true);
            info!(
                sub_process:% = sub_process,
                diagram:% = definitions.diagram(private).id();
                "Created private diagram"
            );
        }

        let source = definitions.diagram(process).plane();
        let target = definitions.diagram(private).plane();
        let elements = descendant_visual_elements(definitions, source, sub_process);
        unbind_visual_elements(definitions, &elements);
        let moved = move_visual_elements(definitions, source, target, Some(&elements));
        context.set_moved(moved);

        let children = canvas.children(shape).to_vec();
        let removed = delete_subtree(canvas, &children);
        let cached = context.cached_mut();
        for &node in &removed {
            if let Some(n) = canvas.node(node) {
                cached.entry(n.business_object()).or_insert(node);
            }
        }

        info!(
            sub_process:% = sub_process,
            elements = elements.len(),
            nodes = removed.len();
            "Collapsed sub-process"
        );
        Ok(())
    }

    fn revert(
        &self,
        context: &mut CommandContext,
        modeler: &mut Modeler,
    ) -> Result<(), SubplaneError> {
        let context = context.sub_process_mut(COLLAPSE_SUBPROCESS)?;
        let (definitions, canvas, _) = modeler.parts_mut();
        let Some(private) = context.resolve_diagram(definitions) else {
            return Ok(());
        };
        let shape = context.sub_process();
        let sub_process = business_object(canvas, shape)?;
        let process = process_diagram(definitions, canvas)?;
        let created = context.created();

        let source = definitions.diagram(private).plane();
        let target = definitions.diagram(process).plane();
        let elements = restored_elements(definitions, source, context.moved(), sub_process);

        let mut import = TreeImport::new(self.importer.as_ref(), context.cached_mut());
        import.register(definitions, &elements);
        move_visual_elements(definitions, source, target, Some(&elements));
        if created {
            definitions.remove_diagram(private);
        }
        let report = import.run(definitions, canvas, sub_process, shape);

        if let Some(err) = report.error() {
            warn!(sub_process:% = sub_process, err:%; "Failed to redraw sub-process");
        }
        for warning in report.warnings() {
            warn!(sub_process:% = sub_process, warning:%; "Import warning");
        }

        info!(
            sub_process:% = sub_process,
            elements = elements.len(),
            removed_diagram = created;
            "Reverted collapse"
        );
        Ok(())
    }
}
