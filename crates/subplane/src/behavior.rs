//! Reacts to the host's toggle-collapse command on vendor documents.
//!
//! [`CompatBehavior`] hooks into [`TOGGLE_COLLAPSE`] after it executed. If the
//! document carries the configured marker and the toggled shape is a
//! sub-process, it runs [`EXPAND_SUBPROCESS`] or [`COLLAPSE_SUBPROCESS`] on the
//! same command stack, so the migration joins the toggle's undo entry.

use std::rc::Rc;

use log::{debug, info, trace};

use subplane_core::{definitions::DiagramRef, semantic::ElementKind};

use crate::{
    cmd::{
        COLLAPSE_SUBPROCESS, CollapseSubProcessHandler, EXPAND_SUBPROCESS,
        ExpandSubProcessHandler, SubProcessContext,
    },
    command::{CommandContext, CommandInterceptor, CommandStack},
    config::CompatConfig,
    error::SubplaneError,
    import::ElementImporter,
    modeler::Modeler,
    toggle::TOGGLE_COLLAPSE,
};

/// Dispatches expand and collapse after a sub-process was toggled.
#[derive(Debug, Clone)]
pub struct CompatBehavior {
    marker: String,
}

impl CompatBehavior {
    /// Creates the behavior for documents carrying `marker`.
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Registers the expand and collapse commands and hooks the behavior
    /// into [`TOGGLE_COLLAPSE`] at the configured priority.
    pub fn register(
        stack: &mut CommandStack,
        config: &CompatConfig,
        importer: Rc<dyn ElementImporter>,
    ) {
        stack.register(
            EXPAND_SUBPROCESS,
            Rc::new(ExpandSubProcessHandler::new(
                Rc::clone(&importer),
                config.recenter_on_expand(),
            )),
        );
        stack.register(
            COLLAPSE_SUBPROCESS,
            Rc::new(CollapseSubProcessHandler::new(importer)),
        );
        stack.register_interceptor(
            &[TOGGLE_COLLAPSE],
            config.priority(),
            Rc::new(Self::new(config.marker())),
        );
        info!(marker = config.marker(), priority = config.priority(); "Registered sub-process behavior");
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }
}

impl CommandInterceptor for CompatBehavior {
    fn post_executed(
        &self,
        _command: &str,
        context: &CommandContext,
        stack: &mut CommandStack,
        modeler: &mut Modeler,
    ) -> Result<(), SubplaneError> {
        let CommandContext::ToggleCollapse(toggle) = context else {
            return Ok(());
        };
        if !modeler.definitions().has_attribute_value(&self.marker) {
            trace!("Document has no vendor marker");
            return Ok(());
        }

        let shape = toggle.shape();
        let node = modeler
            .canvas()
            .node(shape)
            .ok_or(SubplaneError::UnknownNode(shape))?;
        let element = node.business_object();
        let collapsed = node.is_collapsed();
        let is_sub_process = modeler
            .definitions()
            .element(element)
            .is_some_and(|e| e.kind() == ElementKind::SubProcess);
        if !is_sub_process {
            return Ok(());
        }

        let diagram = modeler
            .definitions()
            .find_diagram(element)
            .map(DiagramRef::Resolved);
        if collapsed {
            stack.execute(
                COLLAPSE_SUBPROCESS,
                SubProcessContext::new(shape, diagram),
                modeler,
            )
        } else if diagram.is_some() {
            stack.execute(
                EXPAND_SUBPROCESS,
                SubProcessContext::new(shape, diagram),
                modeler,
            )
        } else {
            debug!(element:% = element; "No private diagram to expand");
            Ok(())
        }
    }
}
