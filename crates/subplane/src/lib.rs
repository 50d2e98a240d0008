//! Subplane - expandable BPMN sub-processes for documents that keep
//! sub-process content in separate diagrams.
//!
//! Some modelers store the content of a collapsed sub-process in a private
//! `BPMNDiagram` instead of the process diagram. Subplane moves that content
//! onto the process plane when the sub-process is expanded, and back into the
//! private diagram when it is collapsed, keeping the semantic tree, the
//! diagram interchange and the live [`canvas`] consistent. Both moves are
//! commands on an undoable [`command::CommandStack`], and redo reuses the
//! very node instances the first run created.
//!
//! [`Editor`] wires everything together for the common case.

pub mod behavior;
pub mod canvas;
pub mod cmd;
pub mod command;
pub mod config;
pub mod events;
pub mod import;
pub mod layout;
pub mod modeler;
pub mod relocate;
pub mod removal;
pub mod toggle;

mod error;

pub use subplane_core::{definitions, di, geometry, identifier, semantic};

pub use error::SubplaneError;

use std::rc::Rc;

use log::info;

use behavior::CompatBehavior;
use canvas::Canvas;
use command::{CommandContext, CommandStack};
use config::CompatConfig;
use definitions::Definitions;
use events::EventBus;
use identifier::Id;
use import::{ElementImporter, ImportReport, SurfaceImporter};
use modeler::Modeler;
use toggle::{TOGGLE_COLLAPSE, ToggleCollapseContext, ToggleCollapseHandler};

/// A document opened for editing, with the sub-process behavior installed.
///
/// # Examples
///
/// ```
/// use subplane::{Editor, config::CompatConfig, definitions::Definitions};
///
/// let mut definitions = Definitions::new("Definitions_1");
/// let process = definitions.add_process("Process_1").unwrap();
/// let diagram = definitions.create_diagram(process);
/// definitions.add_diagram(diagram);
///
/// let editor = Editor::new(definitions, &CompatConfig::default()).unwrap();
///
/// assert!(editor.import_report().is_clean());
/// assert!(!editor.can_undo());
/// ```
#[derive(Debug)]
pub struct Editor {
    modeler: Modeler,
    commands: CommandStack,
    import_report: ImportReport,
}

impl Editor {
    /// Opens `definitions` with the default [`SurfaceImporter`].
    ///
    /// # Errors
    ///
    /// Returns [`SubplaneError::NoDiagram`] if the document has no diagram.
    pub fn new(definitions: Definitions, config: &CompatConfig) -> Result<Self, SubplaneError> {
        Self::with_importer(definitions, config, Rc::new(SurfaceImporter))
    }

    /// Opens `definitions`, drawing elements with `importer`.
    ///
    /// # Errors
    ///
    /// See [`Editor::new`].
    pub fn with_importer(
        definitions: Definitions,
        config: &CompatConfig,
        importer: Rc<dyn ElementImporter>,
    ) -> Result<Self, SubplaneError> {
        let (modeler, import_report) = Modeler::import(definitions, importer.as_ref())?;

        let mut commands = CommandStack::new();
        commands.register(TOGGLE_COLLAPSE, Rc::new(ToggleCollapseHandler));
        CompatBehavior::register(&mut commands, config, importer);

        info!(
            warnings = import_report.warnings().len(),
            nodes = modeler.canvas().elements().count();
            "Opened document"
        );
        Ok(Self {
            modeler,
            commands,
            import_report,
        })
    }

    /// Toggles the collapsed state of the shape drawing `element`.
    ///
    /// # Errors
    ///
    /// Returns [`SubplaneError::UnknownElement`] if `element` is not on the
    /// canvas, and propagates command errors.
    pub fn toggle_collapse(&mut self, element: Id) -> Result<(), SubplaneError> {
        let shape = self
            .modeler
            .canvas()
            .get(element)
            .ok_or(SubplaneError::UnknownElement(element))?;
        self.execute(TOGGLE_COLLAPSE, ToggleCollapseContext::new(shape))
    }

    /// Executes a registered command.
    ///
    /// # Errors
    ///
    /// See [`CommandStack::execute`].
    pub fn execute(
        &mut self,
        command: &str,
        context: impl Into<CommandContext>,
    ) -> Result<(), SubplaneError> {
        self.commands.execute(command, context, &mut self.modeler)
    }

    /// Undoes the last command. Returns `false` if there was nothing to undo.
    ///
    /// # Errors
    ///
    /// Propagates command errors.
    pub fn undo(&mut self) -> Result<bool, SubplaneError> {
        self.commands.undo(&mut self.modeler)
    }

    /// Redoes the last undone command. Returns `false` if there was nothing
    /// to redo.
    ///
    /// # Errors
    ///
    /// Propagates command errors.
    pub fn redo(&mut self) -> Result<bool, SubplaneError> {
        self.commands.redo(&mut self.modeler)
    }

    pub fn can_undo(&self) -> bool {
        self.commands.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.commands.can_redo()
    }

    pub fn modeler(&self) -> &Modeler {
        &self.modeler
    }

    pub fn modeler_mut(&mut self) -> &mut Modeler {
        &mut self.modeler
    }

    pub fn commands_mut(&mut self) -> &mut CommandStack {
        &mut self.commands
    }

    pub fn definitions(&self) -> &Definitions {
        self.modeler.definitions()
    }

    pub fn canvas(&self) -> &Canvas {
        self.modeler.canvas()
    }

    /// The bus on which expand commands publish their import events.
    pub fn events_mut(&mut self) -> &mut EventBus {
        self.modeler.events_mut()
    }

    /// Warnings of the initial import.
    pub fn import_report(&self) -> &ImportReport {
        &self.import_report
    }
}
