//! The document, its live surface and the event bus, held together.

use std::collections::HashMap;

use log::info;

use subplane_core::definitions::Definitions;

use crate::{
    canvas::Canvas,
    error::SubplaneError,
    events::EventBus,
    import::{ElementImporter, ImportReport, TreeImport},
};

/// The state every command operates on.
#[derive(Debug)]
pub struct Modeler {
    definitions: Definitions,
    canvas: Canvas,
    events: EventBus,
}

impl Modeler {
    /// Draws the first diagram of `definitions` on a fresh canvas.
    ///
    /// Per-element problems are returned as warnings in the report; they do
    /// not prevent the import.
    ///
    /// # Errors
    ///
    /// Returns [`SubplaneError::NoDiagram`] if the document has no diagram.
    pub fn import(
        mut definitions: Definitions,
        importer: &dyn ElementImporter,
    ) -> Result<(Self, ImportReport), SubplaneError> {
        let diagram = definitions.diagrams().next().ok_or(SubplaneError::NoDiagram)?;
        let plane = definitions.diagram_plane(diagram);
        let root = plane.bpmn_element();
        let elements: Vec<_> = plane.plane_elements().iter().copied().collect();

        let mut canvas = Canvas::new(root);
        let host = canvas.root_element();
        let mut cache = HashMap::new();
        let mut import = TreeImport::new(importer, &mut cache);
        import.register(&mut definitions, &elements);
        let report = import.run(&definitions, &mut canvas, root, host);

        info!(
            root:% = root,
            elements = elements.len(),
            warnings = report.warnings().len();
            "Imported document"
        );
        let modeler = Self {
            definitions,
            canvas,
            events: EventBus::new(),
        };
        Ok((modeler, report))
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Borrows the document, the canvas and the event bus at once.
    pub fn parts_mut(&mut self) -> (&mut Definitions, &mut Canvas, &mut EventBus) {
        (&mut self.definitions, &mut self.canvas, &mut self.events)
    }
}
