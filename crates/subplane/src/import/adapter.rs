//! Cache-aware tree import.

use std::collections::HashMap;

use log::{debug, info};

use subplane_core::{
    definitions::Definitions,
    di::DiId,
    identifier::Id,
    semantic::SemanticElement,
};

use super::{ElementImporter, ImportError, ImportReport, ImportWarning, TreeWalker, Visitor};
use crate::{
    canvas::{Canvas, Node, NodeId},
    events::{EventBus, ImportEvent},
};

/// Visitor that reuses cached nodes and caches the nodes it creates.
struct CachingVisitor<'a> {
    importer: &'a dyn ElementImporter,
    cache: &'a mut HashMap<Id, NodeId>,
    warnings: Vec<ImportWarning>,
    reused: usize,
}

impl Visitor for CachingVisitor<'_> {
    fn element(
        &mut self,
        element: &SemanticElement,
        parent: NodeId,
        definitions: &Definitions,
        canvas: &mut Canvas,
    ) -> Result<NodeId, ImportError> {
        let Some(&node) = self.cache.get(&element.id()) else {
            let node = self.importer.add(element, parent, definitions, canvas)?;
            self.cache.insert(element.id(), node);
            return Ok(node);
        };

        let hidden = canvas
            .node(parent)
            .is_some_and(|p| p.is_hidden() || p.is_collapsed());
        canvas.set_hidden(node, hidden);

        if canvas.node(node).is_some_and(Node::is_connection) {
            canvas.add_connection(node, parent)?;
        } else {
            canvas.add_shape(node, parent)?;
        }
        self.reused += 1;
        Ok(node)
    }

    fn error(&mut self, warning: ImportWarning) {
        self.warnings.push(warning);
    }
}

/// One materialization pass over a sub-process.
///
/// Register the DI elements of the plane being imported first, relocate them
/// if needed, then call [`TreeImport::run`] or
/// [`TreeImport::run_with_events`].
///
/// The `cache` maps element ids to the nodes drawn for them. On a cache hit
/// the cached node (with its label) is re-attached instead of creating a new
/// one; every node created on a miss is added to the cache.
///
/// # Examples
///
/// ```
/// # use std::collections::HashMap;
/// # use subplane::{canvas::Canvas, import::{SurfaceImporter, TreeImport}};
/// # use subplane_core::{definitions::Definitions, geometry::Bounds, semantic::ElementKind};
/// let mut definitions = Definitions::new("Definitions_1");
/// let process = definitions.add_process("Process_1").unwrap();
/// let task = definitions.add_element(ElementKind::Task, "Task_1", process).unwrap();
/// let diagram = definitions.create_diagram(process);
/// definitions.add_diagram(diagram);
/// let di = definitions.add_shape_di(diagram, task, Bounds::new(0.0, 0.0, 100.0, 80.0)).unwrap();
///
/// let mut canvas = Canvas::new(process);
/// let mut cache = HashMap::new();
/// let mut import = TreeImport::new(&SurfaceImporter, &mut cache);
/// import.register(&mut definitions, &[di]);
/// let root = canvas.root_element();
/// let report = import.run(&definitions, &mut canvas, process, root);
///
/// assert!(report.is_clean());
/// assert_eq!(canvas.get(task), cache.get(&task).copied());
/// ```
pub struct TreeImport<'a> {
    walker: TreeWalker<CachingVisitor<'a>>,
}

impl<'a> TreeImport<'a> {
    pub fn new(importer: &'a dyn ElementImporter, cache: &'a mut HashMap<Id, NodeId>) -> Self {
        Self {
            walker: TreeWalker::new(CachingVisitor {
                importer,
                cache,
                warnings: Vec::new(),
                reused: 0,
            }),
        }
    }

    /// Binds `elements` to their semantic elements, in the given order.
    pub fn register(&mut self, definitions: &mut Definitions, elements: &[DiId]) {
        for &di in elements {
            self.walker.register_di(definitions, di);
        }
        debug!(count = elements.len(); "Registered DI elements");
    }

    /// Draws the content of `sub_process` under `host`.
    ///
    /// A structural failure is recorded as the report's error rather than
    /// returned.
    pub fn run(
        mut self,
        definitions: &Definitions,
        canvas: &mut Canvas,
        sub_process: Id,
        host: NodeId,
    ) -> ImportReport {
        let result = self
            .walker
            .handle_container(definitions, canvas, sub_process, host)
            .and_then(|()| self.walker.handle_deferred(definitions, canvas));

        let visitor = self.walker.into_visitor();
        debug!(
            sub_process:% = sub_process,
            reused = visitor.reused,
            warnings = visitor.warnings.len();
            "Imported sub-process content"
        );
        ImportReport::new(sub_process, result.err(), visitor.warnings)
    }

    /// Like [`TreeImport::run`], surrounded by the import life-cycle events.
    pub fn run_with_events(
        self,
        definitions: &Definitions,
        canvas: &mut Canvas,
        events: &mut EventBus,
        sub_process: Id,
        host: NodeId,
    ) -> ImportReport {
        info!(sub_process:% = sub_process; "Rendering sub-process");
        events.fire(&ImportEvent::RenderStart { sub_process });

        let report = self.run(definitions, canvas, sub_process, host);

        events.fire(&ImportEvent::RenderComplete(&report));
        events.fire(&ImportEvent::Done(&report));
        report
    }
}
