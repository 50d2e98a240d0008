//! Documents shared by the integration tests.
//!
//! Every document declares the vendor namespace unless noted otherwise, and
//! its first diagram draws `Process_1`.

#![allow(dead_code)]

use subplane::{
    Editor,
    canvas::NodeId,
    config::{CompatConfig, DEFAULT_MARKER},
    definitions::Definitions,
    di::{DiElement, DiagramId},
    geometry::{Bounds, Point, Size},
    identifier::Id,
    semantic::ElementKind,
};

/// Size of the DI label drawn for `BoundaryEvent_1`.
pub const BOUNDARY_LABEL: Size = Size::new(80.0, 14.0);

fn document(marked: bool) -> (Definitions, Id, DiagramId) {
    let mut definitions = Definitions::new("Definitions_1");
    definitions.set_attribute("xmlns:bpmn", "http://www.omg.org/spec/BPMN/20100524/MODEL");
    if marked {
        definitions.set_attribute("xmlns:signavio", DEFAULT_MARKER);
    }
    let process = definitions.add_process("Process_1").unwrap();
    let diagram = definitions.create_diagram(process);
    definitions.add_diagram(diagram);
    (definitions, process, diagram)
}

fn sub_process_di(id: &str, bounds: Bounds, expanded: bool) -> DiElement {
    DiElement::shape(Id::new(&format!("{id}_di")), Some(Id::new(id)), bounds).with_expanded(expanded)
}

fn edge(definitions: &mut Definitions, diagram: DiagramId, id: &str, from: Point, to: Point) {
    definitions
        .add_edge_di(diagram, Id::new(id), vec![from, to])
        .unwrap();
}

/// `SubProcess_1` is collapsed on the process plane. Its private diagram
/// holds a task with a named boundary event, an end event, two flows and
/// `SubProcess_Nested`, which has a private diagram of its own. The sibling
/// `SubProcess_2` is collapsed with a private diagram holding `Task_2`.
pub fn nested_collapsed() -> Definitions {
    nested(true)
}

/// [`nested_collapsed`] without the vendor namespace.
pub fn nested_unmarked() -> Definitions {
    nested(false)
}

fn nested(marked: bool) -> Definitions {
    let (mut definitions, process, main) = document(marked);

    let start = definitions
        .add_element(ElementKind::StartEvent, "StartEvent_1", process)
        .unwrap();
    let sub = definitions
        .add_element(ElementKind::SubProcess, "SubProcess_1", process)
        .unwrap();
    let sibling = definitions
        .add_element(ElementKind::SubProcess, "SubProcess_2", process)
        .unwrap();
    definitions
        .add_sequence_flow("SequenceFlow_0", process, Some(start), Some(sub))
        .unwrap();

    let task = definitions.add_element(ElementKind::Task, "Task_1", sub).unwrap();
    let nested = definitions
        .add_element(ElementKind::SubProcess, "SubProcess_Nested", sub)
        .unwrap();
    let end = definitions
        .add_element(ElementKind::EndEvent, "EndEvent_1", sub)
        .unwrap();
    let boundary = definitions
        .add_boundary_event("BoundaryEvent_1", sub, Some(task))
        .unwrap();
    definitions.set_name(boundary, "Timeout").unwrap();
    definitions
        .add_sequence_flow("SequenceFlow_1", sub, Some(task), Some(nested))
        .unwrap();
    definitions
        .add_sequence_flow("SequenceFlow_2", sub, Some(boundary), Some(end))
        .unwrap();
    let nested_task = definitions
        .add_element(ElementKind::Task, "Task_Nested", nested)
        .unwrap();
    let sibling_task = definitions
        .add_element(ElementKind::Task, "Task_2", sibling)
        .unwrap();

    definitions
        .add_shape_di(main, start, Bounds::new(152.0, 102.0, 36.0, 36.0))
        .unwrap();
    definitions.add_plane_element(
        main,
        sub_process_di("SubProcess_1", Bounds::new(240.0, 80.0, 100.0, 80.0), false),
    );
    definitions.add_plane_element(
        main,
        sub_process_di("SubProcess_2", Bounds::new(400.0, 80.0, 100.0, 80.0), false),
    );
    edge(
        &mut definitions,
        main,
        "SequenceFlow_0",
        Point::new(188.0, 120.0),
        Point::new(240.0, 120.0),
    );

    let private = definitions.create_diagram(sub);
    definitions.add_diagram(private);
    definitions
        .add_shape_di(private, task, Bounds::new(100.0, 100.0, 100.0, 80.0))
        .unwrap();
    definitions.add_plane_element(
        private,
        sub_process_di("SubProcess_Nested", Bounds::new(260.0, 100.0, 100.0, 80.0), false),
    );
    definitions
        .add_shape_di(private, end, Bounds::new(262.0, 222.0, 36.0, 36.0))
        .unwrap();
    definitions.add_plane_element(
        private,
        DiElement::shape(
            Id::new("BoundaryEvent_1_di"),
            Some(boundary),
            Bounds::new(142.0, 162.0, 36.0, 36.0),
        )
        .with_label(Bounds::new_from_top_left(Point::new(120.0, 200.0), BOUNDARY_LABEL)),
    );
    edge(
        &mut definitions,
        private,
        "SequenceFlow_1",
        Point::new(200.0, 140.0),
        Point::new(260.0, 140.0),
    );
    edge(
        &mut definitions,
        private,
        "SequenceFlow_2",
        Point::new(160.0, 198.0),
        Point::new(262.0, 240.0),
    );

    let nested_private = definitions.create_diagram(nested);
    definitions.add_diagram(nested_private);
    definitions
        .add_shape_di(nested_private, nested_task, Bounds::new(100.0, 100.0, 100.0, 80.0))
        .unwrap();

    let sibling_private = definitions.create_diagram(sibling);
    definitions.add_diagram(sibling_private);
    definitions
        .add_shape_di(sibling_private, sibling_task, Bounds::new(100.0, 100.0, 100.0, 80.0))
        .unwrap();

    definitions
}

/// `SubProcess_1` is expanded on the process plane with two tasks and a
/// flow drawn inside it. There is no private diagram.
pub fn expanded() -> Definitions {
    let (mut definitions, process, main) = document(true);
    let sub = definitions
        .add_element(ElementKind::SubProcess, "SubProcess_1", process)
        .unwrap();
    let a = definitions.add_element(ElementKind::Task, "Task_1", sub).unwrap();
    let b = definitions.add_element(ElementKind::Task, "Task_2", sub).unwrap();
    definitions
        .add_sequence_flow("SequenceFlow_1", sub, Some(a), Some(b))
        .unwrap();

    definitions.add_plane_element(
        main,
        sub_process_di("SubProcess_1", Bounds::new(100.0, 100.0, 400.0, 200.0), true),
    );
    definitions
        .add_shape_di(main, a, Bounds::new(150.0, 160.0, 100.0, 80.0))
        .unwrap();
    definitions
        .add_shape_di(main, b, Bounds::new(350.0, 160.0, 100.0, 80.0))
        .unwrap();
    edge(
        &mut definitions,
        main,
        "SequenceFlow_1",
        Point::new(250.0, 200.0),
        Point::new(350.0, 200.0),
    );
    definitions
}

/// A collapsed `SubProcess_1` whose private diagram holds `Task_1` and a
/// flow into it that has no source.
pub fn dangling_source() -> Definitions {
    let (mut definitions, process, main) = document(true);
    let sub = definitions
        .add_element(ElementKind::SubProcess, "SubProcess_1", process)
        .unwrap();
    let task = definitions.add_element(ElementKind::Task, "Task_1", sub).unwrap();
    definitions
        .add_sequence_flow("SequenceFlow_1", sub, None, Some(task))
        .unwrap();

    definitions.add_plane_element(
        main,
        sub_process_di("SubProcess_1", Bounds::new(100.0, 100.0, 100.0, 80.0), false),
    );
    let private = definitions.create_diagram(sub);
    definitions.add_diagram(private);
    definitions
        .add_shape_di(private, task, Bounds::new(200.0, 100.0, 100.0, 80.0))
        .unwrap();
    edge(
        &mut definitions,
        private,
        "SequenceFlow_1",
        Point::new(100.0, 140.0),
        Point::new(200.0, 140.0),
    );
    definitions
}

/// A collapsed `SubProcess_1` at (100,100) sized 200x200 whose private
/// diagram holds a single 50x50 task at the origin.
pub fn off_center() -> Definitions {
    let (mut definitions, process, main) = document(true);
    let sub = definitions
        .add_element(ElementKind::SubProcess, "SubProcess_1", process)
        .unwrap();
    let task = definitions.add_element(ElementKind::Task, "Task_1", sub).unwrap();

    definitions.add_plane_element(
        main,
        sub_process_di("SubProcess_1", Bounds::new(100.0, 100.0, 200.0, 200.0), false),
    );
    let private = definitions.create_diagram(sub);
    definitions.add_diagram(private);
    definitions
        .add_shape_di(private, task, Bounds::new(0.0, 0.0, 50.0, 50.0))
        .unwrap();
    definitions
}

/// [`off_center`] with two records in the private diagram that draw no
/// known element: `Orphan_di` has no `bpmnElement` and `Ghost_di` points at
/// an element missing from the document.
pub fn unreferenced_di() -> Definitions {
    let mut definitions = off_center();
    let private = definitions.find_diagram(Id::new("SubProcess_1")).unwrap();
    definitions.add_plane_element(
        private,
        DiElement::shape(
            Id::new("Orphan_di"),
            None,
            Bounds::new_from_top_left(Point::new(60.0, 0.0), Size::new(50.0, 50.0)),
        ),
    );
    definitions.add_plane_element(
        private,
        DiElement::shape(
            Id::new("Ghost_di"),
            Some(Id::new("Ghost")),
            Bounds::new_from_top_left(Point::new(120.0, 0.0), Size::new(50.0, 50.0)),
        ),
    );
    definitions
}

pub fn editor(definitions: Definitions) -> Editor {
    Editor::new(definitions, &CompatConfig::default()).expect("document should open")
}

/// Returns the DI ids of the diagram drawing `root`, or `None` if the
/// document has no such diagram.
pub fn plane_elements(editor: &Editor, root: &str) -> Option<Vec<String>> {
    let definitions = editor.definitions();
    let diagram = definitions.find_diagram(Id::new(root))?;
    Some(
        definitions
            .diagram_plane(diagram)
            .plane_elements()
            .iter()
            .map(|&di| definitions.di(di).id().to_string())
            .collect(),
    )
}

pub fn node(editor: &Editor, id: &str) -> Option<NodeId> {
    editor.canvas().get(Id::new(id))
}

pub fn is_hidden(editor: &Editor, id: &str) -> bool {
    node(editor, id)
        .and_then(|node| editor.canvas().node(node))
        .is_some_and(|node| node.is_hidden())
}

/// The elements drawn inside `SubProcess_1` of [`nested_collapsed`].
pub const NESTED_CONTENT: [&str; 6] = [
    "Task_1",
    "SubProcess_Nested",
    "EndEvent_1",
    "BoundaryEvent_1",
    "SequenceFlow_1",
    "SequenceFlow_2",
];
