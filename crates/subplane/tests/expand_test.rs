//! Integration tests for expanding sub-processes kept in private diagrams.

mod common;

use std::{cell::RefCell, rc::Rc};

use float_cmp::approx_eq;

use subplane::{
    events::{DEFAULT_PRIORITY, EventKind},
    geometry::Bounds,
    identifier::Id,
    import::ImportReport,
};

use common::{BOUNDARY_LABEL, NESTED_CONTENT, editor, is_hidden, nested_collapsed, node, plane_elements};

#[test]
fn test_expand_moves_private_plane_and_draws_content() {
    let mut editor = editor(nested_collapsed());
    assert!(editor.import_report().is_clean());

    editor.toggle_collapse(Id::new("SubProcess_1")).unwrap();

    assert_eq!(plane_elements(&editor, "SubProcess_1"), Some(Vec::new()));
    let process_plane = plane_elements(&editor, "Process_1").unwrap();
    for id in NESTED_CONTENT {
        assert!(process_plane.contains(&format!("{id}_di")), "{id} not moved");
        assert!(node(&editor, id).is_some(), "{id} not drawn");
    }

    let sub = node(&editor, "SubProcess_1").unwrap();
    let task = node(&editor, "Task_1").unwrap();
    let boundary = node(&editor, "BoundaryEvent_1").unwrap();
    assert_eq!(editor.canvas().node(task).unwrap().parent(), Some(sub));
    assert_eq!(editor.canvas().node(boundary).unwrap().host(), Some(task));
    let label = editor.canvas().node(boundary).unwrap().label().unwrap();
    assert_eq!(editor.canvas().node(label).unwrap().bounds().to_size(), BOUNDARY_LABEL);
    assert!(!is_hidden(&editor, "Task_1"));
    assert!(node(&editor, "Task_Nested").is_none());
}

#[test]
fn test_undo_restores_private_plane() {
    let mut editor = editor(nested_collapsed());
    let before = plane_elements(&editor, "SubProcess_1").unwrap();
    let process_before = plane_elements(&editor, "Process_1").unwrap();

    editor.toggle_collapse(Id::new("SubProcess_1")).unwrap();
    assert!(editor.undo().unwrap());

    assert_eq!(plane_elements(&editor, "SubProcess_1").unwrap(), before);
    assert_eq!(plane_elements(&editor, "Process_1").unwrap(), process_before);
    for id in NESTED_CONTENT {
        assert!(node(&editor, id).is_none(), "{id} still drawn");
        let element = editor.definitions().element(Id::new(id)).unwrap();
        assert!(element.di().is_none(), "{id} still bound");
    }

    let sub = node(&editor, "SubProcess_1").unwrap();
    assert!(editor.canvas().node(sub).unwrap().is_collapsed());
    assert!(editor.canvas().children(sub).is_empty());
}

#[test]
fn test_undo_returns_records_without_a_known_element() {
    let mut editor = editor(common::unreferenced_di());
    let private_before = plane_elements(&editor, "SubProcess_1").unwrap();
    let process_before = plane_elements(&editor, "Process_1").unwrap();
    assert_eq!(private_before, ["Task_1_di", "Orphan_di", "Ghost_di"]);

    editor.toggle_collapse(Id::new("SubProcess_1")).unwrap();
    assert_eq!(plane_elements(&editor, "SubProcess_1"), Some(Vec::new()));
    assert!(node(&editor, "Task_1").is_some());

    editor.undo().unwrap();
    assert_eq!(plane_elements(&editor, "SubProcess_1").unwrap(), private_before);
    assert_eq!(plane_elements(&editor, "Process_1").unwrap(), process_before);

    editor.redo().unwrap();
    editor.undo().unwrap();
    assert_eq!(plane_elements(&editor, "SubProcess_1").unwrap(), private_before);
    assert_eq!(plane_elements(&editor, "Process_1").unwrap(), process_before);
}

#[test]
fn test_redo_reuses_the_same_nodes() {
    let mut editor = editor(nested_collapsed());
    editor.toggle_collapse(Id::new("SubProcess_1")).unwrap();
    let drawn: Vec<_> = NESTED_CONTENT
        .iter()
        .map(|id| node(&editor, id).unwrap())
        .collect();
    let label = editor
        .canvas()
        .node(node(&editor, "BoundaryEvent_1").unwrap())
        .unwrap()
        .label();
    let allocated = editor.canvas().allocated();

    editor.undo().unwrap();
    assert!(editor.redo().unwrap());

    let redrawn: Vec<_> = NESTED_CONTENT
        .iter()
        .map(|id| node(&editor, id).unwrap())
        .collect();
    assert_eq!(redrawn, drawn);
    assert_eq!(editor.canvas().allocated(), allocated);
    let boundary = editor.canvas().node(drawn[3]).unwrap();
    assert_eq!(boundary.label(), label);
    assert!(editor.canvas().is_attached(label.unwrap()));
    assert_eq!(boundary.host(), Some(drawn[0]));
    assert_eq!(plane_elements(&editor, "SubProcess_1"), Some(Vec::new()));
}

#[test]
fn test_dangling_source_is_a_single_warning() {
    let mut editor = editor(common::dangling_source());
    let reports: Rc<RefCell<Vec<(EventKind, Option<ImportReport>)>>> = Rc::default();
    let sink = Rc::clone(&reports);
    editor.events_mut().on(
        &[EventKind::RenderStart, EventKind::RenderComplete, EventKind::Done],
        DEFAULT_PRIORITY,
        move |event| {
            sink.borrow_mut()
                .push((event.kind(), event.report().cloned()));
        },
    );

    editor.toggle_collapse(Id::new("SubProcess_1")).unwrap();

    let reports = reports.borrow();
    let kinds: Vec<_> = reports.iter().map(|(kind, _)| *kind).collect();
    assert_eq!(
        kinds,
        [EventKind::RenderStart, EventKind::RenderComplete, EventKind::Done]
    );
    let report = reports[2].1.as_ref().unwrap();
    assert_eq!(report.sub_process(), Id::new("SubProcess_1"));
    assert!(report.error().is_none());
    assert_eq!(report.warnings().len(), 1);
    assert!(
        report.warnings()[0]
            .message()
            .contains("source Ref not specified"),
        "unexpected warning: {}",
        report.warnings()[0]
    );
    assert!(node(&editor, "Task_1").is_some());
    assert!(node(&editor, "SequenceFlow_1").is_none());
}

#[test]
fn test_expand_recenters_content() {
    let mut editor = editor(common::off_center());

    editor.toggle_collapse(Id::new("SubProcess_1")).unwrap();

    let task = node(&editor, "Task_1").unwrap();
    let center = editor.canvas().node(task).unwrap().bounds().center();
    assert!(approx_eq!(f32, center.x(), 200.0, ulps = 2));
    assert!(approx_eq!(f32, center.y(), 200.0, ulps = 2));
    let di = editor
        .definitions()
        .element(Id::new("Task_1"))
        .and_then(|element| element.di())
        .unwrap();
    assert_eq!(
        editor.definitions().di(di).bounds(),
        Some(Bounds::new(175.0, 175.0, 50.0, 50.0))
    );

    editor.undo().unwrap();

    assert_eq!(
        editor.definitions().di(di).bounds(),
        Some(Bounds::new(0.0, 0.0, 50.0, 50.0))
    );
}

#[test]
fn test_expand_without_recentering_keeps_coordinates() {
    let config = subplane::config::CompatConfig::from_toml_str("recenter_on_expand = false").unwrap();
    let mut editor = subplane::Editor::new(common::off_center(), &config).unwrap();

    editor.toggle_collapse(Id::new("SubProcess_1")).unwrap();

    let task = node(&editor, "Task_1").unwrap();
    assert_eq!(
        editor.canvas().node(task).unwrap().bounds(),
        Bounds::new(0.0, 0.0, 50.0, 50.0)
    );
}
