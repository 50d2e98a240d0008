//! Expands a collapsed sub-process, then undoes and redoes the expansion.
//!
//! Pass a TOML configuration file as the first argument to override the
//! defaults. Set `RUST_LOG=debug` to see what moves.

use std::{env, process};

use log::{LevelFilter, error, info};

use subplane::{
    Editor,
    config::{CompatConfig, DEFAULT_MARKER, load_config},
    definitions::Definitions,
    di::DiElement,
    events::{DEFAULT_PRIORITY, EventKind},
    geometry::{Bounds, Point},
    identifier::Id,
    semantic::ElementKind,
};

fn document() -> Result<Definitions, subplane::SubplaneError> {
    let mut definitions = Definitions::new("Definitions_1");
    definitions.set_attribute("xmlns:signavio", DEFAULT_MARKER);
    let process = definitions.add_process("Process_1")?;
    let sub = definitions.add_element(ElementKind::SubProcess, "SubProcess_1", process)?;
    let start = definitions.add_element(ElementKind::StartEvent, "StartEvent_1", sub)?;
    let task = definitions.add_element(ElementKind::Task, "Task_1", sub)?;
    definitions.add_sequence_flow("SequenceFlow_1", sub, Some(start), Some(task))?;

    let main = definitions.create_diagram(process);
    definitions.add_diagram(main);
    definitions.add_plane_element(
        main,
        DiElement::shape(
            Id::new("SubProcess_1_di"),
            Some(sub),
            Bounds::new(100.0, 100.0, 400.0, 250.0),
        )
        .with_expanded(false),
    );

    let private = definitions.create_diagram(sub);
    definitions.add_diagram(private);
    definitions.add_shape_di(private, start, Bounds::new(0.0, 22.0, 36.0, 36.0))?;
    definitions.add_shape_di(private, task, Bounds::new(100.0, 0.0, 100.0, 80.0))?;
    definitions.add_edge_di(
        private,
        Id::new("SequenceFlow_1"),
        vec![Point::new(36.0, 40.0), Point::new(100.0, 40.0)],
    )?;
    Ok(definitions)
}

fn run() -> Result<(), subplane::SubplaneError> {
    let config = match env::args().nth(1) {
        Some(path) => load_config(&path)?,
        None => CompatConfig::default(),
    };

    let mut editor = Editor::new(document()?, &config)?;
    editor
        .events_mut()
        .on(&[EventKind::Done], DEFAULT_PRIORITY, |event| {
            if let Some(report) = event.report() {
                for warning in report.warnings() {
                    error!(warning:%; "Import warning");
                }
                info!(sub_process:% = report.sub_process(), clean = report.is_clean(); "Import done");
            }
        });

    let sub = Id::new("SubProcess_1");
    editor.toggle_collapse(sub)?;
    info!(nodes = editor.canvas().elements().count(); "Expanded");

    editor.undo()?;
    info!(nodes = editor.canvas().elements().count(); "Undone");

    editor.redo()?;
    info!(nodes = editor.canvas().elements().count(); "Redone");
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(err) = run() {
        error!(err:%; "Example failed");
        process::exit(1);
    }
}
