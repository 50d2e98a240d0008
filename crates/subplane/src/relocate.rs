//! Moving DI elements between planes.
//!
//! A DI element always belongs to exactly one plane. Relocation first
//! appends every element to the target plane and only then removes each one
//! from the source plane, rewriting its `$parent` in the same step, so no
//! element is ever without a plane.

use log::debug;

use subplane_core::{
    definitions::Definitions,
    di::{DiId, PlaneId},
    identifier::Id,
};

/// Moves `elements` (or, if `None`, every element) of `source` to `target`.
///
/// Elements already in `target` are not duplicated. Returns the moved
/// elements in the order they were processed.
pub fn move_visual_elements(
    definitions: &mut Definitions,
    source: PlaneId,
    target: PlaneId,
    elements: Option<&[DiId]>,
) -> Vec<DiId> {
    let elements: Vec<DiId> = match elements {
        Some(elements) => elements.to_vec(),
        None => definitions
            .plane(source)
            .plane_elements()
            .iter()
            .copied()
            .collect(),
    };

    for &di in &elements {
        definitions.append_plane_element(target, di);
    }
    for &di in &elements {
        definitions.detach_plane_element(source, di, target);
    }

    debug!(
        source:% = definitions.plane(source).id(),
        target:% = definitions.plane(target).id(),
        count = elements.len();
        "Moved DI elements"
    );
    elements
}

/// Returns the elements of `plane` whose semantic element lies below
/// `ancestor` in the containment tree, in plane order.
pub fn descendant_visual_elements(
    definitions: &Definitions,
    plane: PlaneId,
    ancestor: Id,
) -> Vec<DiId> {
    definitions
        .plane(plane)
        .plane_elements()
        .iter()
        .copied()
        .filter(|&di| {
            definitions
                .di(di)
                .bpmn_element()
                .is_some_and(|element| definitions.has_ancestor(element, ancestor))
        })
        .collect()
}

/// Clears the `di` back-reference of the semantic elements drawn by
/// `elements`.
///
/// Only back-references pointing at one of `elements` are cleared; records
/// without a known element, or whose element is bound elsewhere, are skipped.
pub fn unbind_visual_elements(definitions: &mut Definitions, elements: &[DiId]) {
    for &di in elements {
        let Some(element) = definitions.di(di).bpmn_element() else {
            continue;
        };
        if definitions
            .element(element)
            .is_some_and(|semantic| semantic.di() == Some(di))
        {
            definitions.clear_di(element);
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use subplane_core::{
        di::{DiElement, DiagramId},
        geometry::Bounds,
        semantic::ElementKind,
    };

    use super::*;

    struct Planes {
        definitions: Definitions,
        process: DiagramId,
        private: DiagramId,
    }

    /// Process_1 > [SubProcess_1 > [Task_1, SubProcess_Nested > [Task_Nested]], SubProcess_2 > [Task_2]]
    fn planes() -> Planes {
        let mut definitions = Definitions::new("Definitions_1");
        let process = definitions.add_process("Process_1").unwrap();
        let sub = definitions
            .add_element(ElementKind::SubProcess, "SubProcess_1", process)
            .unwrap();
        let nested = definitions
            .add_element(ElementKind::SubProcess, "SubProcess_Nested", sub)
            .unwrap();
        let sibling = definitions
            .add_element(ElementKind::SubProcess, "SubProcess_2", process)
            .unwrap();
        definitions.add_element(ElementKind::Task, "Task_1", sub).unwrap();
        definitions
            .add_element(ElementKind::Task, "Task_Nested", nested)
            .unwrap();
        definitions
            .add_element(ElementKind::Task, "Task_2", sibling)
            .unwrap();

        let process_diagram = definitions.create_diagram(process);
        definitions.add_diagram(process_diagram);
        let private = definitions.create_diagram(sub);
        definitions.add_diagram(private);

        for id in [
            "SubProcess_1",
            "Task_1",
            "SubProcess_Nested",
            "Task_Nested",
            "SubProcess_2",
            "Task_2",
        ] {
            definitions
                .add_shape_di(process_diagram, Id::new(id), Bounds::new(0.0, 0.0, 10.0, 10.0))
                .unwrap();
        }

        Planes {
            definitions,
            process: process_diagram,
            private,
        }
    }

    fn names(definitions: &Definitions, elements: &[DiId]) -> Vec<String> {
        elements
            .iter()
            .filter_map(|&di| definitions.di(di).bpmn_element())
            .map(|id| id.to_string())
            .collect()
    }

    #[test]
    fn test_filter_follows_full_ancestor_chain() {
        let fx = planes();
        let plane = fx.definitions.diagram(fx.process).plane();

        let selected = descendant_visual_elements(&fx.definitions, plane, Id::new("SubProcess_1"));

        assert_eq!(
            names(&fx.definitions, &selected),
            ["Task_1", "SubProcess_Nested", "Task_Nested"]
        );
    }

    #[test]
    fn test_move_keeps_membership_and_parent_in_sync() {
        let mut fx = planes();
        let source = fx.definitions.diagram(fx.process).plane();
        let target = fx.definitions.diagram(fx.private).plane();
        let selected = descendant_visual_elements(&fx.definitions, source, Id::new("SubProcess_1"));

        let moved = move_visual_elements(&mut fx.definitions, source, target, Some(&selected));

        assert_eq!(moved, selected);
        for &di in &selected {
            assert!(fx.definitions.plane(target).contains(di));
            assert!(!fx.definitions.plane(source).contains(di));
            assert_eq!(fx.definitions.di(di).parent(), Some(target));
        }
        assert_eq!(fx.definitions.plane(source).plane_elements().len(), 3);

        let back = move_visual_elements(&mut fx.definitions, target, source, None);
        assert_eq!(back, selected);
        assert!(fx.definitions.plane(target).plane_elements().is_empty());
        assert_eq!(fx.definitions.plane(source).plane_elements().len(), 6);
    }

    #[test]
    fn test_unbind_clears_back_references() {
        let mut fx = planes();
        let plane = fx.definitions.diagram(fx.process).plane();
        let selected = descendant_visual_elements(&fx.definitions, plane, Id::new("SubProcess_1"));
        for &di in &selected {
            fx.definitions.bind_di(di).unwrap();
        }

        unbind_visual_elements(&mut fx.definitions, &selected);

        for &di in &selected {
            let element = fx.definitions.di(di).bpmn_element().unwrap();
            assert_eq!(fx.definitions.element(element).unwrap().di(), None);
        }
    }

    #[test]
    fn test_unbind_skips_records_not_bound() {
        let mut fx = planes();
        let plane = fx.definitions.diagram(fx.process).plane();
        let bound = descendant_visual_elements(&fx.definitions, plane, Id::new("SubProcess_1"))[0];
        fx.definitions.bind_di(bound).unwrap();
        let duplicate = fx
            .definitions
            .add_shape_di(fx.private, Id::new("Task_1"), Bounds::new(0.0, 0.0, 10.0, 10.0))
            .unwrap();
        let orphan = fx.definitions.add_plane_element(
            fx.private,
            DiElement::shape(Id::new("Orphan_di"), None, Bounds::new(0.0, 0.0, 10.0, 10.0)),
        );

        unbind_visual_elements(&mut fx.definitions, &[duplicate, orphan]);

        let task = fx.definitions.element(Id::new("Task_1")).unwrap();
        assert_eq!(task.di(), Some(bound));
    }

    proptest! {
        #[test]
        fn prop_filter_selects_exactly_the_subtree(
            parents in (1usize..20).prop_flat_map(|len| {
                (0..len).map(|index| 0..=index).collect::<Vec<_>>()
            }),
            pick in any::<prop::sample::Index>(),
        ) {
            // Node 0 is the process; node i + 1 is a sub-process under node parents[i].
            let mut definitions = Definitions::new("Definitions_1");
            let mut ids = vec![definitions.add_process("P").unwrap()];
            for (index, &parent) in parents.iter().enumerate() {
                let id = definitions
                    .add_element(ElementKind::SubProcess, &format!("S{index}"), ids[parent])
                    .unwrap();
                ids.push(id);
            }
            let diagram = definitions.create_diagram(ids[0]);
            definitions.add_diagram(diagram);
            let mut drawn = Vec::new();
            for &id in &ids[1..] {
                drawn.push(
                    definitions
                        .add_shape_di(diagram, id, Bounds::new(0.0, 0.0, 1.0, 1.0))
                        .unwrap(),
                );
            }

            let root = pick.index(ids.len());
            let in_subtree = |mut node: usize| {
                while node != 0 {
                    node = parents[node - 1];
                    if node == root {
                        return true;
                    }
                }
                false
            };
            let expected: Vec<DiId> = (1..ids.len())
                .filter(|&node| in_subtree(node))
                .map(|node| drawn[node - 1])
                .collect();

            let plane = definitions.diagram(diagram).plane();
            let selected = descendant_visual_elements(&definitions, plane, ids[root]);

            prop_assert_eq!(selected, expected);
        }
    }
}
