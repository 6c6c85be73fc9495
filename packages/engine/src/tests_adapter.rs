/// Observation engine tests against the in-memory host
use crate::*;
use std::cell::Cell;
use std::rc::Rc;

/// A 1000x500 container holding one 800x400 element
fn setup() -> (MemoryHost, NodeId, NodeId) {
    let mut host = MemoryHost::new();
    let root = host.root();
    let container = host.append_element(root, "section");
    host.set_content_box(container, 1000.0, 500.0);
    let element = host.append_element(container, "div");
    host.set_content_box(element, 800.0, 400.0);
    (host, container, element)
}

fn counter() -> (Rc<Cell<usize>>, impl FnMut(&NodeId, &Snapshot) + 'static) {
    let calls = Rc::new(Cell::new(0));
    let handle = calls.clone();
    (calls, move |_: &NodeId, _: &Snapshot| handle.set(handle.get() + 1))
}

mod attach_tests {
    use super::*;

    #[test]
    fn test_attach_applies_labels_and_mirrors() {
        let (mut host, _, element) = setup();

        let adapter = attach(
            &mut host,
            AttachOptions::new(Target::one(element))
                .label("width >= 680px", "wide")
                .label("height > 680px", "tall"),
        )
        .unwrap();

        assert!(adapter.is_attached());
        assert_eq!(host.class_names(element), vec!["wide".to_string()]);
        assert_eq!(host.custom_property(element, "--ea-width"), Some("800px"));
        assert_eq!(host.custom_property(element, "--ea-height"), Some("400px"));
        assert_eq!(host.custom_property(element, "--ea-aspect-ratio"), Some("2"));
        assert_eq!(host.custom_property(element, "--ea-orientation"), Some("landscape"));
        assert_eq!(host.custom_property(element, "--ea-children"), None);
    }

    #[test]
    fn test_attach_rejects_empty_target() {
        let mut host = MemoryHost::new();
        let err = attach(
            &mut host,
            AttachOptions::new(Target::many(Vec::<NodeId>::new())).label("width > 1px", "a"),
        )
        .unwrap_err();

        assert_eq!(err, AttachError::empty_target());
    }

    #[test]
    fn test_attach_rejects_non_elements_and_lists_them() {
        let (mut host, container, element) = setup();
        let text = host.append_text(container, "hi");

        let err = attach(
            &mut host,
            AttachOptions::new(Target::many([element, text])).label("width > 1px", "a"),
        )
        .unwrap_err();

        let AttachError::InvalidTarget { message } = &err else {
            panic!("expected InvalidTarget, got {err:?}");
        };
        assert!(message.starts_with("target must be an Element or a list of Elements. Actual:\n["));
        assert!(message.contains(&format!("{element:?}")));
        assert!(message.contains(&format!("{text:?} (not an element)")));
    }

    #[test]
    fn test_attach_rejects_detached_nodes() {
        let (mut host, _, element) = setup();
        host.remove(element);

        let err = attach(
            &mut host,
            AttachOptions::new(Target::one(element)).label("width > 1px", "a"),
        )
        .unwrap_err();

        assert!(matches!(err, AttachError::InvalidTarget { .. }));
    }

    #[test]
    fn test_attach_rejects_invalid_query_verbatim() {
        let (mut host, _, element) = setup();

        let err = attach(
            &mut host,
            AttachOptions::new(Target::one(element))
                .label("width > 1px", "ok")
                .label("Width>1px", "bad"),
        )
        .unwrap_err();

        assert_eq!(
            err,
            AttachError::InvalidQuery(element_adapter_query::QueryError::invalid_query("Width>1px"))
        );
        assert!(host.class_names(element).is_empty());
        assert_eq!(host.custom_property(element, "--ea-width"), None);
    }

    #[test]
    fn test_attach_rejects_bad_watched_properties() {
        let (mut host, _, element) = setup();

        let empty = attach(
            &mut host,
            AttachOptions::new(Target::one(element)).watch(Vec::<String>::new()),
        )
        .unwrap_err();
        assert!(matches!(empty, AttachError::InvalidOption { .. }));

        let unknown = attach(
            &mut host,
            AttachOptions::new(Target::one(element)).watch(["width", "depth"]),
        )
        .unwrap_err();
        assert!(unknown.to_string().contains("\"depth\""));
    }

    #[test]
    fn test_attach_requires_some_watched_property() {
        let (mut host, _, element) = setup();

        let err = attach(&mut host, AttachOptions::new(Target::one(element))).unwrap_err();

        assert_eq!(err, AttachError::NoWatchedProperties);
    }

    #[test]
    fn test_watch_without_queries_only_mirrors() {
        let (mut host, _, element) = setup();
        host.append_element(element, "p");

        let adapter = attach(
            &mut host,
            AttachOptions::new(Target::one(element)).watch(["children"]),
        )
        .unwrap();

        let snapshot = adapter.snapshot(&element).unwrap();
        assert_eq!(snapshot.children, Some(1));
        assert_eq!(snapshot.width, None);
        assert_eq!(host.custom_property(element, "--ea-children"), Some("1"));
        assert_eq!(host.custom_property(element, "--ea-width"), None);
    }

    #[test]
    fn test_children_of_text_inputs_wire_no_mutation_listener() {
        let (mut host, container, _) = setup();
        let input = host.append_input(container, "text");

        let adapter = attach(
            &mut host,
            AttachOptions::new(Target::one(input)).label("children > 0", "parent"),
        )
        .unwrap();

        assert!(!adapter.listeners().mutations);
        assert_eq!(host.mutation_scope(adapter.id(), input), None);
    }

    #[test]
    fn test_only_needed_listeners_are_wired() {
        let (mut host, _, element) = setup();
        let input = host.append_input(element, "text");

        let adapter = attach(
            &mut host,
            AttachOptions::new(Target::many([element, input])).label("characters > 3", "long"),
        )
        .unwrap();

        assert_eq!(
            adapter.listeners(),
            Listeners {
                dimensions: false,
                input: true,
                mutations: false,
            }
        );
        assert!(!host.is_resize_observed(adapter.id(), element));
        assert!(host.has_input_listener(adapter.id(), input));
        assert!(!host.has_input_listener(adapter.id(), element));
        assert_eq!(host.mutation_scope(adapter.id(), element), None);
        assert_eq!(adapter.snapshot(&element).unwrap().characters, None);
        assert_eq!(adapter.snapshot(&input).unwrap().characters, Some(0));
    }
}

mod notification_tests {
    use super::*;

    #[test]
    fn test_resizes_are_coalesced_per_frame() {
        let (mut host, _, element) = setup();
        let mut adapter = attach(
            &mut host,
            AttachOptions::new(Target::one(element)).label("width > 50em", "wide"),
        )
        .unwrap();
        host.run(&mut adapter).unwrap();
        assert!(!host.class_names(element).contains(&"wide".to_string()));

        for width in [810.0, 900.0, 950.0] {
            host.set_content_box(element, width, 400.0);
        }
        host.dispatch(&mut adapter).unwrap();
        assert_eq!(adapter.pending(), 1);
        assert!(host.class_names(element).is_empty());

        let probes = host.probe_count();
        host.frame(&mut adapter).unwrap();

        assert_eq!(host.probe_count(), probes + 1);
        assert_eq!(adapter.pending(), 0);
        assert_eq!(host.class_names(element), vec!["wide".to_string()]);
        assert_eq!(host.custom_property(element, "--ea-width"), Some("950px"));
    }

    #[test]
    fn test_repeated_measurement_reuses_probe_nodes() {
        let (mut host, _, element) = setup();
        let mut adapter = attach(
            &mut host,
            AttachOptions::new(Target::one(element)).label("width >= 40em", "wide"),
        )
        .unwrap();
        host.run(&mut adapter).unwrap();
        let nodes = host.node_count();

        for step in 0..200 {
            host.set_content_box(element, 500.0 + step as f64, 400.0);
            host.run(&mut adapter).unwrap();
        }

        assert_eq!(host.node_count(), nodes);
        assert_eq!(host.child_element_count(&element), 0);
        assert!(host.probe_count() > 200);
    }

    #[test]
    fn test_no_probing_without_units() {
        let (mut host, _, element) = setup();
        let mut adapter = attach(
            &mut host,
            AttachOptions::new(Target::one(element)).label("width > 100px && height < 500px", "box"),
        )
        .unwrap();
        host.set_content_box(element, 300.0, 300.0);
        host.run(&mut adapter).unwrap();

        assert_eq!(host.probe_count(), 0);
        assert_eq!(host.class_names(element), vec!["box".to_string()]);
    }

    #[test]
    fn test_callback_fires_on_rising_edge_only() {
        let (mut host, _, element) = setup();
        let (calls, callback) = counter();
        let mut adapter = attach(
            &mut host,
            AttachOptions::new(Target::one(element)).callback("width > 500px", callback),
        )
        .unwrap();
        assert_eq!(calls.get(), 1);

        adapter.refresh(&mut host).unwrap();
        host.run(&mut adapter).unwrap();
        assert_eq!(calls.get(), 1);

        host.set_content_box(element, 400.0, 400.0);
        host.run(&mut adapter).unwrap();
        assert_eq!(calls.get(), 1);

        host.set_content_box(element, 700.0, 400.0);
        host.run(&mut adapter).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_callback_receives_snapshot() {
        let (mut host, _, element) = setup();
        let seen = Rc::new(Cell::new(None));
        let handle = seen.clone();

        attach(
            &mut host,
            AttachOptions::new(Target::one(element)).callback(
                "orientation == landscape",
                move |node: &NodeId, snapshot: &Snapshot| handle.set(Some((*node, snapshot.width))),
            ),
        )
        .unwrap();

        assert_eq!(seen.get(), Some((element, Some(800.0))));
    }

    #[test]
    fn test_input_reapplies_only_when_count_changes() {
        let (mut host, container, _) = setup();
        let input = host.append_input(container, "search");
        let mut adapter = attach(
            &mut host,
            AttachOptions::new(Target::one(input)).label("characters > 3", "long"),
        )
        .unwrap();
        assert_eq!(host.custom_property(input, "--ea-characters"), Some("0"));

        host.set_value(input, "ab");
        host.dispatch(&mut adapter).unwrap();
        assert_eq!(host.custom_property(input, "--ea-characters"), Some("2"));

        host.remove_custom_property(&input, "--ea-characters");
        host.set_value(input, "  ab ");
        host.dispatch(&mut adapter).unwrap();
        assert_eq!(host.custom_property(input, "--ea-characters"), None);

        host.set_value(input, "abcde");
        host.dispatch(&mut adapter).unwrap();
        assert_eq!(host.custom_property(input, "--ea-characters"), Some("5"));
        assert_eq!(host.class_names(input), vec!["long".to_string()]);
    }

    #[test]
    fn test_children_follow_mutations() {
        let (mut host, _, element) = setup();
        let mut adapter = attach(
            &mut host,
            AttachOptions::new(Target::one(element)).label("children >= 2", "crowded"),
        )
        .unwrap();
        assert_eq!(
            host.mutation_scope(adapter.id(), element),
            Some(MutationScope::child_list())
        );

        let first = host.append_element(element, "li");
        host.append_text(element, "not an element");
        host.append_element(element, "li");
        host.dispatch(&mut adapter).unwrap();

        assert_eq!(host.class_names(element), vec!["crowded".to_string()]);
        assert_eq!(host.custom_property(element, "--ea-children"), Some("2"));

        host.remove(first);
        host.dispatch(&mut adapter).unwrap();

        assert!(host.class_names(element).is_empty());
        assert_eq!(host.class_toggles(element, "crowded"), 2);
    }

    #[test]
    fn test_mutation_processing_does_not_observe_its_own_writes() {
        let (mut host, _, element) = setup();
        let mut adapter = attach(
            &mut host,
            AttachOptions::new(Target::one(element)).label("children > 1 && width > 1em", "crowded"),
        )
        .unwrap();
        host.run(&mut adapter).unwrap();
        host.dispatch(&mut adapter).unwrap();

        host.append_element(element, "li");
        host.append_element(element, "li");
        let records = host.take_mutation_records(adapter.id());
        assert_eq!(records.len(), 2);

        adapter.on_mutations(&mut host, &records).unwrap();

        assert_eq!(host.queued_mutations(adapter.id()), 0);
        assert_eq!(
            host.mutation_scope(adapter.id(), element),
            Some(MutationScope::child_list())
        );
        assert_eq!(host.class_names(element), vec!["crowded".to_string()]);
    }

    #[test]
    fn test_content_editable_characters_follow_text() {
        let (mut host, _, element) = setup();
        host.set_content_editable(element, true);
        let paragraph = host.append_element(element, "p");
        let text = host.append_text(paragraph, "hi");

        let mut adapter = attach(
            &mut host,
            AttachOptions::new(Target::one(element)).label("characters > 5", "long"),
        )
        .unwrap();
        assert_eq!(
            host.mutation_scope(adapter.id(), element),
            Some(MutationScope::subtree_text())
        );
        assert_eq!(adapter.snapshot(&element).unwrap().characters, Some(2));

        host.set_text(text, "  hello world  ");
        host.dispatch(&mut adapter).unwrap();

        assert_eq!(adapter.snapshot(&element).unwrap().characters, Some(11));
        assert_eq!(host.class_names(element), vec!["long".to_string()]);
    }

    #[test]
    fn test_mutations_outside_tracked_elements_are_ignored() {
        let (mut host, container, element) = setup();
        let mut adapter = attach(
            &mut host,
            AttachOptions::new(Target::one(element)).label("children > 0", "filled"),
        )
        .unwrap();

        let records = vec![MutationRecord::new(MutationKind::ChildList, container)];
        adapter.on_mutations(&mut host, &records).unwrap();

        assert_eq!(adapter.snapshot(&element).unwrap().children, Some(0));
        assert!(host.class_names(element).is_empty());
    }

    #[test]
    fn test_attribute_mutations_are_ignored() {
        let (mut host, _, element) = setup();
        let mut adapter = attach(
            &mut host,
            AttachOptions::new(Target::one(element)).watch(["children"]),
        )
        .unwrap();
        host.remove_custom_property(&element, "--ea-children");

        let records = vec![MutationRecord::new(MutationKind::Attributes, element)];
        adapter.on_mutations(&mut host, &records).unwrap();

        assert_eq!(host.custom_property(element, "--ea-children"), None);
    }

    #[test]
    fn test_removed_elements_are_evicted() {
        let (mut host, _, element) = setup();
        let mut adapter = attach(
            &mut host,
            AttachOptions::new(Target::one(element)).label("width > 1px", "a"),
        )
        .unwrap();

        host.remove(element);
        adapter.refresh(&mut host).unwrap();

        assert!(adapter.snapshot(&element).is_none());
        adapter.on_resize(&host, &[ResizeEntry::new(element, Size::new(5.0, 5.0))]);
        assert_eq!(adapter.pending(), 0);
    }
}

mod lifecycle_tests {
    use super::*;

    #[test]
    fn test_detach_removes_labels_mirrors_and_listeners() {
        let (mut host, _, element) = setup();
        let mut adapter = attach(
            &mut host,
            AttachOptions::new(Target::one(element))
                .label("width > 1px", "wide")
                .label("children >= 0", "any"),
        )
        .unwrap();
        assert_eq!(host.class_names(element).len(), 2);

        adapter.detach(&mut host);

        assert_eq!(adapter.state(), AdapterState::Detached);
        assert!(host.class_names(element).is_empty());
        assert!(host.custom_properties(element).is_empty());
        assert!(!host.is_resize_observed(adapter.id(), element));
        assert_eq!(host.mutation_scope(adapter.id(), element), None);
        assert!(adapter.snapshot(&element).is_none());
    }

    #[test]
    fn test_notifications_after_detach_are_inert() {
        let (mut host, _, element) = setup();
        let (calls, callback) = counter();
        let mut adapter = attach(
            &mut host,
            AttachOptions::new(Target::one(element))
                .label("width > 500px", "wide")
                .callback("width > 500px", callback),
        )
        .unwrap();
        host.set_content_box(element, 100.0, 100.0);
        host.dispatch(&mut adapter).unwrap();

        adapter.detach(&mut host);
        adapter.detach(&mut host);
        adapter.refresh(&mut host).unwrap();
        host.frame(&mut adapter).unwrap();
        adapter.on_input(&mut host, &element).unwrap();

        assert_eq!(calls.get(), 1);
        assert!(host.class_names(element).is_empty());
        assert!(host.custom_properties(element).is_empty());
    }

    #[test]
    fn test_reattach_starts_from_fresh_transitions() {
        let (mut host, _, element) = setup();
        let (calls, callback) = counter();
        let mut adapter = attach(
            &mut host,
            AttachOptions::new(Target::one(element)).callback("width > 500px", callback),
        )
        .unwrap();
        adapter.detach(&mut host);

        let (again, callback) = counter();
        attach(
            &mut host,
            AttachOptions::new(Target::one(element)).callback("width > 500px", callback),
        )
        .unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(again.get(), 1);
    }

    #[test]
    fn test_engines_sharing_a_host_are_independent() {
        let (mut host, _, element) = setup();
        let mut first = attach(
            &mut host,
            AttachOptions::new(Target::one(element)).label("width > 1px", "first"),
        )
        .unwrap();
        let mut second = attach(
            &mut host,
            AttachOptions::new(Target::one(element)).label("children >= 0", "second"),
        )
        .unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(host.custom_property(element, "--ea-children"), Some("0"));

        first.detach(&mut host);

        assert_eq!(host.class_names(element), vec!["second".to_string()]);
        assert_eq!(host.custom_property(element, "--ea-children"), Some("0"));
        assert_eq!(host.custom_property(element, "--ea-width"), None);
        assert_eq!(host.custom_property(element, "--ea-orientation"), None);
        assert_eq!(
            host.mutation_scope(second.id(), element),
            Some(MutationScope::child_list())
        );

        host.append_element(element, "li");
        host.dispatch(&mut second).unwrap();
        assert_eq!(second.snapshot(&element).unwrap().children, Some(1));
        assert_eq!(host.custom_property(element, "--ea-children"), Some("1"));
    }
}
