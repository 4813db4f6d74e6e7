#![allow(missing_docs)]

use pagegraph::{
    EdgeKind, ElementState, EventListenerId, GraphNode, NodeId, NodeKind, PageGraph, TextState,
};

fn element(graph: &mut PageGraph, tag: &str) -> NodeId {
    graph.add_node(NodeKind::HtmlElement(ElementState::new(tag)))
}

fn insert(graph: &mut PageGraph, actor: NodeId, child: NodeId, parent: NodeId, after: Option<NodeId>) {
    graph.add_edge(
        actor,
        child,
        EdgeKind::NodeInsert {
            parent: Some(parent),
            prior_sibling: after,
        },
    );
}

fn children(graph: &PageGraph, parent: NodeId) -> Vec<NodeId> {
    graph
        .node(parent)
        .and_then(GraphNode::as_element)
        .expect("element")
        .child_nodes()
        .to_vec()
}

#[test]
fn sibling_chain_matches_chronological_insertion_order() {
    let mut graph = PageGraph::new();
    let parser = graph.add_node(NodeKind::Parser);
    let list = element(&mut graph, "ol");
    let items: Vec<NodeId> = (0..6).map(|_| element(&mut graph, "li")).collect();

    // Build front-to-back via the sibling chain, then splice one into the
    // middle and move one to the front.
    insert(&mut graph, parser, items[0], list, None);
    insert(&mut graph, parser, items[1], list, Some(items[0]));
    insert(&mut graph, parser, items[2], list, Some(items[1]));
    insert(&mut graph, parser, items[3], list, Some(items[2]));
    assert_eq!(children(&graph, list), &items[0..4]);

    insert(&mut graph, parser, items[4], list, Some(items[1]));
    assert_eq!(
        children(&graph, list),
        vec![items[0], items[1], items[4], items[2], items[3]]
    );

    insert(&mut graph, parser, items[5], list, None);
    assert_eq!(children(&graph, list)[0], items[5]);

    // Re-inserting an existing child relocates rather than duplicates it.
    insert(&mut graph, parser, items[0], list, Some(items[3]));
    let order = children(&graph, list);
    assert_eq!(order.len(), 6);
    assert_eq!(order.last(), Some(&items[0]));
}

#[test]
#[should_panic(expected = "not a child")]
fn naming_a_non_member_sibling_panics() {
    let mut graph = PageGraph::new();
    let parser = graph.add_node(NodeKind::Parser);
    let list = element(&mut graph, "ul");
    let li = element(&mut graph, "li");
    let stranger = element(&mut graph, "li");
    insert(&mut graph, parser, li, list, Some(stranger));
}

#[test]
fn moving_between_parents_detaches_from_the_old_one() {
    let mut graph = PageGraph::new();
    let parser = graph.add_node(NodeKind::Parser);
    let old_parent = element(&mut graph, "div");
    let new_parent = element(&mut graph, "div");
    let child = element(&mut graph, "span");

    insert(&mut graph, parser, child, old_parent, None);
    insert(&mut graph, parser, child, new_parent, None);

    assert!(children(&graph, old_parent).is_empty());
    assert_eq!(children(&graph, new_parent), vec![child]);
    assert_eq!(
        graph.node(child).expect("node").dom_parent(),
        Some(new_parent)
    );
}

#[test]
fn tombstone_cascade_is_idempotent_and_transitive() {
    let mut graph = PageGraph::new();
    let parser = graph.add_node(NodeKind::Parser);
    let root = element(&mut graph, "section");
    let mid = element(&mut graph, "p");
    let leaf = graph.add_node(NodeKind::HtmlText(TextState::new("hello")));
    insert(&mut graph, parser, mid, root, None);
    insert(&mut graph, parser, leaf, mid, None);

    graph.mark_node_deleted(root);
    graph.mark_node_deleted(root);
    graph.mark_node_deleted(mid);

    for id in [root, mid, leaf] {
        assert!(graph.node(id).expect("node").is_deleted());
    }
    // Tombstones retain structure for the historical trace.
    assert_eq!(children(&graph, root), vec![mid]);
}

#[test]
fn event_listener_lifecycle_via_edges() {
    let mut graph = PageGraph::new();
    let script = graph.add_node(NodeKind::Script { script_id: 5 });
    let button = element(&mut graph, "button");
    let listener = EventListenerId(77);

    // Removing before any add is a host-legitimate no-op: the listener may
    // predate recording.
    graph.add_edge(
        script,
        button,
        EdgeKind::EventListenerRemove {
            event_type: "click".to_owned(),
            listener_id: listener,
            listener_script: script,
        },
    );

    let add_edge = graph.add_edge(
        script,
        button,
        EdgeKind::EventListenerAdd {
            event_type: "click".to_owned(),
            listener_id: listener,
            listener_script: script,
        },
    );
    let el = graph
        .node(button)
        .and_then(GraphNode::as_element)
        .expect("element");
    assert_eq!(el.event_listener(listener), Some(add_edge));

    graph.add_edge(
        script,
        button,
        EdgeKind::EventListenerRemove {
            event_type: "click".to_owned(),
            listener_id: listener,
            listener_script: script,
        },
    );
    let el = graph
        .node(button)
        .and_then(GraphNode::as_element)
        .expect("element");
    assert_eq!(el.event_listener(listener), None);
    assert_eq!(el.event_listener_count(), 0);
}

#[test]
fn attribute_edges_fold_into_the_mirror() {
    let mut graph = PageGraph::new();
    let script = graph.add_node(NodeKind::Script { script_id: 5 });
    let div = element(&mut graph, "div");

    graph.add_edge(
        script,
        div,
        EdgeKind::AttributeSet {
            name: "class".to_owned(),
            value: "old".to_owned(),
            is_style: false,
        },
    );
    graph.add_edge(
        script,
        div,
        EdgeKind::AttributeSet {
            name: "class".to_owned(),
            value: "new".to_owned(),
            is_style: false,
        },
    );
    graph.add_edge(
        script,
        div,
        EdgeKind::AttributeSet {
            name: "display".to_owned(),
            value: "none".to_owned(),
            is_style: true,
        },
    );
    graph.add_edge(
        script,
        div,
        EdgeKind::AttributeDelete {
            name: "missing".to_owned(),
            is_style: false,
        },
    );

    let el = graph
        .node(div)
        .and_then(GraphNode::as_element)
        .expect("element");
    assert_eq!(el.attribute("class"), Some("new"), "last write wins");
    assert_eq!(el.inline_style("display"), Some("none"));
    assert_eq!(el.attribute("display"), None, "style kept separate");

    // The full mutation history stays in the graph even though the mirror
    // only holds the latest values.
    let attr_edges = graph
        .edges()
        .filter(|e| matches!(e.kind(), EdgeKind::AttributeSet { .. }))
        .count();
    assert_eq!(attr_edges, 3);
}

#[test]
fn text_change_edges_replace_text() {
    let mut graph = PageGraph::new();
    let script = graph.add_node(NodeKind::Script { script_id: 5 });
    let text = graph.add_node(NodeKind::HtmlText(TextState::new("before")));
    graph.add_edge(
        script,
        text,
        EdgeKind::TextChange {
            text: "after".to_owned(),
        },
    );
    assert_eq!(
        graph
            .node(text)
            .and_then(GraphNode::as_text)
            .expect("text")
            .text(),
        "after"
    );
}
