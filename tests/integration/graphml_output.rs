#![allow(missing_docs)]

use std::collections::HashSet;
use std::time::Duration;

use pagegraph::{
    EdgeKind, ElementState, FrameId, ManualClock, NodeKind, PageGraph, RequestId, StorageKind,
};

/// Tag-name check by local name; the document carries the GraphML default
/// namespace.
fn is_tag(node: &roxmltree::Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

/// A small but representative page: parser builds DOM, a script mutates it
/// and fetches a resource, storage is touched.
fn sample_graph() -> PageGraph {
    let clock = ManualClock::new();
    clock.advance(Duration::from_millis(3));
    let mut graph = PageGraph::with_clock(Box::new(clock));
    let frame = FrameId::from("frame-main");

    let parser = graph.add_node(NodeKind::Parser);
    let html = graph.add_node(NodeKind::HtmlElement(ElementState::new("html")));
    let body = graph.add_node(NodeKind::HtmlElement(ElementState::new("body")));
    let script_el = graph.add_node(NodeKind::HtmlElement(ElementState::new("script")));
    let script = graph.add_node(NodeKind::Script { script_id: 1 });
    let storage = graph.add_node(NodeKind::Storage(StorageKind::LocalStorage));

    graph.add_edge(
        parser,
        body,
        EdgeKind::NodeInsert {
            parent: Some(html),
            prior_sibling: None,
        },
    );
    graph.add_edge(
        parser,
        script_el,
        EdgeKind::NodeInsert {
            parent: Some(body),
            prior_sibling: None,
        },
    );
    graph.add_edge(script_el, script, EdgeKind::Execute);
    graph.add_edge(
        script,
        body,
        EdgeKind::AttributeSet {
            name: "data-ready".to_owned(),
            value: "1".to_owned(),
            is_style: false,
        },
    );
    graph.add_edge(
        script,
        storage,
        EdgeKind::StorageSet {
            key: "seen".to_owned(),
            value: "true".to_owned(),
        },
    );

    graph.register_request_start(
        RequestId(42),
        script,
        &frame,
        "https://site.test/data.json",
        "fetch",
    );
    graph.update_response_body(RequestId(42), b"{\"ok\":true}");
    graph.register_request_complete(RequestId(42), 11, &frame);

    graph
}

#[test]
fn document_parses_and_ids_are_unique_and_prefixed() {
    let graph = sample_graph();
    let xml = graph.to_graphml();
    let doc = roxmltree::Document::parse(&xml).expect("well-formed XML");

    let mut seen = HashSet::new();
    for el in doc.descendants().filter(|n| is_tag(n, "node")) {
        let id = el.attribute("id").expect("node id attribute");
        assert!(id.starts_with('n'), "node id {id} prefixed with n");
        assert!(seen.insert(id.to_owned()), "duplicate node id {id}");
    }
    for el in doc.descendants().filter(|n| is_tag(n, "edge")) {
        let id = el.attribute("id").expect("edge id attribute");
        assert!(id.starts_with('e'), "edge id {id} prefixed with e");
        assert!(seen.insert(id.to_owned()), "duplicate edge id {id}");
    }
    assert_eq!(seen.len(), graph.node_count() + graph.edge_count());
}

#[test]
fn edges_reference_emitted_nodes() {
    let xml = sample_graph().to_graphml();
    let doc = roxmltree::Document::parse(&xml).expect("well-formed XML");

    let node_ids: HashSet<&str> = doc
        .descendants()
        .filter(|n| is_tag(n, "node"))
        .filter_map(|n| n.attribute("id"))
        .collect();
    let mut edges = 0;
    for el in doc.descendants().filter(|n| is_tag(n, "edge")) {
        edges += 1;
        let source = el.attribute("source").expect("source");
        let target = el.attribute("target").expect("target");
        assert!(node_ids.contains(source), "unknown source {source}");
        assert!(node_ids.contains(target), "unknown target {target}");
    }
    assert!(edges > 0);
}

#[test]
fn data_keys_are_declared_and_core_attributes_present() {
    let xml = sample_graph().to_graphml();
    let doc = roxmltree::Document::parse(&xml).expect("well-formed XML");

    let declared: HashSet<&str> = doc
        .descendants()
        .filter(|n| is_tag(n, "key"))
        .filter_map(|n| n.attribute("id"))
        .collect();
    assert!(!declared.is_empty());

    for el in doc
        .descendants()
        .filter(|n| is_tag(n, "node") || is_tag(n, "edge"))
    {
        let mut names = Vec::new();
        for data in el.children().filter(|n| is_tag(n, "data")) {
            let key = data.attribute("key").expect("data key");
            assert!(declared.contains(key), "undeclared key {key}");
            names.push(key.to_owned());
        }
        // Every item carries its type, numeric id, and timestamp.
        assert!(names.len() >= 3, "{:?} missing core attributes", el);
    }
}

#[test]
fn timestamps_use_injected_clock_milliseconds() {
    let xml = sample_graph().to_graphml();
    let doc = roxmltree::Document::parse(&xml).expect("well-formed XML");

    // The manual clock was advanced to 3ms before any item was created.
    let timestamp_keys: HashSet<&str> = doc
        .descendants()
        .filter(|n| is_tag(n, "key"))
        .filter(|n| n.attribute("attr.name") == Some("timestamp"))
        .filter_map(|n| n.attribute("id"))
        .collect();
    assert_eq!(timestamp_keys.len(), 2, "node and edge timestamp keys");

    let mut checked = 0;
    for data in doc.descendants().filter(|n| is_tag(n, "data")) {
        if let Some(key) = data.attribute("key") {
            if timestamp_keys.contains(key) {
                let value: u64 = data.text().unwrap_or("").parse().expect("integer ms");
                assert_eq!(value, 3);
                checked += 1;
            }
        }
    }
    assert!(checked > 0);
}

#[test]
fn request_attributes_survive_serialization() {
    let xml = sample_graph().to_graphml();
    assert!(xml.contains("request start"));
    assert!(xml.contains("request complete"));
    assert!(xml.contains("https://site.test/data.json"));
    // Base64 SHA-256 of the streamed body is attached to the completion.
    let doc = roxmltree::Document::parse(&xml).expect("well-formed XML");
    let hash_key = doc
        .descendants()
        .find(|n| {
            is_tag(n, "key") && n.attribute("attr.name") == Some("response hash")
        })
        .and_then(|n| n.attribute("id"))
        .expect("response hash key");
    let hash_value = doc
        .descendants()
        .filter(|n| is_tag(n, "data"))
        .find(|n| n.attribute("key") == Some(hash_key))
        .and_then(|n| n.text())
        .expect("hash emitted");
    assert_eq!(hash_value.len(), 44, "base64 of a 32-byte digest");
}

#[test]
fn write_graphml_matches_to_graphml() {
    let graph = sample_graph();
    let mut buf = Vec::new();
    graph.write_graphml(&mut buf).expect("write");
    assert_eq!(String::from_utf8(buf).expect("utf8"), graph.to_graphml());
}
