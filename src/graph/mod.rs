//! The owning graph arena and the host-facing registration surface.

pub mod edge;
pub mod element;
pub mod node;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::context::{GraphContext, PageClock};
use crate::graph::edge::{EdgeKind, GraphEdge};
use crate::graph::node::{GraphNode, NodeKind};
use crate::request::tracked::RequestStatus;
use crate::request::{DocumentRequest, RequestCompletion, RequestTracker};
use crate::types::{EdgeId, FrameId, NodeId, RequestId, Result};

/// Append-only instrumentation graph for one page load.
///
/// The graph owns every node and edge; all cross-references are ids into
/// these maps. Nodes are tombstoned on deletion, never removed, so the
/// serialized output is a complete historical trace rather than a live DOM
/// snapshot. Confine each instance to one logical sequence; there is no
/// internal locking.
pub struct PageGraph {
    context: GraphContext,
    nodes: FxHashMap<NodeId, GraphNode>,
    edges: FxHashMap<EdgeId, GraphEdge>,
    node_order: Vec<NodeId>,
    edge_order: Vec<EdgeId>,
    resource_nodes: FxHashMap<String, NodeId>,
    tracker: RequestTracker,
}

impl PageGraph {
    /// Graph anchored at the current instant.
    pub fn new() -> Self {
        Self::with_context(GraphContext::new())
    }

    /// Graph with an injected clock; timestamps come from it.
    pub fn with_clock(clock: Box<dyn PageClock>) -> Self {
        Self::with_context(GraphContext::with_clock(clock))
    }

    fn with_context(context: GraphContext) -> Self {
        Self {
            context,
            nodes: FxHashMap::default(),
            edges: FxHashMap::default(),
            node_order: Vec::new(),
            edge_order: Vec::new(),
            resource_nodes: FxHashMap::default(),
            tracker: RequestTracker::new(),
        }
    }

    /// Adds a node and returns its id.
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.context.next_id());
        let created_at = self.context.time_since_page_start();
        let node = GraphNode::new(id, created_at, kind);
        trace!(%id, kind = node.item_name(), "add node");
        self.nodes.insert(id, node);
        self.node_order.push(id);
        id
    }

    /// Adds an edge from `out_node` to `in_node`, wires it into both
    /// endpoints' edge lists, and folds its DOM-mirror effect into the
    /// target. Panics if either endpoint is unknown.
    pub fn add_edge(&mut self, out_node: NodeId, in_node: NodeId, kind: EdgeKind) -> EdgeId {
        assert!(
            self.nodes.contains_key(&out_node),
            "edge source {out_node} is not in the graph"
        );
        assert!(
            self.nodes.contains_key(&in_node),
            "edge target {in_node} is not in the graph"
        );

        let id = EdgeId(self.context.next_id());
        let created_at = self.context.time_since_page_start();
        let edge = GraphEdge::new(id, created_at, out_node, in_node, kind);
        trace!(%id, kind = edge.item_name(), %out_node, %in_node, "add edge");
        self.edges.insert(id, edge);
        self.edge_order.push(id);
        self.node_entry(out_node).push_out_edge(id);
        self.node_entry(in_node).push_in_edge(id);
        self.apply_edge_effect(id);
        id
    }

    /// Node by id.
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    /// Edge by id.
    pub fn edge(&self, id: EdgeId) -> Option<&GraphEdge> {
        self.edges.get(&id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.node_order.iter().map(move |id| &self.nodes[id])
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edge_order.iter().map(move |id| &self.edges[id])
    }

    /// Number of nodes ever added.
    pub fn node_count(&self) -> usize {
        self.node_order.len()
    }

    /// Number of edges ever added.
    pub fn edge_count(&self) -> usize {
        self.edge_order.len()
    }

    /// The request tracker, for inspection.
    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }

    /// Resource node for a URL, creating it on first sight. One node per
    /// URL regardless of how many requests fetch it.
    pub fn resource_node_for_url(&mut self, url: &str) -> NodeId {
        if let Some(id) = self.resource_nodes.get(url) {
            return *id;
        }
        let id = self.add_node(NodeKind::Resource {
            url: url.to_owned(),
        });
        self.resource_nodes.insert(url.to_owned(), id);
        id
    }

    /// Tombstones a DOM node and every transitive child currently attached
    /// to it. One-way and idempotent; nothing is removed from the graph.
    pub fn mark_node_deleted(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let node = self.node_entry(next);
            match node.kind_mut() {
                NodeKind::HtmlElement(state) => {
                    state.mark_deleted();
                    pending.extend_from_slice(state.child_nodes());
                }
                NodeKind::HtmlText(state) => state.mark_deleted(),
                _ => panic!("delete signal for non-DOM node {next}"),
            }
        }
    }

    /// Registers a requester for a network request and records the
    /// request-start edge. Returns the resource node.
    pub fn register_request_start(
        &mut self,
        request_id: RequestId,
        requester: NodeId,
        frame: &FrameId,
        url: &str,
        resource_type: &str,
    ) -> NodeId {
        let resource = self.resource_node_for_url(url);
        self.tracker
            .register_request_start(request_id, requester, frame, resource, resource_type);
        self.add_edge(
            requester,
            resource,
            EdgeKind::RequestStart {
                request_id,
                resource_type: resource_type.to_owned(),
            },
        );
        resource
    }

    /// Records a redirect hop on the tracked request.
    pub fn register_request_redirect(
        &mut self,
        request_id: RequestId,
        frame: &FrameId,
        url: &str,
    ) {
        self.tracker
            .register_request_redirect(request_id, frame, url);
    }

    /// Streams response body bytes into the request's content digest.
    pub fn update_response_body(&mut self, request_id: RequestId, chunk: &[u8]) {
        self.tracker.update_response_body(request_id, chunk);
    }

    /// Records a successful completion reply. On the reply that finalizes
    /// the request, one completion edge is written per requester.
    pub fn register_request_complete(
        &mut self,
        request_id: RequestId,
        encoded_data_length: i64,
        frame: &FrameId,
    ) {
        let completion =
            self.tracker
                .register_request_complete(request_id, encoded_data_length, frame);
        self.write_request_completion(&completion);
    }

    /// Records an error reply; writes error edges on the finalizing reply.
    pub fn register_request_error(&mut self, request_id: RequestId, frame: &FrameId) {
        let completion = self.tracker.register_request_error(request_id, frame);
        self.write_request_completion(&completion);
    }

    /// Registers a top-level navigation for a frame.
    pub fn register_document_request_start(
        &mut self,
        request_id: RequestId,
        frame: &FrameId,
        url: &str,
    ) {
        self.tracker
            .register_document_request_start(request_id, frame, url);
    }

    /// Marks a navigation complete.
    pub fn register_document_request_complete(&mut self, request_id: RequestId) {
        self.tracker.register_document_request_complete(request_id);
    }

    /// Navigation record for a request id, if tracked.
    pub fn document_request_info(&self, request_id: RequestId) -> Option<&DocumentRequest> {
        self.tracker.document_request_info(request_id)
    }

    /// Serializes the whole graph as a GraphML document.
    pub fn to_graphml(&self) -> String {
        crate::graphml::GraphMlDocument(self).to_string()
    }

    /// Writes the GraphML document to an IO sink.
    pub fn write_graphml<W: std::io::Write>(&self, mut writer: W) -> Result<()> {
        write!(writer, "{}", crate::graphml::GraphMlDocument(self))?;
        Ok(())
    }

    fn node_entry(&mut self, id: NodeId) -> &mut GraphNode {
        self.nodes
            .get_mut(&id)
            .unwrap_or_else(|| panic!("node {id} is not in the graph"))
    }

    fn element_entry(&mut self, id: NodeId) -> &mut crate::graph::element::ElementState {
        self.node_entry(id)
            .as_element_mut()
            .unwrap_or_else(|| panic!("node {id} is not an html element"))
    }

    /// Detaches a DOM node from its current parent, if any.
    fn detach_from_parent(&mut self, child: NodeId) {
        let parent = self.node_entry(child).dom_parent();
        if let Some(parent_id) = parent {
            self.element_entry(parent_id).remove_child(child);
        }
        self.set_dom_parent(child, None);
    }

    fn set_dom_parent(&mut self, child: NodeId, parent: Option<NodeId>) {
        let node = self.node_entry(child);
        match node.kind_mut() {
            NodeKind::HtmlElement(state) => state.set_parent(parent),
            NodeKind::HtmlText(state) => state.set_parent(parent),
            _ => panic!("structure edge targets non-DOM node {child}"),
        }
    }

    /// Folds the effect of a just-added edge into the target node's mirror
    /// state, per the edge kind.
    fn apply_edge_effect(&mut self, edge_id: EdgeId) {
        let (target, kind) = {
            let edge = &self.edges[&edge_id];
            (edge.in_node(), edge.kind().clone())
        };
        match kind {
            EdgeKind::NodeInsert {
                parent,
                prior_sibling,
            } => {
                self.detach_from_parent(target);
                self.set_dom_parent(target, parent);
                if let Some(parent_id) = parent {
                    self.element_entry(parent_id)
                        .insert_child_after(target, prior_sibling);
                }
            }
            EdgeKind::NodeRemove => {
                self.detach_from_parent(target);
            }
            EdgeKind::NodeDelete => {
                self.mark_node_deleted(target);
            }
            EdgeKind::AttributeSet {
                name,
                value,
                is_style,
            } => {
                self.element_entry(target)
                    .set_attribute(&name, &value, is_style);
            }
            EdgeKind::AttributeDelete { name, is_style } => {
                self.element_entry(target).delete_attribute(&name, is_style);
            }
            EdgeKind::EventListenerAdd { listener_id, .. } => {
                self.element_entry(target)
                    .add_event_listener(listener_id, edge_id);
            }
            EdgeKind::EventListenerRemove { listener_id, .. } => {
                self.element_entry(target).remove_event_listener(listener_id);
            }
            EdgeKind::TextChange { text } => {
                let node = self.node_entry(target);
                let state = node
                    .as_text_mut()
                    .unwrap_or_else(|| panic!("text change targets non-text node {target}"));
                state.set_text(&text);
            }
            // Remaining kinds record history without mirror-state effects.
            _ => {}
        }
    }

    /// Writes one completion or error edge per requester, exactly once per
    /// request, on the reply that finalized it.
    fn write_request_completion(&mut self, completion: &RequestCompletion) {
        if !completion.is_first_reply {
            return;
        }
        for requester in completion.requesters.clone() {
            let kind = match completion.status {
                RequestStatus::Success => EdgeKind::RequestComplete {
                    request_id: completion.request_id,
                    resource_type: completion.resource_type.clone(),
                    response_hash: completion.response_body_hash.clone(),
                    size: completion.encoded_data_length,
                },
                RequestStatus::Error => EdgeKind::RequestError {
                    request_id: completion.request_id,
                },
                RequestStatus::Unknown => {
                    unreachable!("completion reply with non-terminal status")
                }
            };
            self.add_edge(completion.resource, requester, kind);
        }
    }
}

impl Default for PageGraph {
    fn default() -> Self {
        Self::new()
    }
}
