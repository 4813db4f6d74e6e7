//! Graph nodes and the closed set of node kinds.

use std::time::Duration;

use smallvec::SmallVec;

use crate::graph::element::{ElementState, TextState};
use crate::types::{EdgeId, FrameId, NodeId};

/// Semantic kind of a graph node. Closed sum type; adding a kind is a
/// compile-time-checked change everywhere the graph dispatches on it.
#[derive(Debug)]
pub enum NodeKind {
    /// Mirror of a DOM element, with local parent/child/attribute state.
    HtmlElement(ElementState),
    /// Mirror of a DOM text node.
    HtmlText(TextState),
    /// The HTML parser acting as a script-less actor.
    Parser,
    /// A script actor, identified by the host's script id.
    Script {
        /// Host-assigned script id.
        script_id: u64,
    },
    /// A fetched resource, deduplicated by URL.
    Resource {
        /// Request URL.
        url: String,
    },
    /// A host-exposed binding (JS API surface).
    Binding {
        /// Binding name.
        name: String,
    },
    /// One invocation point of a binding.
    BindingEvent {
        /// Binding-event name.
        name: String,
    },
    /// A concrete storage area.
    Storage(StorageKind),
    /// Root node grouping the storage areas.
    StorageRoot,
    /// Root node grouping per-page shields.
    Shields,
    /// One shield toggle, e.g. `"ads"`.
    Shield {
        /// Shield name.
        name: String,
    },
    /// An ad-filter rule that matched on this page.
    AdFilter {
        /// Matched filter rule text.
        rule: String,
    },
    /// A tracker-filter entry that matched on this page.
    TrackerFilter {
        /// Matched tracker host.
        host: String,
    },
    /// A frame rendered out of process.
    RemoteFrame {
        /// Host frame token.
        frame: FrameId,
    },
    /// Aggregate actor for extension activity.
    Extensions,
}

/// The storage areas PageGraph distinguishes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StorageKind {
    /// Document cookies.
    CookieJar,
    /// `window.localStorage`.
    LocalStorage,
    /// `window.sessionStorage`.
    SessionStorage,
}

impl StorageKind {
    /// Category string used in serialized output.
    pub fn name(self) -> &'static str {
        match self {
            StorageKind::CookieJar => "cookie jar",
            StorageKind::LocalStorage => "local storage",
            StorageKind::SessionStorage => "session storage",
        }
    }
}

/// One vertex of the instrumentation graph.
///
/// The graph owns every node; `in_edges`/`out_edges` and all DOM links are
/// ids into the owning [`crate::PageGraph`], never owning references.
#[derive(Debug)]
pub struct GraphNode {
    id: NodeId,
    created_at: Duration,
    in_edges: SmallVec<[EdgeId; 4]>,
    out_edges: SmallVec<[EdgeId; 4]>,
    kind: NodeKind,
}

impl GraphNode {
    pub(crate) fn new(id: NodeId, created_at: Duration, kind: NodeKind) -> Self {
        Self {
            id,
            created_at,
            in_edges: SmallVec::new(),
            out_edges: SmallVec::new(),
            kind,
        }
    }

    /// Process-unique node id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// GraphML element id, `"n{id}"`.
    pub fn graphml_id(&self) -> String {
        format!("n{}", self.id)
    }

    /// Duration since page-navigation start at creation.
    pub fn time_since_page_start(&self) -> Duration {
        self.created_at
    }

    /// Edges targeting this node, in arrival order.
    pub fn in_edges(&self) -> &[EdgeId] {
        &self.in_edges
    }

    /// Edges leaving this node, in arrival order.
    pub fn out_edges(&self) -> &[EdgeId] {
        &self.out_edges
    }

    /// The node's kind.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub(crate) fn push_in_edge(&mut self, edge: EdgeId) {
        self.in_edges.push(edge);
    }

    pub(crate) fn push_out_edge(&mut self, edge: EdgeId) {
        self.out_edges.push(edge);
    }

    /// True for DOM-mirror nodes (elements and text).
    pub fn is_html(&self) -> bool {
        matches!(self.kind, NodeKind::HtmlElement(_) | NodeKind::HtmlText(_))
    }

    /// True for HTML element nodes.
    pub fn is_html_element(&self) -> bool {
        matches!(self.kind, NodeKind::HtmlElement(_))
    }

    /// True for HTML text nodes.
    pub fn is_html_text(&self) -> bool {
        matches!(self.kind, NodeKind::HtmlText(_))
    }

    /// True for actor nodes (parser or script).
    pub fn is_actor(&self) -> bool {
        matches!(self.kind, NodeKind::Parser | NodeKind::Script { .. })
    }

    /// True for resource nodes.
    pub fn is_resource(&self) -> bool {
        matches!(self.kind, NodeKind::Resource { .. })
    }

    /// Element mirror state, if this is an element node.
    pub fn as_element(&self) -> Option<&ElementState> {
        match &self.kind {
            NodeKind::HtmlElement(state) => Some(state),
            _ => None,
        }
    }

    pub(crate) fn as_element_mut(&mut self) -> Option<&mut ElementState> {
        match &mut self.kind {
            NodeKind::HtmlElement(state) => Some(state),
            _ => None,
        }
    }

    /// Text mirror state, if this is a text node.
    pub fn as_text(&self) -> Option<&TextState> {
        match &self.kind {
            NodeKind::HtmlText(state) => Some(state),
            _ => None,
        }
    }

    pub(crate) fn as_text_mut(&mut self) -> Option<&mut TextState> {
        match &mut self.kind {
            NodeKind::HtmlText(state) => Some(state),
            _ => None,
        }
    }

    /// Current DOM parent for element/text nodes, `None` otherwise.
    pub fn dom_parent(&self) -> Option<NodeId> {
        match &self.kind {
            NodeKind::HtmlElement(state) => state.parent(),
            NodeKind::HtmlText(state) => state.parent(),
            _ => None,
        }
    }

    /// Tombstone flag for element/text nodes, `false` otherwise.
    pub fn is_deleted(&self) -> bool {
        match &self.kind {
            NodeKind::HtmlElement(state) => state.is_deleted(),
            NodeKind::HtmlText(state) => state.is_deleted(),
            _ => false,
        }
    }

    /// Short category string, also the serialized `node type`.
    pub fn item_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::HtmlElement(_) => "html element",
            NodeKind::HtmlText(_) => "text node",
            NodeKind::Parser => "parser",
            NodeKind::Script { .. } => "script",
            NodeKind::Resource { .. } => "resource",
            NodeKind::Binding { .. } => "binding",
            NodeKind::BindingEvent { .. } => "binding event",
            NodeKind::Storage(kind) => kind.name(),
            NodeKind::StorageRoot => "storage",
            NodeKind::Shields => "shields",
            NodeKind::Shield { .. } => "shield",
            NodeKind::AdFilter { .. } => "ad filter",
            NodeKind::TrackerFilter { .. } => "tracker filter",
            NodeKind::RemoteFrame { .. } => "remote frame",
            NodeKind::Extensions => "extensions",
        }
    }

    /// Human-readable description including key attributes.
    pub fn item_desc(&self) -> String {
        match &self.kind {
            NodeKind::HtmlElement(state) => {
                format!("html element ({}) #{}", state.tag_name(), self.id)
            }
            NodeKind::HtmlText(state) => {
                format!("text node (len {}) #{}", state.text().len(), self.id)
            }
            NodeKind::Script { script_id } => format!("script #{script_id}"),
            NodeKind::Resource { url } => format!("resource ({url})"),
            NodeKind::Binding { name } => format!("binding ({name})"),
            NodeKind::BindingEvent { name } => format!("binding event ({name})"),
            NodeKind::Shield { name } => format!("shield ({name})"),
            NodeKind::AdFilter { rule } => format!("ad filter ({rule})"),
            NodeKind::TrackerFilter { host } => format!("tracker filter ({host})"),
            NodeKind::RemoteFrame { frame } => format!("remote frame ({frame})"),
            _ => self.item_name().to_owned(),
        }
    }

    /// Kind-specific serialized attributes; names must exist in the GraphML
    /// key vocabulary for the node domain.
    pub fn serialized_attributes(&self, out: &mut Vec<(&'static str, String)>) {
        match &self.kind {
            NodeKind::HtmlElement(state) => {
                out.push(("tag name", state.tag_name().to_owned()));
                out.push(("is deleted", state.is_deleted().to_string()));
            }
            NodeKind::HtmlText(state) => {
                out.push(("text", state.text().to_owned()));
                out.push(("is deleted", state.is_deleted().to_string()));
            }
            NodeKind::Script { script_id } => {
                out.push(("script id", script_id.to_string()));
            }
            NodeKind::Resource { url } => {
                out.push(("url", url.clone()));
            }
            NodeKind::Binding { name } => {
                out.push(("binding", name.clone()));
            }
            NodeKind::BindingEvent { name } => {
                out.push(("binding event", name.clone()));
            }
            NodeKind::Shield { name } => {
                out.push(("shield name", name.clone()));
            }
            NodeKind::AdFilter { rule } => {
                out.push(("rule", rule.clone()));
            }
            NodeKind::TrackerFilter { host } => {
                out.push(("host", host.clone()));
            }
            NodeKind::RemoteFrame { frame } => {
                out.push(("frame id", frame.to_string()));
            }
            NodeKind::Parser
            | NodeKind::Storage(_)
            | NodeKind::StorageRoot
            | NodeKind::Shields
            | NodeKind::Extensions => {}
        }
    }
}
