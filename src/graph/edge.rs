//! Graph edges and the closed set of edge kinds.

use std::time::Duration;

use crate::types::{EdgeId, EventListenerId, NodeId, RequestId};

/// Semantic kind of a graph edge. Direction is significant: the edge points
/// from cause to effect (e.g. script -> element for a listener add).
#[derive(Clone, Debug)]
pub enum EdgeKind {
    /// Static parent/child structure recorded at first observation.
    Structure,
    /// Actor created a DOM node.
    NodeCreate,
    /// Actor inserted a DOM node under `parent`, after `prior_sibling`.
    NodeInsert {
        /// New parent; `None` detaches into no parent.
        parent: Option<NodeId>,
        /// Sibling the node lands after; `None` means first child.
        prior_sibling: Option<NodeId>,
    },
    /// Actor removed a DOM node from its parent.
    NodeRemove,
    /// Actor deleted a DOM node; tombstones the subtree.
    NodeDelete,
    /// Actor set an attribute or inline style property.
    AttributeSet {
        /// Attribute or style property name.
        name: String,
        /// New value.
        value: String,
        /// True when this targets `style`, not a regular attribute.
        is_style: bool,
    },
    /// Actor removed an attribute or inline style property.
    AttributeDelete {
        /// Attribute or style property name.
        name: String,
        /// True when this targets `style`, not a regular attribute.
        is_style: bool,
    },
    /// Script registered an event listener on a DOM node.
    EventListenerAdd {
        /// DOM event type, e.g. `"click"`.
        event_type: String,
        /// Host-assigned listener registration id.
        listener_id: EventListenerId,
        /// Script node holding the listener function.
        listener_script: NodeId,
    },
    /// Script removed an event listener from a DOM node.
    EventListenerRemove {
        /// DOM event type.
        event_type: String,
        /// Host-assigned listener registration id.
        listener_id: EventListenerId,
        /// Script node that held the listener function.
        listener_script: NodeId,
    },
    /// Execution relationship (element/script -> script).
    Execute,
    /// Execution triggered from an element attribute, e.g. `onload`.
    ExecuteAttr {
        /// Attribute that held the handler.
        attr_name: String,
    },
    /// Actor touched a binding.
    Binding,
    /// Actor invoked a binding at a script position.
    BindingEvent {
        /// Character offset of the call site in the script source.
        script_position: u64,
    },
    /// Requester started a network request for a resource.
    RequestStart {
        /// Host request id.
        request_id: RequestId,
        /// Requested resource type, e.g. `"script"`.
        resource_type: String,
    },
    /// Resource answered a requester successfully.
    RequestComplete {
        /// Host request id.
        request_id: RequestId,
        /// Resource type as reported at completion.
        resource_type: String,
        /// Base64 SHA-256 of the response body, when a body was streamed.
        response_hash: Option<String>,
        /// Encoded response length in bytes.
        size: i64,
    },
    /// Request terminated with a network error.
    RequestError {
        /// Host request id.
        request_id: RequestId,
    },
    /// Script cleared a storage area.
    StorageClear,
    /// Script deleted one storage key.
    StorageDelete {
        /// Storage key.
        key: String,
    },
    /// Script asked for one storage key.
    StorageReadCall {
        /// Storage key.
        key: String,
    },
    /// Storage answered a read.
    StorageReadResult {
        /// Storage key.
        key: String,
        /// Returned value.
        value: String,
    },
    /// Script wrote one storage key.
    StorageSet {
        /// Storage key.
        key: String,
        /// Written value.
        value: String,
    },
    /// Links the storage root to a concrete storage area.
    StorageBucket,
    /// Activity crossing a frame/DOM boundary.
    CrossDom,
    /// Actor replaced a text node's contents.
    TextChange {
        /// New text content.
        text: String,
    },
    /// A filter matched some activity.
    Filter,
    /// A request was blocked by a filter or shield.
    ResourceBlock,
    /// Shield decision applied to some activity.
    Shield,
    /// Links a frame to the document it hosts.
    Document,
}

/// One connector of the instrumentation graph. Holds only the ids of its
/// endpoints; the graph owns both nodes.
#[derive(Debug)]
pub struct GraphEdge {
    id: EdgeId,
    created_at: Duration,
    out_node: NodeId,
    in_node: NodeId,
    kind: EdgeKind,
}

impl GraphEdge {
    pub(crate) fn new(
        id: EdgeId,
        created_at: Duration,
        out_node: NodeId,
        in_node: NodeId,
        kind: EdgeKind,
    ) -> Self {
        Self {
            id,
            created_at,
            out_node,
            in_node,
            kind,
        }
    }

    /// Process-unique edge id.
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// GraphML element id, `"e{id}"`.
    pub fn graphml_id(&self) -> String {
        format!("e{}", self.id)
    }

    /// Duration since page-navigation start at creation.
    pub fn time_since_page_start(&self) -> Duration {
        self.created_at
    }

    /// Source node (the cause).
    pub fn out_node(&self) -> NodeId {
        self.out_node
    }

    /// Target node (the effect).
    pub fn in_node(&self) -> NodeId {
        self.in_node
    }

    /// The edge's kind.
    pub fn kind(&self) -> &EdgeKind {
        &self.kind
    }

    /// True for the DOM structure family (create/insert/remove/delete).
    pub fn is_structural(&self) -> bool {
        matches!(
            self.kind,
            EdgeKind::Structure
                | EdgeKind::NodeCreate
                | EdgeKind::NodeInsert { .. }
                | EdgeKind::NodeRemove
                | EdgeKind::NodeDelete
        )
    }

    /// True for the request family (start/complete/error).
    pub fn is_request(&self) -> bool {
        matches!(
            self.kind,
            EdgeKind::RequestStart { .. }
                | EdgeKind::RequestComplete { .. }
                | EdgeKind::RequestError { .. }
        )
    }

    /// True for request-start edges.
    pub fn is_request_start(&self) -> bool {
        matches!(self.kind, EdgeKind::RequestStart { .. })
    }

    /// True for the storage family.
    pub fn is_storage(&self) -> bool {
        matches!(
            self.kind,
            EdgeKind::StorageClear
                | EdgeKind::StorageDelete { .. }
                | EdgeKind::StorageReadCall { .. }
                | EdgeKind::StorageReadResult { .. }
                | EdgeKind::StorageSet { .. }
                | EdgeKind::StorageBucket
        )
    }

    /// Short category string, also the serialized `edge type`.
    pub fn item_name(&self) -> &'static str {
        match &self.kind {
            EdgeKind::Structure => "structure",
            EdgeKind::NodeCreate => "create node",
            EdgeKind::NodeInsert { .. } => "insert node",
            EdgeKind::NodeRemove => "remove node",
            EdgeKind::NodeDelete => "delete node",
            EdgeKind::AttributeSet { .. } => "set attribute",
            EdgeKind::AttributeDelete { .. } => "delete attribute",
            EdgeKind::EventListenerAdd { .. } => "add event listener",
            EdgeKind::EventListenerRemove { .. } => "remove event listener",
            EdgeKind::Execute => "execute",
            EdgeKind::ExecuteAttr { .. } => "execute from attribute",
            EdgeKind::Binding => "binding",
            EdgeKind::BindingEvent { .. } => "binding event",
            EdgeKind::RequestStart { .. } => "request start",
            EdgeKind::RequestComplete { .. } => "request complete",
            EdgeKind::RequestError { .. } => "request error",
            EdgeKind::StorageClear => "clear storage",
            EdgeKind::StorageDelete { .. } => "delete storage",
            EdgeKind::StorageReadCall { .. } => "read storage call",
            EdgeKind::StorageReadResult { .. } => "read storage result",
            EdgeKind::StorageSet { .. } => "storage set",
            EdgeKind::StorageBucket => "storage bucket",
            EdgeKind::CrossDom => "cross DOM",
            EdgeKind::TextChange { .. } => "text change",
            EdgeKind::Filter => "filter",
            EdgeKind::ResourceBlock => "resource block",
            EdgeKind::Shield => "shield",
            EdgeKind::Document => "document",
        }
    }

    /// Human-readable description including key attributes.
    pub fn item_desc(&self) -> String {
        match &self.kind {
            EdgeKind::AttributeSet { name, value, .. } => {
                format!("set attribute ({name}={value})")
            }
            EdgeKind::AttributeDelete { name, .. } => format!("delete attribute ({name})"),
            EdgeKind::EventListenerAdd { event_type, .. } => {
                format!("add event listener ({event_type})")
            }
            EdgeKind::EventListenerRemove { event_type, .. } => {
                format!("remove event listener ({event_type})")
            }
            EdgeKind::RequestStart {
                request_id,
                resource_type,
            } => format!("request start #{request_id} ({resource_type})"),
            EdgeKind::RequestComplete { request_id, .. } => {
                format!("request complete #{request_id}")
            }
            EdgeKind::RequestError { request_id } => format!("request error #{request_id}"),
            _ => self.item_name().to_owned(),
        }
    }

    /// Kind-specific serialized attributes; names must exist in the GraphML
    /// key vocabulary for the edge domain.
    pub fn serialized_attributes(&self, out: &mut Vec<(&'static str, String)>) {
        match &self.kind {
            EdgeKind::NodeInsert {
                parent,
                prior_sibling,
            } => {
                if let Some(parent) = parent {
                    out.push(("parent", parent.to_string()));
                }
                if let Some(sibling) = prior_sibling {
                    out.push(("prior sibling", sibling.to_string()));
                }
            }
            EdgeKind::AttributeSet {
                name,
                value,
                is_style,
            } => {
                out.push(("key", name.clone()));
                out.push(("value", value.clone()));
                out.push(("is style", is_style.to_string()));
            }
            EdgeKind::AttributeDelete { name, is_style } => {
                out.push(("key", name.clone()));
                out.push(("is style", is_style.to_string()));
            }
            EdgeKind::EventListenerAdd {
                event_type,
                listener_id,
                listener_script,
            }
            | EdgeKind::EventListenerRemove {
                event_type,
                listener_id,
                listener_script,
            } => {
                out.push(("event type", event_type.clone()));
                out.push(("event listener id", listener_id.to_string()));
                out.push(("script id", listener_script.to_string()));
            }
            EdgeKind::ExecuteAttr { attr_name } => {
                out.push(("attr name", attr_name.clone()));
            }
            EdgeKind::BindingEvent { script_position } => {
                out.push(("script position", script_position.to_string()));
            }
            EdgeKind::RequestStart {
                request_id,
                resource_type,
            } => {
                out.push(("request id", request_id.to_string()));
                out.push(("resource type", resource_type.clone()));
            }
            EdgeKind::RequestComplete {
                request_id,
                resource_type,
                response_hash,
                size,
            } => {
                out.push(("request id", request_id.to_string()));
                out.push(("resource type", resource_type.clone()));
                out.push(("status", "success".to_owned()));
                out.push(("size", size.to_string()));
                if let Some(hash) = response_hash {
                    out.push(("response hash", hash.clone()));
                }
            }
            EdgeKind::RequestError { request_id } => {
                out.push(("request id", request_id.to_string()));
                out.push(("status", "error".to_owned()));
            }
            EdgeKind::StorageDelete { key } | EdgeKind::StorageReadCall { key } => {
                out.push(("key", key.clone()));
            }
            EdgeKind::StorageReadResult { key, value } | EdgeKind::StorageSet { key, value } => {
                out.push(("key", key.clone()));
                out.push(("value", value.clone()));
            }
            EdgeKind::TextChange { text } => {
                out.push(("text", text.clone()));
            }
            EdgeKind::Structure
            | EdgeKind::NodeCreate
            | EdgeKind::NodeRemove
            | EdgeKind::NodeDelete
            | EdgeKind::Execute
            | EdgeKind::Binding
            | EdgeKind::StorageClear
            | EdgeKind::StorageBucket
            | EdgeKind::CrossDom
            | EdgeKind::Filter
            | EdgeKind::ResourceBlock
            | EdgeKind::Shield
            | EdgeKind::Document => {}
        }
    }
}
