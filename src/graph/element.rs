//! Graph-local mirror of DOM node state.
//!
//! The graph never queries the live DOM; it answers "who is whose parent"
//! from this bookkeeping, which is folded forward incrementally as
//! structure/attribute/listener edges arrive. Deleted nodes are tombstoned,
//! never dropped, so the graph stays a complete historical trace.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::types::{EdgeId, EventListenerId, NodeId};

/// Mirror state for one HTML element node.
#[derive(Debug)]
pub struct ElementState {
    tag_name: String,
    attributes: BTreeMap<String, String>,
    inline_styles: BTreeMap<String, String>,
    child_nodes: Vec<NodeId>,
    parent: Option<NodeId>,
    event_listeners: FxHashMap<EventListenerId, EdgeId>,
    deleted: bool,
}

impl ElementState {
    /// Fresh element mirror. The tag name is fixed for the element's life.
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: BTreeMap::new(),
            inline_styles: BTreeMap::new(),
            child_nodes: Vec::new(),
            parent: None,
            event_listeners: FxHashMap::default(),
            deleted: false,
        }
    }

    /// Element tag name, e.g. `"div"`.
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Current value of a regular attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Current value of an inline style property.
    pub fn inline_style(&self, name: &str) -> Option<&str> {
        self.inline_styles.get(name).map(String::as_str)
    }

    /// Children in current DOM sibling order.
    pub fn child_nodes(&self) -> &[NodeId] {
        &self.child_nodes
    }

    /// Current parent, if attached.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Edge that registered the given listener, if still present.
    pub fn event_listener(&self, listener: EventListenerId) -> Option<EdgeId> {
        self.event_listeners.get(&listener).copied()
    }

    /// Number of currently registered listeners.
    pub fn event_listener_count(&self) -> usize {
        self.event_listeners.len()
    }

    /// Tombstone flag. One-way; the node stays in the graph regardless.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub(crate) fn set_attribute(&mut self, name: &str, value: &str, is_style: bool) {
        let map = if is_style {
            &mut self.inline_styles
        } else {
            &mut self.attributes
        };
        map.insert(name.to_owned(), value.to_owned());
    }

    pub(crate) fn delete_attribute(&mut self, name: &str, is_style: bool) {
        let map = if is_style {
            &mut self.inline_styles
        } else {
            &mut self.attributes
        };
        // Absent keys may predate recording; removal is a no-op then.
        map.remove(name);
    }

    pub(crate) fn add_event_listener(&mut self, listener: EventListenerId, add_edge: EdgeId) {
        self.event_listeners.insert(listener, add_edge);
    }

    pub(crate) fn remove_event_listener(&mut self, listener: EventListenerId) {
        // Listeners registered before recording began are legitimately absent.
        self.event_listeners.remove(&listener);
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn remove_child(&mut self, child: NodeId) {
        self.child_nodes.retain(|id| *id != child);
    }

    /// Splices `child` into the child list immediately after `prior_sibling`,
    /// or at the front when no sibling is named.
    ///
    /// Panics if a named sibling is not currently a child; that means the
    /// host delivered structure edges out of order.
    pub(crate) fn insert_child_after(&mut self, child: NodeId, prior_sibling: Option<NodeId>) {
        self.child_nodes.retain(|id| *id != child);
        match prior_sibling {
            None => self.child_nodes.insert(0, child),
            Some(sibling) => {
                let at = self
                    .child_nodes
                    .iter()
                    .position(|id| *id == sibling)
                    .unwrap_or_else(|| {
                        panic!(
                            "insert of node {child} names sibling {sibling} \
                             that is not a child of this element"
                        )
                    });
                self.child_nodes.insert(at + 1, child);
            }
        }
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.deleted = true;
    }
}

/// Mirror state for one HTML text node.
#[derive(Debug)]
pub struct TextState {
    text: String,
    parent: Option<NodeId>,
    deleted: bool,
}

impl TextState {
    /// Fresh text-node mirror.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parent: None,
            deleted: false,
        }
    }

    /// Current text content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current parent, if attached.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Tombstone flag.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub(crate) fn set_text(&mut self, text: &str) {
        self.text = text.to_owned();
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.deleted = true;
    }
}
