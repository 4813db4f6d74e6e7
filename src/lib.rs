//! In-process page instrumentation graph.
//!
//! `pagegraph` records DOM, script, and network activity reported by a
//! renderer host as an append-only graph of typed nodes and edges, tracks
//! in-flight network requests across multiple initiators, and serializes
//! the whole history as GraphML.
//!
//! The host drives everything through synchronous callbacks on a single
//! logical sequence; there is no internal locking and no async. Violations
//! of the host contract (reused request ids pointing at different
//! resources, out-of-order DOM edges, completion signals for requests that
//! were never started) panic rather than produce a silently corrupt graph.

pub mod context;
pub mod graph;
pub mod graphml;
pub mod request;
pub mod types;

pub use context::{GraphContext, ManualClock, MonotonicClock, PageClock};
pub use graph::edge::{EdgeKind, GraphEdge};
pub use graph::element::{ElementState, TextState};
pub use graph::node::{GraphNode, NodeKind, StorageKind};
pub use graph::PageGraph;
pub use request::tracked::{RequestStatus, TrackedRequest, TrackedRequestRecord};
pub use request::{DocumentRequest, RequestCompletion, RequestTracker};
pub use types::{EdgeId, EventListenerId, FrameId, NodeId, PageGraphError, RequestId, Result};
