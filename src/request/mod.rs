//! Network request tracking.
//!
//! Maps host-assigned request ids to accumulated state across potentially
//! multiple requesters, counts completion replies so every requester gets
//! exactly one, and keeps a bounded history of completed requests to
//! validate id reuse. A separate, simpler map tracks top-level document
//! (navigation) requests with at most one live entry per frame.
//!
//! Desynchronization with the host (completing a request that never
//! started, reusing an id for a different resource, flipping a finalized
//! status) panics; it cannot be repaired locally and silently continuing
//! would corrupt the graph.

pub mod tracked;

use std::collections::hash_map::Entry;
use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::types::{FrameId, NodeId, RequestId};
use tracked::{RequestStatus, TrackedRequest, TrackedRequestRecord};

/// How many completed requests are retained for id-reuse validation.
const COMPLETED_HISTORY_LIMIT: usize = 512;

/// Snapshot handed back for each completion reply.
#[derive(Clone, Debug)]
pub struct RequestCompletion {
    /// Host request id.
    pub request_id: RequestId,
    /// Every requester registered before this reply.
    pub requesters: SmallVec<[NodeId; 2]>,
    /// Resource node for the request.
    pub resource: NodeId,
    /// Resource type fixed at first registration.
    pub resource_type: String,
    /// Terminal status.
    pub status: RequestStatus,
    /// Base64 SHA-256 of the response body, on success with a body.
    pub response_body_hash: Option<String>,
    /// Encoded response length.
    pub encoded_data_length: i64,
    /// True on the reply that transitioned the request to its terminal
    /// status; completion edges are written exactly once, here.
    pub is_first_reply: bool,
    /// True once every requester has been answered and the record left the
    /// live map.
    pub retired: bool,
}

/// One top-level navigation request, keyed by request id.
#[derive(Clone, Debug)]
pub struct DocumentRequest {
    request_id: RequestId,
    frame: FrameId,
    url: String,
    is_complete: bool,
}

impl DocumentRequest {
    /// Host request id of the navigation.
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Frame performing the navigation.
    pub fn frame(&self) -> &FrameId {
        &self.frame
    }

    /// Navigation URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// True once the navigation completed.
    pub fn is_complete(&self) -> bool {
        self.is_complete
    }
}

/// Tracks in-flight network requests for one graph.
#[derive(Debug, Default)]
pub struct RequestTracker {
    live: FxHashMap<RequestId, TrackedRequestRecord>,
    completed: FxHashMap<RequestId, NodeId>,
    completed_order: VecDeque<RequestId>,
    documents: FxHashMap<RequestId, DocumentRequest>,
    document_initiators: FxHashMap<FrameId, RequestId>,
}

impl RequestTracker {
    /// Empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a requester for `request_id`.
    ///
    /// First registration creates the record; later ones fan in as
    /// additional requesters of the same resource and must agree on
    /// `resource` and `resource_type`. If a completed request previously
    /// used this id for a different resource, the host broke its id
    /// contract and this panics.
    pub fn register_request_start(
        &mut self,
        request_id: RequestId,
        requester: NodeId,
        frame: &FrameId,
        resource: NodeId,
        resource_type: &str,
    ) -> &TrackedRequestRecord {
        match self.live.entry(request_id) {
            Entry::Occupied(entry) => {
                let record = entry.into_mut();
                let request = record.request_mut();
                assert_eq!(
                    request.resource(),
                    resource,
                    "request {request_id} re-registered with a different resource"
                );
                assert_eq!(
                    request.resource_type(),
                    resource_type,
                    "request {request_id} re-registered with a different resource type"
                );
                request.add_requester(requester);
                debug!(%request_id, %requester, requesters = request.requesters().len(),
                    "requester fan-in on live request");
                record
            }
            Entry::Vacant(entry) => {
                if let Some(prior_resource) = self.completed.get(&request_id) {
                    assert_eq!(
                        *prior_resource, resource,
                        "request id {request_id} reused for a different resource"
                    );
                }
                debug!(%request_id, %requester, %frame, resource_type, "tracking new request");
                let request = TrackedRequest::new(
                    request_id,
                    frame.clone(),
                    requester,
                    resource,
                    resource_type,
                );
                entry.insert(TrackedRequestRecord::new(request))
            }
        }
    }

    /// Appends a redirect hop; completion state is untouched.
    pub fn register_request_redirect(&mut self, request_id: RequestId, frame: &FrameId, url: &str) {
        let record = self.live_record_mut(request_id, "redirect");
        record.request_mut().add_redirect(url);
        debug!(%request_id, %frame, url, "request redirect");
    }

    /// Streams response body bytes into the request's content digest.
    pub fn update_response_body(&mut self, request_id: RequestId, chunk: &[u8]) {
        self.live_record_mut(request_id, "response body")
            .request_mut()
            .update_body(chunk);
    }

    /// Records a successful completion and runs the fan-out reply logic.
    pub fn register_request_complete(
        &mut self,
        request_id: RequestId,
        encoded_data_length: i64,
        frame: &FrameId,
    ) -> RequestCompletion {
        let record = self.live_record_mut(request_id, "completion");
        let was_pending = record.request().status() == RequestStatus::Unknown;
        record.request_mut().mark_success(encoded_data_length);
        debug!(%request_id, %frame, encoded_data_length, first = was_pending, "request complete");
        self.return_tracking_record(request_id, was_pending)
    }

    /// Records an error termination and runs the fan-out reply logic.
    pub fn register_request_error(
        &mut self,
        request_id: RequestId,
        frame: &FrameId,
    ) -> RequestCompletion {
        let record = self.live_record_mut(request_id, "error");
        let was_pending = record.request().status() == RequestStatus::Unknown;
        record.request_mut().mark_error();
        debug!(%request_id, %frame, first = was_pending, "request error");
        self.return_tracking_record(request_id, was_pending)
    }

    /// Live record for `request_id`, `None` once retired (or never started).
    pub fn tracking_record(&self, request_id: RequestId) -> Option<&TrackedRequestRecord> {
        self.live.get(&request_id)
    }

    /// Resource a completed request id resolved to, while still in history.
    pub fn completed_resource(&self, request_id: RequestId) -> Option<NodeId> {
        self.completed.get(&request_id).copied()
    }

    /// Registers a top-level navigation request for a frame.
    ///
    /// A frame may have at most one live document request. Re-announcing the
    /// same request id is a no-op; announcing a different one means the host
    /// failed to retire the first navigation and panics.
    pub fn register_document_request_start(
        &mut self,
        request_id: RequestId,
        frame: &FrameId,
        url: &str,
    ) {
        if let Some(existing) = self.document_initiators.get(frame) {
            assert_eq!(
                *existing, request_id,
                "frame {frame} already has live document request {existing}"
            );
            return;
        }
        debug!(%request_id, %frame, url, "tracking document request");
        self.document_initiators.insert(frame.clone(), request_id);
        self.documents.insert(
            request_id,
            DocumentRequest {
                request_id,
                frame: frame.clone(),
                url: url.to_owned(),
                is_complete: false,
            },
        );
    }

    /// Marks a navigation complete and frees its frame's slot.
    pub fn register_document_request_complete(&mut self, request_id: RequestId) {
        let doc = self
            .documents
            .get_mut(&request_id)
            .unwrap_or_else(|| panic!("completion for untracked document request {request_id}"));
        doc.is_complete = true;
        self.document_initiators.remove(&doc.frame);
        debug!(%request_id, frame = %doc.frame, "document request complete");
    }

    /// Navigation record for a request id, if tracked.
    pub fn document_request_info(&self, request_id: RequestId) -> Option<&DocumentRequest> {
        self.documents.get(&request_id)
    }

    fn live_record_mut(&mut self, request_id: RequestId, what: &str) -> &mut TrackedRequestRecord {
        self.live
            .get_mut(&request_id)
            .unwrap_or_else(|| panic!("{what} signal for untracked request {request_id}"))
    }

    /// Counts one completion reply. The record stays live until every
    /// requester has been answered, then moves into the completed history.
    fn return_tracking_record(
        &mut self,
        request_id: RequestId,
        is_first_reply: bool,
    ) -> RequestCompletion {
        let record = self.live_record_mut(request_id, "reply");
        let replies = record.register_reply();
        let request = record.request();
        let retire = replies >= request.requesters().len();

        let completion = RequestCompletion {
            request_id,
            requesters: SmallVec::from_slice(request.requesters()),
            resource: request.resource(),
            resource_type: request.resource_type().to_owned(),
            status: request.status(),
            response_body_hash: match request.status() {
                RequestStatus::Success => request.response_body_hash().map(str::to_owned),
                _ => None,
            },
            encoded_data_length: request.encoded_data_length(),
            is_first_reply,
            retired: retire,
        };

        if retire {
            let resource = completion.resource;
            self.live.remove(&request_id);
            if self.completed.insert(request_id, resource).is_none() {
                self.completed_order.push_back(request_id);
            }
            while self.completed_order.len() > COMPLETED_HISTORY_LIMIT {
                if let Some(evicted) = self.completed_order.pop_front() {
                    self.completed.remove(&evicted);
                }
            }
            debug!(%request_id, replies, status = completion.status.as_str(),
                "request retired to history");
        }

        completion
    }
}
