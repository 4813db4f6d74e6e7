//! Accumulated state for one tracked network request.

use base64::Engine;
use sha2::{Digest, Sha256};
use smallvec::SmallVec;

use crate::types::{FrameId, NodeId, RequestId};

/// Terminal status of a tracked request. Monotonic: `Unknown` moves to
/// `Success` or `Error` once and never reverses.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RequestStatus {
    /// No completion signal received yet.
    Unknown,
    /// The request completed with a response.
    Success,
    /// The request terminated with a network error.
    Error,
}

impl RequestStatus {
    /// Serialized status string.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Unknown => "unknown",
            RequestStatus::Success => "success",
            RequestStatus::Error => "error",
        }
    }
}

/// Streaming SHA-256 over the response body, finalized exactly once into a
/// base64 digest.
#[derive(Clone, Debug)]
enum BodyDigest {
    Streaming(Sha256),
    Finished(Option<String>),
}

impl BodyDigest {
    fn update(&mut self, chunk: &[u8], request_id: RequestId) {
        match self {
            BodyDigest::Streaming(hasher) => hasher.update(chunk),
            BodyDigest::Finished(_) => {
                panic!("request {request_id}: response body bytes after digest finalize")
            }
        }
    }

    /// `saw_body` distinguishes "hash of empty body" from "no body at all"
    /// (error finalization with no streamed bytes).
    fn finish(&mut self, saw_body: bool, request_id: RequestId) {
        match self {
            BodyDigest::Streaming(hasher) => {
                let hash = if saw_body {
                    let digest = std::mem::take(hasher).finalize();
                    Some(base64::engine::general_purpose::STANDARD.encode(digest))
                } else {
                    None
                };
                *self = BodyDigest::Finished(hash);
            }
            BodyDigest::Finished(_) => {
                panic!("request {request_id}: response body digest finalized twice")
            }
        }
    }

    fn hash(&self) -> Option<&str> {
        match self {
            BodyDigest::Streaming(_) => None,
            BodyDigest::Finished(hash) => hash.as_deref(),
        }
    }
}

/// State accumulated for one request id across possibly-multiple requesters.
#[derive(Clone, Debug)]
pub struct TrackedRequest {
    request_id: RequestId,
    frame: FrameId,
    requesters: SmallVec<[NodeId; 2]>,
    resource: NodeId,
    resource_type: String,
    status: RequestStatus,
    encoded_data_length: i64,
    redirects: Vec<String>,
    digest: BodyDigest,
    saw_body: bool,
}

impl TrackedRequest {
    pub(crate) fn new(
        request_id: RequestId,
        frame: FrameId,
        requester: NodeId,
        resource: NodeId,
        resource_type: &str,
    ) -> Self {
        let mut requesters = SmallVec::new();
        requesters.push(requester);
        Self {
            request_id,
            frame,
            requesters,
            resource,
            resource_type: resource_type.to_owned(),
            status: RequestStatus::Unknown,
            encoded_data_length: 0,
            redirects: Vec::new(),
            digest: BodyDigest::Streaming(Sha256::new()),
            saw_body: false,
        }
    }

    /// Host request id this record tracks.
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Frame that carried the first registration.
    pub fn frame(&self) -> &FrameId {
        &self.frame
    }

    /// Every node that initiated this exact request, in registration order.
    pub fn requesters(&self) -> &[NodeId] {
        &self.requesters
    }

    /// Resource node, fixed at first registration.
    pub fn resource(&self) -> NodeId {
        self.resource
    }

    /// Resource type, fixed at first registration.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Current status.
    pub fn status(&self) -> RequestStatus {
        self.status
    }

    /// Encoded response length; meaningful once status is `Success`.
    pub fn encoded_data_length(&self) -> i64 {
        self.encoded_data_length
    }

    /// Redirect hop URLs in arrival order.
    pub fn redirects(&self) -> &[String] {
        &self.redirects
    }

    /// True once at least one requester, a resource, and a terminal status
    /// are all present. Monotonic; never becomes false again.
    pub fn is_complete(&self) -> bool {
        !self.requesters.is_empty() && self.status != RequestStatus::Unknown
    }

    /// Finalized body hash. Only callable once the request succeeded;
    /// calling it in any other state is a host-contract violation.
    pub fn response_body_hash(&self) -> Option<&str> {
        assert_eq!(
            self.status,
            RequestStatus::Success,
            "request {}: body hash read before successful completion",
            self.request_id
        );
        self.digest.hash()
    }

    pub(crate) fn add_requester(&mut self, requester: NodeId) {
        self.requesters.push(requester);
    }

    pub(crate) fn add_redirect(&mut self, url: &str) {
        self.redirects.push(url.to_owned());
    }

    pub(crate) fn update_body(&mut self, chunk: &[u8]) {
        self.saw_body = true;
        self.digest.update(chunk, self.request_id);
    }

    pub(crate) fn mark_success(&mut self, encoded_data_length: i64) {
        match self.status {
            RequestStatus::Unknown => {
                self.status = RequestStatus::Success;
                self.encoded_data_length = encoded_data_length;
                self.digest.finish(self.saw_body, self.request_id);
            }
            // Further completion callbacks for other requesters of the same
            // record; the first reply's metadata stands.
            RequestStatus::Success => {}
            RequestStatus::Error => panic!(
                "request {}: success signaled after error finalization",
                self.request_id
            ),
        }
    }

    pub(crate) fn mark_error(&mut self) {
        match self.status {
            RequestStatus::Unknown => {
                self.status = RequestStatus::Error;
                self.digest.finish(false, self.request_id);
            }
            RequestStatus::Error => {}
            RequestStatus::Success => panic!(
                "request {}: error signaled after successful completion",
                self.request_id
            ),
        }
    }
}

/// A [`TrackedRequest`] plus reply-fan-out bookkeeping. Lives in the
/// tracker's live map until every requester has received its completion
/// reply, then retires into the completed history.
#[derive(Clone, Debug)]
pub struct TrackedRequestRecord {
    request: TrackedRequest,
    num_complete_replies: usize,
}

impl TrackedRequestRecord {
    pub(crate) fn new(request: TrackedRequest) -> Self {
        Self {
            request,
            num_complete_replies: 0,
        }
    }

    /// The tracked request.
    pub fn request(&self) -> &TrackedRequest {
        &self.request
    }

    /// Completion replies handed out so far.
    pub fn num_complete_replies(&self) -> usize {
        self.num_complete_replies
    }

    pub(crate) fn request_mut(&mut self) -> &mut TrackedRequest {
        &mut self.request
    }

    /// Counts one reply; returns the new count.
    pub(crate) fn register_reply(&mut self) -> usize {
        self.num_complete_replies += 1;
        self.num_complete_replies
    }
}
