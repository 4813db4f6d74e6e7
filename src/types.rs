//! Identifier newtypes and the crate error type.

use std::fmt;

/// Identifier of a graph node. Allocated by [`crate::GraphContext`] from the
/// counter shared with edge ids; never reused within one graph.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct NodeId(pub u64);

/// Identifier of a graph edge. Drawn from the same counter as node ids.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct EdgeId(pub u64);

/// Externally assigned identifier of one logical network request, as seen by
/// the host's instrumentation hook.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct RequestId(pub u64);

/// Externally assigned identifier of a DOM event listener registration.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct EventListenerId(pub u64);

/// Opaque frame token handed to us by the host; keys document requests.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FrameId(pub String);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EventListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FrameId {
    fn from(value: &str) -> Self {
        FrameId(value.to_owned())
    }
}

/// Errors surfaced through `Result`. Host-contract violations do not go
/// through this type; they panic at the point of violation.
#[derive(thiserror::Error, Debug)]
pub enum PageGraphError {
    /// Writing serialized output to the caller's sink failed.
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PageGraphError>;
