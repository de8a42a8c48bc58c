//! Correlated request/response traces and causal streams

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{NetworkId, NetworkNode, RequestPacket, ResponsePacket};

/// Identifier of a single correlated trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(Uuid);

impl TraceId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One correlated HTTP request/response pair with resolved endpoints.
///
/// Traces are immutable value objects: pipeline stages derive new instances
/// through the `with_*` constructors instead of mutating shared state.
/// `parent_id` is set at most once and never reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub id: TraceId,
    pub network_id: NetworkId,
    pub parent_id: Option<TraceId>,
    pub stream_id: TraceId,
    pub client: Option<NetworkNode>,
    pub server: Option<NetworkNode>,
    pub request: RequestPacket,
    pub response: ResponsePacket,
}

impl Trace {
    /// A freshly correlated trace is its own stream root until the stream
    /// builder says otherwise.
    pub fn new(
        request: RequestPacket,
        response: ResponsePacket,
        client: Option<NetworkNode>,
        server: Option<NetworkNode>,
    ) -> Self {
        let id = TraceId::random();
        Self {
            id,
            network_id: request.network_id.clone(),
            parent_id: None,
            stream_id: id,
            client,
            server,
            request,
            response,
        }
    }

    /// Wall-clock time between request and response capture.
    pub fn duration_ms(&self) -> i64 {
        (self.response.timestamp - self.request.timestamp).num_milliseconds()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Derive a copy nested under `parent_id`, inheriting its stream.
    pub fn with_parent(self, parent_id: TraceId, stream_id: TraceId) -> Self {
        debug_assert!(self.parent_id.is_none(), "parent assigned twice");
        Self {
            parent_id: Some(parent_id),
            stream_id,
            ..self
        }
    }

    /// Derive a copy with the client re-attributed.
    pub fn with_client(self, client: NetworkNode) -> Self {
        Self {
            client: Some(client),
            ..self
        }
    }
}

/// An ordered chain of causally related traces: one outer request plus the
/// nested requests it triggered, ordered by request time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub id: TraceId,
    pub traces: Vec<Trace>,
}

impl Stream {
    /// The trace that opened the stream.
    pub fn root(&self) -> Option<&Trace> {
        self.traces.iter().find(|trace| trace.is_root())
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.traces.first().map(|trace| trace.request.timestamp)
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }
}
