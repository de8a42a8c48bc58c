//! Aggregator error and warning types

use std::net::IpAddr;

use shared::{NetworkId, TraceId};
use thiserror::Error;

/// Result type for aggregator operations
pub type AggregatorResult<T> = Result<T, AggregatorError>;

/// Hard failures at the capture boundary.
///
/// Everything downstream of collection degrades to [`AggregationWarning`]s
/// instead; the collector pool converts these into `CollectorFailed`
/// warnings so one broken network never aborts the run.
#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("capture command for network {network} exited with status {status}: {stderr}")]
    CaptureFailed {
        network: NetworkId,
        status: i32,
        stderr: String,
    },

    #[error("capture output for network {network} is not valid packet JSON: {source}")]
    MalformedCapture {
        network: NetworkId,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

/// Recoverable diagnostics accumulated by the pipeline stages.
///
/// Each stage returns its warnings alongside its output and logs them once
/// at the point of detection; the affected trace is omitted or left
/// partially resolved.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregationWarning {
    #[error("no matching request for response frame {frame_number} in network {network}")]
    UnmatchedResponse {
        network: NetworkId,
        frame_number: u64,
    },

    #[error("no known node for {ip} in network {network}")]
    UnresolvedEndpoint { network: NetworkId, ip: IpAddr },

    #[error("packet collection failed for network {network}: {reason}")]
    CollectorFailed { network: NetworkId, reason: String },

    #[error("test-runner IP discovery failed ({reason}); falling back to {fallback}")]
    RunnerIpFallback { fallback: IpAddr, reason: String },

    #[error("trace {trace_id} ({method} {path}) lies outside every test window")]
    OutsideTestWindows {
        trace_id: TraceId,
        method: String,
        path: String,
    },
}
