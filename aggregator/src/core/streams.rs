//! Causal stream reconstruction
//!
//! Groups correlated traces into chains of nested service calls. Candidates
//! are processed outermost-first (latest response first) so a nested call
//! is claimed by its direct parent before any enclosing ancestor sees it.

use std::collections::HashMap;

use shared::{Stream, Trace, TraceId};

/// Assign parent/stream relationships across a batch of traces.
///
/// A trace C nests under T when C's window lies strictly inside T's and C's
/// request left the service that handled T's request. Traces that never
/// gain a parent remain roots of their own stream.
pub fn assign_streams(traces: Vec<Trace>) -> Vec<Trace> {
    let mut order: Vec<usize> = (0..traces.len()).collect();
    order.sort_by(|&a, &b| traces[b].response.timestamp.cmp(&traces[a].response.timestamp));

    let mut parents: Vec<Option<TraceId>> = vec![None; traces.len()];
    let mut streams: Vec<TraceId> = traces.iter().map(|trace| trace.stream_id).collect();

    for &parent_idx in &order {
        let parent = &traces[parent_idx];
        for child_idx in 0..traces.len() {
            if child_idx == parent_idx || parents[child_idx].is_some() {
                continue;
            }
            let child = &traces[child_idx];
            let contained = child.request.timestamp > parent.request.timestamp
                && child.response.timestamp < parent.response.timestamp;
            if contained && child.request.source.ip == parent.request.destination.ip {
                parents[child_idx] = Some(parent.id);
                streams[child_idx] = streams[parent_idx];
            }
        }
    }

    traces
        .into_iter()
        .enumerate()
        .map(|(idx, trace)| match parents[idx] {
            Some(parent_id) => trace.with_parent(parent_id, streams[idx]),
            None => trace,
        })
        .collect()
}

/// Group traces into streams: traces within a stream ordered by request
/// time, streams ordered by their root's request time.
pub fn group_streams(traces: Vec<Trace>) -> Vec<Stream> {
    let mut by_stream: HashMap<TraceId, Vec<Trace>> = HashMap::new();
    for trace in traces {
        by_stream.entry(trace.stream_id).or_default().push(trace);
    }

    let mut streams: Vec<Stream> = by_stream
        .into_iter()
        .map(|(id, mut traces)| {
            traces.sort_by_key(|trace| trace.request.timestamp);
            Stream { id, traces }
        })
        .collect();
    streams.sort_by_key(|stream| stream.started_at());
    streams
}
