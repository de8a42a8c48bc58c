//! Test-window matching
//!
//! Attaches every trace to each test-execution node whose time window
//! contains its request. Parent windows enclose their children's, so a
//! trace lands at every matching level of the tree, mirroring that a parent
//! test logically owns its children's traffic.

use std::collections::HashMap;

use shared::{Stream, TestExecutionNode, TestNodeId, Trace};
use tracing::warn;

use crate::error::AggregationWarning;

/// Distribute stream-ordered traces over the test execution forest. Traces
/// inside no window anywhere are dropped with a warning; the capture
/// pipeline's buffering can push a trace past the window that caused it.
pub fn match_test_windows(
    roots: &[TestExecutionNode],
    streams: &[Stream],
) -> (HashMap<TestNodeId, Vec<Trace>>, Vec<AggregationWarning>) {
    let mut assignments = HashMap::new();
    for root in roots {
        collect_node(root, streams, &mut assignments);
    }

    let mut warnings = Vec::new();
    for trace in streams.iter().flat_map(|stream| &stream.traces) {
        if !roots.iter().any(|root| matches_anywhere(root, trace)) {
            warn!(
                "trace {} ({} {}) lies outside every test window",
                trace.id, trace.request.method, trace.request.path
            );
            warnings.push(AggregationWarning::OutsideTestWindows {
                trace_id: trace.id,
                method: trace.request.method.clone(),
                path: trace.request.path.clone(),
            });
        }
    }

    (assignments, warnings)
}

fn collect_node(
    node: &TestExecutionNode,
    streams: &[Stream],
    assignments: &mut HashMap<TestNodeId, Vec<Trace>>,
) {
    // Walking streams in order keeps each node's list grouped and ordered
    // by stream.
    let matched: Vec<Trace> = streams
        .iter()
        .flat_map(|stream| stream.traces.iter())
        .filter(|trace| node.contains(trace.request.timestamp))
        .cloned()
        .collect();

    if !matched.is_empty() {
        assignments.insert(node.id.clone(), matched);
    }

    for child in &node.children {
        collect_node(child, streams, assignments);
    }
}

fn matches_anywhere(node: &TestExecutionNode, trace: &Trace) -> bool {
    node.contains(trace.request.timestamp)
        || node.children.iter().any(|child| matches_anywhere(child, trace))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::streams::{assign_streams, group_streams};
    use crate::testutil::{trace_span, ts};
    use assert_matches::assert_matches;

    fn node(id: &str, start_ms: i64, end_ms: i64, children: Vec<TestExecutionNode>) -> TestExecutionNode {
        TestExecutionNode {
            id: id.into(),
            name: id.to_string(),
            start_time: ts(start_ms),
            end_time: ts(end_ms),
            children,
        }
    }

    #[test]
    fn trace_attaches_at_every_matching_level() {
        let tree = node("suite", 0, 1_000, vec![node("suite/login", 100, 400, vec![])]);
        let trace = trace_span("backend", 150, 200, "172.18.0.1:55000", "172.18.0.2:80");
        let streams = group_streams(assign_streams(vec![trace.clone()]));

        let (assignments, warnings) = match_test_windows(std::slice::from_ref(&tree), &streams);

        assert!(warnings.is_empty());
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[&TestNodeId::from("suite")][0].id, trace.id);
        assert_eq!(assignments[&TestNodeId::from("suite/login")][0].id, trace.id);
    }

    #[test]
    fn trace_in_parent_only_skips_children() {
        let tree = node("suite", 0, 1_000, vec![node("suite/login", 100, 400, vec![])]);
        let trace = trace_span("backend", 600, 700, "172.18.0.1:55000", "172.18.0.2:80");
        let streams = group_streams(assign_streams(vec![trace.clone()]));

        let (assignments, _) = match_test_windows(std::slice::from_ref(&tree), &streams);

        assert_eq!(assignments.len(), 1);
        assert!(assignments.contains_key(&TestNodeId::from("suite")));
    }

    #[test]
    fn outside_window_trace_warns_and_is_dropped() {
        let tree = node("suite", 0, 100, vec![]);
        let trace = trace_span("backend", 500, 600, "172.18.0.1:55000", "172.18.0.2:80");
        let streams = group_streams(assign_streams(vec![trace.clone()]));

        let (assignments, warnings) = match_test_windows(std::slice::from_ref(&tree), &streams);

        assert!(assignments.is_empty());
        assert_matches!(
            warnings.as_slice(),
            [AggregationWarning::OutsideTestWindows { trace_id, .. }] if *trace_id == trace.id
        );
    }

    #[test]
    fn matching_is_idempotent() {
        let tree = node("suite", 0, 1_000, vec![node("suite/a", 0, 500, vec![]), node("suite/b", 500, 1_000, vec![])]);
        let traces = vec![
            trace_span("backend", 100, 200, "172.18.0.1:55000", "172.18.0.2:80"),
            trace_span("backend", 600, 700, "172.18.0.1:55001", "172.18.0.2:80"),
        ];
        let streams = group_streams(assign_streams(traces));

        let (first, first_warnings) = match_test_windows(std::slice::from_ref(&tree), &streams);
        let (second, second_warnings) = match_test_windows(std::slice::from_ref(&tree), &streams);

        assert_eq!(first, second);
        assert_eq!(first_warnings, second_warnings);
    }

    #[test]
    fn node_list_preserves_stream_grouping() {
        let tree = node("suite", 0, 2_000, vec![]);
        let s1_root = trace_span("backend", 0, 300, "172.18.0.1:55000", "172.18.0.2:80");
        let s1_child = trace_span("backend", 50, 250, "172.18.0.2:49001", "172.18.0.3:80");
        let s2_root = trace_span("backend", 400, 500, "172.18.0.1:55001", "172.18.0.2:80");

        let streams = group_streams(assign_streams(vec![s2_root.clone(), s1_child.clone(), s1_root.clone()]));
        let (assignments, _) = match_test_windows(std::slice::from_ref(&tree), &streams);

        let ids: Vec<_> = assignments[&TestNodeId::from("suite")].iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![s1_root.id, s1_child.id, s2_root.id]);
    }
}
