//! Externally supplied test-execution tree

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a test-execution node, assigned by the surrounding
/// harness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestNodeId(String);

impl TestNodeId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TestNodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One node of the test execution tree, with start/end times already
/// finalized by the harness. Read-only for the aggregator. A child's
/// interval is contained within its parent's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestExecutionNode {
    pub id: TestNodeId,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub children: Vec<TestExecutionNode>,
}

impl TestExecutionNode {
    /// Whether `at` falls inside this node's window, bounds inclusive.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start_time && at <= self.end_time
    }
}
