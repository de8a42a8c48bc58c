//! Logical network participants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use uuid::Uuid;

/// Identifier of a monitored Docker network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkId(String);

impl NetworkId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NetworkId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Role of a participant within a monitored network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Container,
    TestRunner,
    MockServer,
    NetworkGateway,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Container => write!(f, "container"),
            NodeType::TestRunner => write!(f, "test_runner"),
            NodeType::MockServer => write!(f, "mock_server"),
            NodeType::NetworkGateway => write!(f, "network_gateway"),
        }
    }
}

/// Palette for report rendering; participants receive colors round-robin in
/// the order they are first observed.
pub const NODE_COLORS: [&str; 8] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#9c755f",
];

/// A logical network participant. Created once when first observed in a
/// network, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub id: Uuid,
    pub node_type: NodeType,
    /// Mock servers are addressed by virtual hostname rather than IP.
    pub ip_address: Option<IpAddr>,
    pub display_name: String,
    pub color: String,
}

impl NetworkNode {
    pub fn new<N, C>(node_type: NodeType, ip_address: Option<IpAddr>, display_name: N, color: C) -> Self
    where
        N: Into<String>,
        C: Into<String>,
    {
        Self {
            id: Uuid::new_v4(),
            node_type,
            ip_address,
            display_name: display_name.into(),
            color: color.into(),
        }
    }
}

impl fmt::Display for NetworkNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.node_type)
    }
}
