//! Aggregator trait definitions for dependency injection

use async_trait::async_trait;

use crate::error::AggregatorResult;
use shared::{CapturedPacket, NetworkId};

/// External packet-capture collaborator, one logical capture per monitored
/// network.
///
/// Invoked exactly once per network when collection starts; there is no
/// retry. A failing network is reported as a warning and contributes zero
/// packets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PacketCapture: Send + Sync {
    /// Pull the batch of packets captured on `network` so far.
    async fn capture_packets(&self, network: &NetworkId) -> AggregatorResult<Vec<CapturedPacket>>;
}
