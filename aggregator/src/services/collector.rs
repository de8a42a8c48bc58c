//! Per-network packet collection
//!
//! One collector task per monitored network, run in parallel. A failing
//! network degrades to zero packets without affecting the others; there is
//! no retry and no cancellation.

use std::sync::Arc;

use futures_util::future::join_all;
use shared::{CapturedPacket, NetworkId};
use tracing::{info, warn};

use crate::error::AggregationWarning;
use crate::traits::PacketCapture;

pub struct CollectorPool {
    capture: Arc<dyn PacketCapture>,
}

impl CollectorPool {
    pub fn new(capture: Arc<dyn PacketCapture>) -> Self {
        Self { capture }
    }

    /// Pull packet batches from every monitored network in parallel and
    /// merge them into one list.
    pub async fn collect_all(&self, networks: &[NetworkId]) -> (Vec<CapturedPacket>, Vec<AggregationWarning>) {
        let tasks: Vec<_> = networks
            .iter()
            .cloned()
            .map(|network| {
                let capture = Arc::clone(&self.capture);
                tokio::spawn(async move { capture.capture_packets(&network).await })
            })
            .collect();

        let mut packets = Vec::new();
        let mut warnings = Vec::new();

        for (network, joined) in networks.iter().zip(join_all(tasks).await) {
            match joined {
                Ok(Ok(batch)) => {
                    info!("collected {} packets from network {network}", batch.len());
                    packets.extend(batch);
                }
                Ok(Err(e)) => {
                    warn!("packet collection failed for network {network}: {e}");
                    warnings.push(AggregationWarning::CollectorFailed {
                        network: network.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    warn!("collector task for network {network} did not complete: {e}");
                    warnings.push(AggregationWarning::CollectorFailed {
                        network: network.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        (packets, warnings)
    }
}
