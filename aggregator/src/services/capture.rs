//! Exec-based packet capture adapter
//!
//! Shells out to the per-network capture helper and parses its JSON output.
//! Single attempt, no retry; failures surface as [`AggregatorError`] and
//! are downgraded to warnings by the collector pool.

use std::process::Command;

use async_trait::async_trait;
use shared::{CapturedPacket, NetworkId};
use tracing::debug;

use crate::error::{AggregatorError, AggregatorResult};
use crate::traits::PacketCapture;

/// Runs an external capture program once per network, e.g.
/// `capture-dump --format json <network>`. The network id is appended as
/// the final argument; stdout must be a JSON array of captured packets.
#[derive(Debug, Clone)]
pub struct ExecPacketCapture {
    program: String,
    args: Vec<String>,
}

impl ExecPacketCapture {
    pub fn new<S: Into<String>>(program: S, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn run_capture(&self, network: &NetworkId) -> AggregatorResult<Vec<CapturedPacket>> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(network.as_str())
            .output()?;

        if !output.status.success() {
            return Err(AggregatorError::CaptureFailed {
                network: network.clone(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let packets: Vec<CapturedPacket> =
            serde_json::from_slice(&output.stdout).map_err(|source| AggregatorError::MalformedCapture {
                network: network.clone(),
                source,
            })?;

        debug!("captured {} packets from network {network}", packets.len());
        Ok(packets)
    }
}

#[async_trait]
impl PacketCapture for ExecPacketCapture {
    async fn capture_packets(&self, network: &NetworkId) -> AggregatorResult<Vec<CapturedPacket>> {
        let capture = self.clone();
        let network = network.clone();
        // The helper blocks until its dump is written; keep it off the
        // runtime worker threads.
        tokio::task::spawn_blocking(move || capture.run_capture(&network)).await?
    }
}
