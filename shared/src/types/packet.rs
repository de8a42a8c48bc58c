//! Captured packet records produced by the external capture collaborator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

use super::NetworkId;
use crate::errors::SharedError;

/// One side of a TCP conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub ip: IpAddr,
    pub port: u16,
}

impl Endpoint {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self { ip, port }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

impl std::str::FromStr for Endpoint {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SharedError::InvalidEndpoint { input: s.to_string() };
        let (ip, port) = s.rsplit_once(':').ok_or_else(invalid)?;
        Ok(Self {
            ip: ip.parse().map_err(|_| invalid())?,
            port: port.parse().map_err(|_| invalid())?,
        })
    }
}

/// Ordered multi-map of HTTP headers. Insertion order is preserved; lookup
/// is case-insensitive on the header name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        self.0.push((name.into(), value.into()));
    }

    /// First value recorded under `name`, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// `Host` header value, lowercased and with any `:port` suffix stripped.
    pub fn host(&self) -> Option<String> {
        self.get("host")
            .map(|host| host.split(':').next().unwrap_or(host).trim().to_ascii_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for Headers {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Direction of a captured packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PacketKind {
    Request,
    Response,
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketKind::Request => write!(f, "REQUEST"),
            PacketKind::Response => write!(f, "RESPONSE"),
        }
    }
}

/// Request- or response-specific fields of a captured packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum PacketDetail {
    Request { method: String, path: String },
    Response { status_code: u16, status_text: String },
}

/// A raw captured HTTP packet, deserialized from the capture collaborator's
/// JSON output. Produced once per test run and never mutated after
/// ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedPacket {
    /// Network-local frame number, monotonically increasing per capture
    /// session.
    pub frame_number: u64,
    pub network_id: NetworkId,
    pub timestamp: DateTime<Utc>,
    pub source: Endpoint,
    pub destination: Endpoint,
    pub protocol_version: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(flatten)]
    pub detail: PacketDetail,
    /// Frame number of the request this response answers, when the capture
    /// tool could determine it directly.
    #[serde(default)]
    pub correlation_hint: Option<u64>,
}

impl CapturedPacket {
    pub fn kind(&self) -> PacketKind {
        match self.detail {
            PacketDetail::Request { .. } => PacketKind::Request,
            PacketDetail::Response { .. } => PacketKind::Response,
        }
    }

    pub fn is_request(&self) -> bool {
        self.kind() == PacketKind::Request
    }

    pub fn is_response(&self) -> bool {
        self.kind() == PacketKind::Response
    }
}

/// Typed view of a REQUEST packet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestPacket {
    pub frame_number: u64,
    pub network_id: NetworkId,
    pub timestamp: DateTime<Utc>,
    pub source: Endpoint,
    pub destination: Endpoint,
    pub protocol_version: String,
    pub headers: Headers,
    pub payload: Option<String>,
    pub method: String,
    pub path: String,
}

impl TryFrom<CapturedPacket> for RequestPacket {
    type Error = SharedError;

    fn try_from(packet: CapturedPacket) -> Result<Self, Self::Error> {
        match packet.detail {
            PacketDetail::Request { method, path } => Ok(Self {
                frame_number: packet.frame_number,
                network_id: packet.network_id,
                timestamp: packet.timestamp,
                source: packet.source,
                destination: packet.destination,
                protocol_version: packet.protocol_version,
                headers: packet.headers,
                payload: packet.payload,
                method,
                path,
            }),
            PacketDetail::Response { .. } => Err(SharedError::PacketKindMismatch {
                expected: PacketKind::Request,
                actual: PacketKind::Response,
                frame_number: packet.frame_number,
            }),
        }
    }
}

/// Typed view of a RESPONSE packet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePacket {
    pub frame_number: u64,
    pub network_id: NetworkId,
    pub timestamp: DateTime<Utc>,
    pub source: Endpoint,
    pub destination: Endpoint,
    pub protocol_version: String,
    pub headers: Headers,
    pub payload: Option<String>,
    pub status_code: u16,
    pub status_text: String,
    pub correlation_hint: Option<u64>,
}

impl TryFrom<CapturedPacket> for ResponsePacket {
    type Error = SharedError;

    fn try_from(packet: CapturedPacket) -> Result<Self, Self::Error> {
        match packet.detail {
            PacketDetail::Response { status_code, status_text } => Ok(Self {
                frame_number: packet.frame_number,
                network_id: packet.network_id,
                timestamp: packet.timestamp,
                source: packet.source,
                destination: packet.destination,
                protocol_version: packet.protocol_version,
                headers: packet.headers,
                payload: packet.payload,
                status_code,
                status_text,
                correlation_hint: packet.correlation_hint,
            }),
            PacketDetail::Request { .. } => Err(SharedError::PacketKindMismatch {
                expected: PacketKind::Response,
                actual: PacketKind::Request,
                frame_number: packet.frame_number,
            }),
        }
    }
}
