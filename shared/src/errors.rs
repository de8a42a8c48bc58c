//! Shared error types for the trace aggregation core

use thiserror::Error;

use crate::types::PacketKind;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("frame {frame_number} is a {actual} packet, expected {expected}")]
    PacketKindMismatch {
        expected: PacketKind,
        actual: PacketKind,
        frame_number: u64,
    },

    #[error("invalid endpoint address: {input}")]
    InvalidEndpoint { input: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
