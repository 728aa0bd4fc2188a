//! Error types for container encoding.
//!
//! This module defines every failure an encode can report. All of them abort
//! the whole encode; none is retried.

use thiserror::Error;

/// Boxed error returned by the payload and preview collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for container encoding.
#[derive(Error, Debug)]
pub enum Error {
    /// The payload collaborator failed.
    ///
    /// Raised before the header is computed, so nothing has been written
    /// to the sink.
    #[error("Payload generation failed: {0}")]
    PayloadGeneration(#[source] BoxError),

    /// The payload contains a byte outside the ASCII range.
    ///
    /// The payload is never truncated or re-encoded; the first offending
    /// byte and its position are reported instead.
    #[error("Payload byte 0x{byte:02X} at offset {offset} is not ASCII")]
    EncodingConstraint { offset: usize, byte: u8 },

    /// A print parameter does not fit its header field.
    ///
    /// Negative values, non-finite filament lengths and values wider than
    /// the field end up here.
    #[error("Invalid print parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("Offset of {section} section ({offset}) does not fit in 32 bits")]
    SectionTooLarge { section: &'static str, offset: u64 },

    /// The output sink rejected a write.
    ///
    /// The sink may hold a partial container; cleaning it up is the
    /// caller's job.
    #[error(transparent)]
    SinkWrite(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_parameter(name: &'static str, value: impl ToString) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
        }
    }
}
