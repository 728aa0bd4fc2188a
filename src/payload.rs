//! Machine-instruction payload.

use crate::error::{BoxError, Error};

/// Producer of the G-code payload, usually a slicer back end.
pub trait PayloadSource {
    fn render(&mut self) -> Result<Vec<u8>, BoxError>;
}

impl<F> PayloadSource for F
where
    F: FnMut() -> Result<Vec<u8>, BoxError>,
{
    fn render(&mut self) -> Result<Vec<u8>, BoxError> {
        self()
    }
}

/// Make sure every payload byte is ASCII.
///
/// Reports the first byte above `0x7F` as [`Error::EncodingConstraint`].
pub fn check_ascii(payload: &[u8]) -> Result<(), Error> {
    match payload.iter().position(|b| !b.is_ascii()) {
        Some(offset) => Err(Error::EncodingConstraint {
            offset,
            byte: payload[offset],
        }),
        None => Ok(()),
    }
}
