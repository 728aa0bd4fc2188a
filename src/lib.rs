//! xgcode container encoder
//!
//! This crate writes the `xgcode 1.0` container read by FlashForge style
//! printers: a fixed header, an 80x60 BMP thumbnail, a 320x320 PNG preview
//! and the G-code itself, back to back in a single file.
//!
//! # Example
//!
//! ```rust
//! use xgcode::{Encoder, PrintParams, HEADER_SIZE};
//!
//! let params = PrintParams::new(120, 0.5)
//!     .shell_count(3)
//!     .print_speed(60)
//!     .bed_temperature(60)
//!     .extruder_temperature(200);
//!
//! let mut out: Vec<u8> = Vec::new();
//! Encoder::new()
//!     .encode(&mut out, b"G1\n", b"", b"AB", &params)
//!     .unwrap();
//!
//! assert_eq!(out.len(), HEADER_SIZE + 2 + 3);
//! assert_eq!(&out[HEADER_SIZE..HEADER_SIZE + 2], b"AB");
//! ```

mod encoder;
mod error;
mod header;
mod params;
mod payload;
pub mod preview;

pub use crate::{
    encoder::{encode, Encoder},
    error::{BoxError, Error},
    header::{Field, Header, Layout, HEADER_SIZE, MAGIC},
    params::PrintParams,
    payload::{check_ascii, PayloadSource},
    preview::{Encoding, Preview, PreviewSource, PreviewSpec, PREVIEW, THUMBNAIL},
};
