use std::io::Write;

use log::{debug, info};

use crate::{
    error::Error,
    header::{Header, Layout},
    params::PrintParams,
    payload::{check_ascii, PayloadSource},
    preview::{capture, PreviewSource, PREVIEW, THUMBNAIL},
};

/// Container encoder.
///
/// Holds nothing but the header layout, so one encoder can be shared by
/// any number of concurrent encodes as long as each has its own sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Encoder {
    layout: Layout,
}

impl Encoder {
    /// Encoder for the default compact header.
    pub fn new() -> Encoder {
        Encoder {
            layout: Layout::Compact,
        }
    }

    pub fn layout(self, layout: Layout) -> Self {
        Encoder { layout }
    }

    /// Compute the header for sections of the given sizes.
    ///
    /// Offsets are laid out back to back from the end of the header:
    /// image 1, image 2, then the payload.
    pub fn header(
        &self,
        image1_len: usize,
        image2_len: usize,
        params: &PrintParams,
    ) -> Result<Header, Error> {
        let image1_offset = self.layout.size() as u64;
        let image2_offset = image1_offset + image1_len as u64;
        let payload_offset = image2_offset + image2_len as u64;

        Ok(Header {
            image1_offset: offset("image1", image1_offset)?,
            image2_offset: offset("image2", image2_offset)?,
            payload_offset: offset("payload", payload_offset)?,
            print_time: params.print_time_secs()?,
            filament_length: params.filament_length_mm()?,
            shell_count: params.shell_count_u16()?,
            print_speed: params.print_speed_u16()?,
            bed_temperature: params.bed_temperature_u16()?,
            extruder1_temperature: params.extruder1_temperature_u16()?,
            extruder2_temperature: params.resolved_extruder2_temperature()?,
        })
    }

    /// Write one container to `sink`.
    ///
    /// Everything is validated before the first write, so an invalid
    /// payload or parameter leaves the sink untouched. A failing sink
    /// aborts immediately and may leave a partial container behind.
    pub fn encode<W: Write + ?Sized>(
        &self,
        sink: &mut W,
        payload: &[u8],
        image1: &[u8],
        image2: &[u8],
        params: &PrintParams,
    ) -> Result<(), Error> {
        check_ascii(payload)?;
        let header = self.header(image1.len(), image2.len(), params)?;
        debug!("{:?} {:?}", self.layout, header);

        sink.write_all(&header.to_bytes(self.layout))?;
        sink.write_all(image1)?;
        sink.write_all(image2)?;
        sink.write_all(payload)?;
        sink.flush()?;

        info!(
            "wrote container: header {} + images {} + {} + payload {} bytes",
            self.layout.size(),
            image1.len(),
            image2.len(),
            payload.len()
        );
        Ok(())
    }

    /// Gather the payload and both previews from their sources, then encode.
    ///
    /// A payload failure aborts before anything is written. A preview
    /// failure only empties that section. Previews are rendered on the
    /// calling thread.
    pub fn encode_with<W, P, S>(
        &self,
        sink: &mut W,
        payload: &mut P,
        previews: &mut S,
        params: &PrintParams,
    ) -> Result<(), Error>
    where
        W: Write + ?Sized,
        P: PayloadSource + ?Sized,
        S: PreviewSource + ?Sized,
    {
        let gcode = payload.render().map_err(Error::PayloadGeneration)?;
        let thumbnail = capture(previews, THUMBNAIL);
        let preview = capture(previews, PREVIEW);
        debug!(
            "payload {} bytes, previews {} + {} bytes",
            gcode.len(),
            thumbnail.len(),
            preview.len()
        );

        self.encode(
            sink,
            &gcode,
            thumbnail.as_bytes(),
            preview.as_bytes(),
            params,
        )
    }
}

fn offset(section: &'static str, offset: u64) -> Result<u32, Error> {
    if offset > u64::from(u32::MAX) {
        return Err(Error::SectionTooLarge { section, offset });
    }
    Ok(offset as u32)
}

/// Write one container with the default compact header.
pub fn encode<W: Write + ?Sized>(
    sink: &mut W,
    payload: &[u8],
    image1: &[u8],
    image2: &[u8],
    params: &PrintParams,
) -> Result<(), Error> {
    Encoder::new().encode(sink, payload, image1, image2, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::BoxError, preview::PreviewSpec, HEADER_SIZE};

    fn params() -> PrintParams {
        PrintParams::new(120, 0.5)
            .shell_count(3)
            .print_speed(60)
            .bed_temperature(60)
            .extruder_temperature(200)
    }

    fn u32_at(buf: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
    }

    #[test]
    fn header_offsets_follow_section_sizes() {
        let header = Encoder::new().header(0, 2, &params()).unwrap();
        assert_eq!(header.image1_offset, 54);
        assert_eq!(header.image2_offset, 54);
        assert_eq!(header.payload_offset, 56);
        assert_eq!(header.filament_length, 500);
        assert_eq!(header.extruder2_temperature, 200);

        let header = Encoder::new()
            .layout(Layout::Padded)
            .header(10, 20, &params())
            .unwrap();
        assert_eq!(header.image1_offset, 58);
        assert_eq!(header.image2_offset, 68);
        assert_eq!(header.payload_offset, 88);
    }

    #[test]
    fn encodes_sections_in_order() {
        let mut out = Vec::new();
        encode(&mut out, b"G1\n", b"", b"AB", &params()).unwrap();

        assert_eq!(out.len(), HEADER_SIZE + 2 + 3);
        assert_eq!(u32_at(&out, 16), 54);
        assert_eq!(u32_at(&out, 20), 54);
        assert_eq!(u32_at(&out, 24), 56);
        assert_eq!(&out[54..56], b"AB");
        assert_eq!(&out[56..], b"G1\n");
    }

    #[test]
    fn offsets_overflowing_u32_are_rejected() {
        let huge = u32::MAX as usize;
        match Encoder::new().header(huge, 0, &params()) {
            Err(Error::SectionTooLarge { section, offset }) => {
                assert_eq!(section, "image2");
                assert_eq!(offset, u64::from(u32::MAX) + 54);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn invalid_parameters_write_nothing() {
        let mut out = Vec::new();
        let params = params().bed_temperature(-20);
        let result = encode(&mut out, b"G28\n", b"", b"", &params);
        assert!(matches!(result, Err(Error::InvalidParameter { .. })));
        assert!(out.is_empty());
    }

    #[test]
    fn payload_failure_writes_nothing() {
        let mut out = Vec::new();
        let mut payload = || -> Result<Vec<u8>, BoxError> { Err("slicer crashed".into()) };
        let mut previews = |_: PreviewSpec| -> Result<Vec<u8>, BoxError> { Ok(vec![1, 2, 3]) };

        let result = Encoder::new().encode_with(&mut out, &mut payload, &mut previews, &params());
        match result {
            Err(Error::PayloadGeneration(err)) => assert_eq!(err.to_string(), "slicer crashed"),
            other => panic!("unexpected result {:?}", other),
        }
        assert!(out.is_empty());
    }

    #[test]
    fn preview_failure_leaves_section_empty() {
        let mut out = Vec::new();
        let mut payload = || -> Result<Vec<u8>, BoxError> { Ok(b"G28\n".to_vec()) };
        let mut previews = |spec: PreviewSpec| -> Result<Vec<u8>, BoxError> {
            if spec == THUMBNAIL {
                Err("surface lost".into())
            } else {
                Ok(vec![0xAA; 5])
            }
        };

        Encoder::new()
            .encode_with(&mut out, &mut payload, &mut previews, &params())
            .unwrap();

        assert_eq!(u32_at(&out, 16), 54);
        assert_eq!(u32_at(&out, 20), 54);
        assert_eq!(u32_at(&out, 24), 59);
        assert_eq!(&out[54..59], &[0xAA; 5]);
        assert_eq!(&out[59..], b"G28\n");
    }
}
