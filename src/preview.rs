//! Preview images embedded in the container.
//!
//! The container stores two pictures verbatim: a small BMP thumbnail and a
//! larger PNG preview. Their contents are opaque to the encoder; only the
//! bytes and their length matter.
//!
//! Rendering usually needs a surface owned by one thread of the host
//! application. A [`PreviewSource`] is always called on the thread that
//! calls [`Encoder::encode_with`](crate::Encoder::encode_with). Hosts with
//! such a restriction either call from that thread, or render beforehand
//! and pass the finished buffers to [`Encoder::encode`](crate::Encoder::encode).

use log::{debug, warn};

use crate::error::BoxError;

/// Image encoding requested from a [`PreviewSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Bmp,
    Png,
}

/// Size and encoding of one preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewSpec {
    pub width: u32,
    pub height: u32,
    pub encoding: Encoding,
}

/// First image section: 80x60 BMP shown in the printer's file list.
pub const THUMBNAIL: PreviewSpec = PreviewSpec {
    width: 80,
    height: 60,
    encoding: Encoding::Bmp,
};

/// Second image section: 320x320 PNG.
pub const PREVIEW: PreviewSpec = PreviewSpec {
    width: 320,
    height: 320,
    encoding: Encoding::Png,
};

/// Encoded preview bytes plus the encoding they were requested in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    encoding: Encoding,
    data: Vec<u8>,
}

impl Preview {
    pub fn new(encoding: Encoding, data: Vec<u8>) -> Self {
        Preview { encoding, data }
    }

    /// A zero length section. Valid in a container; its offset simply
    /// equals the start of the next section.
    pub fn empty(encoding: Encoding) -> Self {
        Preview {
            encoding,
            data: Vec::new(),
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Producer of encoded preview images.
pub trait PreviewSource {
    fn render(&mut self, spec: PreviewSpec) -> Result<Vec<u8>, BoxError>;
}

impl<F> PreviewSource for F
where
    F: FnMut(PreviewSpec) -> Result<Vec<u8>, BoxError>,
{
    fn render(&mut self, spec: PreviewSpec) -> Result<Vec<u8>, BoxError> {
        self(spec)
    }
}

/// Render one preview, substituting an empty image on failure.
///
/// A missing picture never fails an encode; the error is logged and the
/// section is left empty.
pub fn capture<S: PreviewSource + ?Sized>(source: &mut S, spec: PreviewSpec) -> Preview {
    match source.render(spec) {
        Ok(data) => {
            debug!(
                "rendered {}x{} {:?} preview, {} bytes",
                spec.width,
                spec.height,
                spec.encoding,
                data.len()
            );
            Preview::new(spec.encoding, data)
        }
        Err(err) => {
            warn!(
                "{}x{} {:?} preview failed, embedding an empty image: {}",
                spec.width, spec.height, spec.encoding, err
            );
            Preview::empty(spec.encoding)
        }
    }
}

#[cfg(feature = "image")]
pub use self::render::{encode_image, ImageSource};

#[cfg(feature = "image")]
mod render {
    use std::path::Path;

    use image::{imageops::FilterType, DynamicImage, ImageOutputFormat};

    use super::{Encoding, PreviewSource, PreviewSpec};
    use crate::error::BoxError;

    /// Scale `image` to exactly `spec.width` x `spec.height` and encode it.
    ///
    /// BMP output is written as 24 bit RGB, which is what printer firmware
    /// expects for the thumbnail.
    pub fn encode_image(
        image: &DynamicImage,
        spec: PreviewSpec,
    ) -> Result<Vec<u8>, image::ImageError> {
        let scaled = image.resize_exact(spec.width, spec.height, FilterType::Triangle);
        let mut buf: Vec<u8> = Vec::new();

        match spec.encoding {
            Encoding::Bmp => DynamicImage::ImageRgb8(scaled.to_rgb8())
                .write_to(&mut buf, ImageOutputFormat::Bmp)?,
            Encoding::Png => scaled.write_to(&mut buf, ImageOutputFormat::Png)?,
        }

        Ok(buf)
    }

    /// [`PreviewSource`] that derives every preview from one rendered picture.
    #[derive(Debug, Clone)]
    pub struct ImageSource {
        image: DynamicImage,
    }

    impl ImageSource {
        pub fn new(image: DynamicImage) -> Self {
            ImageSource { image }
        }

        pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, image::ImageError> {
            Ok(ImageSource {
                image: image::open(path)?,
            })
        }
    }

    impl PreviewSource for ImageSource {
        fn render(&mut self, spec: PreviewSpec) -> Result<Vec<u8>, BoxError> {
            Ok(encode_image(&self.image, spec)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_keeps_rendered_bytes() {
        let mut source = |spec: PreviewSpec| -> Result<Vec<u8>, BoxError> {
            Ok(vec![spec.width as u8, spec.height as u8])
        };
        let preview = capture(&mut source, THUMBNAIL);
        assert_eq!(preview.encoding(), Encoding::Bmp);
        assert_eq!(preview.as_bytes(), &[80, 60]);
        assert_eq!(preview.len(), 2);
    }

    #[test]
    fn failed_render_becomes_empty_preview() {
        let mut source =
            |_: PreviewSpec| -> Result<Vec<u8>, BoxError> { Err("no render surface".into()) };
        let preview = capture(&mut source, PREVIEW);
        assert!(preview.is_empty());
        assert_eq!(preview.encoding(), Encoding::Png);
        assert_eq!(preview, Preview::empty(Encoding::Png));
    }

    #[cfg(feature = "image")]
    mod image_source {
        use super::super::*;
        use image::{DynamicImage, GenericImageView, ImageBuffer, Rgba};

        fn picture() -> DynamicImage {
            DynamicImage::ImageRgba8(ImageBuffer::from_fn(200, 100, |x, y| {
                Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
            }))
        }

        #[test]
        fn thumbnail_is_bmp_at_requested_size() {
            let bytes = encode_image(&picture(), THUMBNAIL).unwrap();
            assert_eq!(&bytes[..2], b"BM");

            let decoded = image::load_from_memory(&bytes).unwrap();
            assert_eq!(decoded.dimensions(), (80, 60));
        }

        #[test]
        fn preview_is_png_at_requested_size() {
            let mut source = ImageSource::new(picture());
            let bytes = source.render(PREVIEW).unwrap();
            assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

            let decoded = image::load_from_memory(&bytes).unwrap();
            assert_eq!(decoded.dimensions(), (320, 320));
        }

        #[test]
        fn missing_file_fails_to_open() {
            assert!(ImageSource::open("/nonexistent/picture.png").is_err());
        }
    }
}
