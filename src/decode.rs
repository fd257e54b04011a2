//! Decode capability. The engine treats decoding as an opaque step behind
//! the [`Decoder`] trait; [`ImageDecoder`] is the built-in implementation
//! decoding to RGBA8 with best-effort EXIF orientation correction.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::RgbaImage;
use tracing::debug;

use crate::error::DecodeErrorKind;
use crate::events::DecodedImage;

/// Opaque decode capability: locator in, pixel buffer out.
pub trait Decoder: Send + Sync + 'static {
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeErrorKind>;
}

/// Default decoder backed by the `image` crate. Orientation handling is
/// best-effort; when EXIF metadata is missing the buffer is kept as decoded.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageDecoder;

impl Decoder for ImageDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeErrorKind> {
        let reader = image::ImageReader::open(path)
            .map_err(|e| DecodeErrorKind::Io(e.to_string()))?
            .with_guessed_format()
            .map_err(|e| DecodeErrorKind::Io(e.to_string()))?;
        let decoded = reader
            .decode()
            .map_err(|e| DecodeErrorKind::Malformed(e.to_string()))?;
        let rgba = apply_orientation(decoded.to_rgba8(), read_orientation(path).unwrap_or(1));
        let (width, height) = rgba.dimensions();
        Ok(DecodedImage {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }
}

fn apply_orientation(img: RgbaImage, orientation: u16) -> RgbaImage {
    use image::imageops;
    match orientation {
        2 => imageops::flip_horizontal(&img),
        3 => imageops::rotate180(&img),
        4 => imageops::flip_vertical(&img),
        5 => imageops::flip_horizontal(&imageops::rotate90(&img)),
        6 => imageops::rotate90(&img),
        7 => imageops::flip_horizontal(&imageops::rotate270(&img)),
        8 => imageops::rotate270(&img),
        // 1 is upright; unknown values fall through unchanged.
        _ => img,
    }
}

fn read_orientation(path: &Path) -> Option<u16> {
    let file = File::open(path).ok()?;
    let mut buf = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut buf).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let value = field.value.get_uint(0)? as u16;
    debug!(orientation = value, path = %path.display(), "exif orientation");
    Some(value)
}
