//! Reference-image preprocessing before upload: downscale, flatten onto
//! white, re-encode as JPEG.

use crate::data_uri::{base64_encode, format_data_uri, strip_data_prefix, DataUri};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{RgbImage, RgbaImage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImagingError {
    #[error("not a base64 data URI")]
    NotDataUri,
    #[error("invalid base64 payload")]
    Base64,
    #[error("image: {0}")]
    Image(#[from] image::ImageError),
}

/// Size after fitting `(w, h)` inside a `max_edge` square, keeping aspect.
/// Images already within bounds are untouched.
pub fn fit_within(w: u32, h: u32, max_edge: u32) -> (u32, u32) {
    if w <= max_edge && h <= max_edge {
        return (w, h);
    }
    let (w, h, max) = (w as f64, h as f64, max_edge as f64);
    let (nw, nh) = if w > h { (max, max / w * h) } else { (max / h * w, max) };
    ((nw.floor() as u32).max(1), (nh.floor() as u32).max(1))
}

/// Composite over an opaque white background.
pub fn flatten_on_white(img: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let [r, g, b, a] = img.get_pixel(x, y).0;
        let a = a as u32;
        let mix = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        image::Rgb([mix(r), mix(g), mix(b)])
    })
}

/// Decode, downscale to `max_edge`, flatten and JPEG-encode. Returns the JPEG
/// bytes.
pub fn prepare_reference_bytes(bytes: &[u8], max_edge: u32, quality: u8) -> Result<Vec<u8>, ImagingError> {
    let decoded = image::load_from_memory(bytes)?;
    let (w, h) = fit_within(decoded.width(), decoded.height(), max_edge);
    let resized = if (w, h) == (decoded.width(), decoded.height()) {
        decoded
    } else {
        decoded.resize_exact(w, h, FilterType::Triangle)
    };
    let rgb = flatten_on_white(&resized.to_rgba8());

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100)).encode_image(&rgb)?;
    Ok(out)
}

/// Same as [`prepare_reference_bytes`] but from and to a data URI.
pub fn prepare_reference(data_uri: &str, max_edge: u32, quality: u8) -> Result<String, ImagingError> {
    let uri = DataUri::parse(data_uri).ok_or(ImagingError::NotDataUri)?;
    let bytes = uri.decode().ok_or(ImagingError::Base64)?;
    let jpeg = prepare_reference_bytes(&bytes, max_edge, quality)?;
    Ok(format_data_uri("image/jpeg", &base64_encode(&jpeg)))
}

/// Bare base64 JPEG payload for the API. Preprocessing failures fall back to
/// the original payload.
pub fn reference_payload(data_uri: &str, max_edge: u32, quality: u8) -> String {
    match prepare_reference(data_uri, max_edge, quality) {
        Ok(prepared) => strip_data_prefix(&prepared).to_owned(),
        Err(e) => {
            log::warn!("[gen] image processing failed, using original: {e}");
            strip_data_prefix(data_uri).to_owned()
        }
    }
}
