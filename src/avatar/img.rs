use std::io::Cursor;

use image::{
    codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, ImageDecoder, ImageReader,
};

use super::{data_url::DataUrl, error::UploadError};

const JPEG_MIME: &str = "image/jpeg";

/// Size of the re-encoded image: capped at `max_width`, aspect ratio kept.
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width {
        return (width, height);
    }
    let scaled = (f64::from(height) * f64::from(max_width) / f64::from(width)).round() as u32;
    (max_width, scaled.max(1))
}

/// Decode, downscale and re-encode an image as JPEG.
///
/// Decoding is CPU bound, so it runs on the blocking pool and the caller
/// only suspends until the new data URL is ready.
pub async fn compress_image(
    input: DataUrl,
    max_width: u32,
    quality: u8,
) -> Result<DataUrl, UploadError> {
    tokio::task::spawn_blocking(move || compress_blocking(input.data(), max_width, quality))
        .await
        .map_err(|e| UploadError::Processing(format!("image task failed: {e}")))?
}

fn compress_blocking(input: &[u8], max_width: u32, quality: u8) -> Result<DataUrl, UploadError> {
    let reader = ImageReader::new(Cursor::new(input)).with_guessed_format()?;
    if reader.format().is_none() {
        return Err(UploadError::Processing("Unsupported image format".into()));
    }
    let mut decoder = reader.into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut img = DynamicImage::from_decoder(decoder)?;
    // the re-encoded JPEG carries no EXIF, bake the rotation into the pixels
    img.apply_orientation(orientation);

    let (width, height) = target_dimensions(img.width(), img.height(), max_width);
    let img = if (width, height) == (img.width(), img.height()) {
        img
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    };

    // JPEG has no alpha channel
    let img = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Vec::with_capacity(2_usize.pow(16)); // 64KB
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?;

    Ok(DataUrl::new(JPEG_MIME, buf))
}
