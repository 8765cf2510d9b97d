//! Base64 image encoding for multimodal messages

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tracing::debug;

use crate::conversation::ImageAttachment;

/// Largest source accepted by the backend without recompression
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// JPEG quality used when recompressing oversized images
const JPEG_QUALITY: u8 = 85;

/// Encode an attachment as base64, recompressing to JPEG when it is too large
pub fn encode_image(image: &ImageAttachment) -> Result<String> {
    match image {
        ImageAttachment::File(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read image {}", path.display()))?;
            encode_bytes(&bytes, &path.display().to_string(), MAX_IMAGE_BYTES)
        }
        ImageAttachment::Png(data) => encode_bytes(data, "<in-memory png>", MAX_IMAGE_BYTES),
    }
}

fn encode_bytes(bytes: &[u8], label: &str, limit: usize) -> Result<String> {
    if bytes.len() <= limit {
        return Ok(STANDARD.encode(bytes));
    }

    debug!(image = %label, size = bytes.len(), limit, "Recompressing oversized image");

    let decoded = image::load_from_memory(bytes)
        .with_context(|| format!("Failed to decode image {}", label))?;
    let compressed = compress_jpeg(&decoded)?;

    if compressed.len() > limit {
        anyhow::bail!("Unable to compress the image below 20 MB. [{}]", label);
    }

    Ok(STANDARD.encode(compressed))
}

fn compress_jpeg(img: &DynamicImage) -> Result<Vec<u8>> {
    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .context("Failed to encode image as JPEG")?;
    Ok(buffer)
}
