//! Screenshot post-processing.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::ImageResult;
use tracing::{debug, warn};

pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Normalizes raw renderer output into a JPEG of an exact size.
#[derive(Debug, Clone, Copy)]
pub struct ImageProcessor {
    quality: u8,
}

impl ImageProcessor {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    /// Decodes, converts to RGB, resizes to `width`x`height` when needed and
    /// re-encodes as JPEG.
    ///
    /// Falls back to the raw input if any step fails.
    pub fn optimize(&self, raw: Bytes, width: u32, height: u32) -> Bytes {
        match self.try_optimize(&raw, width, height) {
            Ok(processed) => {
                debug!(
                    "Processed screenshot: {} -> {} bytes ({}x{})",
                    raw.len(),
                    processed.len(),
                    width,
                    height
                );
                Bytes::from(processed)
            }
            Err(e) => {
                warn!("Image processing failed, serving raw render output: {}", e);
                raw
            }
        }
    }

    fn try_optimize(&self, raw: &[u8], width: u32, height: u32) -> ImageResult<Vec<u8>> {
        let mut rgb = image::load_from_memory(raw)?.to_rgb8();

        if rgb.dimensions() != (width, height) {
            rgb = imageops::resize(&rgb, width, height, FilterType::Lanczos3);
        }

        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, self.quality).encode_image(&rgb)?;
        Ok(out)
    }
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}
