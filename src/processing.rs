use crate::constants::{
    LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_LOW_LEVEL, LIBDEFLATER_MEDIUM_LEVEL, MAX_FILE_SIZE,
    MAX_IMAGE_DIMENSION, MAX_ITERATIONS, MAX_SCALE_STEP, MIN_ENCODE_QUALITY, MIN_ITERATION_SIDE,
    MIN_SCALE_STEP, OXIPNG_PRESET, QUALITY_STEP,
};
use crate::engine::CompressionEngine;
use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use crate::options::EngineConfig;
use image::codecs::bmp::BmpEncoder;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Frame, GenericImageView};
use oxipng::{Deflaters, Options};

/// The default engine, built on the `image` crate with oxipng for PNG output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageEngine;

impl ImageEngine {
    pub fn new() -> Self {
        Self
    }
}

impl CompressionEngine for ImageEngine {
    fn compress(&self, source: &[u8], config: &EngineConfig) -> Result<Vec<u8>> {
        config.validate()?;

        let mut img = load_image_from_memory(source)?;
        let source_dimensions = img.dimensions();
        resize_to_fit(&mut img, config.max_width_or_height);

        let format = config.file_type;
        let mut quality = config.quality;
        let mut encoded = encode_image(&img, format, quality)?;
        tracing::debug!(
            format = format.as_str(),
            width = img.width(),
            height = img.height(),
            bytes = encoded.len(),
            "initial encode"
        );

        if let Some(budget) = config.budget_bytes() {
            for iteration in 1..=MAX_ITERATIONS {
                if encoded.len() as u64 <= budget {
                    break;
                }
                if img.width() <= MIN_ITERATION_SIDE || img.height() <= MIN_ITERATION_SIDE {
                    tracing::debug!("image too small to shrink further");
                    break;
                }

                let scale = next_scale(encoded.len() as u64, budget);
                let width = ((img.width() as f64 * scale).round() as u32).max(MIN_ITERATION_SIDE);
                let height = ((img.height() as f64 * scale).round() as u32).max(MIN_ITERATION_SIDE);
                img = img.resize_exact(width, height, FilterType::Lanczos3);

                if format.is_lossy() {
                    quality = (quality * QUALITY_STEP).max(MIN_ENCODE_QUALITY);
                }

                encoded = encode_image(&img, format, quality)?;
                tracing::debug!(
                    iteration,
                    width,
                    height,
                    quality,
                    bytes = encoded.len(),
                    budget,
                    "budget iteration"
                );
            }
        }

        if should_keep_source(source, source_dimensions, &encoded, config) {
            tracing::debug!("source already satisfies the request, keeping it");
            return Ok(source.to_vec());
        }

        Ok(encoded)
    }
}

/// Decodes an image from memory after enforcing the size and dimension limits.
///
/// # Returns
/// * `Ok(image)` - The decoded image
/// * `Err(CompressionError)` - If the bytes are too large, not an image, or
///   the decoded image exceeds the dimension limit
pub fn load_image_from_memory(source: &[u8]) -> Result<DynamicImage> {
    let file_size = source.len() as u64;
    if file_size > MAX_FILE_SIZE {
        return Err(CompressionError::FileTooLarge(file_size, MAX_FILE_SIZE));
    }

    let img = image::load_from_memory(source)?;

    let (width, height) = img.dimensions();
    if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
        return Err(CompressionError::InvalidDimensions(
            width,
            height,
            MAX_IMAGE_DIMENSION,
        ));
    }

    Ok(img)
}

/// Downscales so neither side exceeds `max_side`, keeping the aspect ratio.
/// Never upscales.
pub fn resize_to_fit(img: &mut DynamicImage, max_side: u32) {
    if max_side == 0 || (img.width() <= max_side && img.height() <= max_side) {
        return;
    }
    *img = img.resize(max_side, max_side, FilterType::Lanczos3);
}

/// Encodes `img` into `format`. `quality` is in (0, 1] and only affects
/// lossy formats and the PNG deflate level.
pub fn encode_image(img: &DynamicImage, format: OutputFormat, quality: f32) -> Result<Vec<u8>> {
    let mut buf = Vec::new();

    match format {
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality_to_percent(quality));
            rgb.write_with_encoder(encoder)?;
        }
        OutputFormat::Png => {
            img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)?;
            buf = optimize_png(&buf, quality)?;
        }
        OutputFormat::WebP => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_with_encoder(WebPEncoder::new_lossless(&mut buf))?;
        }
        OutputFormat::Gif => {
            let mut encoder = GifEncoder::new(&mut buf);
            encoder.encode_frame(Frame::new(img.to_rgba8()))?;
        }
        OutputFormat::Bmp => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_with_encoder(BmpEncoder::new(&mut buf))?;
        }
    }

    Ok(buf)
}

fn optimize_png(data: &[u8], quality: f32) -> Result<Vec<u8>> {
    let mut oxipng_options = Options::from_preset(OXIPNG_PRESET);

    let level = if quality >= 0.9 {
        LIBDEFLATER_HIGH_LEVEL
    } else if quality >= 0.7 {
        LIBDEFLATER_MEDIUM_LEVEL
    } else {
        LIBDEFLATER_LOW_LEVEL
    };
    oxipng_options.deflate = Deflaters::Libdeflater { compression: level };

    oxipng::optimize_from_memory(data, &oxipng_options)
        .map_err(|e| CompressionError::PngOptimization(e.to_string()))
}

pub fn quality_to_percent(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Linear scale factor for the next attempt. Encoded size tracks pixel
/// count, so the side length shrinks with the square root of the overshoot.
fn next_scale(size: u64, budget: u64) -> f64 {
    let ratio = budget as f64 / size as f64;
    (MAX_SCALE_STEP * ratio.sqrt()).clamp(MIN_SCALE_STEP, MAX_SCALE_STEP)
}

fn should_keep_source(
    source: &[u8],
    (width, height): (u32, u32),
    encoded: &[u8],
    config: &EngineConfig,
) -> bool {
    if encoded.len() <= source.len() {
        return false;
    }

    let same_format = image::guess_format(source)
        .ok()
        .and_then(OutputFormat::from_image_format)
        == Some(config.file_type);
    if !same_format {
        return false;
    }

    if let Some(budget) = config.budget_bytes() {
        if source.len() as u64 > budget {
            return false;
        }
    }

    width <= config.max_width_or_height && height <= config.max_width_or_height
}
