pub const DEFAULT_QUALITY: f32 = 0.8;
pub const MIN_QUALITY: f32 = 0.5;
pub const MAX_QUALITY: f32 = 1.0;

pub const DEFAULT_TARGET_SIZE_KB: u32 = 80;

pub const DEFAULT_MAX_WIDTH_OR_HEIGHT: u32 = 1920;

/// Hard limits applied to every source before decoding.
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;
pub const MAX_IMAGE_DIMENSION: u32 = 16384;

// Budget search in the default engine
pub const MAX_ITERATIONS: usize = 10;
pub const MIN_ITERATION_SIDE: u32 = 16;
pub const QUALITY_STEP: f32 = 0.95;
pub const MIN_ENCODE_QUALITY: f32 = 0.1;
pub const MIN_SCALE_STEP: f64 = 0.5;
pub const MAX_SCALE_STEP: f64 = 0.95;

pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_MEDIUM_LEVEL: u8 = 10;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;
pub const OXIPNG_PRESET: u8 = 2;

pub const DOWNLOAD_PREFIX: &str = "compressed-";

pub const FAILURE_MESSAGE: &str = "Failed to compress/process the image. Please try again.";
pub const LOADING_MESSAGE: &str = "Compressing image...";

pub const SUPPORTED_INPUT_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff", "ico",
];

pub const LOG_ENV_VAR: &str = "PIXEL_SQUEEZE_LOG";

// Common output message prefixes
pub const ORIGINAL_SIZE_PREFIX: &str = "📊 Original:";
pub const PROCESSED_SIZE_PREFIX: &str = "📈 Processed:";
pub const COMPRESSION_RATIO_PREFIX: &str = "🎯 Compression ratio:";
pub const SUCCESS_PREFIX: &str = "✅";
