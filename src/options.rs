use crate::constants::{
    DEFAULT_MAX_WIDTH_OR_HEIGHT, DEFAULT_QUALITY, DEFAULT_TARGET_SIZE_KB, MAX_IMAGE_DIMENSION,
    MAX_QUALITY, MIN_QUALITY,
};
use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Apply the size budget and quality
    #[default]
    Compress,
    /// Format change only, full quality and no size budget
    Convert,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Compress => write!(f, "compress"),
            Mode::Convert => write!(f, "convert"),
        }
    }
}

impl FromStr for Mode {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "compress" => Ok(Mode::Compress),
            "convert" => Ok(Mode::Convert),
            _ => Err(CompressionError::UnsupportedFormat(format!("unknown mode: {}", s))),
        }
    }
}

/// What the user picked for a single upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobOptions {
    pub output_format: OutputFormat,
    pub quality: f32,
    pub target_size_kb: u32,
    pub mode: Mode,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::default(),
            quality: DEFAULT_QUALITY,
            target_size_kb: DEFAULT_TARGET_SIZE_KB,
            mode: Mode::default(),
        }
    }
}

impl JobOptions {
    pub fn new(
        mode: Mode,
        output_format: OutputFormat,
        quality: Option<f32>,
        target_size_kb: Option<u32>,
    ) -> Result<Self> {
        let quality = quality.unwrap_or(DEFAULT_QUALITY);
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(CompressionError::InvalidQuality(quality));
        }

        let target_size_kb = target_size_kb.unwrap_or(DEFAULT_TARGET_SIZE_KB);
        if target_size_kb == 0 {
            return Err(CompressionError::InvalidTargetSize(target_size_kb));
        }

        Ok(Self {
            output_format,
            quality,
            target_size_kb,
            mode,
        })
    }

    /// Derives the engine configuration for these options.
    ///
    /// Compress mode turns the target size into a megabyte budget and keeps
    /// the selected quality. Convert mode ignores both and asks for an
    /// unconstrained budget at full quality.
    pub fn to_engine_config(&self, max_width_or_height: u32, use_worker: bool) -> EngineConfig {
        let (max_size_mb, quality) = match self.mode {
            Mode::Compress => (self.target_size_kb as f64 / 1024.0, self.quality),
            Mode::Convert => (f64::INFINITY, MAX_QUALITY),
        };

        EngineConfig {
            max_size_mb,
            max_width_or_height,
            use_worker,
            file_type: self.output_format,
            quality,
        }
    }
}

/// The record handed to a [`CompressionEngine`](crate::engine::CompressionEngine).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Size budget in MB; infinite when unconstrained
    pub max_size_mb: f64,
    pub max_width_or_height: u32,
    /// Run the engine off the calling task
    pub use_worker: bool,
    pub file_type: OutputFormat,
    pub quality: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        JobOptions::default().to_engine_config(DEFAULT_MAX_WIDTH_OR_HEIGHT, true)
    }
}

impl EngineConfig {
    /// Budget in bytes, or `None` if there is no size constraint
    pub fn budget_bytes(&self) -> Option<u64> {
        if self.max_size_mb.is_finite() {
            Some((self.max_size_mb * 1024.0 * 1024.0).round() as u64)
        } else {
            None
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.budget_bytes().is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_width_or_height == 0 || self.max_width_or_height > MAX_IMAGE_DIMENSION {
            return Err(CompressionError::InvalidDimensions(
                self.max_width_or_height,
                self.max_width_or_height,
                MAX_IMAGE_DIMENSION,
            ));
        }
        if !(self.quality > 0.0 && self.quality <= MAX_QUALITY) {
            return Err(CompressionError::InvalidQuality(self.quality));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_options_default() {
        let options = JobOptions::new(Mode::Compress, OutputFormat::Jpeg, None, None).unwrap();
        assert_eq!(options.quality, 0.8);
        assert_eq!(options.target_size_kb, 80);
        assert_eq!(options, JobOptions::default());
    }

    #[test]
    fn test_job_options_invalid_quality() {
        let result = JobOptions::new(Mode::Compress, OutputFormat::Jpeg, Some(0.4), None);
        assert!(matches!(result, Err(CompressionError::InvalidQuality(_))));

        let result = JobOptions::new(Mode::Compress, OutputFormat::Jpeg, Some(1.1), None);
        assert!(matches!(result, Err(CompressionError::InvalidQuality(_))));

        let result = JobOptions::new(Mode::Compress, OutputFormat::Jpeg, Some(f32::NAN), None);
        assert!(matches!(result, Err(CompressionError::InvalidQuality(_))));
    }

    #[test]
    fn test_job_options_zero_target() {
        let result = JobOptions::new(Mode::Compress, OutputFormat::Png, None, Some(0));
        assert!(matches!(result, Err(CompressionError::InvalidTargetSize(0))));
    }

    #[test]
    fn test_compress_budget_is_target_over_1024() {
        let options = JobOptions::new(Mode::Compress, OutputFormat::Jpeg, Some(0.7), Some(64)).unwrap();
        let config = options.to_engine_config(1920, true);

        assert_eq!(config.max_size_mb, 0.0625);
        assert_eq!(config.quality, 0.7);
        assert_eq!(config.budget_bytes(), Some(64 * 1024));
        assert_eq!(config.file_type, OutputFormat::Jpeg);
        assert_eq!(config.max_width_or_height, 1920);
        assert!(config.use_worker);
    }

    #[test]
    fn test_convert_ignores_target_and_quality() {
        let options = JobOptions::new(Mode::Convert, OutputFormat::WebP, Some(0.5), Some(50)).unwrap();
        let config = options.to_engine_config(1024, false);

        assert_eq!(config.quality, 1.0);
        assert!(config.is_unconstrained());
        assert_eq!(config.file_type.mime_type(), "image/webp");
        assert!(!config.use_worker);
    }

    #[test]
    fn test_engine_config_validate() {
        assert!(EngineConfig::default().validate().is_ok());

        let mut config = EngineConfig::default();
        config.max_width_or_height = 0;
        assert!(matches!(
            config.validate(),
            Err(CompressionError::InvalidDimensions(0, 0, _))
        ));
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Convert".parse::<Mode>().unwrap(), Mode::Convert);
        assert_eq!("compress".parse::<Mode>().unwrap(), Mode::Compress);
        assert!("shrink".parse::<Mode>().is_err());
    }
}
