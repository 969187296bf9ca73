//! Resolved runtime configuration.
//!
//! The command line (with environment fallbacks) is parsed by `cli`; this is
//! the validated result the rest of the program works from.

use crate::constants::{DEFAULT_MAX_WIDTH_OR_HEIGHT, MAX_FILE_SIZE, MAX_IMAGE_DIMENSION};
use crate::error::{CompressionError, Result};
use crate::formats::is_image_file;
use crate::job::SourceImage;
use crate::options::JobOptions;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub input: PathBuf,
    pub options: JobOptions,
    pub output_dir: PathBuf,
    pub max_width_or_height: u32,
    pub use_worker: bool,
    pub report: Option<PathBuf>,
    pub threads: Option<usize>,
    pub quiet: bool,
    pub verbose: bool,
}

impl Settings {
    pub fn new(input: PathBuf, options: JobOptions) -> Self {
        Self {
            input,
            options,
            output_dir: PathBuf::from("."),
            max_width_or_height: DEFAULT_MAX_WIDTH_OR_HEIGHT,
            use_worker: true,
            report: None,
            threads: None,
            quiet: false,
            verbose: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_width_or_height == 0 || self.max_width_or_height > MAX_IMAGE_DIMENSION {
            return Err(CompressionError::InvalidDimensions(
                self.max_width_or_height,
                self.max_width_or_height,
                MAX_IMAGE_DIMENSION,
            ));
        }
        validate_input_path(&self.input)
    }

    /// Reads the input file into a [`SourceImage`] named after its file name.
    /// Files over [`MAX_FILE_SIZE`] are rejected before anything is read.
    pub fn load_source(&self) -> Result<SourceImage> {
        validate_input_path(&self.input)?;

        let file_size = fs::metadata(&self.input)?.len();
        if file_size > MAX_FILE_SIZE {
            return Err(CompressionError::FileTooLarge(file_size, MAX_FILE_SIZE));
        }

        let bytes = fs::read(&self.input)?;
        let filename = self
            .input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input.to_string_lossy().into_owned());
        Ok(SourceImage::new(filename, bytes))
    }
}

/// The input must be an existing regular file with an image extension.
pub fn validate_input_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(CompressionError::FileNotFound(path.to_path_buf()));
    }

    if !path.is_file() {
        return Err(CompressionError::UnsupportedFormat(
            "Input path is not a file".to_string(),
        ));
    }

    if !is_image_file(path) {
        return Err(CompressionError::UnsupportedFormat(format!(
            "{} is not an image file",
            path.display()
        )));
    }

    Ok(())
}
