//! Turns a [`JobState`] into something a person can look at: previews of the
//! original and processed images, a status line, and the download.

use crate::constants::{DOWNLOAD_PREFIX, LOADING_MESSAGE};
use crate::error::{CompressionError, Result};
use crate::formats::{sniff_mime_type, OutputFormat};
use crate::job::{ImageJob, JobState};
use crate::options::Mode;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::GenericImageView;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Strips the last extension: `photo.tar.gz` becomes `photo.tar`.
pub fn file_basename(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) if !filename[idx + 1..].is_empty() && !filename[idx + 1..].contains('/') => {
            &filename[..idx]
        }
        _ => filename,
    }
}

/// `compressed-<basename>.<format>`
pub fn download_file_name(source_filename: &str, format: OutputFormat) -> String {
    format!(
        "{}{}.{}",
        DOWNLOAD_PREFIX,
        file_basename(source_filename),
        format.as_str()
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub mime_type: &'static str,
    pub size_bytes: usize,
    /// `None` when the bytes could not be decoded
    pub dimensions: Option<(u32, u32)>,
    pub data_url: String,
}

impl Preview {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mime_type = sniff_mime_type(bytes).unwrap_or("application/octet-stream");
        let dimensions = image::load_from_memory(bytes).ok().map(|img| img.dimensions());

        Self {
            mime_type,
            size_bytes: bytes.len(),
            dimensions,
            data_url: format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes)),
        }
    }

    pub fn describe(&self) -> String {
        let size = format_size(self.size_bytes as u64);
        match self.dimensions {
            Some((w, h)) => format!("{} ({}x{}, {})", size, w, h, self.mime_type),
            None => format!("{} ({})", size, self.mime_type),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Writes the download into `dir`, creating it if needed.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .map_err(|_| CompressionError::DirectoryCreationFailed(dir.to_path_buf()))?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedView {
    pub heading: String,
    pub preview: Preview,
    pub download: Download,
    /// Percentage saved relative to the original; negative when it grew
    pub ratio: f64,
}

/// What to show for one state. Empty shows nothing; Loading shows the status
/// line and the original; Errored shows the error and the original; Ready
/// shows both previews and the download.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Presentation {
    pub status: Option<String>,
    pub error: Option<String>,
    pub original: Option<Preview>,
    pub processed: Option<ProcessedView>,
}

pub fn present(state: &JobState) -> Presentation {
    match state {
        JobState::Empty => Presentation::default(),
        JobState::Loading(job) => Presentation {
            status: Some(LOADING_MESSAGE.to_string()),
            original: Some(Preview::from_bytes(&job.source.bytes)),
            ..Presentation::default()
        },
        JobState::Errored(job) => Presentation {
            error: job.error().map(str::to_string),
            original: Some(Preview::from_bytes(&job.source.bytes)),
            ..Presentation::default()
        },
        JobState::Ready(job) => Presentation {
            original: Some(Preview::from_bytes(&job.source.bytes)),
            processed: job.result_bytes().map(|bytes| processed_view(job, bytes)),
            ..Presentation::default()
        },
    }
}

fn processed_view(job: &ImageJob, bytes: &[u8]) -> ProcessedView {
    let heading = match job.options.mode {
        Mode::Compress => format!("Compressed Image ({}KB)", job.options.target_size_kb),
        Mode::Convert => format!("Converted Image ({})", job.options.output_format),
    };

    let original = job.source.len() as f64;
    let ratio = if original > 0.0 {
        (original - bytes.len() as f64) / original * 100.0
    } else {
        0.0
    };

    ProcessedView {
        heading,
        preview: Preview::from_bytes(bytes),
        download: Download {
            file_name: download_file_name(&job.source.filename, job.options.output_format),
            bytes: bytes.to_vec(),
        },
        ratio,
    }
}

pub fn format_size(bytes: u64) -> String {
    let size_kb = bytes as f64 / 1024.0;
    let size_mb = size_kb / 1024.0;
    if size_mb >= 1.0 {
        format!("{:.2} MB", size_mb)
    } else {
        format!("{:.2} KB", size_kb)
    }
}

/// A standalone HTML page with both previews and a download link.
pub fn render_html(presentation: &Presentation) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>PixelSqueeze - Image Compression Tool</title>\n</head>\n<body>\n\
         <h1>PixelSqueeze</h1>\n",
    );

    if let Some(status) = &presentation.status {
        let _ = writeln!(html, "<p class=\"status\">{}</p>", escape_html(status));
    }
    if let Some(error) = &presentation.error {
        let _ = writeln!(html, "<p class=\"error\">{}</p>", escape_html(error));
    }

    html.push_str("<div class=\"previews\">\n");
    if let Some(original) = &presentation.original {
        let _ = writeln!(
            html,
            "<div>\n<h2>Original Image</h2>\n<img src=\"{}\" alt=\"Original\">\n<p>{}</p>\n</div>",
            original.data_url,
            escape_html(&original.describe())
        );
    }
    if let Some(processed) = &presentation.processed {
        let _ = writeln!(
            html,
            "<div>\n<h2>{}</h2>\n<img src=\"{}\" alt=\"Compressed\">\n<p>{}</p>\n\
             <a href=\"{}\" download=\"{}\">Download Compressed Image</a>\n</div>",
            escape_html(&processed.heading),
            processed.preview.data_url,
            escape_html(&processed.preview.describe()),
            processed.preview.data_url,
            escape_html(&processed.download.file_name)
        );
    }
    html.push_str("</div>\n</body>\n</html>\n");

    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
