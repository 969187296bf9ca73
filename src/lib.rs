pub mod cli;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod formats;
pub mod job;
pub mod logger;
pub mod options;
pub mod presenter;
pub mod processing;
pub mod session;

pub use engine::CompressionEngine;
pub use error::{CompressionError, Result};
pub use formats::OutputFormat;
pub use job::{transition, ImageJob, JobEvent, JobState, Outcome, SourceImage};
pub use options::{EngineConfig, JobOptions, Mode};
pub use presenter::{download_file_name, present, Presentation};
pub use processing::ImageEngine;
pub use session::{Completion, PendingJob, Session};
