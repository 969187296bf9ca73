use crate::config::Settings;
use crate::constants::DEFAULT_MAX_WIDTH_OR_HEIGHT;
use crate::error::Result;
use crate::formats::OutputFormat;
use crate::options::{JobOptions, Mode};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(
    name = "pixel-squeeze",
    about = "Compress or convert an image to a target size, quality and format",
    long_about = "pixel-squeeze takes one image and produces a compressed or reformatted copy. \
                  Compress mode squeezes the image under a target size at the chosen quality; \
                  convert mode only changes the format and keeps full quality. \
                  The result is saved as compressed-<name>.<format>.",
    version,
    after_help = "EXAMPLES:\n  \
    pixel-squeeze compress photo.jpg -t 80 -q 0.8\n  \
    pixel-squeeze compress scan.png -f webp -t 200 -o ./out\n  \
    pixel-squeeze convert logo.png -f webp --report preview.html"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress an image under a target size",
        long_about = "Re-encode an image so it fits the target size, starting from the given quality. \
                      Large images are first scaled down to the maximum dimension."
    )]
    Compress {
        #[command(flatten)]
        common: CommonArgs,

        #[arg(
            short = 'f',
            long,
            default_value = "jpeg",
            value_parser = OutputFormat::from_str,
            help = "Output format (jpeg, png, webp, gif, bmp)"
        )]
        format: OutputFormat,

        #[arg(
            short = 'q',
            long,
            help = "Quality from 0.5 to 1.0 (default: 0.8)",
            long_help = "Starting quality from 0.5 (smallest) to 1.0 (best). \
                         Only JPEG output is lossy; other formats use it to pick the PNG deflate level."
        )]
        quality: Option<f32>,

        #[arg(
            short = 't',
            long = "target-size",
            help = "Target size in KB (default: 80)",
            long_help = "Upper bound on the output size in KB. Common choices: 50, 64, 80, 100, 200."
        )]
        target_size_kb: Option<u32>,
    },

    #[command(
        about = "Convert an image to another format at full quality",
        long_about = "Change the image format without a size constraint. Quality is fixed at 1.0."
    )]
    Convert {
        #[command(flatten)]
        common: CommonArgs,

        #[arg(
            short = 'f',
            long,
            value_parser = OutputFormat::from_str,
            help = "Output format (jpeg, png, webp, gif, bmp)"
        )]
        format: OutputFormat,
    },
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CommonArgs {
    #[arg(help = "Input image file path")]
    pub input: PathBuf,

    #[arg(
        short = 'o',
        long,
        env = "PIXEL_SQUEEZE_OUTPUT_DIR",
        default_value = ".",
        help = "Directory the result is saved into"
    )]
    pub output_dir: PathBuf,

    #[arg(
        long,
        env = "PIXEL_SQUEEZE_MAX_DIMENSION",
        default_value_t = DEFAULT_MAX_WIDTH_OR_HEIGHT,
        help = "Longest allowed side in pixels"
    )]
    pub max_dimension: u32,

    #[arg(long, help = "Run the engine on the calling task instead of a worker thread")]
    pub no_worker: bool,

    #[arg(long, help = "Write an HTML page with both previews and a download link")]
    pub report: Option<PathBuf>,

    #[arg(
        short = 'j',
        long,
        env = "PIXEL_SQUEEZE_THREADS",
        help = "Number of threads used by the encoders (default: auto)"
    )]
    pub threads: Option<usize>,

    #[arg(long, conflicts_with = "verbose", help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, help = "Print engine details")]
    pub verbose: bool,
}

impl Args {
    /// Validates the selected options and resolves the runtime settings.
    pub fn into_settings(self) -> Result<Settings> {
        let (common, options) = match self.command {
            Commands::Compress {
                common,
                format,
                quality,
                target_size_kb,
            } => (
                common,
                JobOptions::new(Mode::Compress, format, quality, target_size_kb)?,
            ),
            Commands::Convert { common, format } => {
                (common, JobOptions::new(Mode::Convert, format, None, None)?)
            }
        };

        let mut settings = Settings::new(common.input, options);
        settings.output_dir = common.output_dir;
        settings.max_width_or_height = common.max_dimension;
        settings.use_worker = !common.no_worker;
        settings.report = common.report;
        settings.threads = common.threads;
        settings.quiet = common.quiet;
        settings.verbose = common.verbose;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompressionError;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_compress_defaults() {
        let args = Args::try_parse_from(["pixel-squeeze", "compress", "photo.jpg"]).unwrap();
        let settings = args.into_settings().unwrap();

        assert_eq!(settings.options, JobOptions::default());
        assert_eq!(settings.max_width_or_height, 1920);
        assert!(settings.use_worker);
        assert_eq!(settings.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_convert_requires_format() {
        assert!(Args::try_parse_from(["pixel-squeeze", "convert", "photo.png"]).is_err());

        let args =
            Args::try_parse_from(["pixel-squeeze", "convert", "photo.png", "-f", "webp"]).unwrap();
        let settings = args.into_settings().unwrap();
        assert_eq!(settings.options.mode, Mode::Convert);
        assert_eq!(settings.options.output_format, OutputFormat::WebP);
    }

    #[test]
    fn test_invalid_quality_is_rejected() {
        let args =
            Args::try_parse_from(["pixel-squeeze", "compress", "photo.jpg", "-q", "0.3"]).unwrap();
        assert!(matches!(
            args.into_settings(),
            Err(CompressionError::InvalidQuality(_))
        ));
    }

    #[test]
    fn test_unknown_format_is_a_parse_error() {
        assert!(
            Args::try_parse_from(["pixel-squeeze", "compress", "photo.jpg", "-f", "tiff"]).is_err()
        );
    }
}
