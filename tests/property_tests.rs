use pixel_squeeze::formats::OutputFormat;
use pixel_squeeze::job::{transition, ImageJob, JobEvent, JobState, SourceImage};
use pixel_squeeze::options::{JobOptions, Mode};
use pixel_squeeze::presenter::{download_file_name, file_basename};
use proptest::prelude::*;

fn any_format() -> impl Strategy<Value = OutputFormat> {
    prop::sample::select(OutputFormat::all_formats().to_vec())
}

fn loading(generation: u64) -> JobState {
    let job = ImageJob::new(
        generation,
        SourceImage::new("photo.jpg", vec![1u8; 4]),
        JobOptions::default(),
    );
    transition(JobState::Empty, JobEvent::FileSelected(job))
}

proptest! {
    #[test]
    fn job_options_quality_in_range(quality in 0.5f32..=1.0f32) {
        let options = JobOptions::new(Mode::Compress, OutputFormat::Jpeg, Some(quality), None);
        prop_assert!(options.is_ok());
    }

    #[test]
    fn job_options_quality_out_of_range(quality in prop_oneof![0.0f32..0.5f32, 1.0001f32..10.0f32]) {
        let options = JobOptions::new(Mode::Compress, OutputFormat::Jpeg, Some(quality), None);
        prop_assert!(options.is_err());
    }

    #[test]
    fn convert_is_always_full_quality_and_unconstrained(
        format in any_format(),
        quality in 0.5f32..=1.0f32,
        target in 1u32..=100_000u32,
        max_side in 1u32..=8192u32,
    ) {
        let options = JobOptions::new(Mode::Convert, format, Some(quality), Some(target)).unwrap();
        let config = options.to_engine_config(max_side, true);

        prop_assert_eq!(config.quality, 1.0);
        prop_assert!(config.is_unconstrained());
        prop_assert_eq!(config.file_type, format);
        prop_assert_eq!(config.max_width_or_height, max_side);
    }

    #[test]
    fn compress_budget_is_target_over_1024(
        format in any_format(),
        quality in 0.5f32..=1.0f32,
        target in 1u32..=100_000u32,
    ) {
        let options = JobOptions::new(Mode::Compress, format, Some(quality), Some(target)).unwrap();
        let config = options.to_engine_config(1920, false);

        prop_assert_eq!(config.max_size_mb, target as f64 / 1024.0);
        prop_assert_eq!(config.budget_bytes(), Some(target as u64 * 1024));
        prop_assert_eq!(config.quality, quality);
    }

    #[test]
    fn download_extension_follows_format(
        stem in "[a-zA-Z0-9_-]{1,12}",
        ext in prop::sample::select(vec!["jpg", "jpeg", "png", "webp", "gif"]),
        format in any_format(),
    ) {
        let name = download_file_name(&format!("{}.{}", stem, ext), format);
        prop_assert_eq!(name, format!("compressed-{}.{}", stem, format.as_str()));
    }

    #[test]
    fn basename_never_contains_last_extension(stem in "[a-z]{1,8}(\\.[a-z]{1,3}){0,2}", ext in "[a-z]{1,4}") {
        let filename = format!("{}.{}", stem, ext);
        prop_assert_eq!(file_basename(&filename), stem.as_str());
    }

    #[test]
    fn completion_lands_on_exactly_one_terminal_state(
        succeed in any::<bool>(),
        bytes in prop::collection::vec(any::<u8>(), 0..16),
    ) {
        let event = if succeed {
            JobEvent::EngineResolved { generation: 7, bytes }
        } else {
            JobEvent::EngineRejected { generation: 7, cause: "boom".to_string() }
        };

        let state = transition(loading(7), event);
        let job = state.job().unwrap();

        match &state {
            JobState::Ready(_) => {
                prop_assert!(job.result_bytes().is_some_and(|b| !b.is_empty()));
                prop_assert!(job.error().is_none());
            }
            JobState::Errored(_) => {
                prop_assert!(job.error().is_some_and(|m| !m.is_empty()));
                prop_assert!(job.result_bytes().is_none());
            }
            other => prop_assert!(false, "unexpected state {:?}", other),
        }
    }

    #[test]
    fn stale_completion_never_changes_state(current in 2u64..1000, stale_offset in 1u64..1000) {
        let stale = current.saturating_sub(stale_offset);
        prop_assume!(stale != current);

        let before = loading(current);
        let after = transition(before.clone(), JobEvent::EngineResolved { generation: stale, bytes: vec![1] });
        prop_assert_eq!(after, before);
    }
}
