//! Drives one upload at a time through the engine.
//!
//! [`Session::select`] starts a job and hands back a [`PendingJob`]; running
//! it produces a [`Completion`] that [`Session::complete`] folds back into
//! the state. Each selection takes a new generation number, so when a second
//! file is selected before the first finishes the older completion is
//! dropped and the latest selection wins.

use crate::engine::CompressionEngine;
use crate::error::CompressionError;
use crate::job::{transition, ImageJob, JobEvent, JobState, SourceImage};
use crate::options::{EngineConfig, JobOptions};
use std::sync::Arc;

/// Result of one engine invocation, tagged with the job it belongs to.
#[derive(Debug)]
pub struct Completion {
    pub generation: u64,
    pub result: Result<Vec<u8>, CompressionError>,
}

impl Completion {
    fn into_event(self) -> JobEvent {
        match self.result {
            Ok(bytes) => JobEvent::EngineResolved {
                generation: self.generation,
                bytes,
            },
            Err(e) => JobEvent::EngineRejected {
                generation: self.generation,
                cause: e.to_string(),
            },
        }
    }
}

/// A started job that still has to go through the engine.
pub struct PendingJob<E> {
    generation: u64,
    source: Arc<[u8]>,
    config: EngineConfig,
    engine: Arc<E>,
}

impl<E: CompressionEngine> PendingJob<E> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Calls the engine. With `use_worker` the call runs on tokio's blocking
    /// pool, otherwise inline on the current task.
    pub async fn run(self) -> Completion {
        let PendingJob {
            generation,
            source,
            config,
            engine,
        } = self;

        let result = if config.use_worker {
            tokio::task::spawn_blocking(move || engine.compress(&source, &config))
                .await
                .unwrap_or_else(|e| Err(CompressionError::Worker(e.to_string())))
        } else {
            engine.compress(&source, &config)
        };

        Completion { generation, result }
    }
}

pub struct Session<E> {
    engine: Arc<E>,
    state: JobState,
    generation: u64,
    max_width_or_height: u32,
    use_worker: bool,
}

impl<E: CompressionEngine> Session<E> {
    pub fn new(engine: E, max_width_or_height: u32, use_worker: bool) -> Self {
        Self {
            engine: Arc::new(engine),
            state: JobState::Empty,
            generation: 0,
            max_width_or_height,
            use_worker,
        }
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn into_state(self) -> JobState {
        self.state
    }

    /// Starts a job for `source`, replacing whatever was shown before.
    pub fn select(&mut self, source: SourceImage, options: JobOptions) -> PendingJob<E> {
        self.generation += 1;
        let generation = self.generation;

        let config = options.to_engine_config(self.max_width_or_height, self.use_worker);
        tracing::debug!(
            generation,
            filename = %source.filename,
            mode = %options.mode,
            format = config.file_type.as_str(),
            max_size_mb = config.max_size_mb,
            quality = config.quality,
            "file selected"
        );

        let pending = PendingJob {
            generation,
            source: Arc::clone(&source.bytes),
            config,
            engine: Arc::clone(&self.engine),
        };

        self.apply(JobEvent::FileSelected(ImageJob::new(generation, source, options)));
        pending
    }

    /// Folds an engine completion into the state. Returns `false` when the
    /// completion was stale and ignored.
    pub fn complete(&mut self, completion: Completion) -> bool {
        let current = completion.generation == self.generation && self.state.is_loading();
        self.apply(completion.into_event());
        current
    }

    /// Select, run and complete in one go.
    pub async fn process(&mut self, source: SourceImage, options: JobOptions) -> &JobState {
        let pending = self.select(source, options);
        let completion = pending.run().await;
        self.complete(completion);
        &self.state
    }

    fn apply(&mut self, event: JobEvent) {
        let state = std::mem::take(&mut self.state);
        self.state = transition(state, event);
    }
}
