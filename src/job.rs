//! The per-upload job record and the state machine that drives it.
//!
//! A job is created when a file is selected, resolved exactly once by the
//! engine, and dropped when the next selection replaces it. Everything here
//! is a plain value: [`transition`] takes the current state and an event and
//! returns the next state.

use crate::constants::FAILURE_MESSAGE;
use crate::options::JobOptions;
use std::sync::Arc;

/// The selected file, shared cheaply with the worker running the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub filename: String,
    pub bytes: Arc<[u8]>,
}

impl SourceImage {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Processed(Vec<u8>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageJob {
    pub generation: u64,
    pub source: SourceImage,
    pub options: JobOptions,
    pub outcome: Option<Outcome>,
}

impl ImageJob {
    pub fn new(generation: u64, source: SourceImage, options: JobOptions) -> Self {
        Self {
            generation,
            source,
            options,
            outcome: None,
        }
    }

    pub fn result_bytes(&self) -> Option<&[u8]> {
        match &self.outcome {
            Some(Outcome::Processed(bytes)) => Some(bytes),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Some(Outcome::Failed(message)) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum JobState {
    #[default]
    Empty,
    Loading(ImageJob),
    Ready(ImageJob),
    Errored(ImageJob),
}

impl JobState {
    pub fn name(&self) -> &'static str {
        match self {
            JobState::Empty => "empty",
            JobState::Loading(_) => "loading",
            JobState::Ready(_) => "ready",
            JobState::Errored(_) => "errored",
        }
    }

    pub fn job(&self) -> Option<&ImageJob> {
        match self {
            JobState::Empty => None,
            JobState::Loading(job) | JobState::Ready(job) | JobState::Errored(job) => Some(job),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, JobState::Loading(_))
    }

    /// Ready and Errored stay put until the next selection.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Ready(_) | JobState::Errored(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    FileSelected(ImageJob),
    EngineResolved { generation: u64, bytes: Vec<u8> },
    EngineRejected { generation: u64, cause: String },
}

impl JobEvent {
    fn generation(&self) -> u64 {
        match self {
            JobEvent::FileSelected(job) => job.generation,
            JobEvent::EngineResolved { generation, .. }
            | JobEvent::EngineRejected { generation, .. } => *generation,
        }
    }
}

/// Advances the state machine.
///
/// A selection always wins and starts a fresh Loading job. Engine results
/// only land on the Loading job with the same generation; anything else is
/// stale and leaves the state untouched.
pub fn transition(state: JobState, event: JobEvent) -> JobState {
    let generation = event.generation();

    match (state, event) {
        (_, JobEvent::FileSelected(job)) => JobState::Loading(job),

        (JobState::Loading(mut job), JobEvent::EngineResolved { bytes, .. })
            if job.generation == generation =>
        {
            if bytes.is_empty() {
                tracing::warn!(generation, "engine resolved with an empty result");
                job.outcome = Some(Outcome::Failed(FAILURE_MESSAGE.to_string()));
                JobState::Errored(job)
            } else {
                job.outcome = Some(Outcome::Processed(bytes));
                JobState::Ready(job)
            }
        }

        (JobState::Loading(mut job), JobEvent::EngineRejected { cause, .. })
            if job.generation == generation =>
        {
            tracing::error!(generation, cause = %cause, "image compression failed");
            job.outcome = Some(Outcome::Failed(FAILURE_MESSAGE.to_string()));
            JobState::Errored(job)
        }

        (state, _) => {
            tracing::debug!(
                generation,
                state = state.name(),
                "ignoring stale engine completion"
            );
            state
        }
    }
}
