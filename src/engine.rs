//! Boundary between the interaction layer and whatever re-encodes pixels.

use crate::error::Result;
use crate::options::EngineConfig;

/// An image re-encoding engine.
///
/// Takes the raw source bytes and a derived [`EngineConfig`] and returns the
/// re-encoded image. Implementations are free to decode, resize and iterate
/// however they like; callers only see bytes or an error. The call is
/// blocking, the session decides where it runs.
pub trait CompressionEngine: Send + Sync + 'static {
    fn compress(&self, source: &[u8], config: &EngineConfig) -> Result<Vec<u8>>;
}

impl<F> CompressionEngine for F
where
    F: Fn(&[u8], &EngineConfig) -> Result<Vec<u8>> + Send + Sync + 'static,
{
    fn compress(&self, source: &[u8], config: &EngineConfig) -> Result<Vec<u8>> {
        self(source, config)
    }
}
