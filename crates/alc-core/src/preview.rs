//! Audio preview of a latency value.
//!
//! A [`PreviewService`] renders a short clip in which the listener hears the
//! given delay. The service lives outside this crate; [`request_preview`]
//! guards it against values that cannot be rendered.

use thiserror::Error;

/// Errors from an audio preview request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreviewError {
    /// The latency is zero, negative, or not a finite number.
    #[error("cannot preview a latency of {0} ms")]
    InvalidLatency(f64),

    /// The preview service failed.
    #[error("preview service failed: {0}")]
    Service(String),
}

/// Renders playable audio for a latency in milliseconds.
pub trait PreviewService {
    /// Returns encoded audio (for example a WAV file) for `latency_ms`.
    fn render(&mut self, latency_ms: f64) -> Result<Vec<u8>, PreviewError>;
}

/// Validates `latency_ms` and asks `service` for a preview.
///
/// Invalid latencies are rejected without calling the service.
pub fn request_preview(
    service: &mut dyn PreviewService,
    latency_ms: f64,
) -> Result<Vec<u8>, PreviewError> {
    if !latency_ms.is_finite() || latency_ms <= 0.0 {
        return Err(PreviewError::InvalidLatency(latency_ms));
    }
    service.render(latency_ms).inspect_err(|err| {
        tracing::warn!("preview: {err}");
    })
}
