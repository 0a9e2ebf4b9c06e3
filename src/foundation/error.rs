use std::fmt;

/// Convenience result type used across raytide.
pub type RaytideResult<T> = Result<T, RaytideError>;

/// Which partitions of a render job failed.
///
/// Band indices are sorted and deduplicated before the completion signal
/// carries this value out of the job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderFailure {
    /// Indices of the row bands whose workers reported an error.
    pub bands: Vec<usize>,
}

impl fmt::Display for RenderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} band(s) failed: {:?}", self.bands.len(), self.bands)
    }
}

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum RaytideError {
    /// Invalid caller-provided arguments or sequencing.
    #[error("validation error: {0}")]
    Validation(String),

    /// The worker pool could not be constructed; no partial pool is usable.
    #[error("worker pool init error: {0}")]
    PoolInit(String),

    /// One or more partitions failed during a render; no framebuffer is
    /// presented for the job.
    #[error("render failed: {0}")]
    RenderFailed(RenderFailure),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RaytideError {
    /// Build a [`RaytideError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RaytideError::PoolInit`] value.
    pub fn pool_init(msg: impl Into<String>) -> Self {
        Self::PoolInit(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_failure_displays_band_indices() {
        let err = RaytideError::RenderFailed(RenderFailure { bands: vec![1, 3] });
        let msg = err.to_string();
        assert!(msg.contains("render failed"), "got: {msg}");
        assert!(msg.contains("[1, 3]"), "got: {msg}");
    }

    #[test]
    fn anyhow_errors_wrap_transparently() {
        let err: RaytideError = anyhow::anyhow!("disk on fire").into();
        assert_eq!(err.to_string(), "disk on fire");
    }
}
