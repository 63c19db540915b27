/// Errors raised by the tracker for inputs it cannot process.
///
/// A frame without any blob is not an error; it is reported through
/// [`TrackingResult::found`](super::TrackingResult::found).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrackerError {
    /// Tracker constructed with a zero height or width.
    #[error("invalid frame dimensions {height}x{width}")]
    InvalidDimensions { height: usize, width: usize },
    /// Frame shape does not match the dimensions the tracker was built with.
    #[error("frame dimension mismatch: expected {expected:?}, got {got:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
    /// Frame has no pixels or not exactly three channels.
    #[error("empty or malformed frame of shape {0:?}")]
    EmptyFrame(Vec<usize>),
    /// A color range channel whose lower bound exceeds its upper bound.
    #[error("invalid color range on channel {channel}: lower {lower} > upper {upper}")]
    InvalidColorRange {
        channel: &'static str,
        lower: u8,
        upper: u8,
    },
    /// Invalid tracker configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised while loading a [`TrackerConfig`](super::TrackerConfig) from disk.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] TrackerError),
}
