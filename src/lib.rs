//! HSV color-blob tracking for steering a quadcopter from a video feed.
//!
//! The [`tracker`] module holds the per-frame algorithm: blur, HSV threshold,
//! morphological clean-up, largest external contour, and the offset/landing
//! decision. The [`integration`] module connects it to frame sources, the
//! visualization overlay and the flight-command interface.

pub mod integration;
pub mod tracker;

pub use integration::{
    FlightCommand, FlightController, FrameSource, ImageSequenceSource, Mission,
    PipelineError, RawStreamSource, RecordingController, SourceError, TrackedFrame,
    TrackerPipeline,
};
pub use tracker::{
    Blob, ColorRange, ColorTracker, ConfigError, Frame, Hsv, Mask, TrackerConfig, TrackerError,
    TrackingResult,
};
