//! Integration module for connecting the color tracker with its collaborators.
//!
//! This module provides the frame-source abstraction (live stream or
//! recorded files), a pipeline driving the tracker over a source, the
//! visualization overlay and the flight-command interface.

pub mod flight;
pub mod overlay;
mod pipeline;
mod source;

pub use flight::{Direction, FlightCommand, FlightController, Mission, RecordingController, Rotation};
pub use pipeline::{PipelineError, TrackedFrame, TrackerPipeline};
pub use source::{
    FrameSource, ImageSequenceSource, RawStreamSource, SourceError, frame_from_rgb_image,
    frame_to_rgb_image,
};
