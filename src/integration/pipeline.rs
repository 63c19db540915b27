//! TrackerPipeline for combining a frame source with the color tracker.

use std::ops::ControlFlow;

use log::info;

use crate::tracker::{ColorTracker, Frame, TrackerConfig, TrackerError, TrackingResult};

use super::FrameSource;

/// Errors from a pipeline run: either the source or the tracker failed.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError<E> {
    #[error("frame source failed: {0}")]
    Source(E),
    #[error("tracking failed: {0}")]
    Tracker(#[from] TrackerError),
}

/// A frame together with the tracking result computed on it.
#[derive(Debug, Clone)]
pub struct TrackedFrame {
    pub frame: Frame,
    pub result: TrackingResult,
}

/// A combined tracker that bundles a frame source with the color tracker.
///
/// The tracker is built from the first frame's dimensions, so a source may
/// deliver any (consistent) frame size.
pub struct TrackerPipeline<S: FrameSource> {
    source: S,
    config: TrackerConfig,
    tracker: Option<ColorTracker>,
    frames: usize,
}

impl<S: FrameSource> TrackerPipeline<S> {
    /// Create a new tracking pipeline with the given source and tracker config.
    pub fn new(source: S, config: TrackerConfig) -> Self {
        Self {
            source,
            config,
            tracker: None,
            frames: 0,
        }
    }

    /// Create a new tracking pipeline with default tracker configuration.
    pub fn with_default_config(source: S) -> Self {
        Self::new(source, TrackerConfig::default())
    }

    /// Pull one frame from the source and track it.
    ///
    /// Returns `Ok(None)` once the source reports end-of-stream.
    pub fn process_next(&mut self) -> Result<Option<TrackedFrame>, PipelineError<S::Error>> {
        let Some(frame) = self.source.next_frame().map_err(PipelineError::Source)? else {
            return Ok(None);
        };

        let tracker = match &mut self.tracker {
            Some(tracker) => tracker,
            slot => {
                let (height, width, _) = frame.dim();
                info!("initializing tracker for {}x{} frames", width, height);
                slot.insert(ColorTracker::with_config(height, width, &self.config)?)
            }
        };

        let result = tracker.track(&frame, self.config.landing_radius)?;
        self.frames += 1;
        Ok(Some(TrackedFrame { frame, result }))
    }

    /// Process frames until end-of-stream or until `on_frame` breaks.
    ///
    /// Returns the number of frames processed.
    pub fn run<F>(&mut self, mut on_frame: F) -> Result<usize, PipelineError<S::Error>>
    where
        F: FnMut(&ColorTracker, TrackedFrame) -> ControlFlow<()>,
    {
        let start = self.frames;
        while let Some(tracked) = self.process_next()? {
            let Some(tracker) = self.tracker.as_ref() else {
                break;
            };
            if on_frame(tracker, tracked).is_break() {
                break;
            }
        }
        let processed = self.frames - start;
        info!("processed {} frames", processed);
        Ok(processed)
    }

    /// Total frames tracked so far.
    pub fn frame_count(&self) -> usize {
        self.frames
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// The tracker, once the first frame has been seen.
    pub fn tracker(&self) -> Option<&ColorTracker> {
        self.tracker.as_ref()
    }

    /// Get a reference to the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a mutable reference to the underlying source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
