//! Per-frame HSV color-blob tracker.

use std::path::Path;

use log::{debug, trace};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::integration::overlay;
use crate::tracker::color::{ColorRange, in_range_mask, to_hsv};
use crate::tracker::contour::{Contour, find_external_contours};
use crate::tracker::error::{ConfigError, TrackerError};
use crate::tracker::filter::{dilate, erode, gaussian_blur};
use crate::tracker::geometry::{Circle, min_enclosing_circle};
use crate::tracker::Frame;

/// Configuration for the ColorTracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub color_range: ColorRange,
    /// Enclosing radius (pixels) above which the blob is close enough to land on
    pub landing_radius: f64,
    /// Enclosing radius (pixels) a blob must exceed to count as found
    pub min_radius: f64,
    /// Gaussian kernel size, odd
    pub blur_kernel: usize,
    /// Erosion and dilation passes applied to the color mask
    pub morph_iterations: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            color_range: ColorRange::blue(),
            landing_radius: 100.0,
            min_radius: 10.0,
            blur_kernel: 11,
            morph_iterations: 2,
        }
    }
}

impl TrackerConfig {
    /// Load a configuration from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.blur_kernel == 0 || self.blur_kernel % 2 == 0 {
            return Err(TrackerError::InvalidConfig(format!(
                "blur_kernel must be a positive odd number, got {}",
                self.blur_kernel
            )));
        }
        if !(self.landing_radius.is_finite() && self.landing_radius > 0.0) {
            return Err(TrackerError::InvalidConfig(format!(
                "landing_radius must be positive, got {}",
                self.landing_radius
            )));
        }
        if !(self.min_radius.is_finite() && self.min_radius >= 0.0) {
            return Err(TrackerError::InvalidConfig(format!(
                "min_radius must be non-negative, got {}",
                self.min_radius
            )));
        }
        Ok(())
    }
}

/// The largest blob found in a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blob {
    /// Minimum enclosing circle of the blob's contour
    pub circle: Circle,
    /// Area-weighted centre of the contour
    pub centroid: Point2<f64>,
    /// Contour area in square pixels
    pub area: f64,
}

/// Outcome of one `track` call.
///
/// `land` is decided from the enclosing radius alone and is reported even
/// when the blob is too small to count as `found` (offsets are then zero).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TrackingResult {
    /// Centroid x minus frame centre x, positive to the right
    pub xoffset: i32,
    /// Frame centre y minus centroid y, positive upwards
    pub yoffset: i32,
    pub land: bool,
    pub found: bool,
    /// Enclosing radius of the largest blob, `None` when there is no blob
    pub radius: Option<f64>,
}

impl TrackingResult {
    /// Result for a frame with no usable blob.
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> (i32, i32) {
        (self.xoffset, self.yoffset)
    }

    /// `(xoffset, yoffset, land, found, radius)`
    pub fn into_tuple(self) -> (i32, i32, bool, bool, Option<f64>) {
        (self.xoffset, self.yoffset, self.land, self.found, self.radius)
    }
}

/// Color tracker: finds the largest blob within a color range and reports
/// its offset from the frame centre.
///
/// The only state that survives between calls is the last offset (and
/// blob), kept for [`ColorTracker::draw_arrows`].
#[derive(Debug, Clone)]
pub struct ColorTracker {
    color_range: ColorRange,
    height: usize,
    width: usize,
    midx: i32,
    midy: i32,
    xoffset: i32,
    yoffset: i32,
    min_radius: f64,
    blur_kernel: usize,
    morph_iterations: usize,
    last_blob: Option<Blob>,
}

impl ColorTracker {
    /// Create a tracker for frames of `height` x `width` pixels with default
    /// smoothing and minimum blob size.
    pub fn new(height: usize, width: usize, color_range: ColorRange) -> Result<Self, TrackerError> {
        let config = TrackerConfig {
            color_range,
            ..TrackerConfig::default()
        };
        Self::with_config(height, width, &config)
    }

    pub fn with_config(
        height: usize,
        width: usize,
        config: &TrackerConfig,
    ) -> Result<Self, TrackerError> {
        if height == 0 || width == 0 {
            return Err(TrackerError::InvalidDimensions { height, width });
        }
        config.validate()?;
        let midx = i32::try_from(width / 2)
            .map_err(|_| TrackerError::InvalidDimensions { height, width })?;
        let midy = i32::try_from(height / 2)
            .map_err(|_| TrackerError::InvalidDimensions { height, width })?;

        Ok(Self {
            color_range: config.color_range,
            height,
            width,
            midx,
            midy,
            xoffset: 0,
            yoffset: 0,
            min_radius: config.min_radius,
            blur_kernel: config.blur_kernel,
            morph_iterations: config.morph_iterations,
            last_blob: None,
        })
    }

    /// Frame centre `(midx, midy)`.
    pub fn midpoint(&self) -> (i32, i32) {
        (self.midx, self.midy)
    }

    /// Offsets from the most recent `track` call.
    pub fn offsets(&self) -> (i32, i32) {
        (self.xoffset, self.yoffset)
    }

    /// Blob accepted by the most recent `track` call, if any.
    pub fn last_blob(&self) -> Option<&Blob> {
        self.last_blob.as_ref()
    }

    pub fn color_range(&self) -> &ColorRange {
        &self.color_range
    }

    /// Frame dimensions as `(height, width)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    fn check_frame(&self, frame: &Frame) -> Result<(), TrackerError> {
        let (height, width, channels) = frame.dim();
        if frame.is_empty() || channels != 3 {
            return Err(TrackerError::EmptyFrame(frame.shape().to_vec()));
        }
        if (height, width) != (self.height, self.width) {
            return Err(TrackerError::DimensionMismatch {
                expected: (self.height, self.width),
                got: (height, width),
            });
        }
        Ok(())
    }

    /// Locate the largest blob in range without touching tracker state.
    ///
    /// Returns `Ok(None)` when nothing is in range or the largest contour is
    /// degenerate (zero area, so no centroid).
    pub fn locate_blob(&self, frame: &Frame) -> Result<Option<Blob>, TrackerError> {
        self.check_frame(frame)?;

        // Step 1-2: Smooth and move to HSV
        let blurred = gaussian_blur(frame, self.blur_kernel, 0.0);
        let hsv = to_hsv(&blurred);

        // Step 3-4: Threshold and clean up small specks
        let mask = in_range_mask(&hsv, &self.color_range);
        let mask = dilate(&erode(&mask, self.morph_iterations), self.morph_iterations);

        // Step 5: External contours
        let contours = find_external_contours(&mask);
        trace!("found {} external contours", contours.len());

        // Step 6: Largest contour, first one wins on ties
        let Some((contour, area)) = largest_contour(&contours) else {
            return Ok(None);
        };
        let Some(centroid) = contour.moments().centroid() else {
            debug!("largest contour is degenerate ({} points), ignoring", contour.len());
            return Ok(None);
        };
        let points: Vec<Point2<f64>> = contour
            .points()
            .iter()
            .map(|p| Point2::new(p.x as f64, p.y as f64))
            .collect();
        let Some(circle) = min_enclosing_circle(&points) else {
            return Ok(None);
        };

        Ok(Some(Blob {
            circle,
            centroid,
            area,
        }))
    }

    /// Track the blob in one frame.
    ///
    /// `land` is set when the blob's enclosing radius strictly exceeds
    /// `landing_radius`. Offsets are only reported for blobs whose radius
    /// exceeds the minimum size; otherwise they reset to zero.
    pub fn track(&mut self, frame: &Frame, landing_radius: f64) -> Result<TrackingResult, TrackerError> {
        let Some(blob) = self.locate_blob(frame)? else {
            self.reset();
            return Ok(TrackingResult::not_found());
        };

        let radius = blob.circle.radius;
        let land = radius > landing_radius;
        let found = radius > self.min_radius;

        if found {
            self.xoffset = blob.centroid.x as i32 - self.midx;
            self.yoffset = self.midy - blob.centroid.y as i32;
            self.last_blob = Some(blob);
        } else {
            self.reset();
        }

        debug!(
            "blob centroid=({:.1}, {:.1}) radius={:.1} area={:.0} found={} land={} offset=({}, {})",
            blob.centroid.x,
            blob.centroid.y,
            radius,
            blob.area,
            found,
            land,
            self.xoffset,
            self.yoffset
        );

        Ok(TrackingResult {
            xoffset: self.xoffset,
            yoffset: self.yoffset,
            land,
            found,
            radius: Some(radius),
        })
    }

    fn reset(&mut self) {
        self.xoffset = 0;
        self.yoffset = 0;
        self.last_blob = None;
    }

    /// Draw the direction arrow (and the last accepted blob) onto `frame`.
    pub fn draw_arrows(&self, frame: Frame) -> Frame {
        let frame = overlay::draw_offset_arrow(frame, self.midpoint(), self.offsets());
        match &self.last_blob {
            Some(blob) => overlay::draw_blob(frame, blob),
            None => frame,
        }
    }
}

/// Largest contour by area; the earliest one wins on exact ties.
fn largest_contour(contours: &[Contour]) -> Option<(&Contour, f64)> {
    let mut best: Option<(&Contour, f64)> = None;
    for contour in contours {
        let area = contour.area();
        if best.is_none_or(|(_, best_area)| area > best_area) {
            best = Some((contour, area));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn blank(height: usize, width: usize) -> Frame {
        Array3::zeros((height, width, 3))
    }

    fn fill_square(frame: &mut Frame, top: usize, left: usize, side: usize) {
        for y in top..top + side {
            for x in left..left + side {
                frame[[y, x, 0]] = 255;
            }
        }
    }

    #[test]
    fn test_midpoint_floor_division() {
        let tracker = ColorTracker::new(400, 600, ColorRange::blue()).unwrap();
        assert_eq!(tracker.midpoint(), (300, 200));
        assert_eq!(tracker.offsets(), (0, 0));

        let odd = ColorTracker::new(401, 601, ColorRange::blue()).unwrap();
        assert_eq!(odd.midpoint(), (300, 200));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            ColorTracker::new(0, 600, ColorRange::blue()),
            Err(TrackerError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut tracker = ColorTracker::new(40, 60, ColorRange::blue()).unwrap();
        let err = tracker.track(&blank(40, 61), 100.0).unwrap_err();
        assert_eq!(
            err,
            TrackerError::DimensionMismatch {
                expected: (40, 60),
                got: (40, 61)
            }
        );
    }

    #[test]
    fn test_empty_frame_not_found() {
        let mut tracker = ColorTracker::new(40, 60, ColorRange::blue()).unwrap();
        let result = tracker.track(&blank(40, 60), 100.0).unwrap();
        assert_eq!(result.into_tuple(), (0, 0, false, false, None));
        assert!(tracker.last_blob().is_none());
    }

    #[test]
    fn test_square_blob_offsets() {
        let mut frame = blank(80, 100);
        // 30x30 square centred on (75, 25) in (x, y)
        fill_square(&mut frame, 10, 60, 31);
        let mut tracker = ColorTracker::new(80, 100, ColorRange::blue()).unwrap();
        let result = tracker.track(&frame, 100.0).unwrap();
        assert!(result.found);
        assert!(!result.land);
        assert_eq!(result.offset(), (25, 15));
        assert_eq!(tracker.offsets(), (25, 15));
    }

    #[test]
    fn test_speck_is_removed_by_morphology() {
        let mut frame = blank(60, 60);
        fill_square(&mut frame, 20, 20, 3);
        let mut tracker = ColorTracker::new(60, 60, ColorRange::blue()).unwrap();
        let result = tracker.track(&frame, 100.0).unwrap();
        assert_eq!(result, TrackingResult::not_found());
    }

    #[test]
    fn test_largest_contour_first_wins_ties() {
        let a = Contour::new(vec![Point2::new(0, 0), Point2::new(2, 0), Point2::new(0, 2)]);
        let b = Contour::new(vec![Point2::new(5, 5), Point2::new(7, 5), Point2::new(5, 7)]);
        let contours = [a.clone(), b];
        let (best, area) = largest_contour(&contours).unwrap();
        assert_eq!(best, &a);
        assert!((area - 2.0).abs() < 1e-9);
        assert!(largest_contour(&[]).is_none());
    }

    #[test]
    fn test_config_validation() {
        assert!(TrackerConfig::default().validate().is_ok());
        let even = TrackerConfig {
            blur_kernel: 10,
            ..TrackerConfig::default()
        };
        assert!(even.validate().is_err());
        let negative = TrackerConfig {
            landing_radius: -1.0,
            ..TrackerConfig::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_config_partial_json_uses_defaults() {
        let config: TrackerConfig = serde_json::from_str(r#"{"landing_radius": 42.0}"#).unwrap();
        assert_eq!(config.landing_radius, 42.0);
        assert_eq!(config.blur_kernel, 11);
        assert_eq!(config.color_range, ColorRange::blue());
    }
}
