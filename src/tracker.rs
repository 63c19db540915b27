mod color;
mod color_tracker;
mod contour;
mod error;
mod filter;
mod geometry;

use image::GrayImage;
use ndarray::Array3;

/// Raster image of shape `(height, width, 3)` in BGR channel order.
pub type Frame = Array3<u8>;

/// Binary image; [`FOREGROUND`] marks set pixels, everything else is zero.
pub type Mask = GrayImage;

/// Value of a set pixel in a [`Mask`].
pub const FOREGROUND: u8 = 255;

pub use color::{ColorRange, Hsv, bgr_to_hsv, in_range_mask, to_hsv};
pub use color_tracker::{Blob, ColorTracker, TrackerConfig, TrackingResult};
pub use contour::{Contour, Moments, find_external_contours};
pub use error::{ConfigError, TrackerError};
pub use filter::{dilate, erode, gaussian_blur};
pub use geometry::{Circle, min_enclosing_circle};
