//! Rendering helpers for visualizing tracker output on a frame.
//!
//! All functions take the frame by value and return the annotated frame;
//! they never read tracker state themselves.

use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut, draw_polygon_mut,
};
use imageproc::point::Point;
use nalgebra::{Point2, Vector2};

use super::source::{frame_from_rgb_image, frame_to_rgb_image};
use crate::tracker::{Blob, Frame};

pub const ARROW_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const CIRCLE_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

const ARROW_THICKNESS: f64 = 5.0;
const ARROW_TIP_RATIO: f64 = 0.1;
const CENTROID_DOT_RADIUS: i32 = 5;

/// Draw an arrow from the frame centre towards the tracked offset.
///
/// `offset` uses the tracker convention (y positive upwards), so the tip
/// lands at `(midx + xoffset, midy - yoffset)` in image coordinates.
pub fn draw_offset_arrow(frame: Frame, midpoint: (i32, i32), offset: (i32, i32)) -> Frame {
    let (midx, midy) = midpoint;
    let (xoffset, yoffset) = offset;
    let start = Point2::new(midx as f64, midy as f64);
    let end = Point2::new((midx + xoffset) as f64, (midy - yoffset) as f64);

    let mut canvas = frame_to_rgb_image(&frame);
    draw_arrowed_line(&mut canvas, start, end, ARROW_COLOR, ARROW_THICKNESS);
    frame_from_rgb_image(&canvas)
}

/// Draw the blob's enclosing circle (two pixels thick) and a dot on its centroid.
pub fn draw_blob(frame: Frame, blob: &Blob) -> Frame {
    let mut canvas = frame_to_rgb_image(&frame);

    let center = (blob.circle.center.x as i32, blob.circle.center.y as i32);
    let radius = blob.circle.radius as i32;
    for r in [radius - 1, radius] {
        if r >= 0 {
            draw_hollow_circle_mut(&mut canvas, center, r, CIRCLE_COLOR);
        }
    }

    let centroid = (blob.centroid.x as i32, blob.centroid.y as i32);
    draw_filled_circle_mut(&mut canvas, centroid, CENTROID_DOT_RADIUS, ARROW_COLOR);
    frame_from_rgb_image(&canvas)
}

fn draw_arrowed_line(
    canvas: &mut RgbImage,
    start: Point2<f64>,
    end: Point2<f64>,
    color: Rgb<u8>,
    thickness: f64,
) {
    draw_thick_segment(canvas, start, end, color, thickness);

    let shaft = start - end;
    let tip = shaft.norm() * ARROW_TIP_RATIO;
    if tip <= 0.0 {
        return;
    }
    let angle = shaft.y.atan2(shaft.x);
    for side in [std::f64::consts::FRAC_PI_4, -std::f64::consts::FRAC_PI_4] {
        let barb = end + Vector2::new((angle + side).cos(), (angle + side).sin()) * tip;
        draw_thick_segment(canvas, barb, end, color, thickness);
    }
}

/// Segment drawn as a filled quad with round caps.
fn draw_thick_segment(
    canvas: &mut RgbImage,
    a: Point2<f64>,
    b: Point2<f64>,
    color: Rgb<u8>,
    thickness: f64,
) {
    let half = thickness / 2.0;
    let cap = half.floor() as i32;
    for end in [a, b] {
        draw_filled_circle_mut(canvas, (end.x.round() as i32, end.y.round() as i32), cap, color);
    }

    let dir = b - a;
    let len = dir.norm();
    if len > 0.0 {
        let normal = Vector2::new(-dir.y, dir.x) * (half / len);
        let corners = [a + normal, b + normal, b - normal, a - normal]
            .map(|p| Point::new(p.x.round() as i32, p.y.round() as i32));
        // draw_polygon_mut rejects an explicitly closed polygon
        if corners[0] != corners[3] {
            draw_polygon_mut(canvas, &corners, color);
        }
    }
    draw_line_segment_mut(canvas, (a.x as f32, a.y as f32), (b.x as f32, b.y as f32), color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::Circle;
    use ndarray::Array3;

    fn is_color(frame: &Frame, y: usize, x: usize, color: Rgb<u8>) -> bool {
        // Frames are BGR
        (0..3).all(|c| frame[[y, x, c]] == color.0[2 - c])
    }

    #[test]
    fn test_arrow_points_up_for_positive_yoffset() {
        let frame = Array3::zeros((100, 100, 3));
        let out = draw_offset_arrow(frame, (50, 50), (0, 30));
        // Shaft runs from row 50 up to row 20 along column 50.
        assert!(is_color(&out, 50, 50, ARROW_COLOR));
        assert!(is_color(&out, 21, 50, ARROW_COLOR));
        assert!(is_color(&out, 35, 50, ARROW_COLOR));
        assert!(!is_color(&out, 60, 50, ARROW_COLOR));
        assert!(!is_color(&out, 35, 60, ARROW_COLOR));
    }

    #[test]
    fn test_zero_offset_draws_dot() {
        let frame = Array3::zeros((20, 20, 3));
        let out = draw_offset_arrow(frame, (10, 10), (0, 0));
        assert!(is_color(&out, 10, 10, ARROW_COLOR));
        assert!(!is_color(&out, 10, 14, ARROW_COLOR));
    }

    #[test]
    fn test_arrow_clipped_to_frame() {
        let frame = Array3::zeros((20, 20, 3));
        let out = draw_offset_arrow(frame, (10, 10), (500, -500));
        assert!(is_color(&out, 19, 19, ARROW_COLOR));
    }

    #[test]
    fn test_blob_circle_and_centroid() {
        let frame = Array3::zeros((60, 60, 3));
        let blob = Blob {
            circle: Circle::new(Point2::new(30.0, 30.0), 20.0),
            centroid: Point2::new(30.0, 30.0),
            area: 1256.0,
        };
        let out = draw_blob(frame, &blob);
        assert!(is_color(&out, 30, 10, CIRCLE_COLOR));
        assert!(is_color(&out, 10, 30, CIRCLE_COLOR));
        assert!(is_color(&out, 30, 30, ARROW_COLOR));
        assert!(is_color(&out, 30, 20, Rgb([0, 0, 0])));
    }
}
