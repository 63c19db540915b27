//! Gaussian smoothing and binary morphology.

use image::{Rgb, Rgb32FImage};
use imageproc::distance_transform::Norm;
use imageproc::filter::separable_filter_equal;
use imageproc::morphology;
use ndarray::Array3;

use super::{Frame, Mask};

/// Standard deviation derived from the kernel size when none is given.
fn auto_sigma(ksize: usize) -> f64 {
    0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

fn gaussian_kernel(ksize: usize, sigma: f64) -> Vec<f32> {
    let sigma = if sigma > 0.0 { sigma } else { auto_sigma(ksize) };
    let center = (ksize / 2) as f64;
    let scale = -0.5 / (sigma * sigma);
    let weights: Vec<f64> = (0..ksize)
        .map(|i| {
            let d = i as f64 - center;
            (scale * d * d).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.iter().map(|w| (w / sum) as f32).collect()
}

/// Separable Gaussian blur over a `ksize` x `ksize` window; `sigma <= 0`
/// derives it from `ksize`.
///
/// Every channel is filtered independently and edge pixels are replicated
/// outwards. An even `ksize` is rounded up to the next odd size.
pub fn gaussian_blur(frame: &Frame, ksize: usize, sigma: f64) -> Frame {
    let ksize = ksize.max(1) | 1;
    let (height, width, _) = frame.dim();
    if height == 0 || width == 0 || ksize == 1 {
        return frame.clone();
    }

    let source = Rgb32FImage::from_fn(width as u32, height as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        Rgb([
            frame[[y, x, 0]] as f32,
            frame[[y, x, 1]] as f32,
            frame[[y, x, 2]] as f32,
        ])
    });
    let blurred = separable_filter_equal(&source, &gaussian_kernel(ksize, sigma));

    Array3::from_shape_fn((height, width, 3), |(y, x, c)| {
        let v = blurred.get_pixel(x as u32, y as u32).0[c];
        v.round().clamp(0.0, 255.0) as u8
    })
}

/// Chebyshev radius matching `iterations` passes of a 3×3 rectangular element.
fn chessboard_radius(iterations: usize) -> u8 {
    u8::try_from(iterations).unwrap_or(u8::MAX)
}

/// Erode with a 3×3 rectangular element, `iterations` times.
///
/// Only background pixels inside the mask erode; the frame edge does not.
pub fn erode(mask: &Mask, iterations: usize) -> Mask {
    if iterations == 0 {
        return mask.clone();
    }
    morphology::erode(mask, Norm::LInf, chessboard_radius(iterations))
}

/// Dilate with a 3×3 rectangular element, `iterations` times.
pub fn dilate(mask: &Mask, iterations: usize) -> Mask {
    if iterations == 0 {
        return mask.clone();
    }
    morphology::dilate(mask, Norm::LInf, chessboard_radius(iterations))
}
