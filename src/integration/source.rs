//! Frame providers feeding the tracker.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use image::RgbImage;
use image::imageops::{self, FilterType};
use log::{debug, info};
use ndarray::Array3;

use crate::tracker::Frame;

/// Errors raised while acquiring frames.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to decode {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("stream ended mid-frame after {got} of {expected} bytes")]
    TruncatedFrame { expected: usize, got: usize },
    #[error("no image files found in {0}")]
    EmptyDirectory(PathBuf),
    #[error("invalid frame size {height}x{width}")]
    InvalidFrameSize { height: usize, width: usize },
}

/// Trait for anything that yields video frames, one per call.
///
/// Implement this trait to feed the tracker from a camera, a file or a
/// synthetic generator.
///
/// # Example
///
/// ```ignore
/// use blobtrack_rs::{Frame, FrameSource};
///
/// struct Still(Option<Frame>);
///
/// impl FrameSource for Still {
///     type Error = std::convert::Infallible;
///
///     fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error> {
///         Ok(self.0.take())
///     }
/// }
/// ```
pub trait FrameSource {
    /// Error type for acquisition failures.
    type Error;

    /// Fetch the next BGR frame, or `Ok(None)` once the stream has ended.
    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    type Error = S::Error;

    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error> {
        (**self).next_frame()
    }
}

/// Convert an RGB image into a BGR frame.
pub fn frame_from_rgb_image(image: &RgbImage) -> Frame {
    let (width, height) = image.dimensions();
    Array3::from_shape_fn((height as usize, width as usize, 3), |(y, x, c)| {
        image.get_pixel(x as u32, y as u32).0[2 - c]
    })
}

/// Convert a BGR frame into an RGB image.
pub fn frame_to_rgb_image(frame: &Frame) -> RgbImage {
    let (height, width, _) = frame.dim();
    RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        image::Rgb([frame[[y, x, 2]], frame[[y, x, 1]], frame[[y, x, 0]]])
    })
}

/// Live feed of packed BGR24 frames read from a byte stream.
///
/// A capture device or a capture tool writing raw video to a pipe
/// (`stdin`, a FIFO, a device node) delivers frames back to back with no
/// framing, so the frame size must be known up front.
pub struct RawStreamSource<R: Read> {
    reader: R,
    height: usize,
    width: usize,
    buffer: Vec<u8>,
}

impl<R: Read> RawStreamSource<R> {
    pub fn new(reader: R, height: usize, width: usize) -> Result<Self, SourceError> {
        if height == 0 || width == 0 {
            return Err(SourceError::InvalidFrameSize { height, width });
        }
        info!("reading raw {}x{} BGR24 frames", width, height);
        Ok(Self {
            reader,
            height,
            width,
            buffer: vec![0; height * width * 3],
        })
    }

    /// Frame dimensions as `(height, width)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

impl<R: Read> FrameSource for RawStreamSource<R> {
    type Error = SourceError;

    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error> {
        let expected = self.buffer.len();
        let mut filled = 0;
        while filled < expected {
            match self.reader.read(&mut self.buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if filled == 0 {
            info!("raw stream ended");
            return Ok(None);
        }
        if filled < expected {
            return Err(SourceError::TruncatedFrame {
                expected,
                got: filled,
            });
        }

        let frame = Array3::from_shape_vec((self.height, self.width, 3), self.buffer.clone())
            .map_err(|_| SourceError::InvalidFrameSize {
                height: self.height,
                width: self.width,
            })?;
        Ok(Some(frame))
    }
}

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Recorded footage stored as a sequence of image files.
pub struct ImageSequenceSource {
    paths: std::vec::IntoIter<PathBuf>,
    resize_width: Option<u32>,
}

impl ImageSequenceSource {
    /// Play back explicit files in the given order.
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            paths: paths.into_iter(),
            resize_width: None,
        }
    }

    /// Play back every image file in `dir`, sorted by file name.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, SourceError> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            if path.is_file() && is_image {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            return Err(SourceError::EmptyDirectory(dir.to_path_buf()));
        }
        paths.sort();
        info!("playing {} frames from {}", paths.len(), dir.display());
        Ok(Self::from_paths(paths))
    }

    /// Scale every frame to `width` pixels wide, keeping the aspect ratio.
    pub fn with_resize_width(mut self, width: u32) -> Self {
        self.resize_width = Some(width).filter(|&w| w > 0);
        self
    }

    fn load(&self, path: &Path) -> Result<Frame, SourceError> {
        let image = image::open(path)
            .map_err(|source| SourceError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();

        let image = match self.resize_width {
            Some(width) if width != image.width() => {
                let height = ((image.height() as u64 * width as u64) / image.width().max(1) as u64)
                    .max(1) as u32;
                imageops::resize(&image, width, height, FilterType::Triangle)
            }
            _ => image,
        };

        debug!("loaded {} ({}x{})", path.display(), image.width(), image.height());
        Ok(frame_from_rgb_image(&image))
    }
}

impl FrameSource for ImageSequenceSource {
    type Error = SourceError;

    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error> {
        match self.paths.next() {
            Some(path) => self.load(&path).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_raw_stream_frames_then_end() {
        let data: Vec<u8> = (0..24).collect();
        let mut source = RawStreamSource::new(Cursor::new(data), 2, 2).unwrap();

        let first = source.next_frame().unwrap().unwrap();
        assert_eq!(first.dim(), (2, 2, 3));
        assert_eq!(first[[0, 0, 0]], 0);
        assert_eq!(first[[1, 1, 2]], 11);

        let second = source.next_frame().unwrap().unwrap();
        assert_eq!(second[[0, 0, 0]], 12);

        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_raw_stream_truncated() {
        let mut source = RawStreamSource::new(Cursor::new(vec![0u8; 5]), 2, 2).unwrap();
        assert!(matches!(
            source.next_frame(),
            Err(SourceError::TruncatedFrame {
                expected: 12,
                got: 5
            })
        ));
    }

    #[test]
    fn test_raw_stream_rejects_zero_size() {
        assert!(RawStreamSource::new(Cursor::new(Vec::new()), 0, 4).is_err());
    }

    #[test]
    fn test_rgb_bgr_conversion() {
        let mut image = RgbImage::new(3, 2);
        image.put_pixel(2, 1, image::Rgb([10, 20, 30]));
        let frame = frame_from_rgb_image(&image);
        assert_eq!(frame.dim(), (2, 3, 3));
        assert_eq!(
            (frame[[1, 2, 0]], frame[[1, 2, 1]], frame[[1, 2, 2]]),
            (30, 20, 10)
        );
        assert_eq!(frame_to_rgb_image(&frame), image);
    }
}
