//! Trait for object detection inference backends.

use crate::tracker::Detection;

/// Trait for object detection inference backends.
///
/// Implement this trait to feed any detection model into the tracker.
///
/// # Example
///
/// ```
/// use speedtrack_rs::Detection;
/// use speedtrack_rs::integration::DetectionSource;
///
/// struct MyDetector;
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, _input: &[u8], _width: u32, _height: u32) -> Result<Vec<Detection>, Self::Error> {
///         // Run inference and return detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Run inference on an image region and return detections in region
    /// coordinates.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes (format depends on implementation)
    /// * `width` - Region width in pixels
    /// * `height` - Region height in pixels
    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error>;
}

impl<D: DetectionSource + ?Sized> DetectionSource for Box<D> {
    type Error = D::Error;

    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error> {
        (**self).detect(input, width, height)
    }
}
