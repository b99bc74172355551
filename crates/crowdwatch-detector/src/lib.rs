//! Person detection for crowd counting.
//!
//! A [`Detector`] turns one image into an ordered list of [`Detection`]s.
//! The API server never calls a detector; detections feed the metrics
//! pipeline out of band, and [`count_people`] is the number that ends up in
//! a zone's `people_count`.
//!
//! [`StubDetector`] is the only implementation shipped here. It validates
//! its input and reports no detections.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Class label for detections that count towards crowd size.
pub const PERSON_CLASS: &str = "person";

/// Errors a detector can report.
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    /// The image path does not exist or is not a regular file.
    #[error("image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    /// The image exists but could not be inspected.
    #[error("failed to read image {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Axis-aligned box in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl BoundingBox {
    /// Center point of the box.
    pub fn centroid(&self) -> (f64, f64) {
        (
            f64::from(self.x) + f64::from(self.width) / 2.0,
            f64::from(self.y) + f64::from(self.height) / 2.0,
        )
    }
}

/// One object found in an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Class label, e.g. `person`.
    pub class: String,
    /// Model confidence in `[0, 1]`.
    pub confidence: f32,
    /// Location of the object.
    pub bbox: BoundingBox,
}

impl Detection {
    /// Center point of the detection's bounding box.
    pub fn centroid(&self) -> (f64, f64) {
        self.bbox.centroid()
    }

    /// Whether this detection is a person.
    pub fn is_person(&self) -> bool {
        self.class == PERSON_CLASS
    }
}

/// Finds objects in an image.
pub trait Detector {
    /// Run detection on the image at `image`, returning detections in the
    /// order the model produced them.
    fn detect(&self, image: &Path) -> Result<Vec<Detection>, DetectorError>;
}

/// Detector that checks the image is readable and finds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubDetector;

impl Detector for StubDetector {
    fn detect(&self, image: &Path) -> Result<Vec<Detection>, DetectorError> {
        let metadata = match std::fs::metadata(image) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DetectorError::ImageNotFound(image.to_path_buf()));
            }
            Err(source) => {
                return Err(DetectorError::Io {
                    path: image.to_path_buf(),
                    source,
                });
            }
        };

        if !metadata.is_file() {
            return Err(DetectorError::ImageNotFound(image.to_path_buf()));
        }

        debug!(image = %image.display(), bytes = metadata.len(), "stub detector skipping inference");
        Ok(Vec::new())
    }
}

/// Number of person detections.
pub fn count_people(detections: &[Detection]) -> usize {
    detections.iter().filter(|d| d.is_person()).count()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn detection(class: &str, x: u32, y: u32) -> Detection {
        Detection {
            class: class.to_owned(),
            confidence: 0.9,
            bbox: BoundingBox {
                x,
                y,
                width: 20,
                height: 40,
            },
        }
    }

    #[test]
    fn centroid_is_box_center() {
        let (cx, cy) = detection(PERSON_CLASS, 10, 10).centroid();
        assert!((cx - 20.0).abs() < f64::EPSILON);
        assert!((cy - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn count_people_ignores_other_classes() {
        let detections = vec![
            detection(PERSON_CLASS, 0, 0),
            detection("bicycle", 5, 5),
            detection(PERSON_CLASS, 50, 0),
        ];
        assert_eq!(count_people(&detections), 2);
        assert_eq!(count_people(&[]), 0);
    }

    #[test]
    fn stub_detector_finds_nothing_in_existing_image() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let detections = StubDetector.detect(file.path()).unwrap();
        assert!(detections.is_empty());
    }

    #[test]
    fn stub_detector_rejects_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("frame.jpg");
        let result = StubDetector.detect(&missing);
        assert!(matches!(result, Err(DetectorError::ImageNotFound(p)) if p == missing));
    }

    #[test]
    fn stub_detector_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = StubDetector.detect(dir.path());
        assert!(matches!(result, Err(DetectorError::ImageNotFound(_))));
    }

    #[test]
    fn detection_serializes_with_nested_box() {
        let json = serde_json::to_value(detection(PERSON_CLASS, 1, 2)).unwrap();
        assert_eq!(json["class"], "person");
        assert_eq!(json["bbox"]["x"], 1);
        assert_eq!(json["bbox"]["height"], 40);
    }
}
