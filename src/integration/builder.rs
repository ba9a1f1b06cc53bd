//! Builder for creating Detection objects from various input formats.

use crate::tracker::{ClassId, Detection, Rect};

/// Builder for creating `Detection` objects from raw detector output.
#[derive(Debug, Clone)]
pub struct DetectionBuilder {
    bbox: Rect,
    class_id: ClassId,
    confidence: f32,
}

impl Default for DetectionBuilder {
    fn default() -> Self {
        Self {
            bbox: Rect::default(),
            class_id: ClassId::Other,
            confidence: 0.0,
        }
    }
}

impl DetectionBuilder {
    /// Create a new detection builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = Rect::from_tlbr(x1, y1, x2, y2);
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.bbox = Rect::from_cxcywh(cx, cy, w, h);
        self
    }

    /// Set bounding box in TLWH format (left, top, width, height).
    pub fn tlwh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.bbox = Rect::new(x, y, w, h);
        self
    }

    /// Set the category.
    pub fn class(mut self, class_id: ClassId) -> Self {
        self.class_id = class_id;
        self
    }

    /// Set the category from a COCO class index.
    pub fn coco_class(self, index: usize) -> Self {
        self.class(ClassId::from_coco(index))
    }

    /// Set confidence score.
    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Build the Detection.
    pub fn build(self) -> Detection {
        Detection::from_rect(self.bbox, self.class_id, self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_builder() {
        let det = DetectionBuilder::new()
            .tlbr(10.0, 20.0, 50.0, 80.0)
            .coco_class(7)
            .confidence(0.95)
            .build();

        assert_eq!(det.bbox, Rect::new(10.0, 20.0, 40.0, 60.0));
        assert_eq!(det.class_id, ClassId::Truck);
        assert_eq!(det.confidence, 0.95);
    }

    #[test]
    fn test_box_formats_agree() {
        let a = DetectionBuilder::new().tlwh(10.0, 20.0, 40.0, 60.0).build();
        let b = DetectionBuilder::new().xywh(30.0, 50.0, 40.0, 60.0).build();
        assert_eq!(a.bbox, b.bbox);
        assert_eq!(a.class_id, ClassId::Other);
    }
}
