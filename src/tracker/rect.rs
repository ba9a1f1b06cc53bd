use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in pixel coordinates.
///
/// Supports three common bounding box formats:
/// - TLWH: Top-Left X, Top-Left Y, Width, Height
/// - TLBR: Top-Left X, Top-Left Y, Bottom-Right X, Bottom-Right Y
/// - CXCYWH: Center X, Center Y, Width, Height (the motion model's measurement space)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    /// Width of the bounding box
    pub width: f32,
    /// Height of the bounding box
    pub height: f32,
}

impl Rect {
    /// Create a new Rect from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a Rect from TLBR format (top-left x, top-left y, bottom-right x, bottom-right y).
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Create a Rect from its center point and dimensions.
    #[inline]
    pub fn from_cxcywh(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    #[inline]
    pub fn to_tlwh(&self) -> [f32; 4] {
        [self.x, self.y, self.width, self.height]
    }

    #[inline]
    pub fn to_cxcywh(&self) -> [f32; 4] {
        let (cx, cy) = self.center();
        [cx, cy, self.width, self.height]
    }

    /// Get the center point of the bounding box.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// A box is usable when all coordinates are finite and both sides are positive.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Translate the box by the origin of `region`, mapping region-relative
    /// coordinates back into full-frame coordinates.
    #[inline]
    pub fn offset_by(&self, region: &Rect) -> Rect {
        Rect::new(self.x + region.x, self.y + region.y, self.width, self.height)
    }

    /// Euclidean distance between the centers of two boxes.
    pub fn center_distance(&self, other: &Rect) -> f32 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }

    /// Calculate Intersection over Union (IoU) with another bounding box.
    ///
    /// Degenerate boxes (zero union) yield 0.0.
    pub fn iou(&self, other: &Rect) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        let inter_area = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        let union_area = self.area() + other.area() - inter_area;

        if union_area > 0.0 {
            (inter_area / union_area).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Calculate IoU matrix between two sets of bounding boxes.
///
/// Returns a matrix of shape (M, N) where M is the length of `boxes_a`
/// and N is the length of `boxes_b`.
pub fn iou_batch(boxes_a: &[Rect], boxes_b: &[Rect]) -> Array2<f32> {
    Array2::from_shape_fn((boxes_a.len(), boxes_b.len()), |(i, j)| {
        boxes_a[i].iou(&boxes_b[j])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rect_conversions() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);

        assert_eq!(rect.to_tlwh(), [10.0, 20.0, 30.0, 40.0]);
        assert_eq!(rect.to_tlbr(), [10.0, 20.0, 40.0, 60.0]);
        assert_eq!(rect.to_cxcywh(), [25.0, 40.0, 30.0, 40.0]);
    }

    #[test]
    fn test_from_tlbr() {
        let rect = Rect::from_tlbr(10.0, 20.0, 40.0, 60.0);
        assert_eq!(rect.to_tlwh(), [10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_from_cxcywh() {
        let rect = Rect::from_cxcywh(25.0, 40.0, 30.0, 40.0);
        assert_eq!(rect, Rect::new(10.0, 20.0, 30.0, 40.0));
    }

    #[test]
    fn test_iou() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);

        // Intersection: 5x5 = 25, union: 100 + 100 - 25 = 175
        assert_abs_diff_eq!(a.iou(&b), 25.0 / 175.0, epsilon = 1e-6);
    }

    #[test]
    fn test_iou_is_symmetric() {
        let a = Rect::new(3.0, 1.0, 12.0, 7.0);
        let b = Rect::new(6.0, 4.0, 9.0, 11.0);
        assert_eq!(a.iou(&b), b.iou(&a));
    }

    #[test]
    fn test_iou_no_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 20.0, 10.0, 10.0);
        assert_eq!(a.iou(&b), 0.0);

        // touching edges share no area
        let c = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert_eq!(a.iou(&c), 0.0);
    }

    #[test]
    fn test_iou_same_box() {
        let a = Rect::new(100.0, 100.0, 50.0, 30.0);
        assert_eq!(a.iou(&a), 1.0);
    }

    #[test]
    fn test_iou_degenerate() {
        let a = Rect::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(a.iou(&a), 0.0);
    }

    #[test]
    fn test_validity() {
        assert!(Rect::new(0.0, 0.0, 1.0, 1.0).is_valid());
        assert!(!Rect::new(0.0, 0.0, 0.0, 1.0).is_valid());
        assert!(!Rect::new(0.0, 0.0, 5.0, -1.0).is_valid());
        assert!(!Rect::new(f32::NAN, 0.0, 5.0, 5.0).is_valid());
    }

    #[test]
    fn test_offset_and_distance() {
        let r = Rect::new(10.0, 10.0, 4.0, 4.0);
        let region = Rect::new(100.0, 50.0, 640.0, 480.0);
        assert_eq!(r.offset_by(&region), Rect::new(110.0, 60.0, 4.0, 4.0));

        let moved = Rect::new(13.0, 14.0, 4.0, 4.0);
        assert_abs_diff_eq!(r.center_distance(&moved), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_iou_batch_shape() {
        let a = [Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(50.0, 50.0, 10.0, 10.0)];
        let b = [Rect::new(0.0, 0.0, 10.0, 10.0)];
        let ious = iou_batch(&a, &b);
        assert_eq!(ious.dim(), (2, 1));
        assert_eq!(ious[[0, 0]], 1.0);
        assert_eq!(ious[[1, 0]], 0.0);
    }
}
