use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Vehicle category assigned by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassId {
    Car,
    Motorcycle,
    Truck,
    Other,
}

impl ClassId {
    /// All categories in reporting order.
    pub const ALL: [ClassId; 4] = [
        ClassId::Car,
        ClassId::Motorcycle,
        ClassId::Truck,
        ClassId::Other,
    ];

    /// Map a COCO class index (as produced by YOLO-family detectors) to a category.
    pub fn from_coco(index: usize) -> Self {
        match index {
            2 => ClassId::Car,
            3 => ClassId::Motorcycle,
            7 => ClassId::Truck,
            _ => ClassId::Other,
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClassId::Car => "car",
            ClassId::Motorcycle => "motorcycle",
            ClassId::Truck => "truck",
            ClassId::Other => "other",
        };
        f.write_str(name)
    }
}

/// Per-category counter table. Serialises as a `{category: count}` map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    counts: [u64; 4],
}

impl CategoryCounts {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, class_id: ClassId) -> u64 {
        self.counts[class_id.index()]
    }

    #[inline]
    pub fn increment(&mut self, class_id: ClassId) {
        self.counts[class_id.index()] += 1;
    }

    /// Sum over all categories.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Iterate `(category, count)` pairs in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (ClassId, u64)> + '_ {
        ClassId::ALL.iter().map(|&c| (c, self.get(c)))
    }
}

impl Serialize for CategoryCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_coco() {
        assert_eq!(ClassId::from_coco(2), ClassId::Car);
        assert_eq!(ClassId::from_coco(3), ClassId::Motorcycle);
        assert_eq!(ClassId::from_coco(7), ClassId::Truck);
        assert_eq!(ClassId::from_coco(0), ClassId::Other);
        assert_eq!(ClassId::from_coco(5), ClassId::Other);
    }

    #[test]
    fn test_counts() {
        let mut counts = CategoryCounts::new();
        counts.increment(ClassId::Car);
        counts.increment(ClassId::Car);
        counts.increment(ClassId::Truck);

        assert_eq!(counts.get(ClassId::Car), 2);
        assert_eq!(counts.get(ClassId::Motorcycle), 0);
        assert_eq!(counts.total(), 3);

        let pairs: Vec<_> = counts.iter().collect();
        assert_eq!(pairs[0], (ClassId::Car, 2));
        assert_eq!(pairs[2], (ClassId::Truck, 1));
    }

    #[test]
    fn test_counts_serialise_as_map() {
        let mut counts = CategoryCounts::new();
        counts.increment(ClassId::Car);
        counts.increment(ClassId::Car);
        counts.increment(ClassId::Truck);

        let value = serde_json::to_value(counts).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "car": 2, "motorcycle": 0, "truck": 1, "other": 0 })
        );
    }
}
