//! Matching utilities for multi-object tracking.

use log::warn;
use ndarray::Array2;

use crate::tracker::class_id::ClassId;
use crate::tracker::rect::Rect;

/// Cost assigned to pairs that must never be matched.
const FORBIDDEN_COST: f64 = 1e6;

/// Detection input for the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Bounding box in TLWH format, relative to the processed region
    pub bbox: Rect,
    pub class_id: ClassId,
    /// Detector confidence in 0.0–1.0
    pub confidence: f32,
}

impl Detection {
    pub fn new(x: f32, y: f32, width: f32, height: f32, class_id: ClassId, confidence: f32) -> Self {
        Self {
            bbox: Rect::new(x, y, width, height),
            class_id,
            confidence,
        }
    }

    pub fn from_rect(bbox: Rect, class_id: ClassId, confidence: f32) -> Self {
        Self {
            bbox,
            class_id,
            confidence,
        }
    }
}

/// Compute IoU distance matrix between tracks and detections.
pub fn iou_distance(track_boxes: &[Rect], det_boxes: &[Rect]) -> Array2<f32> {
    Array2::from_shape_fn((track_boxes.len(), det_boxes.len()), |(i, j)| {
        1.0 - track_boxes[i].iou(&det_boxes[j])
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

impl AssignmentResult {
    fn all_unmatched(num_rows: usize, num_cols: usize) -> Self {
        Self {
            matches: vec![],
            unmatched_tracks: (0..num_rows).collect(),
            unmatched_detections: (0..num_cols).collect(),
        }
    }

    /// Build the result from a row-to-column assignment, rejecting pairs
    /// whose cost exceeds `thresh`.
    fn from_assignment(
        cost_matrix: &Array2<f32>,
        row_to_col: impl IntoIterator<Item = (usize, usize)>,
        thresh: f32,
    ) -> Self {
        let (num_rows, num_cols) = cost_matrix.dim();
        let mut track_matched = vec![false; num_rows];
        let mut det_matched = vec![false; num_cols];
        let mut matches = vec![];

        for (row, col) in row_to_col {
            if row < num_rows && col < num_cols && cost_matrix[[row, col]] <= thresh {
                matches.push((row, col));
                track_matched[row] = true;
                det_matched[col] = true;
            }
        }
        matches.sort_unstable();

        Self {
            matches,
            unmatched_tracks: (0..num_rows).filter(|&i| !track_matched[i]).collect(),
            unmatched_detections: (0..num_cols).filter(|&j| !det_matched[j]).collect(),
        }
    }
}

/// Minimum-cost assignment over `cost_matrix` using the Jonker-Volgenant
/// solver. Pairs with cost above `thresh` are forbidden and never returned.
pub fn linear_assignment(cost_matrix: &Array2<f32>, thresh: f32) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();
    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult::all_unmatched(num_rows, num_cols);
    }

    let size = num_rows.max(num_cols);
    let mut padded = Array2::<f64>::from_elem((size, size), FORBIDDEN_COST);
    for ((i, j), &cost) in cost_matrix.indexed_iter() {
        if cost <= thresh {
            padded[[i, j]] = cost as f64;
        }
    }

    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => AssignmentResult::from_assignment(
            cost_matrix,
            row_to_col.into_iter().enumerate(),
            thresh,
        ),
        Err(err) => {
            warn!("assignment solver failed on {num_rows}x{num_cols} costs: {err:?}");
            AssignmentResult::all_unmatched(num_rows, num_cols)
        }
    }
}

/// Best-first greedy assignment. Ties resolve by row then column.
pub fn greedy_assignment(cost_matrix: &Array2<f32>, thresh: f32) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();
    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult::all_unmatched(num_rows, num_cols);
    }

    let mut candidates: Vec<(f32, usize, usize)> = cost_matrix
        .indexed_iter()
        .filter(|&(_, &cost)| cost <= thresh)
        .map(|((i, j), &cost)| (cost, i, j))
        .collect();
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    let mut row_used = vec![false; num_rows];
    let mut col_used = vec![false; num_cols];
    let mut pairs = vec![];
    for (_, i, j) in candidates {
        if !row_used[i] && !col_used[j] {
            row_used[i] = true;
            col_used[j] = true;
            pairs.push((i, j));
        }
    }

    AssignmentResult::from_assignment(cost_matrix, pairs, thresh)
}

/// Associate predicted track boxes with detection boxes.
///
/// Cost is `1 - IoU`; pairs with IoU below `match_threshold` never match.
/// Small track sets (at most `greedy_max_tracks`) use greedy assignment,
/// everything else the optimal solver.
pub fn associate(
    predicted: &[Rect],
    detections: &[Rect],
    match_threshold: f32,
    greedy_max_tracks: usize,
) -> AssignmentResult {
    if predicted.is_empty() || detections.is_empty() {
        return AssignmentResult::all_unmatched(predicted.len(), detections.len());
    }

    let dists = iou_distance(predicted, detections);
    let max_cost = 1.0 - match_threshold;

    if predicted.len() <= greedy_max_tracks {
        greedy_assignment(&dists, max_cost)
    } else {
        linear_assignment(&dists, max_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_empty_inputs_short_circuit() {
        let boxes = [Rect::new(0.0, 0.0, 10.0, 10.0)];

        let result = associate(&[], &boxes, 0.3, 0);
        assert!(result.matches.is_empty());
        assert_eq!(result.unmatched_detections, vec![0]);

        let result = associate(&boxes, &[], 0.3, 0);
        assert_eq!(result.unmatched_tracks, vec![0]);
        assert!(result.unmatched_detections.is_empty());
    }

    #[test]
    fn test_optimal_beats_greedy() {
        // Greedy grabs (0, 0) at 0.1 and is left with (1, 1) at 0.9: total 1.0.
        // The optimal pairing (0, 1) + (1, 0) costs 0.4.
        let costs = array![[0.1f32, 0.2], [0.2, 0.9]];

        let optimal = linear_assignment(&costs, 0.95);
        assert_eq!(optimal.matches, vec![(0, 1), (1, 0)]);

        let greedy = greedy_assignment(&costs, 0.95);
        assert_eq!(greedy.matches, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_threshold_forbids_pairs() {
        let costs = array![[0.2f32, 0.9], [0.95, 0.8]];
        let result = linear_assignment(&costs, 0.7);
        assert_eq!(result.matches, vec![(0, 0)]);
        assert_eq!(result.unmatched_tracks, vec![1]);
        assert_eq!(result.unmatched_detections, vec![1]);
    }

    #[test]
    fn test_rectangular_matrix() {
        let costs = array![[0.5f32, 0.1, 0.6]];
        let result = linear_assignment(&costs, 0.7);
        assert_eq!(result.matches, vec![(0, 1)]);
        assert_eq!(result.unmatched_detections, vec![0, 2]);
    }

    #[test]
    fn test_crossing_objects_keep_lineage() {
        let predicted = [
            Rect::new(100.0, 100.0, 40.0, 40.0),
            Rect::new(120.0, 100.0, 40.0, 40.0),
        ];
        let detections = [
            Rect::new(122.0, 100.0, 40.0, 40.0),
            Rect::new(98.0, 100.0, 40.0, 40.0),
        ];
        let result = associate(&predicted, &detections, 0.3, 1);
        assert_eq!(result.matches, vec![(0, 1), (1, 0)]);
        assert!(result.unmatched_tracks.is_empty());
        assert!(result.unmatched_detections.is_empty());
    }

    #[test]
    fn test_disjoint_boxes_never_match() {
        let predicted = [Rect::new(0.0, 0.0, 10.0, 10.0)];
        let detections = [Rect::new(200.0, 200.0, 10.0, 10.0)];
        for greedy_max_tracks in [0, 1] {
            let result = associate(&predicted, &detections, 0.3, greedy_max_tracks);
            assert!(result.matches.is_empty());
            assert_eq!(result.unmatched_tracks, vec![0]);
            assert_eq!(result.unmatched_detections, vec![0]);
        }
    }
}
