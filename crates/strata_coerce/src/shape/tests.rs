use super::*;
use pretty_assertions::assert_eq;

/// Walk `[[a, b], [c, d]]`: two sequences of two leaves.
#[test]
fn test_rectangular_nesting() {
    let mut tracker = ShapeTracker::new(MAX_DIMS);
    assert!(tracker.update(0, &[2], true));
    for _ in 0..2 {
        assert!(tracker.update(1, &[2], true));
        assert!(tracker.update(2, &[], false));
        assert!(tracker.update(2, &[], false));
    }
    assert_eq!(tracker.max_ndim(), 2);
    assert_eq!(tracker.shape(2), Shape::new(&[2, 2]));
}

/// `[[1, 2], [3]]`: the second row disagrees on its length.
#[test]
fn test_shorter_sibling_is_ragged() {
    let mut tracker = ShapeTracker::new(MAX_DIMS);
    assert!(tracker.update(0, &[2], true));
    assert!(tracker.update(1, &[2], true));
    assert!(tracker.update(2, &[], false));
    assert!(tracker.update(2, &[], false));
    assert!(!tracker.update(1, &[1], true));
    assert_eq!(tracker.max_ndim(), 1);
    assert_eq!(tracker.shape(1), Shape::new(&[2]));
}

/// `[[1, 2], 3]`: a leaf where a dimension was already fixed.
#[test]
fn test_leaf_above_fixed_dimension_is_ragged() {
    let mut tracker = ShapeTracker::new(MAX_DIMS);
    assert!(tracker.update(0, &[2], true));
    assert!(tracker.update(1, &[2], true));
    assert!(tracker.update(2, &[], false));
    assert!(tracker.update(2, &[], false));
    assert!(!tracker.update(1, &[], false));
    assert_eq!(tracker.max_ndim(), 1);
}

/// `[1, [2, 3]]`: the leaf fixes the rank before the deeper sibling.
#[test]
fn test_deeper_sibling_after_leaf_is_ragged() {
    let mut tracker = ShapeTracker::new(MAX_DIMS);
    assert!(tracker.update(0, &[2], true));
    assert!(tracker.update(1, &[], false));
    assert_eq!(tracker.max_ndim(), 1);
    assert!(!tracker.update(1, &[2], true));
    assert_eq!(tracker.max_ndim(), 1);
}

#[test]
fn test_array_likes_contribute_their_whole_shape() {
    let mut tracker = ShapeTracker::new(MAX_DIMS);
    assert!(tracker.update(0, &[2], true));
    assert!(tracker.update(1, &[3, 4], false));
    assert!(tracker.update(1, &[3, 4], false));
    assert_eq!(tracker.shape(tracker.max_ndim()), Shape::new(&[2, 3, 4]));

    assert!(!tracker.update(1, &[3, 5], false));
    assert_eq!(tracker.max_ndim(), 2);
}

#[test]
fn test_depth_limit() {
    let mut tracker = ShapeTracker::new(1);
    assert!(tracker.update(0, &[2], true));
    assert!(!tracker.update(0, &[2, 2], false));
    assert_eq!(tracker.max_ndim(), 1);
}

#[test]
fn test_empty_sequence_closes_the_rank() {
    let mut tracker = ShapeTracker::new(MAX_DIMS);
    assert!(tracker.update(0, &[0], true));
    tracker.close_at(1);
    assert_eq!(tracker.shape(tracker.max_ndim()), Shape::new(&[0]));
}
