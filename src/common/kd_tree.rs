//! This module provides a thin wrapper around a kiddo k-d tree which indexes a
//! slice of points and answers radius queries by index.  The wrapper is the
//! only spatial capability the elimination engine relies on: enumerate the
//! `(id, squared distance)` pairs of every indexed point within a radius of a
//! query point.  Anything with that contract could stand in for it.

use kiddo::SquaredEuclidean;
use parry3d_f64::na::Point;

/// A k-d tree over a slice of D-dimensional points, addressed by the index each
/// point had in the slice it was built from.  The query point itself is
/// reported by radius queries when it is indexed (at squared distance zero);
/// callers that need to exclude it should filter by id.
pub struct KdTree<const D: usize> {
    tree: kiddo::KdTree<f64, D>,
    len: usize,
}

impl<const D: usize> KdTree<D> {
    /// Build a tree over the given points.  Ids handed back by queries are
    /// indices into this slice.  An empty slice is allowed and produces a tree
    /// that answers every query with no results.
    pub fn new(points: &[Point<f64, D>]) -> Self {
        let mut tree = kiddo::KdTree::with_capacity(points.len());
        for (i, p) in points.iter().enumerate() {
            tree.add(&to_coords(p), i as u64);
        }
        Self {
            tree,
            len: points.len(),
        }
    }

    /// The number of indexed points.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Find all indexed points within `radius` of `center`, returning their
    /// `(id, squared distance)` pairs.  Visitation order carries no meaning,
    /// but it is deterministic for a tree built from the same input.
    ///
    /// # Arguments
    ///
    /// * `center`: the query point
    /// * `radius`: the search radius, in the same units as the points
    ///
    /// returns: Vec<(usize, f64)>
    pub fn within(&self, center: &Point<f64, D>, radius: f64) -> Vec<(usize, f64)> {
        if self.len == 0 {
            return Vec::new();
        }
        self.tree
            .within_unsorted::<SquaredEuclidean>(&to_coords(center), radius * radius)
            .into_iter()
            .map(|n| (n.item as usize, n.distance))
            .collect()
    }
}

fn to_coords<const D: usize>(p: &Point<f64, D>) -> [f64; D] {
    std::array::from_fn(|i| p[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point2;

    fn unit_square_corners() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
        ]
    }

    #[test]
    fn within_returns_squared_distances() {
        let tree = KdTree::new(&unit_square_corners());
        let mut found = tree.within(&Point2::new(0.0, 0.0), 1.1);
        found.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

        // The query point itself, then the two adjacent corners.  The opposite
        // corner is at squared distance 2 and stays outside the radius.
        assert_eq!(found.len(), 3);
        assert_eq!(found[0], (0, 0.0));
        assert_eq!(found[1].1, 1.0);
        assert_eq!(found[2].1, 1.0);
    }

    #[test]
    fn within_radius_is_exclusive_of_farther_points() {
        let tree = KdTree::new(&unit_square_corners());
        let found = tree.within(&Point2::new(0.5, 0.5), 0.1);
        assert!(found.is_empty());
    }

    #[test]
    fn empty_tree_answers_with_no_results() {
        let tree = KdTree::<2>::new(&[]);
        assert!(tree.is_empty());
        assert!(tree.within(&Point2::new(0.5, 0.5), 10.0).is_empty());
    }
}
