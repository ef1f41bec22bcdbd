//! The point set the spatial index is actually built over.  Without tiling it
//! is a straight copy of the caller's input; with tiling it additionally holds
//! a translated replica of every point that sits within the weight radius of a
//! domain face, so that points near one edge are weighed against their wrapped
//! neighbors from the opposite edge.  Replicas map back to the input index
//! they were copied from and never appear in any output.

use parry3d_f64::na::Point;

pub struct CandidateSet<const D: usize> {
    points: Vec<Point<f64, D>>,
    source: Vec<usize>,
    input_len: usize,
}

impl<const D: usize> CandidateSet<D> {
    /// A candidate set that indexes exactly the input points.
    pub fn untiled(input: &[Point<f64, D>]) -> Self {
        Self {
            points: input.to_vec(),
            source: (0..input.len()).collect(),
            input_len: input.len(),
        }
    }

    /// A candidate set augmented with boundary replicas: every input point
    /// within `d_max` of a face of the `[bounds_min, bounds_max]` box gets a
    /// copy translated by the domain's full extent on that axis, recursively
    /// across the remaining axes so corner points replicate diagonally too.
    pub fn tiled(
        input: &[Point<f64, D>],
        bounds_min: &Point<f64, D>,
        bounds_max: &Point<f64, D>,
        d_max: f64,
    ) -> Self {
        let mut set = Self::untiled(input);
        for (i, p) in input.iter().enumerate() {
            set.reflect(i, *p, bounds_min, bounds_max, d_max, 0);
        }
        set
    }

    fn reflect(
        &mut self,
        id: usize,
        point: Point<f64, D>,
        bounds_min: &Point<f64, D>,
        bounds_max: &Point<f64, D>,
        d_max: f64,
        first_axis: usize,
    ) {
        for d in first_axis..D {
            let extent = bounds_max[d] - bounds_min[d];
            if bounds_max[d] - point[d] < d_max {
                let mut p = point;
                p[d] -= extent;
                self.points.push(p);
                self.source.push(id);
                self.reflect(id, p, bounds_min, bounds_max, d_max, d + 1);
            }
            if point[d] - bounds_min[d] < d_max {
                let mut p = point;
                p[d] += extent;
                self.points.push(p);
                self.source.push(id);
                self.reflect(id, p, bounds_min, bounds_max, d_max, d + 1);
            }
        }
    }

    /// All candidate positions, input points first, replicas after.
    pub fn points(&self) -> &[Point<f64, D>] {
        &self.points
    }

    pub fn point(&self, candidate: usize) -> &Point<f64, D> {
        &self.points[candidate]
    }

    /// The input index a candidate stands for: itself for an input point, the
    /// replicated point's index for a replica.
    pub fn source(&self, candidate: usize) -> usize {
        self.source[candidate]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// How many of the candidates are boundary replicas.
    pub fn replica_count(&self) -> usize {
        self.points.len() - self.input_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point2;
    use approx::assert_relative_eq;

    fn unit_bounds() -> (Point2, Point2) {
        (Point2::new(0.0, 0.0), Point2::new(1.0, 1.0))
    }

    #[test]
    fn interior_points_are_not_replicated() {
        let (lo, hi) = unit_bounds();
        let input = vec![Point2::new(0.5, 0.5), Point2::new(0.4, 0.6)];
        let set = CandidateSet::tiled(&input, &lo, &hi, 0.1);
        assert_eq!(set.len(), 2);
        assert_eq!(set.replica_count(), 0);
    }

    #[test]
    fn edge_point_gets_one_wrapped_replica() {
        let (lo, hi) = unit_bounds();
        let input = vec![Point2::new(0.05, 0.5)];
        let set = CandidateSet::tiled(&input, &lo, &hi, 0.1);

        assert_eq!(set.replica_count(), 1);
        assert_eq!(set.source(1), 0);
        assert_relative_eq!(set.point(1).x, 1.05, epsilon = 1e-12);
        assert_relative_eq!(set.point(1).y, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn corner_point_replicates_diagonally() {
        let (lo, hi) = unit_bounds();
        let input = vec![Point2::new(0.05, 0.95)];
        let set = CandidateSet::tiled(&input, &lo, &hi, 0.1);

        // One replica across each near face plus the diagonal corner copy.
        assert_eq!(set.replica_count(), 3);
        let mut coords: Vec<(i32, i32)> = (1..set.len())
            .map(|i| {
                let p = set.point(i);
                (p.x.round() as i32, p.y.round() as i32)
            })
            .collect();
        coords.sort_unstable();
        assert_eq!(coords, vec![(0, 0), (1, 0), (1, 1)]);
        assert!((1..set.len()).all(|i| set.source(i) == 0));
    }

    #[test]
    fn untiled_maps_every_candidate_to_itself() {
        let input = vec![Point2::new(0.1, 0.1), Point2::new(0.9, 0.9)];
        let set = CandidateSet::untiled(&input);
        assert_eq!(set.len(), 2);
        assert_eq!(set.replica_count(), 0);
        assert!((0..set.len()).all(|i| set.source(i) == i));
    }
}
