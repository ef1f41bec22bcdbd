//! Weighted sample elimination.  The engine assigns every candidate point a
//! weight measuring how crowded it is by its neighbors within a radius `d_max`,
//! then repeatedly removes the most crowded point, subtracting its share from
//! each neighbor's weight as it goes.  Stopping at a requested count yields a
//! fixed-size blue noise subset; running until the top weight reaches zero
//! yields "as many mutually separated points as fit".
//!
//! The supporting pieces stand on their own: the k-d tree answers radius
//! queries,
//! the [`IndexedMaxHeap`] provides pop-max and decrease-key over the weight
//! table, the [`WeightFunction`] computes pairwise contributions, and the
//! [`CandidateSet`] handles boundary tiling.  [`SampleElimination`] wires them
//! together and carries the tuning parameters.

mod candidates;
mod heap;
mod weight;

pub use candidates::CandidateSet;
pub use heap::IndexedMaxHeap;
pub use weight::{
    PowerLawWeight, WeightFn, WeightFunction, max_poisson_disk_radius,
    progressive_radius_multiplier, weight_limit_fraction,
};

use crate::Result;
use crate::common::kd_tree::KdTree;
use itertools::{Itertools, MinMaxResult};
use parry3d_f64::na::Point;
use serde::{Deserialize, Serialize};

/// The exhaustive variant treats any top weight at or below this as zero, so
/// accumulated floating point residue does not keep the loop alive after every
/// real conflict is resolved.
const EXHAUSTION_EPSILON: f64 = 0.5e-5;

/// How an elimination pass decides it is finished.
#[derive(Clone, Copy)]
enum Stop {
    /// Run until exactly this many candidates remain.
    Count(usize),

    /// Run until the most crowded candidate has (effectively) zero weight, but
    /// never eliminate the final candidate.
    Exhausted,
}

/// Configuration and entry points for weighted sample elimination over
/// D-dimensional points.
///
/// The domain bounds are used for boundary tiling and for computing the
/// default weight radius; they default to the unit box.  `alpha`, `beta` and
/// `gamma` tune the default weight function and its limiting; both switches
/// default the way the method is normally run (limiting on, tiling off).
///
/// A single instance is immutable during a call and holds no per-call state,
/// so one configuration can serve any number of invocations, including
/// concurrent ones from different threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleElimination<const D: usize> {
    /// Minimum corner of the sampling domain.
    pub bounds_min: Point<f64, D>,

    /// Maximum corner of the sampling domain.
    pub bounds_max: Point<f64, D>,

    /// Falloff exponent of the default weight function.
    pub alpha: f64,

    /// Strength of weight limiting in the default weight function.  Zero
    /// effectively disables limiting.
    pub beta: f64,

    /// Sensitivity of weight limiting to the output/input ratio.
    pub gamma: f64,

    /// Whether the default weight function clamps small distances.  Limiting
    /// keeps near-coincident pairs from dominating every elimination decision
    /// and typically sharpens the blue noise characteristics of the result.
    pub weight_limiting: bool,

    /// Whether the domain wraps at its boundaries.  When on, points within
    /// `d_max` of a face are weighed against replicas of their neighbors from
    /// the opposite face, so the output tiles seamlessly.
    pub tiling: bool,
}

impl<const D: usize> Default for SampleElimination<D> {
    fn default() -> Self {
        Self {
            bounds_min: Point::origin(),
            bounds_max: Point::from([1.0; D]),
            alpha: 8.0,
            beta: 0.65,
            gamma: 1.5,
            weight_limiting: true,
            tiling: false,
        }
    }
}

impl<const D: usize> SampleElimination<D> {
    /// Default parameters over the given domain bounds.
    pub fn bounded(bounds_min: Point<f64, D>, bounds_max: Point<f64, D>) -> Self {
        Self {
            bounds_min,
            bounds_max,
            ..Self::default()
        }
    }

    /// Default parameters over the axis-aligned bounding box of the given
    /// points.  Fails on an empty slice, which has no extent on any axis.
    pub fn from_domain_of(points: &[Point<f64, D>]) -> Result<Self> {
        if points.is_empty() {
            return Err("Cannot derive a sampling domain from an empty point set".into());
        }
        let mut lo = Point::origin();
        let mut hi = Point::origin();
        for d in 0..D {
            match points
                .iter()
                .map(|p| p[d])
                .minmax_by(|a, b| a.partial_cmp(b).unwrap())
            {
                MinMaxResult::MinMax(min, max) => {
                    lo[d] = min;
                    hi[d] = max;
                }
                MinMaxResult::OneElement(v) => {
                    lo[d] = v;
                    hi[d] = v;
                }
                MinMaxResult::NoElements => {}
            }
        }
        Ok(Self::bounded(lo, hi))
    }

    /// Select a blue noise subset of `output_size` points from `points` using
    /// the default weight function.
    ///
    /// When `progressive` is true the returned points are additionally ordered
    /// so that every prefix of the sequence is itself a well-separated set,
    /// with earlier prefixes separated at proportionally larger radii.
    ///
    /// A `d_max` of zero (or less) asks for the radius to be derived from the
    /// domain volume and the output count: twice the maximum packing radius
    /// for `output_size` disks.  `dimensions` is normally `D`, but a smaller
    /// value can be given when the points sample a lower-dimensional manifold,
    /// such as a surface embedded in 3D.
    ///
    /// # Arguments
    ///
    /// * `points`: the dense candidate set; it is only read, never modified
    /// * `output_size`: how many points to keep; must be nonzero and smaller
    ///   than the input size
    /// * `progressive`: whether to order the output for progressive use
    /// * `d_max`: the weight radius, or zero to derive it
    /// * `dimensions`: the dimensionality of the sampling domain, at least 2
    ///   and at most `D`
    ///
    /// returns: Result<Vec<Point<f64, D>>>
    ///
    /// # Examples
    ///
    /// ```
    /// use bluenoise::{Point2, SampleElimination2};
    ///
    /// let points = vec![
    ///     Point2::new(0.1, 0.1),
    ///     Point2::new(0.12, 0.1),
    ///     Point2::new(0.5, 0.5),
    ///     Point2::new(0.88, 0.9),
    ///     Point2::new(0.9, 0.9),
    /// ];
    /// let engine = SampleElimination2::default();
    /// let kept = engine.eliminate(&points, 2, false, 0.0, 2).unwrap();
    /// assert_eq!(kept.len(), 2);
    /// ```
    pub fn eliminate(
        &self,
        points: &[Point<f64, D>],
        output_size: usize,
        progressive: bool,
        d_max: f64,
        dimensions: usize,
    ) -> Result<Vec<Point<f64, D>>> {
        let selected = self.eliminate_indices(points, output_size, progressive, d_max, dimensions)?;
        Ok(selected.into_iter().map(|i| points[i]).collect())
    }

    /// As [`SampleElimination::eliminate`], but returning the indices of the
    /// selected points in the input slice instead of copies of the points.
    pub fn eliminate_indices(
        &self,
        points: &[Point<f64, D>],
        output_size: usize,
        progressive: bool,
        d_max: f64,
        dimensions: usize,
    ) -> Result<Vec<usize>> {
        if points.is_empty() {
            return Ok(Vec::new());
        }
        self.check_request(points.len(), Some(output_size), dimensions)?;
        let d_max = self.resolve_d_max(d_max, dimensions, output_size);
        let weight_fn = self.default_weight(points.len(), output_size, d_max);
        self.eliminate_indices_with(points, output_size, progressive, d_max, dimensions, &weight_fn)
    }

    /// As [`SampleElimination::eliminate`], but with a caller-supplied weight
    /// function.  The function must be symmetric in its two points and return
    /// zero at distances of `d_max` and beyond; the engine is otherwise
    /// agnostic to its form.
    pub fn eliminate_with<W: WeightFunction<D>>(
        &self,
        points: &[Point<f64, D>],
        output_size: usize,
        progressive: bool,
        d_max: f64,
        dimensions: usize,
        weight_fn: &W,
    ) -> Result<Vec<Point<f64, D>>> {
        let selected = self.eliminate_indices_with(
            points,
            output_size,
            progressive,
            d_max,
            dimensions,
            weight_fn,
        )?;
        Ok(selected.into_iter().map(|i| points[i]).collect())
    }

    /// The index-returning core of the fixed-size variant.
    pub fn eliminate_indices_with<W: WeightFunction<D>>(
        &self,
        points: &[Point<f64, D>],
        output_size: usize,
        progressive: bool,
        d_max: f64,
        dimensions: usize,
        weight_fn: &W,
    ) -> Result<Vec<usize>> {
        if points.is_empty() {
            return Ok(Vec::new());
        }
        self.check_request(points.len(), Some(output_size), dimensions)?;
        let d_max = self.resolve_d_max(d_max, dimensions, output_size);

        let (order, _) = self.eliminate_pass(points, d_max, weight_fn, Stop::Count(output_size));
        let mut selected = order[..output_size].to_vec();
        if progressive {
            self.order_progressively(points, &mut selected, d_max, dimensions, weight_fn);
        }
        Ok(selected)
    }

    /// Eliminate until the most crowded remaining point has zero weight, i.e.
    /// keep as many mutually separated points as fit, using the default weight
    /// function.  The survivor count is not known in advance; it is the length
    /// of the returned vector.  At least one point always survives, even when
    /// every candidate conflicts with every other.
    ///
    /// # Arguments
    ///
    /// * `points`: the dense candidate set
    /// * `progressive`: whether to order the survivors for progressive use
    /// * `d_max`: the weight radius, or zero to derive it from the domain
    ///   volume and the input count
    /// * `dimensions`: the dimensionality of the sampling domain
    ///
    /// returns: Result<Vec<Point<f64, D>>>
    pub fn eliminate_all(
        &self,
        points: &[Point<f64, D>],
        progressive: bool,
        d_max: f64,
        dimensions: usize,
    ) -> Result<Vec<Point<f64, D>>> {
        let selected = self.eliminate_all_indices(points, progressive, d_max, dimensions)?;
        Ok(selected.into_iter().map(|i| points[i]).collect())
    }

    /// As [`SampleElimination::eliminate_all`], but returning the surviving
    /// indices in the input slice.
    pub fn eliminate_all_indices(
        &self,
        points: &[Point<f64, D>],
        progressive: bool,
        d_max: f64,
        dimensions: usize,
    ) -> Result<Vec<usize>> {
        if points.is_empty() {
            return Ok(Vec::new());
        }
        self.check_request(points.len(), None, dimensions)?;
        let d_max = self.resolve_d_max(d_max, dimensions, points.len());
        let weight_fn = self.default_weight(points.len(), points.len(), d_max);
        self.eliminate_all_indices_with(points, progressive, d_max, dimensions, &weight_fn)
    }

    /// As [`SampleElimination::eliminate_all`], with a caller-supplied weight
    /// function.
    pub fn eliminate_all_with<W: WeightFunction<D>>(
        &self,
        points: &[Point<f64, D>],
        progressive: bool,
        d_max: f64,
        dimensions: usize,
        weight_fn: &W,
    ) -> Result<Vec<Point<f64, D>>> {
        let selected =
            self.eliminate_all_indices_with(points, progressive, d_max, dimensions, weight_fn)?;
        Ok(selected.into_iter().map(|i| points[i]).collect())
    }

    /// The index-returning core of the exhaustive variant.
    pub fn eliminate_all_indices_with<W: WeightFunction<D>>(
        &self,
        points: &[Point<f64, D>],
        progressive: bool,
        d_max: f64,
        dimensions: usize,
        weight_fn: &W,
    ) -> Result<Vec<usize>> {
        if points.is_empty() {
            return Ok(Vec::new());
        }
        self.check_request(points.len(), None, dimensions)?;
        let d_max = self.resolve_d_max(d_max, dimensions, points.len());

        let (order, survivors) = self.eliminate_pass(points, d_max, weight_fn, Stop::Exhausted);
        let mut selected = order[..survivors].to_vec();
        if progressive {
            self.order_progressively(points, &mut selected, d_max, dimensions, weight_fn);
        }
        Ok(selected)
    }

    /// The largest radius at which `sample_count` non-overlapping disks can be
    /// packed into the domain.  A non-positive `domain_size` means "use the
    /// volume of this configuration's bounds".  The default weight radius is
    /// twice this value.
    pub fn max_poisson_disk_radius(
        &self,
        dimensions: usize,
        sample_count: usize,
        domain_size: f64,
    ) -> f64 {
        let size = if domain_size > 0.0 {
            domain_size
        } else {
            self.domain_size()
        };
        weight::max_poisson_disk_radius(dimensions, sample_count, size)
    }

    /// The minimum-distance fraction the default weight function uses for the
    /// given input and output sizes, per this configuration's `beta` and
    /// `gamma`.
    pub fn weight_limit_fraction(&self, input_size: usize, output_size: usize) -> f64 {
        weight::weight_limit_fraction(input_size, output_size, self.beta, self.gamma)
    }

    fn domain_size(&self) -> f64 {
        (0..D)
            .map(|d| self.bounds_max[d] - self.bounds_min[d])
            .product()
    }

    fn resolve_d_max(&self, d_max: f64, dimensions: usize, sample_count: usize) -> f64 {
        if d_max > 0.0 {
            d_max
        } else {
            2.0 * self.max_poisson_disk_radius(dimensions, sample_count, 0.0)
        }
    }

    fn default_weight(&self, input_size: usize, output_size: usize, d_max: f64) -> PowerLawWeight {
        let d_min = if self.weight_limiting {
            d_max * self.weight_limit_fraction(input_size, output_size)
        } else {
            0.0
        };
        PowerLawWeight::new(self.alpha, d_min)
    }

    fn check_request(
        &self,
        input_size: usize,
        output_size: Option<usize>,
        dimensions: usize,
    ) -> Result<()> {
        if dimensions < 2 || dimensions > D {
            return Err(format!("Dimensions must be between 2 and {}, got {}", D, dimensions).into());
        }
        if let Some(output_size) = output_size {
            if output_size == 0 {
                return Err("Output size must be greater than zero".into());
            }
            if output_size >= input_size {
                return Err("Output size must be smaller than the number of input points".into());
            }
        }
        Ok(())
    }

    /// One full elimination pass: build the candidate set (with boundary
    /// replicas when tiling), index it, accumulate the initial weights, then
    /// pop-and-subtract until the stop rule says done.  Returns the heap order
    /// (survivors first, then the eliminated in reverse order of removal) and
    /// the survivor count.
    fn eliminate_pass<W: WeightFunction<D>>(
        &self,
        points: &[Point<f64, D>],
        d_max: f64,
        weight_fn: &W,
        stop: Stop,
    ) -> (Vec<usize>, usize) {
        let candidates = if self.tiling {
            CandidateSet::tiled(points, &self.bounds_min, &self.bounds_max, d_max)
        } else {
            CandidateSet::untiled(points)
        };
        let tree = KdTree::new(candidates.points());

        // Each input point's weight is the sum of contributions from every
        // candidate within the radius, replicas included, excluding the point
        // itself by source id.
        let mut weights = vec![0.0; points.len()];
        for (i, p) in points.iter().enumerate() {
            for (candidate, d2) in tree.within(p, d_max) {
                if candidates.source(candidate) != i {
                    weights[i] += weight_fn.weight(p, candidates.point(candidate), d2, d_max);
                }
            }
        }

        let mut heap = IndexedMaxHeap::build(weights);
        loop {
            let finished = match stop {
                Stop::Count(target) => heap.active_len() <= target,
                Stop::Exhausted => {
                    heap.active_len() <= 1 || heap.top_weight() <= EXHAUSTION_EPSILON
                }
            };
            if finished {
                break;
            }

            let removed = heap.pop();
            let center = points[removed];
            for (candidate, d2) in tree.within(&center, d_max) {
                let neighbor = candidates.source(candidate);
                if neighbor != removed {
                    let contribution =
                        weight_fn.weight(&center, candidates.point(candidate), d2, d_max);
                    heap.decrease(neighbor, contribution);
                }
            }
        }

        let survivors = heap.active_len();
        let order = (0..heap.len()).map(|rank| heap.id_at_rank(rank)).collect();
        (order, survivors)
    }

    /// Reorder an already-selected subset for progressive use by repeatedly
    /// eliminating it down to half, each time with the radius grown to match
    /// the halved density.  Each round's eliminated points stay behind the
    /// kept ones in reverse removal order, so the tail of the sequence fills
    /// in detail and any prefix stands alone as a well-separated set.
    fn order_progressively<W: WeightFunction<D>>(
        &self,
        points: &[Point<f64, D>],
        selected: &mut [usize],
        mut d_max: f64,
        dimensions: usize,
        weight_fn: &W,
    ) {
        let mut remaining = selected.len();
        while remaining >= 3 {
            let keep = remaining / 2;
            d_max *= progressive_radius_multiplier(dimensions);

            let subset: Vec<Point<f64, D>> =
                selected[..remaining].iter().map(|&i| points[i]).collect();
            let (order, _) = self.eliminate_pass(&subset, d_max, weight_fn, Stop::Count(keep));

            let reordered: Vec<usize> = order.iter().map(|&k| selected[k]).collect();
            selected[..remaining].copy_from_slice(&reordered);
            remaining = keep;
        }
    }
}

impl SampleElimination<2> {
    /// Default parameters over the given 2D bounding box.
    pub fn from_aabb(aabb: &crate::Aabb2) -> Self {
        Self::bounded(aabb.mins, aabb.maxs)
    }
}

impl SampleElimination<3> {
    /// Default parameters over the given 3D bounding box.
    pub fn from_aabb(aabb: &crate::Aabb3) -> Self {
        Self::bounded(aabb.mins, aabb.maxs)
    }
}
