//! The weight function seam of the elimination engine, its default
//! implementation, and the closed-form radius formulas the engine uses to pick
//! a neighborhood size when the caller does not supply one.

use parry3d_f64::na::Point;
use std::f64::consts::PI;

/// The pairwise weight contribution between two candidate points.  The engine
/// calls this for every neighbor pair within `d_max` of each other, first to
/// accumulate each candidate's total weight and later to subtract the removed
/// point's share from its neighbors.
///
/// Implementations must be symmetric in the two points and must return zero
/// whenever the distance is at or beyond `d_max`; otherwise the subtractive
/// bookkeeping would drift from the weights that would be computed fresh.
///
/// A one-off closure of the same shape can be passed through the [`WeightFn`]
/// adapter without defining a named type.
pub trait WeightFunction<const D: usize> {
    /// The weight contribution between `p0` and `p1`, given their squared
    /// distance and the radius beyond which contributions are zero.
    fn weight(&self, p0: &Point<f64, D>, p1: &Point<f64, D>, dist2: f64, d_max: f64) -> f64;
}

/// Adapter that lets a plain closure serve as a [`WeightFunction`].
pub struct WeightFn<F>(pub F);

impl<F, const D: usize> WeightFunction<D> for WeightFn<F>
where
    F: Fn(&Point<f64, D>, &Point<f64, D>, f64, f64) -> f64,
{
    fn weight(&self, p0: &Point<f64, D>, p1: &Point<f64, D>, dist2: f64, d_max: f64) -> f64 {
        (self.0)(p0, p1, dist2, d_max)
    }
}

/// The default weight function: `(1 - d/d_max)^alpha`, with the distance
/// clamped from below to `d_min`.  The clamp bounds the contribution of
/// near-coincident pairs, which would otherwise dominate every elimination
/// decision; `d_min = 0` disables it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLawWeight {
    /// Falloff exponent; larger values concentrate the weight on the closest
    /// neighbors.
    pub alpha: f64,

    /// Lower clamp applied to the distance before evaluating the falloff.
    pub d_min: f64,
}

impl PowerLawWeight {
    pub fn new(alpha: f64, d_min: f64) -> Self {
        Self { alpha, d_min }
    }
}

impl<const D: usize> WeightFunction<D> for PowerLawWeight {
    fn weight(&self, _p0: &Point<f64, D>, _p1: &Point<f64, D>, dist2: f64, d_max: f64) -> f64 {
        let d = dist2.sqrt();
        if d >= d_max {
            return 0.0;
        }
        let d = d.max(self.d_min);
        (1.0 - d / d_max).powf(self.alpha)
    }
}

/// The fraction of `d_max` below which the default weight function stops
/// distinguishing distances: `(1 - (output/input)^gamma) * beta`.  Shrinks to
/// zero as the output size approaches the input size, where limiting has
/// nothing left to do.
///
/// # Arguments
///
/// * `input_size`: the number of candidate points
/// * `output_size`: the number of points that will survive elimination
/// * `beta`: overall strength of the limit
/// * `gamma`: sensitivity to the input/output ratio
///
/// returns: f64
pub fn weight_limit_fraction(input_size: usize, output_size: usize, beta: f64, gamma: f64) -> f64 {
    let ratio = output_size as f64 / input_size as f64;
    (1.0 - ratio.powf(gamma)) * beta
}

/// The largest radius at which `sample_count` non-overlapping disks (spheres,
/// hyperspheres) can be packed into a domain of the given size, assuming the
/// optimal packing density for the dimension.  Dedicated closed forms cover the
/// hexagonal packing in 2D and the FCC packing in 3D; higher dimensions fall
/// back to dividing the per-sample share of the domain by the volume of the
/// unit d-ball.
///
/// The caller supplies a positive `domain_size` (area, volume, or hypervolume
/// of the sampling domain); `sample_count` must be nonzero.
///
/// # Arguments
///
/// * `dimensions`: the dimensionality of the packing, at least 2
/// * `sample_count`: how many disks are packed into the domain
/// * `domain_size`: the measure of the sampling domain
///
/// returns: f64
pub fn max_poisson_disk_radius(dimensions: usize, sample_count: usize, domain_size: f64) -> f64 {
    let sample_area = domain_size / sample_count as f64;
    match dimensions {
        2 => (sample_area / (2.0 * 3.0_f64.sqrt())).sqrt(),
        3 => (sample_area / (4.0 * 2.0_f64.sqrt())).powf(1.0 / 3.0),
        _ => {
            // Volume of the unit d-ball by the two-step recurrence, seeded at
            // d = 2 (pi) for even dimensions and d = 1 (length 2) for odd.
            let (mut ball, start) = if dimensions % 2 == 0 {
                (PI, 4_usize)
            } else {
                (2.0, 3_usize)
            };
            let mut d = start;
            while d <= dimensions {
                ball *= 2.0 * PI / d as f64;
                d += 2;
            }
            (sample_area / ball).powf(1.0 / dimensions as f64)
        }
    }
}

/// How much the weight radius grows when a sample set is halved during
/// progressive ordering.  Doubling the per-sample share of the domain grows the
/// packing radius by `2^(1/d)`; the 2D case keeps its own closed form.
pub fn progressive_radius_multiplier(dimensions: usize) -> f64 {
    if dimensions == 2 {
        2.0_f64.sqrt()
    } else {
        2.0_f64.powf(1.0 / dimensions as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point2;
    use approx::assert_relative_eq;
    use test_case::test_case;

    #[test]
    fn limit_fraction_at_default_tuning() {
        // beta = 0.65, gamma = 1.5, halving the set
        let f = weight_limit_fraction(100, 50, 0.65, 1.5);
        assert_relative_eq!(f, 0.4201902961143721, epsilon = 1e-12);
    }

    #[test]
    fn limit_fraction_vanishes_when_nothing_is_eliminated() {
        let f = weight_limit_fraction(64, 64, 0.65, 1.5);
        assert_relative_eq!(f, 0.0, epsilon = 1e-12);
    }

    #[test_case(2, 100, 1.0, 0.053728497; "hexagonal packing in 2d")]
    #[test_case(3, 1000, 1.0, 0.056123102; "fcc packing in 3d")]
    #[test_case(4, 100, 1.0, 0.212169; "ball volume fallback in 4d")]
    #[test_case(5, 100, 1.0, 0.285588; "ball volume fallback in 5d")]
    fn packing_radius_closed_forms(dimensions: usize, count: usize, size: f64, expected: f64) {
        let r = max_poisson_disk_radius(dimensions, count, size);
        assert_relative_eq!(r, expected, max_relative = 1e-5);
    }

    #[test]
    fn packing_radius_scales_with_domain_size() {
        // Quadrupling a 2D domain doubles the radius for the same count.
        let r1 = max_poisson_disk_radius(2, 256, 1.0);
        let r4 = max_poisson_disk_radius(2, 256, 4.0);
        assert_relative_eq!(r4, 2.0 * r1, epsilon = 1e-12);
    }

    #[test]
    fn power_law_weight_shape() {
        let a = Point2::origin();
        let b = Point2::new(0.5, 0.0);
        let w = PowerLawWeight::new(8.0, 0.0);

        // Coincident points give the full weight, the radius edge gives zero.
        assert_relative_eq!(w.weight(&a, &a, 0.0, 1.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(w.weight(&a, &b, 1.0, 1.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(w.weight(&a, &b, 4.0, 1.0), 0.0, epsilon = 1e-12);

        let linear = PowerLawWeight::new(1.0, 0.0);
        assert_relative_eq!(linear.weight(&a, &b, 0.25, 1.0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn distance_clamp_bounds_close_pairs() {
        let a = Point2::origin();
        let b = Point2::new(0.001, 0.0);
        let limited = PowerLawWeight::new(8.0, 0.5);

        // Everything below the clamp evaluates as if it sat at the clamp.
        let at_clamp = limited.weight(&a, &b, 0.25, 1.0);
        let near_zero = limited.weight(&a, &b, 1e-6, 1.0);
        assert_relative_eq!(near_zero, at_clamp, epsilon = 1e-12);
        assert_relative_eq!(at_clamp, 0.5_f64.powi(8), epsilon = 1e-12);
    }

    #[test_case(2, std::f64::consts::SQRT_2; "2d")]
    #[test_case(3, 1.2599210498948732; "3d")]
    #[test_case(4, 1.189207115002721; "4d")]
    fn progressive_multiplier(dimensions: usize, expected: f64) {
        assert_relative_eq!(
            progressive_radius_multiplier(dimensions),
            expected,
            epsilon = 1e-12
        );
    }
}
