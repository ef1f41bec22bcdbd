//! Weighted sample elimination for generating blue noise (Poisson disk) sample
//! sets, after Cem Yuksel's 2015 method.  Given a dense set of candidate points
//! in a D-dimensional domain, the algorithm selects a smaller subset in which no
//! two points are closer than a target separation, without any rejection
//! sampling.  The selection can optionally be ordered for progressive
//! refinement, such that every prefix of the output is itself a well-separated
//! set.
//!
//! The crate is organized around a single dimension-generic engine,
//! [`SampleElimination`], with the supporting pieces exposed for callers that
//! want to assemble their own pipeline: a k-d tree radius index
//! ([`common::kd_tree::KdTree`]), an indexed max-heap with decrease-key
//! ([`elimination::IndexedMaxHeap`]), and a pluggable weight function seam
//! ([`WeightFunction`]).

use std::error::Error;

pub mod common;
pub mod elimination;

pub type Result<T> = std::result::Result<T, Box<dyn Error>>;

pub type Point2 = parry2d_f64::na::Point2<f64>;
pub type Vector2 = parry2d_f64::na::Vector2<f64>;
pub type Aabb2 = parry2d_f64::bounding_volume::Aabb;

pub type Point3 = parry3d_f64::na::Point3<f64>;
pub type Vector3 = parry3d_f64::na::Vector3<f64>;
pub type Aabb3 = parry3d_f64::bounding_volume::Aabb;

pub type KdTree2 = common::kd_tree::KdTree<2>;
pub type KdTree3 = common::kd_tree::KdTree<3>;

pub type SampleElimination2 = elimination::SampleElimination<2>;
pub type SampleElimination3 = elimination::SampleElimination<3>;

pub use elimination::{PowerLawWeight, SampleElimination, WeightFn, WeightFunction};
