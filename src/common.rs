pub mod kd_tree;
pub mod points;

pub use kd_tree::KdTree;
pub use points::{dist, dist_squared};
