//! # Math Utilities
//!
//! Ray representation and the small set of geometric primitives the
//! manipulation engine is built on: line/plane intersection, closest points
//! between a segment and a ray, directional magnitudes, and angle helpers.

pub mod geometry;
pub mod ray;

pub use ray::Ray;
