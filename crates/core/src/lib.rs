//! Pure domain logic for the pothole-reporting platform.
//!
//! Everything in this crate is synchronous, deterministic, and free of I/O so
//! it can be exercised from any layer (API handlers, repositories, tests)
//! without setup:
//!
//! - [`geometry`] -- pixel bounding boxes to real-world area.
//! - [`severity`] -- total area to one of four severity bands.
//! - [`costing`] -- severity + area to material, bag count, and cost.
//! - [`lifecycle`] -- report status transitions and audit entries.
//! - [`error`] -- the shared domain error taxonomy.

pub mod costing;
pub mod error;
pub mod geometry;
pub mod lifecycle;
pub mod roles;
pub mod severity;
pub mod types;
