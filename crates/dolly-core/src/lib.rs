//! Dolly Core - Foundational types for the Dolly camera-path tools
//!
//! This crate provides what the other Dolly crates depend on:
//! - `DollyError` and the `Result` alias
//! - Look-at / Euler-angle math on top of `glam`
//! - Catmull-Rom helper used for cubic path interpolation

mod error;
pub mod math;
pub mod spline;

pub use error::{DollyError, Result};
pub use glam::{Mat3, Mat4, Vec3};
