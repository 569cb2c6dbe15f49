//! Rotation and projection helpers on top of glam.

pub mod projection;
pub mod rotation;
