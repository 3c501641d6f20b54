//! Core engine types and utilities for Falcon Flight.
//!
//! This crate provides the foundational types used across the demo:
//! - Transform and spatial helpers
//! - Fixed-tick time management
//! - A small hecs-backed scene graph (nodes, parenting, lights, models)

pub mod components;
pub mod scene;
pub mod time;
pub mod transform;

pub use components::*;
pub use scene::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
pub use hecs::Entity;
