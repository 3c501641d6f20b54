//! Components attached to scene nodes.

use glam::Vec3;
use hecs::Entity;

/// Debug name of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(pub String);

/// Parent link. A node's `Transform` is relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub Entity);

/// Handle to a GPU model owned by the renderer side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(pub u32);

/// Marks a node as drawing a loaded model with the node's world matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Renderable {
    pub model: ModelId,
    /// Skip lighting (skyboxes and other emissive backdrops).
    pub unlit: bool,
}

/// A cone light positioned by its node and aimed at a target node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    /// Linear RGB color.
    pub color: Vec3,
    pub intensity: f32,
    /// Range after which the light contributes nothing. 0 = unbounded.
    pub distance: f32,
    /// Outer cone half-angle in radians.
    pub angle: f32,
    /// Fraction of the cone (0..1) that fades out toward the edge.
    pub penumbra: f32,
    /// Distance falloff exponent.
    pub decay: f32,
    pub cast_shadow: bool,
    pub shadow_bias: f32,
    /// Node the cone points at. `None` points along the node's forward axis.
    pub target: Option<Entity>,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
            distance: 0.0,
            angle: std::f32::consts::FRAC_PI_3,
            penumbra: 0.0,
            decay: 2.0,
            cast_shadow: false,
            shadow_bias: 0.0,
            target: None,
        }
    }
}

impl SpotLight {
    /// Cosine of the outer cone edge.
    pub fn cos_outer(&self) -> f32 {
        self.angle.cos()
    }

    /// Cosine where the penumbra fade starts.
    pub fn cos_inner(&self) -> f32 {
        (self.angle * (1.0 - self.penumbra.clamp(0.0, 1.0))).cos()
    }
}
