//! Scene graph: named nodes with local transforms and parent links.
//!
//! Storage is a hecs `World`; every node carries a `Name`, a local
//! `Transform` and optionally a `Parent`. World matrices are composed on
//! demand by walking the parent chain, which is cheap for the handful of
//! nodes a scene holds and keeps mutation trivial (no dirty flags).

use glam::{Mat4, Vec3};
use hecs::{Entity, World};

use crate::components::{Name, Parent, Renderable, SpotLight};
use crate::transform::Transform;

/// Errors from scene-graph operations.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("scene node {0:?} does not exist")]
    NoSuchNode(Entity),

    #[error("parenting {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: Entity, child: Entity },
}

/// A spotlight resolved to world space for the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldSpotLight {
    pub position: Vec3,
    /// Unit vector from the light toward its target.
    pub direction: Vec3,
    pub light: SpotLight,
}

/// A renderable node resolved to world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldRenderable {
    pub node: Entity,
    pub renderable: Renderable,
    pub world: Mat4,
}

/// Node hierarchy for one scene.
#[derive(Default)]
pub struct Scene {
    world: World,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a root node.
    pub fn spawn_node(&mut self, name: &str, transform: Transform) -> Entity {
        self.world.spawn((Name(name.to_string()), transform))
    }

    /// Create a node directly under `parent`.
    pub fn spawn_child(
        &mut self,
        parent: Entity,
        name: &str,
        transform: Transform,
    ) -> Result<Entity, SceneError> {
        if !self.world.contains(parent) {
            return Err(SceneError::NoSuchNode(parent));
        }
        let node = self.spawn_node(name, transform);
        self.add_child(parent, node)?;
        Ok(node)
    }

    /// Re-parent `child` under `parent`. The child's local transform is kept,
    /// so it moves rigidly with its new parent from now on.
    pub fn add_child(&mut self, parent: Entity, child: Entity) -> Result<(), SceneError> {
        for node in [parent, child] {
            if !self.world.contains(node) {
                return Err(SceneError::NoSuchNode(node));
            }
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(SceneError::Cycle { parent, child });
        }
        self.world
            .insert_one(child, Parent(parent))
            .map_err(|_| SceneError::NoSuchNode(child))
    }

    /// Despawn `node` and its whole subtree.
    pub fn remove(&mut self, node: Entity) -> Result<(), SceneError> {
        if !self.world.contains(node) {
            return Err(SceneError::NoSuchNode(node));
        }
        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            pending.extend(self.children(current));
            self.world
                .despawn(current)
                .map_err(|_| SceneError::NoSuchNode(current))?;
        }
        Ok(())
    }

    pub fn contains(&self, node: Entity) -> bool {
        self.world.contains(node)
    }

    pub fn node_count(&self) -> u32 {
        self.world.len()
    }

    pub fn name(&self, node: Entity) -> Option<String> {
        self.world.get::<&Name>(node).ok().map(|n| n.0.clone())
    }

    pub fn parent(&self, node: Entity) -> Option<Entity> {
        self.world.get::<&Parent>(node).ok().map(|p| p.0)
    }

    /// Direct children of `node`.
    pub fn children(&self, node: Entity) -> Vec<Entity> {
        self.world
            .query::<&Parent>()
            .iter()
            .filter(|(_, parent)| parent.0 == node)
            .map(|(entity, _)| entity)
            .collect()
    }

    /// Local transform of `node`.
    pub fn local(&self, node: Entity) -> Result<Transform, SceneError> {
        self.world
            .get::<&Transform>(node)
            .map(|t| *t)
            .map_err(|_| SceneError::NoSuchNode(node))
    }

    /// Mutate the local transform of `node` in place.
    pub fn update_local(
        &mut self,
        node: Entity,
        f: impl FnOnce(&mut Transform),
    ) -> Result<(), SceneError> {
        let mut transform = self
            .world
            .get::<&mut Transform>(node)
            .map_err(|_| SceneError::NoSuchNode(node))?;
        f(&mut *transform);
        Ok(())
    }

    pub fn set_position(&mut self, node: Entity, position: Vec3) -> Result<(), SceneError> {
        self.update_local(node, |t| t.position = position)
    }

    pub fn set_scale(&mut self, node: Entity, scale: Vec3) -> Result<(), SceneError> {
        self.update_local(node, |t| t.scale = scale)
    }

    /// Compose local transforms from the root down to `node`.
    pub fn world_matrix(&self, node: Entity) -> Result<Mat4, SceneError> {
        let mut matrix = self.local(node)?.to_matrix();
        let mut current = self.parent(node);
        while let Some(parent) = current {
            matrix = self.local(parent)?.to_matrix() * matrix;
            current = self.parent(parent);
        }
        Ok(matrix)
    }

    pub fn world_position(&self, node: Entity) -> Result<Vec3, SceneError> {
        Ok(self.world_matrix(node)?.transform_point3(Vec3::ZERO))
    }

    /// Attach (or replace) a model on `node`.
    pub fn attach_model(&mut self, node: Entity, renderable: Renderable) -> Result<(), SceneError> {
        self.world
            .insert_one(node, renderable)
            .map_err(|_| SceneError::NoSuchNode(node))
    }

    /// Attach (or replace) a spotlight on `node`.
    pub fn attach_spot_light(&mut self, node: Entity, light: SpotLight) -> Result<(), SceneError> {
        self.world
            .insert_one(node, light)
            .map_err(|_| SceneError::NoSuchNode(node))
    }

    /// Every renderable node with its world matrix.
    pub fn renderables(&self) -> Vec<WorldRenderable> {
        let mut out = Vec::new();
        for (node, renderable) in self.world.query::<&Renderable>().iter() {
            match self.world_matrix(node) {
                Ok(world) => out.push(WorldRenderable { node, renderable: *renderable, world }),
                Err(e) => log::warn!("Skipping renderable {:?}: {}", node, e),
            }
        }
        out
    }

    /// Every spotlight resolved to world position and aim direction.
    pub fn spot_lights(&self) -> Vec<WorldSpotLight> {
        let mut out = Vec::new();
        for (node, light) in self.world.query::<&SpotLight>().iter() {
            let Ok(world) = self.world_matrix(node) else {
                continue;
            };
            let position = world.transform_point3(Vec3::ZERO);
            let forward = world.transform_vector3(-Vec3::Z).normalize_or_zero();
            let direction = light
                .target
                .and_then(|target| self.world_position(target).ok())
                .and_then(|target| (target - position).try_normalize())
                .unwrap_or(forward);
            out.push(WorldSpotLight { position, direction, light: *light });
        }
        out
    }

    fn is_ancestor(&self, ancestor: Entity, node: Entity) -> bool {
        let mut current = self.parent(node);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn child_moves_rigidly_with_parent() {
        let mut scene = Scene::new();
        let ship = scene.spawn_node("ship", Transform::default());
        let light = scene
            .spawn_child(ship, "light", Transform::from_position(Vec3::new(0.0, 25.0, 0.0)))
            .unwrap();

        scene.set_position(ship, Vec3::new(5.0, 0.0, 0.0)).unwrap();
        assert!(approx(scene.world_position(light).unwrap(), Vec3::new(5.0, 25.0, 0.0)));

        scene.update_local(ship, |t| t.set_yaw_roll(PI, 0.0)).unwrap();
        scene.set_position(light, Vec3::new(0.0, 0.0, -3.0)).unwrap();
        assert!(approx(scene.world_position(light).unwrap(), Vec3::new(5.0, 0.0, 3.0)));
    }

    #[test]
    fn parenting_cycle_is_rejected() {
        let mut scene = Scene::new();
        let a = scene.spawn_node("a", Transform::default());
        let b = scene.spawn_child(a, "b", Transform::default()).unwrap();
        let c = scene.spawn_child(b, "c", Transform::default()).unwrap();

        assert!(matches!(scene.add_child(c, a), Err(SceneError::Cycle { .. })));
        assert!(matches!(scene.add_child(a, a), Err(SceneError::Cycle { .. })));
        assert_eq!(scene.parent(a), None);
    }

    #[test]
    fn remove_despawns_subtree() {
        let mut scene = Scene::new();
        let root = scene.spawn_node("root", Transform::default());
        let keep = scene.spawn_node("keep", Transform::default());
        let child = scene.spawn_child(root, "child", Transform::default()).unwrap();
        let grandchild = scene.spawn_child(child, "grandchild", Transform::default()).unwrap();

        scene.remove(root).unwrap();
        assert!(!scene.contains(child));
        assert!(!scene.contains(grandchild));
        assert!(scene.contains(keep));
        assert_eq!(scene.node_count(), 1);
        assert!(matches!(scene.remove(root), Err(SceneError::NoSuchNode(_))));
    }

    #[test]
    fn spot_light_aims_at_target_node() {
        let mut scene = Scene::new();
        let ship = scene.spawn_node("ship", Transform::from_position(Vec3::new(0.0, 0.0, 4.0)));
        let target = scene.spawn_child(ship, "target", Transform::default()).unwrap();
        let lamp = scene
            .spawn_child(ship, "lamp", Transform::from_position(Vec3::new(0.0, 25.0, 0.0)))
            .unwrap();
        scene
            .attach_spot_light(lamp, SpotLight { target: Some(target), ..Default::default() })
            .unwrap();

        let lights = scene.spot_lights();
        assert_eq!(lights.len(), 1);
        assert!(approx(lights[0].position, Vec3::new(0.0, 25.0, 4.0)));
        assert!(approx(lights[0].direction, -Vec3::Y));
    }

    #[test]
    fn renderables_report_world_matrix() {
        let mut scene = Scene::new();
        let ship = scene.spawn_node("ship", Transform::from_position(Vec3::X));
        let model = scene
            .spawn_child(ship, "model", Transform::default().with_uniform_scale(0.5))
            .unwrap();
        scene
            .attach_model(model, Renderable { model: crate::ModelId(7), unlit: false })
            .unwrap();

        let items = scene.renderables();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].renderable.model, crate::ModelId(7));
        let p = items[0].world.transform_point3(Vec3::new(2.0, 0.0, 0.0));
        assert!(approx(p, Vec3::new(2.0, 0.0, 0.0)));
    }
}
