//! The flight scene: node hierarchy, ship flight state and chase camera,
//! advanced one fixed tick at a time. Holds no GPU resources.

use engine_core::{ModelId, Renderable, Scene, SceneError, SpotLight, Transform};
use glam::{Quat, Vec3};
use hecs::Entity;
use input::FlightInput;
use renderer::Camera;

use crate::assets::AssetKind;
use crate::config::DemoConfig;
use crate::flight::{ShipFlight, ShipPose};

/// Nodes created at startup.
#[derive(Debug, Clone, Copy)]
pub struct SceneNodes {
    pub skybox: Entity,
    /// Moves and turns; everything ship-mounted hangs off it.
    pub ship_container: Entity,
    pub ship_model: Entity,
    pub spot_target: Entity,
}

pub struct FlightScene {
    pub scene: Scene,
    pub nodes: SceneNodes,
    pub pose: ShipPose,
    pub flight: ShipFlight,
    pub camera: Camera,
    pub ambient: Vec3,
    follow_offset: Vec3,
    camera_smoothing: f32,
}

impl FlightScene {
    pub fn new(config: &DemoConfig) -> Result<Self, SceneError> {
        let mut scene = Scene::new();

        let skybox = scene.spawn_node(
            "skybox",
            Transform::default().with_uniform_scale(config.assets.skybox_scale),
        );

        let pose = ShipPose::new(Vec3::ZERO, config.flight.initial_yaw);
        let ship_container = scene.spawn_node("ship_container", pose.transform());
        let ship_model = scene.spawn_child(
            ship_container,
            "ship_model",
            Transform::from_position_rotation(
                Vec3::ZERO,
                Quat::from_rotation_y(config.assets.ship_model_yaw),
            ),
        )?;
        let spot_target = scene.spawn_child(ship_container, "spot_target", Transform::default())?;
        let spotlight = scene.spawn_child(
            ship_container,
            "spotlight",
            Transform::from_position(Vec3::from(config.spotlight.position)),
        )?;

        let spot = &config.spotlight;
        scene.attach_spot_light(
            spotlight,
            SpotLight {
                color: Vec3::from(spot.color),
                intensity: spot.intensity,
                distance: spot.distance,
                angle: spot.angle,
                penumbra: spot.penumbra,
                decay: spot.decay,
                cast_shadow: spot.cast_shadow,
                shadow_bias: spot.shadow_bias,
                target: Some(spot_target),
            },
        )?;

        let cam = &config.camera;
        let mut camera = Camera::new(Vec3::from(cam.start_position));
        camera.fov_degrees = cam.fov;
        camera.near = cam.near;
        camera.far = cam.far;

        log::debug!("Scene built with {} nodes", scene.node_count());

        Ok(Self {
            scene,
            nodes: SceneNodes { skybox, ship_container, ship_model, spot_target },
            pose,
            flight: ShipFlight::new(config.flight_tuning()),
            camera,
            ambient: Vec3::from(spot.ambient),
            follow_offset: Vec3::from(cam.follow_offset),
            camera_smoothing: cam.smoothing,
        })
    }

    /// One fixed tick: fly the ship, move the spotlight target, chase with
    /// the camera.
    pub fn tick(&mut self, input: &FlightInput) {
        self.flight.step(input, &mut self.pose);

        let container = self.pose.transform();
        let synced = self
            .scene
            .update_local(self.nodes.ship_container, |t| {
                t.position = container.position;
                t.rotation = container.rotation;
            })
            .and_then(|_| self.scene.set_position(self.nodes.spot_target, self.flight.aim.current));
        if let Err(e) = synced {
            log::error!("Ship nodes out of sync: {}", e);
        }

        self.camera.chase(&container, self.follow_offset, self.camera_smoothing);
    }

    /// Hang a loaded model on its node. The skybox ignores lighting.
    pub fn attach_model(&mut self, kind: AssetKind, model: ModelId) -> Result<(), SceneError> {
        let (node, unlit) = match kind {
            AssetKind::Skybox => (self.nodes.skybox, true),
            AssetKind::Ship => (self.nodes.ship_model, false),
        };
        self.scene.attach_model(node, Renderable { model, unlit })?;
        log::debug!(
            "Model {:?} attached to '{}'",
            model,
            self.scene.name(node).unwrap_or_default()
        );
        Ok(())
    }

    pub fn set_ship_scale(&mut self, scale: f32) -> Result<(), SceneError> {
        self.scene.set_scale(self.nodes.ship_model, Vec3::splat(scale))
    }
}
