//! Per-frame update: asset arrivals, the help panel timer, then fixed flight ticks.

use engine_core::{ModelId, Time};

use crate::assets::{AssetKind, LoadEvent};
use crate::controls::Controls;
use crate::flight_scene::FlightScene;

impl crate::DemoState {
    pub(crate) fn update(&mut self) {
        self.time.update();
        self.receive_assets();
        step_frame(&mut self.time, &mut self.world, &mut self.controls);
    }

    fn receive_assets(&mut self) {
        for event in self.loader.poll() {
            match event {
                LoadEvent::Progress(kind, progress) => {
                    let percent = progress.percent();
                    log::info!("{} loading: {:.2}%", kind.label(), percent);
                    if kind == AssetKind::Ship {
                        self.ship_progress = percent;
                    }
                }
                LoadEvent::Finished(kind, Ok(data)) => {
                    let model = self.renderer.upload_model(&data);
                    let id = ModelId(self.models.len() as u32);
                    self.models.push(model);
                    match self.world.attach_model(kind, id) {
                        Ok(()) => log::info!(
                            "{} ready: {} vertices, {} triangles",
                            kind.label(),
                            data.vertex_count(),
                            data.triangle_count()
                        ),
                        Err(e) => log::error!("Could not attach {}: {}", kind.label(), e),
                    }
                    if kind == AssetKind::Ship {
                        self.apply_ship_scale();
                    }
                }
                LoadEvent::Finished(kind, Err(e)) => {
                    log::error!("Failed to load {}: {}", kind.label(), e);
                }
            }
        }
    }
}

/// One frame of simulation after `time` has been updated.
///
/// The help panel timer takes the full wall-clock delta, so the latch still
/// clears after a stall longer than the tick backlog. Flight runs only the
/// capped fixed ticks.
pub(crate) fn step_frame(time: &mut Time, world: &mut FlightScene, controls: &mut Controls) {
    controls.help_panel.tick(time.delta_seconds());
    while time.should_fixed_update() {
        world.tick(&controls.input.flight());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DemoConfig;
    use crate::help_panel::ToggleSource;
    use std::time::Duration;

    fn setup() -> (Time, FlightScene, Controls) {
        let config = DemoConfig::default();
        let world = FlightScene::new(&config).unwrap();
        (Time::new(), world, Controls::new(config.ui.latch_interval_secs))
    }

    #[test]
    fn long_stall_still_reopens_a_user_hidden_panel() {
        let (mut time, mut world, mut controls) = setup();
        controls.help_panel.toggle(ToggleSource::User);
        assert!(!controls.help_panel.is_visible());

        time.advance(Duration::from_secs(6));
        step_frame(&mut time, &mut world, &mut controls);
        assert!(controls.help_panel.is_visible());
    }

    #[test]
    fn long_stall_caps_flight_ticks() {
        let (mut time, mut world, mut controls) = setup();
        controls.on_key(input::KeyCode::KeyW, input::ElementState::Pressed, false);
        let start = world.pose.position;

        time.advance(Duration::from_secs(6));
        step_frame(&mut time, &mut world, &mut controls);
        let travelled = (world.pose.position - start).length();
        let per_tick = DemoConfig::default().flight_tuning().move_speed;
        assert!(travelled > 0.0);
        assert!(travelled <= per_tick * engine_core::MAX_BACKLOG_TICKS as f32 + 1e-3);
    }

    #[test]
    fn short_frames_feed_the_panel_timer_in_small_steps() {
        let (mut time, mut world, mut controls) = setup();
        controls.on_key(input::KeyCode::Tab, input::ElementState::Pressed, false);
        for _ in 0..200 {
            time.advance(Duration::from_millis(16));
            step_frame(&mut time, &mut world, &mut controls);
        }
        // 3.2 s: still latched, so still hidden.
        assert!(!controls.help_panel.is_visible());
        for _ in 0..150 {
            time.advance(Duration::from_millis(16));
            step_frame(&mut time, &mut world, &mut controls);
        }
        assert!(controls.help_panel.is_visible());
    }
}
