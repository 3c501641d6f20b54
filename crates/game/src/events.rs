//! Window event handling for DemoState.

use glam::Vec2;
use winit::event::{MouseButton, WindowEvent};
use winit::keyboard::PhysicalKey;

use crate::layout::ScreenLayout;

impl crate::DemoState {
    /// Handle a window event. Returns true if the app should exit.
    pub(crate) fn handle_window_event(&mut self, event: WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => {
                self.running = false;
                true
            }
            WindowEvent::Resized(size) => {
                self.renderer.resize(size);
                self.world.camera.set_aspect(size.width, size.height);
                self.layout = ScreenLayout::new(size.width, size.height, self.renderer.window.scale_factor());
                self.apply_ship_scale();
                log::debug!("Resized to {}x{}", size.width, size.height);
                false
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let (w, h) = self.renderer.dimensions();
                self.layout = ScreenLayout::new(w, h, scale_factor);
                self.apply_ship_scale();
                false
            }
            WindowEvent::Focused(false) => {
                self.controls.on_focus_lost();
                false
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.controls.on_key(key, event.state, event.repeat);
                }
                false
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                self.controls.on_mouse_button(state, &self.layout);
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.controls.on_cursor_moved((position.x, position.y), &self.layout);
                false
            }
            WindowEvent::CursorLeft { .. } => {
                self.controls.on_cursor_left();
                false
            }
            WindowEvent::Touch(touch) => {
                let point = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                self.controls.on_touch(touch.id, touch.phase, point, &self.layout);
                false
            }
            WindowEvent::RedrawRequested => {
                self.update();
                if let Err(e) = self.render() {
                    log::error!("Render error: {}", e);
                    self.running = false;
                    return true;
                }
                self.renderer.window.request_redraw();
                false
            }
            _ => false,
        }
    }
}
