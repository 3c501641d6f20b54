//! Pointer tracking for the on-screen controls.
//!
//! Turns raw mouse and touch events plus a hit test into press/release events
//! on a button, or a click on the help panel. The mouse-leave release is
//! synthesized here since winit only reports cursor positions.
//!
//! [`Controls`] owns the flight flags, the pointer tracker and the help panel,
//! and routes keyboard and pointer events between them.

use std::collections::HashMap;

use glam::Vec2;
use input::{ElementState, FlightAction, InputSignal, InputState, KeyCode, PointerEvent};
use winit::event::TouchPhase;

use crate::help_panel::{HelpPanel, ToggleSource};
use crate::layout::{Control, ScreenLayout};

/// What the demo should do in response to a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerCommand {
    Control(FlightAction, PointerEvent),
    /// A completed click or tap on the help panel.
    TogglePanel,
}

#[derive(Debug, Default)]
pub struct PointerTracker {
    /// Control under the left button since it went down.
    mouse_pressed: Option<Control>,
    /// Control each active touch started on.
    touches: HashMap<u64, Control>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Left button went down over `hit`.
    pub fn mouse_down(&mut self, hit: Option<Control>) -> Option<PointerCommand> {
        let hit = hit?;
        self.mouse_pressed = Some(hit);
        match hit {
            Control::Button(action) => Some(PointerCommand::Control(action, PointerEvent::MouseDown)),
            Control::HelpPanel => None,
        }
    }

    /// Left button went up over `hit`.
    pub fn mouse_up(&mut self, hit: Option<Control>) -> Option<PointerCommand> {
        match self.mouse_pressed.take()? {
            Control::Button(action) => Some(PointerCommand::Control(action, PointerEvent::MouseUp)),
            Control::HelpPanel if hit == Some(Control::HelpPanel) => Some(PointerCommand::TogglePanel),
            Control::HelpPanel => None,
        }
    }

    /// Cursor moved and is now over `hit`. Leaving the pressed button
    /// releases it.
    pub fn cursor_moved(&mut self, hit: Option<Control>) -> Option<PointerCommand> {
        match self.mouse_pressed {
            Some(Control::Button(action)) if hit != Some(Control::Button(action)) => {
                self.mouse_pressed = None;
                Some(PointerCommand::Control(action, PointerEvent::MouseLeave))
            }
            _ => None,
        }
    }

    /// Cursor left the window.
    pub fn cursor_left(&mut self) -> Option<PointerCommand> {
        match self.mouse_pressed.take()? {
            Control::Button(action) => Some(PointerCommand::Control(action, PointerEvent::MouseLeave)),
            Control::HelpPanel => None,
        }
    }

    /// A touch changed phase over `hit`. Moves are ignored: a touch stays
    /// bound to the control it started on until it ends.
    pub fn touch(&mut self, id: u64, phase: TouchPhase, hit: Option<Control>) -> Option<PointerCommand> {
        match phase {
            TouchPhase::Started => {
                let hit = hit?;
                self.touches.insert(id, hit);
                match hit {
                    Control::Button(action) => Some(PointerCommand::Control(action, PointerEvent::TouchStart)),
                    Control::HelpPanel => None,
                }
            }
            TouchPhase::Moved => None,
            TouchPhase::Ended => match self.touches.remove(&id)? {
                Control::Button(action) => Some(PointerCommand::Control(action, PointerEvent::TouchEnd)),
                Control::HelpPanel if hit == Some(Control::HelpPanel) => Some(PointerCommand::TogglePanel),
                Control::HelpPanel => None,
            },
            TouchPhase::Cancelled => match self.touches.remove(&id)? {
                Control::Button(action) => Some(PointerCommand::Control(action, PointerEvent::TouchCancel)),
                Control::HelpPanel => None,
            },
        }
    }

    /// Forget every press (window lost focus).
    pub fn clear(&mut self) {
        self.mouse_pressed = None;
        self.touches.clear();
    }
}

/// Input routing. Window events come in, flag and panel changes come out.
#[derive(Debug)]
pub struct Controls {
    pub input: InputState,
    pub pointer: PointerTracker,
    pub help_panel: HelpPanel,
}

impl Controls {
    pub fn new(latch_interval_secs: f32) -> Self {
        Self {
            input: InputState::new(),
            pointer: PointerTracker::new(),
            help_panel: HelpPanel::new(latch_interval_secs),
        }
    }

    /// A physical key changed state. Tab toggles the panel; flight keys set
    /// their flag and may auto-hide it.
    pub fn on_key(&mut self, key: KeyCode, state: ElementState, repeat: bool) {
        if key == KeyCode::Tab {
            if state.is_pressed() && !repeat {
                self.help_panel.toggle(ToggleSource::User);
            }
        } else if self.input.process_keyboard(key, state) == Some(InputSignal::MovementStarted) {
            self.help_panel.notify_movement();
        }
    }

    /// Left mouse button at the last known cursor position.
    pub fn on_mouse_button(&mut self, state: ElementState, layout: &ScreenLayout) {
        let hit = self.hit_at(self.input.cursor_position(), layout);
        let command = match state {
            ElementState::Pressed => self.pointer.mouse_down(hit),
            ElementState::Released => self.pointer.mouse_up(hit),
        };
        self.apply(command);
    }

    /// Cursor moved to `position` (physical pixels).
    pub fn on_cursor_moved(&mut self, position: (f64, f64), layout: &ScreenLayout) {
        self.input.process_cursor_position(position);
        let hit = self.hit_at(self.input.cursor_position(), layout);
        let command = self.pointer.cursor_moved(hit);
        self.apply(command);
    }

    pub fn on_cursor_left(&mut self) {
        let command = self.pointer.cursor_left();
        self.apply(command);
    }

    pub fn on_touch(&mut self, id: u64, phase: TouchPhase, point: Vec2, layout: &ScreenLayout) {
        let hit = self.hit_at(point, layout);
        let command = self.pointer.touch(id, phase, hit);
        self.apply(command);
    }

    /// Key-up events for held keys will never arrive.
    pub fn on_focus_lost(&mut self) {
        self.input.release_all();
        self.pointer.clear();
    }

    fn hit_at(&self, point: Vec2, layout: &ScreenLayout) -> Option<Control> {
        layout.hit_test(point, self.help_panel.is_visible())
    }

    fn apply(&mut self, command: Option<PointerCommand>) {
        match command {
            Some(PointerCommand::Control(action, event)) => {
                if self.input.process_pointer(action, event) == Some(InputSignal::MovementStarted) {
                    self.help_panel.notify_movement();
                }
            }
            Some(PointerCommand::TogglePanel) => self.help_panel.toggle(ToggleSource::User),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADVANCE: Control = Control::Button(FlightAction::Advance);
    const LEFT: Control = Control::Button(FlightAction::TurnLeft);

    #[test]
    fn mouse_press_and_release_on_button() {
        let mut tracker = PointerTracker::new();
        assert_eq!(
            tracker.mouse_down(Some(ADVANCE)),
            Some(PointerCommand::Control(FlightAction::Advance, PointerEvent::MouseDown))
        );
        assert_eq!(
            tracker.mouse_up(Some(ADVANCE)),
            Some(PointerCommand::Control(FlightAction::Advance, PointerEvent::MouseUp))
        );
        // Nothing is held any more.
        assert_eq!(tracker.mouse_up(Some(ADVANCE)), None);
        assert_eq!(tracker.cursor_left(), None);
    }

    #[test]
    fn dragging_off_a_button_releases_it() {
        let mut tracker = PointerTracker::new();
        tracker.mouse_down(Some(LEFT));
        assert_eq!(tracker.cursor_moved(Some(LEFT)), None);
        assert_eq!(
            tracker.cursor_moved(None),
            Some(PointerCommand::Control(FlightAction::TurnLeft, PointerEvent::MouseLeave))
        );
        // Button already released: the later mouse-up does nothing.
        assert_eq!(tracker.mouse_up(None), None);
    }

    #[test]
    fn leaving_the_window_releases_the_button() {
        let mut tracker = PointerTracker::new();
        tracker.mouse_down(Some(ADVANCE));
        assert_eq!(
            tracker.cursor_left(),
            Some(PointerCommand::Control(FlightAction::Advance, PointerEvent::MouseLeave))
        );
        assert_eq!(tracker.cursor_left(), None);
    }

    #[test]
    fn panel_click_needs_press_and_release_on_panel() {
        let mut tracker = PointerTracker::new();
        assert_eq!(tracker.mouse_down(Some(Control::HelpPanel)), None);
        assert_eq!(tracker.mouse_up(Some(Control::HelpPanel)), Some(PointerCommand::TogglePanel));

        tracker.mouse_down(Some(Control::HelpPanel));
        assert_eq!(tracker.mouse_up(None), None);

        assert_eq!(tracker.mouse_down(None), None);
        assert_eq!(tracker.mouse_up(Some(Control::HelpPanel)), None);
    }

    #[test]
    fn touches_are_tracked_per_id() {
        let mut tracker = PointerTracker::new();
        assert_eq!(
            tracker.touch(1, TouchPhase::Started, Some(LEFT)),
            Some(PointerCommand::Control(FlightAction::TurnLeft, PointerEvent::TouchStart))
        );
        tracker.touch(2, TouchPhase::Started, Some(ADVANCE));
        // Moving off the button keeps the touch bound to it.
        assert_eq!(tracker.touch(1, TouchPhase::Moved, None), None);

        assert_eq!(
            tracker.touch(2, TouchPhase::Ended, None),
            Some(PointerCommand::Control(FlightAction::Advance, PointerEvent::TouchEnd))
        );
        assert_eq!(
            tracker.touch(1, TouchPhase::Cancelled, None),
            Some(PointerCommand::Control(FlightAction::TurnLeft, PointerEvent::TouchCancel))
        );
        assert_eq!(tracker.touch(1, TouchPhase::Ended, None), None);
    }

    #[test]
    fn tap_on_panel_toggles() {
        let mut tracker = PointerTracker::new();
        assert_eq!(tracker.touch(7, TouchPhase::Started, Some(Control::HelpPanel)), None);
        assert_eq!(
            tracker.touch(7, TouchPhase::Ended, Some(Control::HelpPanel)),
            Some(PointerCommand::TogglePanel)
        );
    }

    #[test]
    fn clear_forgets_everything() {
        let mut tracker = PointerTracker::new();
        tracker.mouse_down(Some(ADVANCE));
        tracker.touch(3, TouchPhase::Started, Some(LEFT));
        tracker.clear();
        assert_eq!(tracker.cursor_left(), None);
        assert_eq!(tracker.mouse_up(Some(ADVANCE)), None);
        assert_eq!(tracker.touch(3, TouchPhase::Ended, Some(LEFT)), None);
    }

    fn centre(rect: crate::layout::Rect) -> (f64, f64) {
        ((rect.x + rect.w * 0.5) as f64, (rect.y + rect.h * 0.5) as f64)
    }

    fn setup() -> (Controls, ScreenLayout) {
        (Controls::new(5.0), ScreenLayout::new(1280, 720, 1.0))
    }

    #[test]
    fn first_key_down_hides_the_panel() {
        let (mut controls, _) = setup();
        controls.on_key(KeyCode::KeyW, ElementState::Pressed, false);
        assert!(!controls.help_panel.is_visible());
        assert!(controls.input.flight().advancing);

        // Key repeat and release leave it hidden.
        controls.on_key(KeyCode::KeyW, ElementState::Pressed, true);
        controls.on_key(KeyCode::KeyW, ElementState::Released, false);
        assert!(!controls.help_panel.is_visible());
        assert!(!controls.input.flight().advancing);
    }

    #[test]
    fn panel_click_keeps_it_through_a_key_down() {
        let (mut controls, layout) = setup();
        // Close then reopen by clicking.
        for _ in 0..2 {
            let panel = centre(layout.panel_rect(controls.help_panel.is_visible()));
            controls.on_cursor_moved(panel, &layout);
            controls.on_mouse_button(ElementState::Pressed, &layout);
            controls.on_mouse_button(ElementState::Released, &layout);
        }
        assert!(controls.help_panel.is_visible());

        controls.on_key(KeyCode::KeyA, ElementState::Pressed, false);
        assert!(controls.input.flight().turning_left);
        assert!(controls.help_panel.is_visible());
    }

    #[test]
    fn button_press_sets_flag_and_hides_the_panel() {
        let (mut controls, layout) = setup();
        let (action, rect) = layout.buttons[1];
        assert_eq!(action, FlightAction::Advance);

        controls.on_cursor_moved(centre(rect), &layout);
        controls.on_mouse_button(ElementState::Pressed, &layout);
        assert!(controls.input.flight().advancing);
        assert!(!controls.help_panel.is_visible());

        // Dragging off the button releases it.
        controls.on_cursor_moved((1.0, 700.0), &layout);
        assert!(!controls.input.flight().advancing);
        controls.on_mouse_button(ElementState::Released, &layout);
        assert!(!controls.help_panel.is_visible());
    }

    #[test]
    fn touch_on_button_hides_the_panel() {
        let (mut controls, layout) = setup();
        let (x, y) = centre(layout.buttons[0].1);
        controls.on_touch(4, TouchPhase::Started, Vec2::new(x as f32, y as f32), &layout);
        assert!(controls.input.flight().turning_left);
        assert!(!controls.help_panel.is_visible());
        controls.on_touch(4, TouchPhase::Ended, Vec2::ZERO, &layout);
        assert!(!controls.input.flight().turning_left);
    }

    #[test]
    fn tab_latches_the_panel() {
        let (mut controls, _) = setup();
        controls.on_key(KeyCode::Tab, ElementState::Pressed, false);
        assert!(!controls.help_panel.is_visible());
        controls.on_key(KeyCode::Tab, ElementState::Pressed, true);
        controls.on_key(KeyCode::Tab, ElementState::Released, false);
        assert!(!controls.help_panel.is_visible());

        controls.on_key(KeyCode::Tab, ElementState::Pressed, false);
        controls.on_key(KeyCode::KeyD, ElementState::Pressed, false);
        assert!(controls.help_panel.is_visible());
    }

    #[test]
    fn focus_loss_releases_everything() {
        let (mut controls, layout) = setup();
        controls.on_key(KeyCode::KeyW, ElementState::Pressed, false);
        controls.on_cursor_moved(centre(layout.buttons[0].1), &layout);
        controls.on_mouse_button(ElementState::Pressed, &layout);
        controls.on_focus_lost();
        assert_eq!(controls.input.flight(), input::FlightInput::default());
        controls.on_cursor_left();
        assert_eq!(controls.input.flight(), input::FlightInput::default());
    }
}
