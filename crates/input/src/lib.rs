//! Input handling for ship flight: keyboard and pointer (mouse/touch) controls.
//!
//! Everything funnels into three flags, [`FlightInput`]. Event handlers return
//! an [`InputSignal`] when a movement input starts so the caller can react
//! (the help panel hides itself on the first one).

use glam::Vec2;

/// A movement the player can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightAction {
    Advance,
    TurnLeft,
    TurnRight,
}

impl FlightAction {
    /// Keyboard binding: W/Up advance, A/Left turn left, D/Right turn right.
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::KeyW | KeyCode::ArrowUp => Some(Self::Advance),
            KeyCode::KeyA | KeyCode::ArrowLeft => Some(Self::TurnLeft),
            KeyCode::KeyD | KeyCode::ArrowRight => Some(Self::TurnRight),
            _ => None,
        }
    }

    /// Short label for on-screen buttons.
    pub fn label(self) -> &'static str {
        match self {
            Self::Advance => "^",
            Self::TurnLeft => "<",
            Self::TurnRight => ">",
        }
    }
}

/// The three held-movement flags read once per tick.
///
/// Both turn flags may be set at once; the flight update decides who wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlightInput {
    pub advancing: bool,
    pub turning_left: bool,
    pub turning_right: bool,
}

impl FlightInput {
    /// Returns true if the flag changed.
    pub fn set_advancing(&mut self, active: bool) -> bool {
        std::mem::replace(&mut self.advancing, active) != active
    }

    /// Returns true if the flag changed.
    pub fn set_turning_left(&mut self, active: bool) -> bool {
        std::mem::replace(&mut self.turning_left, active) != active
    }

    /// Returns true if the flag changed.
    pub fn set_turning_right(&mut self, active: bool) -> bool {
        std::mem::replace(&mut self.turning_right, active) != active
    }

    pub fn set(&mut self, action: FlightAction, active: bool) -> bool {
        match action {
            FlightAction::Advance => self.set_advancing(active),
            FlightAction::TurnLeft => self.set_turning_left(active),
            FlightAction::TurnRight => self.set_turning_right(active),
        }
    }

    pub fn is_active(&self, action: FlightAction) -> bool {
        match action {
            FlightAction::Advance => self.advancing,
            FlightAction::TurnLeft => self.turning_left,
            FlightAction::TurnRight => self.turning_right,
        }
    }
}

/// Something the caller may want to react to beyond the flag change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSignal {
    /// A movement key went down or a movement button was pressed.
    MovementStarted,
}

/// Press/release style pointer events on an on-screen control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    MouseDown,
    MouseUp,
    /// Cursor left the control (or the window) while it was pressed.
    MouseLeave,
    TouchStart,
    TouchEnd,
    TouchCancel,
}

impl PointerEvent {
    pub fn is_press(self) -> bool {
        matches!(self, Self::MouseDown | Self::TouchStart)
    }
}

/// Manages input state between ticks.
#[derive(Debug, Default)]
pub struct InputState {
    flight: FlightInput,
    /// Cursor position in physical window pixels.
    cursor_position: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a keyboard event. Non-movement keys are ignored.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) -> Option<InputSignal> {
        let action = FlightAction::from_key(key)?;
        match state {
            ElementState::Pressed => {
                self.flight.set(action, true);
                Some(InputSignal::MovementStarted)
            }
            ElementState::Released => {
                self.flight.set(action, false);
                None
            }
        }
    }

    /// Process a pointer event on the control bound to `action`.
    /// Presses set the flag, every release-like event clears it.
    pub fn process_pointer(&mut self, action: FlightAction, event: PointerEvent) -> Option<InputSignal> {
        if event.is_press() {
            self.flight.set(action, true);
            Some(InputSignal::MovementStarted)
        } else {
            self.flight.set(action, false);
            None
        }
    }

    /// Process cursor position update (physical pixels).
    pub fn process_cursor_position(&mut self, position: (f64, f64)) {
        self.cursor_position = Vec2::new(position.0 as f32, position.1 as f32);
    }

    /// Drop every held input, e.g. when the window loses focus and key-up
    /// events would never arrive.
    pub fn release_all(&mut self) {
        self.flight = FlightInput::default();
    }

    /// Current flight flags.
    pub fn flight(&self) -> FlightInput {
        self.flight
    }

    /// Get the cursor position in physical window pixels.
    pub fn cursor_position(&self) -> Vec2 {
        self.cursor_position
    }
}

// Re-export for convenience
pub use winit::event::ElementState;
pub use winit::keyboard::KeyCode;
