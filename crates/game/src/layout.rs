//! On-screen layout: help panel and control button rectangles, pointer hit
//! testing, and the narrow-window ship scale rule.
//!
//! Rectangles are in physical pixels (the space winit reports cursor and
//! touch positions in); sizes are authored in logical pixels and scaled.

use glam::Vec2;
use input::FlightAction;

/// Axis-aligned rectangle, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Half-open on the right and bottom edges.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }
}

/// Something on screen a pointer can press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    HelpPanel,
    Button(FlightAction),
}

/// Help text, one line per row.
pub const HELP_LINES: [&str; 5] = [
    "CONTROLS",
    "W / Up     Advance",
    "A / Left   Turn left",
    "D / Right  Turn right",
    "Click here or Tab to hide",
];
pub const HELP_COLLAPSED: &str = "? Help";

/// Glyph scale of overlay text in logical pixels.
pub const TEXT_SCALE: f32 = 2.0;
const MARGIN: f32 = 16.0;
const PADDING: f32 = 10.0;
const LINE_GAP: f32 = 6.0;
const BUTTON_SIZE: f32 = 72.0;
const BUTTON_GAP: f32 = 16.0;
/// Glyph cell of the overlay font at scale 1.
const GLYPH_W: f32 = 6.0;
const GLYPH_H: f32 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenLayout {
    pub scale_factor: f32,
    /// Expanded help panel, top-left.
    pub panel: Rect,
    /// Collapsed help tab in the same corner.
    pub panel_collapsed: Rect,
    /// Bottom-centre buttons: turn left, advance, turn right.
    pub buttons: [(FlightAction, Rect); 3],
}

impl ScreenLayout {
    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        let s = scale_factor.max(0.1) as f32;
        let (w, h) = (width as f32, height as f32);

        let text_w = |text: &str| text.chars().count() as f32 * GLYPH_W * TEXT_SCALE * s;
        let line_h = (GLYPH_H * TEXT_SCALE + LINE_GAP) * s;

        let widest = HELP_LINES.iter().copied().map(text_w).fold(0.0, f32::max);
        let panel = Rect::new(
            MARGIN * s,
            MARGIN * s,
            widest + PADDING * 2.0 * s,
            line_h * HELP_LINES.len() as f32 + (PADDING * 2.0 - LINE_GAP) * s,
        );
        let panel_collapsed = Rect::new(
            MARGIN * s,
            MARGIN * s,
            text_w(HELP_COLLAPSED) + PADDING * 2.0 * s,
            (GLYPH_H * TEXT_SCALE + PADDING * 2.0) * s,
        );

        let size = BUTTON_SIZE * s;
        let gap = BUTTON_GAP * s;
        let row_w = size * 3.0 + gap * 2.0;
        let x0 = (w - row_w) * 0.5;
        let y = h - size - MARGIN * s;
        let buttons = [
            (FlightAction::TurnLeft, Rect::new(x0, y, size, size)),
            (FlightAction::Advance, Rect::new(x0 + size + gap, y, size, size)),
            (FlightAction::TurnRight, Rect::new(x0 + (size + gap) * 2.0, y, size, size)),
        ];

        Self { scale_factor: s, panel, panel_collapsed, buttons }
    }

    /// The panel rectangle for its current state.
    pub fn panel_rect(&self, panel_visible: bool) -> Rect {
        if panel_visible {
            self.panel
        } else {
            self.panel_collapsed
        }
    }

    /// What is under `point`, buttons first.
    pub fn hit_test(&self, point: Vec2, panel_visible: bool) -> Option<Control> {
        self.buttons
            .iter()
            .find(|(_, rect)| rect.contains(point))
            .map(|(action, _)| Control::Button(*action))
            .or_else(|| {
                self.panel_rect(panel_visible)
                    .contains(point)
                    .then_some(Control::HelpPanel)
            })
    }
}

/// Physical pixels to logical pixels.
pub fn logical_width(physical_width: u32, scale_factor: f64) -> f32 {
    (physical_width as f64 / scale_factor.max(0.1)) as f32
}

/// Uniform ship model scale for a window `logical_width` wide.
pub fn ship_model_scale(logical_width: f32, threshold: f32, narrow_scale: f32) -> f32 {
    if logical_width < threshold {
        narrow_scale
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_windows_shrink_the_ship() {
        assert_eq!(ship_model_scale(787.0, 788.0, 0.5), 0.5);
        assert_eq!(ship_model_scale(320.0, 788.0, 0.5), 0.5);
        assert_eq!(ship_model_scale(788.0, 788.0, 0.5), 1.0);
        assert_eq!(ship_model_scale(1920.0, 788.0, 0.5), 1.0);
    }

    #[test]
    fn hidpi_width_is_measured_in_logical_pixels() {
        assert_eq!(logical_width(1200, 2.0), 600.0);
        assert_eq!(ship_model_scale(logical_width(1200, 2.0), 788.0, 0.5), 0.5);
        assert_eq!(ship_model_scale(logical_width(1200, 1.0), 788.0, 0.5), 1.0);
        assert_eq!(ship_model_scale(logical_width(1576, 2.0), 788.0, 0.5), 1.0);
    }

    #[test]
    fn buttons_sit_bottom_centre_in_order() {
        let layout = ScreenLayout::new(1280, 720, 1.0);
        let [(a0, left), (a1, mid), (a2, right)] = layout.buttons;
        assert_eq!((a0, a1, a2), (FlightAction::TurnLeft, FlightAction::Advance, FlightAction::TurnRight));
        assert!(left.x < mid.x && mid.x < right.x);
        assert!((mid.x + mid.w * 0.5 - 640.0).abs() < 0.5);
        assert!(left.y + left.h <= 720.0);
    }

    #[test]
    fn hit_test_finds_buttons_and_panel() {
        let layout = ScreenLayout::new(1280, 720, 1.0);
        let (action, advance) = layout.buttons[1];
        assert_eq!(action, FlightAction::Advance);
        let centre = Vec2::new(advance.x + advance.w * 0.5, advance.y + advance.h * 0.5);
        assert_eq!(layout.hit_test(centre, true), Some(Control::Button(FlightAction::Advance)));

        let in_panel = Vec2::new(layout.panel.x + 2.0, layout.panel.y + 2.0);
        assert_eq!(layout.hit_test(in_panel, true), Some(Control::HelpPanel));
        assert_eq!(layout.hit_test(Vec2::new(640.0, 300.0), true), None);
    }

    #[test]
    fn collapsed_panel_has_a_smaller_target() {
        let layout = ScreenLayout::new(1280, 720, 1.0);
        let below_tab = Vec2::new(
            layout.panel_collapsed.x + 2.0,
            layout.panel_collapsed.y + layout.panel_collapsed.h + 4.0,
        );
        assert!(layout.panel.contains(below_tab));
        assert_eq!(layout.hit_test(below_tab, true), Some(Control::HelpPanel));
        assert_eq!(layout.hit_test(below_tab, false), None);
    }

    #[test]
    fn hidpi_scales_sizes() {
        let one = ScreenLayout::new(1280, 720, 1.0);
        let two = ScreenLayout::new(2560, 1440, 2.0);
        assert!((two.panel.w - one.panel.w * 2.0).abs() < 1e-3);
        assert!((two.buttons[0].1.w - one.buttons[0].1.w * 2.0).abs() < 1e-3);
    }

    #[test]
    fn rect_edges_are_half_open() {
        let r = Rect::new(10.0, 10.0, 5.0, 5.0);
        assert!(r.contains(Vec2::new(10.0, 10.0)));
        assert!(!r.contains(Vec2::new(15.0, 12.0)));
        assert!(!r.contains(Vec2::new(12.0, 15.0)));
    }
}
