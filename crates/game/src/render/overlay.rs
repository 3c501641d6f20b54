//! Overlay rendering: help panel, control buttons, loading progress.

use input::FlightInput;
use renderer::OverlayTextBuilder;

use crate::layout::{ScreenLayout, HELP_COLLAPSED, HELP_LINES, TEXT_SCALE};

/// Everything the overlay needs to know about the demo this frame.
#[derive(Debug, Clone, Copy)]
pub struct OverlayView {
    pub panel_visible: bool,
    /// Held flags; their buttons draw highlighted.
    pub flight: FlightInput,
    /// Ship load percentage while it is still loading.
    pub ship_loading: Option<f32>,
}

/// Build the screen-space overlay in physical pixels.
pub fn build(view: &OverlayView, layout: &ScreenLayout, sw: f32, sh: f32) -> OverlayTextBuilder {
    let mut tb = OverlayTextBuilder::new(sw, sh);
    let s = layout.scale_factor;
    let scale = TEXT_SCALE * s;
    let line_h = OverlayTextBuilder::line_height(scale) + 6.0 * s;
    let pad = 10.0 * s;

    let bg = [0.0, 0.0, 0.0, 0.55];
    let white = [1.0, 1.0, 1.0, 1.0];
    let gray = [0.7, 0.7, 0.7, 1.0];
    let accent = [1.0, 0.85, 0.3, 1.0];

    // ---- Help panel (top-left) ----
    let panel = layout.panel_rect(view.panel_visible);
    tb.add_rect(panel.x, panel.y, panel.w, panel.h, bg);
    tb.add_outline(panel.x, panel.y, panel.w, panel.h, s.max(1.0), gray);
    if view.panel_visible {
        let mut y = panel.y + pad;
        for (i, line) in HELP_LINES.iter().enumerate() {
            let color = if i == 0 { accent } else { white };
            tb.add_text(panel.x + pad, y, line, scale, color);
            y += line_h;
        }
    } else {
        tb.add_text_centered(panel.x, panel.y, panel.w, panel.h, HELP_COLLAPSED, scale, white);
    }

    // ---- Control buttons (bottom-centre) ----
    for (action, rect) in layout.buttons {
        let held = view.flight.is_active(action);
        let fill = if held { [1.0, 0.85, 0.3, 0.45] } else { bg };
        tb.add_rect(rect.x, rect.y, rect.w, rect.h, fill);
        tb.add_outline(rect.x, rect.y, rect.w, rect.h, 2.0 * s, if held { accent } else { gray });
        tb.add_text_centered(rect.x, rect.y, rect.w, rect.h, action.label(), scale * 2.0, white);
    }

    // ---- Loading progress (centre) ----
    if let Some(percent) = view.ship_loading {
        let text = format!("Loading ship: {:.0}%", percent);
        let bar_w = 240.0 * s;
        let bar_h = 8.0 * s;
        let x = (sw - bar_w) * 0.5;
        let text_x = (sw - OverlayTextBuilder::text_width(&text, scale)) * 0.5;
        let text_h = tb.add_text_with_bg(text_x, sh * 0.5 - line_h, &text, scale, white, bg);
        let y = sh * 0.5 - line_h + text_h + 4.0 * s;
        tb.add_rect(x, y, bar_w, bar_h, bg);
        tb.add_rect(x, y, bar_w * (percent / 100.0).clamp(0.0, 1.0), bar_h, accent);
    }

    tb
}
