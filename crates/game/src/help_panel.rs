//! Help panel visibility: hides itself on the first movement input, unless the
//! user has toggled it by hand recently.

/// Who flipped the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleSource {
    /// Click or tap on the panel, or the Tab key. Sets the latch.
    User,
    /// Movement auto-hide or the periodic reopen.
    Auto,
}

/// Shortest accepted latch interval.
pub const MIN_LATCH_INTERVAL_SECS: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct HelpPanel {
    visible: bool,
    /// Set by a user toggle; blocks auto-hide until the next periodic check.
    user_latched: bool,
    /// Seconds between latch checks.
    interval: f32,
    /// Time since the last check, like a repeating timer started at launch.
    since_check: f32,
}

impl HelpPanel {
    /// Starts visible and unlatched.
    pub fn new(interval_secs: f32) -> Self {
        Self {
            visible: true,
            user_latched: false,
            interval: interval_secs.max(MIN_LATCH_INTERVAL_SECS),
            since_check: 0.0,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self, source: ToggleSource) {
        self.visible = !self.visible;
        if source == ToggleSource::User {
            self.user_latched = true;
        }
        log::debug!(
            "Help panel {} ({:?})",
            if self.visible { "shown" } else { "hidden" },
            source
        );
    }

    /// A movement input started. Returns true if the panel was hidden.
    pub fn notify_movement(&mut self) -> bool {
        if self.visible && !self.user_latched {
            self.toggle(ToggleSource::Auto);
            true
        } else {
            false
        }
    }

    /// Advance the periodic check. Each elapsed interval clears the latch and
    /// reopens the panel if it was closed.
    pub fn tick(&mut self, dt: f32) {
        self.since_check += dt;
        while self.since_check >= self.interval {
            self.since_check -= self.interval;
            self.check_latch();
        }
    }

    fn check_latch(&mut self) {
        if self.user_latched {
            self.user_latched = false;
            if !self.visible {
                self.toggle(ToggleSource::Auto);
            }
        }
    }
}

impl Default for HelpPanel {
    fn default() -> Self {
        Self::new(5.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: f32 = 1.0 / 60.0;

    fn run_for(panel: &mut HelpPanel, seconds: f32) {
        let ticks = (seconds / TICK).round() as u32;
        for _ in 0..ticks {
            panel.tick(TICK);
        }
    }

    #[test]
    fn first_movement_hides_visible_panel() {
        let mut panel = HelpPanel::default();
        assert!(panel.is_visible());
        assert!(panel.notify_movement());
        assert!(!panel.is_visible());
        // Already hidden: nothing to do.
        assert!(!panel.notify_movement());
        assert!(!panel.is_visible());
    }

    #[test]
    fn user_toggle_blocks_auto_hide() {
        let mut panel = HelpPanel::default();
        panel.notify_movement();
        panel.toggle(ToggleSource::User);
        assert!(panel.is_visible());
        assert!(!panel.notify_movement());
        assert!(panel.is_visible());
    }

    #[test]
    fn manually_hidden_panel_reopens_within_interval() {
        let mut panel = HelpPanel::default();
        run_for(&mut panel, 1.5);
        panel.toggle(ToggleSource::User);
        assert!(!panel.is_visible());

        run_for(&mut panel, 3.4);
        assert!(!panel.is_visible(), "still inside the first interval");
        run_for(&mut panel, 0.2);
        assert!(panel.is_visible());

        // The cycle restarts: movement hides it again.
        assert!(panel.notify_movement());
    }

    #[test]
    fn reopen_never_takes_longer_than_interval() {
        let mut panel = HelpPanel::default();
        run_for(&mut panel, 4.9);
        panel.toggle(ToggleSource::User);
        run_for(&mut panel, 5.0);
        assert!(panel.is_visible());
    }

    #[test]
    fn check_without_latch_leaves_hidden_panel_alone() {
        let mut panel = HelpPanel::default();
        panel.notify_movement();
        run_for(&mut panel, 12.0);
        assert!(!panel.is_visible());
    }

    #[test]
    fn latch_cleared_on_visible_panel_stays_visible() {
        let mut panel = HelpPanel::default();
        panel.toggle(ToggleSource::User);
        panel.toggle(ToggleSource::User);
        assert!(panel.is_visible());
        assert!(!panel.notify_movement(), "latched");
        run_for(&mut panel, 5.5);
        assert!(panel.is_visible());
        assert!(panel.notify_movement(), "latch cleared");
    }

    #[test]
    fn large_step_runs_every_due_check() {
        let mut panel = HelpPanel::new(2.0);
        panel.toggle(ToggleSource::User);
        panel.tick(4.5);
        assert!(panel.is_visible());
        assert!(panel.notify_movement());
    }

    #[test]
    fn zero_interval_is_raised_to_minimum() {
        let mut panel = HelpPanel::new(0.0);
        panel.toggle(ToggleSource::User);
        panel.tick(MIN_LATCH_INTERVAL_SECS * 0.5);
        assert!(!panel.is_visible());
        panel.tick(MIN_LATCH_INTERVAL_SECS * 0.6);
        assert!(panel.is_visible());
    }
}
