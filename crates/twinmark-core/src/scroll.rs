//! Proportional scroll mirroring between the two panes.

use twinmark_common::ViewMode;

use crate::platform::{ScrollMetrics, ScrollSurface};

/// Where `from` is scrolled to as a fraction of its range.
pub fn scroll_fraction(from: &ScrollMetrics) -> f64 {
    from.scroll_top / from.scroll_range()
}

/// Offset that puts `to` at the same fraction as `from`.
pub fn mirrored_scroll_top(from: &ScrollMetrics, to: &ScrollMetrics) -> f64 {
    let range = (to.scroll_height - to.client_height).max(0.0);
    (scroll_fraction(from) * range).clamp(0.0, range)
}

/// Mirrors a scroll of one pane onto the other.
///
/// Setting the other pane's offset makes it fire its own scroll notification;
/// the mirror ignores everything until the host reports the next animation
/// frame, so the echo is not bounced back.
#[derive(Debug, Clone)]
pub struct ScrollMirror {
    enabled: bool,
    view_mode: ViewMode,
    syncing: bool,
}

impl ScrollMirror {
    pub fn new(enabled: bool, view_mode: ViewMode) -> Self {
        Self {
            enabled,
            view_mode,
            syncing: false,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.view_mode = view_mode;
    }

    /// Whether a mirrored write is waiting for the next frame.
    pub fn is_syncing(&self) -> bool {
        self.syncing
    }

    /// Handle a scroll of `from`. Returns true if `to` was moved.
    pub fn on_scroll(&mut self, from: &impl ScrollSurface, to: &mut impl ScrollSurface) -> bool {
        if !self.enabled || self.syncing || self.view_mode != ViewMode::Split {
            return false;
        }
        self.syncing = true;
        let top = mirrored_scroll_top(&from.metrics(), &to.metrics());
        to.set_scroll_top(top);
        true
    }

    /// Clears the in-flight flag; call once per rendered frame.
    pub fn on_animation_frame(&mut self) {
        self.syncing = false;
    }
}

impl Default for ScrollMirror {
    fn default() -> Self {
        Self::new(true, ViewMode::Split)
    }
}
