//! Scrubber synchronizer
//!
//! Reconciles the host-reported position with the user's drag position.
//! While sliding, the displayed position follows the drag only; the moment
//! sliding ends it follows the host again. Dragging never seeks; release
//! yields exactly one seek target.

/// Drag state and track geometry for the progress bar
#[derive(Debug, Clone, PartialEq)]
pub struct Scrubber {
    sliding: bool,
    local_position_ms: u64,
    /// Measured after layout; `None` until the first measurement
    track_width: Option<f32>,
    thumb_width: f32,
}

impl Scrubber {
    pub fn new(thumb_width: f32) -> Self {
        Self {
            sliding: false,
            local_position_ms: 0,
            track_width: None,
            thumb_width: thumb_width.max(0.0),
        }
    }

    pub fn is_sliding(&self) -> bool {
        self.sliding
    }

    /// `sliding ? local : reported`
    pub fn displayed_position(&self, reported_ms: u64) -> u64 {
        if self.sliding {
            self.local_position_ms
        } else {
            reported_ms
        }
    }

    /// Start a drag, freezing the local position at what is displayed now
    pub fn begin(&mut self, reported_ms: u64) {
        if !self.sliding {
            self.local_position_ms = reported_ms;
            self.sliding = true;
        }
    }

    /// Move the drag; returns `false` when no drag is active
    pub fn drag_to(&mut self, position_ms: u64) -> bool {
        if !self.sliding {
            return false;
        }
        self.local_position_ms = position_ms;
        true
    }

    /// End the drag, yielding the single seek target
    pub fn release(&mut self) -> Option<u64> {
        if !self.sliding {
            return None;
        }
        self.sliding = false;
        Some(self.local_position_ms)
    }

    /// Abandon a drag without seeking (reload, failure)
    pub fn cancel(&mut self) {
        self.sliding = false;
    }

    pub fn set_track_width(&mut self, width: f32) {
        if width.is_finite() && width >= 0.0 {
            self.track_width = Some(width);
        }
    }

    /// Travel available to the thumb's leading edge
    fn travel(&self) -> Option<f32> {
        self.track_width.map(|w| (w - self.thumb_width).max(0.0))
    }

    /// Thumb offset for `position_ms` along a track of known width
    ///
    /// `position / duration * (track - thumb)`, clamped to the track. Zero
    /// until both width and a non-zero duration are known.
    pub fn thumb_offset(&self, position_ms: u64, duration_ms: Option<u64>) -> f32 {
        let (Some(travel), Some(duration)) = (self.travel(), duration_ms) else {
            return 0.0;
        };
        if duration == 0 {
            return 0.0;
        }
        let fraction = position_ms as f64 / duration as f64;
        ((fraction * travel as f64) as f32).clamp(0.0, travel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_follows_host_when_not_sliding() {
        let scrubber = Scrubber::new(16.0);
        for reported in [0, 400, 900, 1_500] {
            assert_eq!(scrubber.displayed_position(reported), reported);
        }
    }

    #[test]
    fn test_drag_freezes_then_reverts() {
        let mut scrubber = Scrubber::new(16.0);
        scrubber.begin(3_000);
        // Host keeps playing underneath the drag
        assert_eq!(scrubber.displayed_position(3_100), 3_000);

        assert!(scrubber.drag_to(7_500));
        assert_eq!(scrubber.displayed_position(3_200), 7_500);

        assert_eq!(scrubber.release(), Some(7_500));
        assert_eq!(scrubber.displayed_position(3_300), 3_300);
    }

    #[test]
    fn test_release_yields_single_target() {
        let mut scrubber = Scrubber::new(16.0);
        scrubber.begin(0);
        for position in (0..=10_000).step_by(250) {
            scrubber.drag_to(position);
        }
        assert_eq!(scrubber.release(), Some(10_000));
        assert_eq!(scrubber.release(), None);
    }

    #[test]
    fn test_drag_without_begin_is_ignored() {
        let mut scrubber = Scrubber::new(16.0);
        assert!(!scrubber.drag_to(500));
        assert_eq!(scrubber.displayed_position(1_200), 1_200);
    }

    #[test]
    fn test_thumb_offset_needs_measured_width() {
        let mut scrubber = Scrubber::new(20.0);
        assert_eq!(scrubber.thumb_offset(5_000, Some(10_000)), 0.0);

        scrubber.set_track_width(220.0);
        assert_eq!(scrubber.thumb_offset(5_000, Some(10_000)), 100.0);
        assert_eq!(scrubber.thumb_offset(0, Some(10_000)), 0.0);
        assert_eq!(scrubber.thumb_offset(10_000, Some(10_000)), 200.0);
    }

    #[test]
    fn test_thumb_offset_clamped() {
        let mut scrubber = Scrubber::new(20.0);
        scrubber.set_track_width(220.0);
        // Position past duration (late report after an asset swap)
        assert_eq!(scrubber.thumb_offset(15_000, Some(10_000)), 200.0);
        assert_eq!(scrubber.thumb_offset(1_000, Some(0)), 0.0);
        assert_eq!(scrubber.thumb_offset(1_000, None), 0.0);

        // Track narrower than the thumb
        scrubber.set_track_width(10.0);
        assert_eq!(scrubber.thumb_offset(5_000, Some(10_000)), 0.0);
    }

    #[test]
    fn test_invalid_width_ignored() {
        let mut scrubber = Scrubber::new(20.0);
        scrubber.set_track_width(f32::NAN);
        scrubber.set_track_width(-1.0);
        assert_eq!(scrubber.thumb_offset(5_000, Some(10_000)), 0.0);

        // A later valid measurement still applies
        scrubber.set_track_width(220.0);
        assert_eq!(scrubber.thumb_offset(5_000, Some(10_000)), 100.0);
    }
}
