//! Controls visibility timer
//!
//! Debounced auto-hide for the overlay controls. Showing the controls starts
//! a countdown (2.5 s by default); any new interaction restarts it, and a
//! drag holds the controls up until release. Opacity is a function of elapsed
//! time since the last fade began, so the animation runs at the same speed
//! whatever the render rate.
//!
//! The countdown is a plain deadline. The session loop sleeps until
//! `deadline()` and calls `expire`; nothing here spawns a timer, so clearing
//! the deadline is all it takes to cancel one.

use lesson_common::FadeCurve;
use std::time::Duration;
use tokio::time::Instant;

/// One opacity animation between two levels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpacityFade {
    from: f32,
    to: f32,
    started_at: Instant,
    duration: Duration,
    curve: FadeCurve,
}

impl OpacityFade {
    /// A fade that has already settled at `level`
    pub fn settled(level: f32, now: Instant, curve: FadeCurve) -> Self {
        Self {
            from: level,
            to: level,
            started_at: now,
            duration: Duration::ZERO,
            curve,
        }
    }

    pub fn new(
        from: f32,
        to: f32,
        started_at: Instant,
        duration: Duration,
        curve: FadeCurve,
    ) -> Self {
        Self {
            from,
            to,
            started_at,
            duration,
            curve,
        }
    }

    /// Opacity at `now` (0.0 = hidden, 1.0 = fully shown)
    pub fn opacity_at(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.curve.interpolate(self.from, self.to, t)
    }

    pub fn is_settled(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= self.duration
    }

    pub fn target(&self) -> f32 {
        self.to
    }
}

/// Auto-hide state for the overlay controls
#[derive(Debug, Clone)]
pub struct ControlsVisibility {
    hide_delay: Duration,
    fade_duration: Duration,
    curve: FadeCurve,
    visible: bool,
    /// Held up by an active drag; no countdown runs while held
    held: bool,
    deadline: Option<Instant>,
    fade: OpacityFade,
}

impl ControlsVisibility {
    /// Start hidden; the session shows the controls on mount
    pub fn new(
        hide_delay: Duration,
        fade_duration: Duration,
        curve: FadeCurve,
        now: Instant,
    ) -> Self {
        Self {
            hide_delay,
            fade_duration,
            curve,
            visible: false,
            held: false,
            deadline: None,
            fade: OpacityFade::settled(0.0, now, curve),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// When the pending auto-hide fires, if one is pending
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn opacity(&self, now: Instant) -> f32 {
        self.fade.opacity_at(now)
    }

    pub fn fade(&self) -> &OpacityFade {
        &self.fade
    }

    /// Fade in (if hidden) and restart the countdown
    pub fn show(&mut self, now: Instant) {
        if !self.visible {
            self.visible = true;
            self.start_fade(1.0, now);
        }
        self.restart_countdown(now);
    }

    /// Fade out and drop any pending countdown
    pub fn hide(&mut self, now: Instant) {
        self.deadline = None;
        if self.visible {
            self.visible = false;
            self.start_fade(0.0, now);
        }
    }

    /// User tapped the video surface
    ///
    /// Hidden controls appear; visible ones hide. A tap during a drag changes
    /// nothing. Returns the visibility after the tap.
    pub fn tap(&mut self, now: Instant) -> bool {
        if self.held {
            return self.visible;
        }
        if self.visible {
            self.hide(now);
        } else {
            self.show(now);
        }
        self.visible
    }

    /// Any other control interaction (play toggle, skip, fullscreen)
    pub fn touch(&mut self, now: Instant) {
        self.show(now);
    }

    /// Keep the controls up for the duration of a drag
    pub fn hold(&mut self, now: Instant) {
        self.show(now);
        self.held = true;
        self.deadline = None;
    }

    /// Drag ended; the countdown starts over from now
    pub fn release(&mut self, now: Instant) {
        if self.held {
            self.held = false;
            self.restart_countdown(now);
        }
    }

    /// Hide if the countdown has run out; returns `true` when it fired
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.hide(now);
                true
            }
            _ => false,
        }
    }

    /// Clear the countdown without changing visibility (teardown, reset)
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.held = false;
    }

    fn restart_countdown(&mut self, now: Instant) {
        if !self.held {
            self.deadline = Some(now + self.hide_delay);
        }
    }

    fn start_fade(&mut self, to: f32, now: Instant) {
        // Reversing mid-fade starts from the current level, not the end point
        let from = self.fade.opacity_at(now);
        self.fade = OpacityFade::new(from, to, now, self.fade_duration, self.curve);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(2500);
    const FADE: Duration = Duration::from_millis(300);

    fn controls(now: Instant) -> ControlsVisibility {
        ControlsVisibility::new(DELAY, FADE, FadeCurve::Linear, now)
    }

    #[test]
    fn test_show_starts_countdown() {
        let t0 = Instant::now();
        let mut c = controls(t0);
        assert!(!c.is_visible());
        assert_eq!(c.deadline(), None);

        c.show(t0);
        assert!(c.is_visible());
        assert_eq!(c.deadline(), Some(t0 + DELAY));
    }

    #[test]
    fn test_expire_only_after_deadline() {
        let t0 = Instant::now();
        let mut c = controls(t0);
        assert!(c.tap(t0));

        assert!(!c.expire(t0 + Duration::from_millis(2499)));
        assert!(c.is_visible());
        assert!(c.expire(t0 + DELAY));
        assert!(!c.is_visible());
        assert_eq!(c.deadline(), None);

        // Stays hidden: nothing left to expire
        assert!(!c.expire(t0 + Duration::from_secs(60)));
        assert!(!c.is_visible());
    }

    #[test]
    fn test_tap_toggles() {
        let t0 = Instant::now();
        let mut c = controls(t0);
        assert!(c.tap(t0));
        assert!(!c.tap(t0 + Duration::from_millis(500)));
        assert_eq!(c.deadline(), None);
    }

    #[test]
    fn test_interaction_restarts_countdown() {
        let t0 = Instant::now();
        let mut c = controls(t0);
        c.show(t0);

        let t1 = t0 + Duration::from_millis(2000);
        c.touch(t1);
        assert_eq!(c.deadline(), Some(t1 + DELAY));
        assert!(!c.expire(t0 + DELAY));
        assert!(c.is_visible());
    }

    #[test]
    fn test_drag_holds_controls() {
        let t0 = Instant::now();
        let mut c = controls(t0);
        c.hold(t0);
        assert!(c.is_visible());
        assert_eq!(c.deadline(), None);

        // Tapping mid-drag neither hides nor restarts anything
        assert!(c.tap(t0 + Duration::from_secs(1)));
        assert_eq!(c.deadline(), None);
        assert!(!c.expire(t0 + Duration::from_secs(10)));

        let t_release = t0 + Duration::from_secs(10);
        c.release(t_release);
        assert!(!c.is_held());
        assert_eq!(c.deadline(), Some(t_release + DELAY));
    }

    #[test]
    fn test_opacity_follows_elapsed_time() {
        let t0 = Instant::now();
        let mut c = controls(t0);
        assert_eq!(c.opacity(t0), 0.0);

        c.show(t0);
        assert_eq!(c.opacity(t0), 0.0);
        assert!((c.opacity(t0 + Duration::from_millis(150)) - 0.5).abs() < 1e-4);
        assert_eq!(c.opacity(t0 + FADE), 1.0);
        assert_eq!(c.opacity(t0 + Duration::from_secs(5)), 1.0);
        assert!(c.fade().is_settled(t0 + FADE));
    }

    #[test]
    fn test_reversal_starts_from_current_level() {
        let t0 = Instant::now();
        let mut c = controls(t0);
        c.show(t0);

        let mid = t0 + Duration::from_millis(150);
        c.hide(mid);
        assert!((c.opacity(mid) - 0.5).abs() < 1e-4);
        assert_eq!(c.fade().target(), 0.0);
        assert_eq!(c.opacity(mid + FADE), 0.0);
    }

    #[test]
    fn test_cancel_clears_countdown() {
        let t0 = Instant::now();
        let mut c = controls(t0);
        c.show(t0);
        c.cancel();
        assert_eq!(c.deadline(), None);
        assert!(!c.expire(t0 + Duration::from_secs(10)));
        assert!(c.is_visible());
    }
}
