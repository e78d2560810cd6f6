//! Countdown display state and frame rendering

use serde::{Deserialize, Serialize};

/// Angle at which the progress arc starts (top of the ring, clockwise)
pub const ARC_START_DEGREES: f32 = -90.0;
const FULL_CIRCLE_DEGREES: f32 = 360.0;

/// Everything needed to draw one frame of the countdown ring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayFrame {
    pub background_sweep: f32,
    pub arc_start: f32,
    pub arc_sweep: f32,
    pub progress: f32,
    pub text: String,
}

/// Stateful countdown view: tracks max/current seconds and the derived progress
#[derive(Debug, Clone)]
pub struct CountdownDisplay {
    max_time: u64,
    current_time: u64,
    progress: f32,
    redraws: u64,
}

impl CountdownDisplay {
    /// Create a display showing a full ring for `max_seconds`
    pub fn new(max_seconds: u64) -> Self {
        Self {
            max_time: max_seconds,
            current_time: max_seconds,
            progress: 1.0,
            redraws: 0,
        }
    }

    /// Set the maximum time; also refills the ring
    pub fn set_max_time(&mut self, seconds: u64) {
        self.max_time = seconds;
        self.current_time = seconds;
        self.progress = 1.0;
        self.invalidate();
    }

    /// Set the current time and recompute progress against the maximum
    pub fn set_current_time(&mut self, seconds: u64) {
        self.current_time = seconds;
        self.progress = if self.max_time == 0 {
            0.0
        } else {
            seconds as f32 / self.max_time as f32
        };
        self.invalidate();
    }

    pub fn max_time(&self) -> u64 {
        self.max_time
    }

    pub fn current_time(&self) -> u64 {
        self.current_time
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Number of redraw requests issued so far
    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    /// Centered "MM:SS" label for the current time
    pub fn time_text(&self) -> String {
        format_mm_ss(self.current_time)
    }

    /// Produce the drawing instructions for the current state
    pub fn render(&self) -> DisplayFrame {
        frame_for(self.current_time, self.progress)
    }

    /// Frame partway through an animated sweep from `from_seconds` to
    /// `to_seconds`; `fraction` is clamped to 0..=1 and the shown second is
    /// truncated. The display state itself is left untouched.
    pub fn frame_between(&self, from_seconds: u64, to_seconds: u64, fraction: f32) -> DisplayFrame {
        let fraction = fraction.clamp(0.0, 1.0);
        let from = from_seconds as f64;
        let value = from + (to_seconds as f64 - from) * fraction as f64;
        let seconds = value.max(0.0) as u64;

        let progress = if self.max_time == 0 {
            0.0
        } else {
            seconds as f32 / self.max_time as f32
        };
        frame_for(seconds, progress)
    }

    /// Evenly spaced frames of a sweep, both endpoints included
    pub fn animation_frames(&self, from_seconds: u64, to_seconds: u64, steps: usize) -> Vec<DisplayFrame> {
        if steps == 0 {
            return vec![self.frame_between(from_seconds, to_seconds, 1.0)];
        }
        (0..=steps)
            .map(|step| self.frame_between(from_seconds, to_seconds, step as f32 / steps as f32))
            .collect()
    }

    fn invalidate(&mut self) {
        self.redraws += 1;
    }
}

fn frame_for(seconds: u64, progress: f32) -> DisplayFrame {
    DisplayFrame {
        background_sweep: FULL_CIRCLE_DEGREES,
        arc_start: ARC_START_DEGREES,
        arc_sweep: FULL_CIRCLE_DEGREES * progress,
        progress,
        text: format_mm_ss(seconds),
    }
}

/// Format whole seconds as "MM:SS"
pub fn format_mm_ss(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_matches_minutes_and_seconds() {
        let mut display = CountdownDisplay::new(25 * 60);
        for seconds in [0, 5, 59, 60, 61, 599, 1500, 3599, 6000] {
            display.set_current_time(seconds);
            let expected = format!("{:02}:{:02}", seconds / 60, seconds % 60);
            assert_eq!(display.time_text(), expected);
        }
        display.set_current_time(65);
        assert_eq!(display.time_text(), "01:05");
    }

    #[test]
    fn progress_runs_from_full_to_empty() {
        let mut display = CountdownDisplay::new(10);
        display.set_max_time(300);
        display.set_current_time(300);
        assert_eq!(display.progress(), 1.0);

        display.set_current_time(150);
        assert_eq!(display.progress(), 0.5);

        display.set_current_time(0);
        assert_eq!(display.progress(), 0.0);
    }

    #[test]
    fn zero_max_time_yields_zero_progress() {
        let mut display = CountdownDisplay::new(0);
        display.set_current_time(0);
        assert_eq!(display.progress(), 0.0);
        assert_eq!(display.render().arc_sweep, 0.0);
    }

    #[test]
    fn set_max_time_refills_ring() {
        let mut display = CountdownDisplay::new(60);
        display.set_current_time(12);
        display.set_max_time(90);
        assert_eq!(display.current_time(), 90);
        assert_eq!(display.progress(), 1.0);
        assert_eq!(display.time_text(), "01:30");
    }

    #[test]
    fn render_starts_arc_at_top() {
        let mut display = CountdownDisplay::new(100);
        display.set_current_time(25);

        let frame = display.render();
        assert_eq!(frame.background_sweep, 360.0);
        assert_eq!(frame.arc_start, -90.0);
        assert_eq!(frame.arc_sweep, 90.0);
        assert_eq!(frame.text, "00:25");
    }

    #[test]
    fn every_setter_requests_a_redraw() {
        let mut display = CountdownDisplay::new(60);
        assert_eq!(display.redraws(), 0);
        display.set_current_time(59);
        display.set_max_time(60);
        assert_eq!(display.redraws(), 2);
    }

    #[test]
    fn sweep_frames_interpolate_between_seconds() {
        let display = CountdownDisplay::new(100);

        let mid = display.frame_between(100, 50, 0.5);
        assert_eq!(mid.text, "01:15");
        assert_eq!(mid.arc_sweep, 270.0);

        // Out-of-range fractions pin to the endpoints
        assert_eq!(display.frame_between(100, 50, -1.0).text, "01:40");
        assert_eq!(display.frame_between(100, 50, 2.0).text, "00:50");

        // Partial seconds are truncated
        assert_eq!(display.frame_between(10, 0, 0.25).text, "00:07");
    }

    #[test]
    fn animation_frames_cover_both_ends_without_redraws() {
        let display = CountdownDisplay::new(60);
        let frames = display.animation_frames(0, 60, 4);

        let texts: Vec<_> = frames.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["00:00", "00:15", "00:30", "00:45", "01:00"]);
        assert_eq!(frames[4].progress, 1.0);
        assert_eq!(display.animation_frames(0, 60, 0).len(), 1);
        assert_eq!(display.redraws(), 0);
        assert_eq!(display.current_time(), 60);
    }
}
