use super::{Phase, Timeline};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Floor for window widths so zero-width windows never divide by zero.
pub const EPSILON: f32 = 1e-4;

/// Position inside the loop, in `[0, 1)`.
pub fn loop_progress(elapsed_secs: f64, loop_secs: f64) -> f32 {
    if !elapsed_secs.is_finite() || !loop_secs.is_finite() || loop_secs <= 0.0 {
        return 0.0;
    }
    let progress = (elapsed_secs.rem_euclid(loop_secs) / loop_secs) as f32;
    wrap_unit(progress)
}

/// Integer-nanosecond variant of [`loop_progress`]; exact for any uptime.
pub fn loop_progress_at(elapsed: Duration, loop_duration: Duration) -> f32 {
    let period = loop_duration.as_nanos();
    if period == 0 {
        return 0.0;
    }
    let offset = elapsed.as_nanos() % period;
    wrap_unit((offset as f64 / period as f64) as f32)
}

// Rounding can push the f32 result onto 1.0, which is the next loop's start.
fn wrap_unit(progress: f32) -> f32 {
    if (0.0..1.0).contains(&progress) {
        progress
    } else {
        0.0
    }
}

/// First phase containing `progress`, or the last phase when none does.
pub fn active_phase(progress: f32, phases: &[Phase]) -> Option<&Phase> {
    phases
        .iter()
        .find(|phase| phase.contains(progress))
        .or_else(|| phases.last())
}

pub fn phase_progress(progress: f32, phase: &Phase) -> f32 {
    window_progress(progress, phase.start, phase.end)
}

pub fn window_progress(progress: f32, start: f32, end: f32) -> f32 {
    let span = (end - start).max(EPSILON);
    let raw = (progress - start) / span;
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 1.0)
    }
}

pub fn ease_in_out_cubic(x: f32) -> f32 {
    let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
    if x < 0.5 {
        4.0 * x * x * x
    } else {
        1.0 - (-2.0 * x + 2.0).powi(3) / 2.0
    }
}

/// A `[start, end)` ramp over loop progress driving one visual property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationWindow {
    pub start: f32,
    pub end: f32,
}

impl AnimationWindow {
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    pub fn progress(&self, loop_progress: f32) -> f32 {
        window_progress(loop_progress, self.start, self.end)
    }

    pub fn eased(&self, loop_progress: f32) -> f32 {
        ease_in_out_cubic(self.progress(loop_progress))
    }

    /// Same window shifted later by `delay` (desynchronises identical props).
    pub fn delayed(&self, delay: f32) -> Self {
        Self::new(self.start + delay, self.end + delay)
    }
}

/// Derived clock values for one refresh. Built fresh every tick, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    pub elapsed_secs: f64,
    pub progress: f32,
}

impl FrameClock {
    pub fn sample(elapsed: Duration, timeline: &Timeline) -> Self {
        Self {
            elapsed_secs: elapsed.as_secs_f64(),
            progress: loop_progress_at(elapsed, timeline.loop_duration()),
        }
    }

    /// Clock pinned to a loop position, for evaluating a single instant.
    pub fn at_progress(progress: f32) -> Self {
        Self {
            elapsed_secs: 0.0,
            progress,
        }
    }
}
