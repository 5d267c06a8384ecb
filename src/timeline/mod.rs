pub mod eval;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use eval::{
    active_phase, ease_in_out_cubic, loop_progress, loop_progress_at, phase_progress,
    window_progress, AnimationWindow, FrameClock,
};

/// Boundaries closer than this are treated as touching.
const CONTIGUITY_TOLERANCE: f32 = 1e-6;

/// A named slice of the construction loop, shown by the ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub label: String,
    pub description: String,
    pub start: f32,
    pub end: f32,
}

impl Phase {
    pub fn new(label: &str, description: &str, start: f32, end: f32) -> Self {
        Self {
            label: label.to_string(),
            description: description.to_string(),
            start,
            end,
        }
    }

    pub fn contains(&self, progress: f32) -> bool {
        progress >= self.start && progress < self.end
    }
}

/// Ordered phase table plus the real-time length of one loop.
///
/// Construction validates the table, so every `Timeline` covers `[0, 1)`
/// with contiguous, non-empty phases.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    loop_duration: Duration,
    phases: Vec<Phase>,
}

impl Timeline {
    pub fn new(loop_duration_secs: f64, phases: Vec<Phase>) -> Result<Self> {
        if !loop_duration_secs.is_finite() || loop_duration_secs <= 0.0 {
            bail!("loop duration must be a positive number of seconds, got {}", loop_duration_secs);
        }
        validate_phases(&phases)?;

        Ok(Self {
            loop_duration: Duration::from_secs_f64(loop_duration_secs),
            phases,
        })
    }

    pub fn loop_duration(&self) -> Duration {
        self.loop_duration
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Phase covering `progress`. Values outside `[0, 1)` land on the tail phase.
    pub fn active_phase(&self, progress: f32) -> &Phase {
        let tail = self.phases.len() - 1;
        active_phase(progress, &self.phases).unwrap_or(&self.phases[tail])
    }

    pub fn phase_index(&self, phase: &Phase) -> usize {
        self.phases
            .iter()
            .position(|p| p == phase)
            .unwrap_or(self.phases.len() - 1)
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            loop_duration: Duration::from_secs_f64(default_loop_duration()),
            phases: default_phases(),
        }
    }
}

pub fn default_loop_duration() -> f64 {
    40.0
}

pub fn default_phases() -> Vec<Phase> {
    vec![
        Phase::new("Site Survey", "Mapping untouched terrain for the master plan", 0.0, 0.15),
        Phase::new("Groundbreaking", "Blueprints approved and the site is cleared", 0.15, 0.30),
        Phase::new("Foundations", "Cranes arrive as podium foundations are poured", 0.30, 0.45),
        Phase::new("Structural Frame", "Steel and concrete rise floor by floor", 0.45, 0.65),
        Phase::new("Facade Glazing", "Smart glass encloses every residence", 0.65, 0.88),
        Phase::new("Skyline Reveal", "Green corridors open onto a luminous skyline", 0.88, 1.0),
    ]
}

fn validate_phases(phases: &[Phase]) -> Result<()> {
    let (Some(first), Some(last)) = (phases.first(), phases.last()) else {
        bail!("timeline needs at least one phase");
    };

    for phase in phases {
        if !(phase.start.is_finite() && phase.end.is_finite()) {
            bail!("phase '{}' has a non-finite boundary", phase.label);
        }
        if phase.start < 0.0 || phase.end > 1.0 {
            bail!(
                "phase '{}' [{}, {}) leaves the [0, 1) loop",
                phase.label, phase.start, phase.end
            );
        }
        if phase.end - phase.start <= 0.0 {
            bail!("phase '{}' has zero or negative width", phase.label);
        }
    }

    if first.start.abs() > CONTIGUITY_TOLERANCE {
        bail!("first phase '{}' starts at {} instead of 0", first.label, first.start);
    }
    if (last.end - 1.0).abs() > CONTIGUITY_TOLERANCE {
        bail!("last phase '{}' ends at {} instead of 1", last.label, last.end);
    }

    for pair in phases.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        let gap = next.start - prev.end;
        if gap > CONTIGUITY_TOLERANCE {
            bail!("gap between '{}' and '{}' ({} .. {})", prev.label, next.label, prev.end, next.start);
        }
        if gap < -CONTIGUITY_TOLERANCE {
            bail!("'{}' overlaps '{}' ({} > {})", prev.label, next.label, prev.end, next.start);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Timeline {
        Timeline::new(
            40.0,
            vec![
                Phase::new("Survey", "", 0.0, 0.25),
                Phase::new("Foundation", "", 0.25, 0.6),
                Phase::new("Skyline", "", 0.6, 1.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn default_timeline_is_valid() {
        let timeline = Timeline::default();
        let rebuilt = Timeline::new(default_loop_duration(), default_phases()).unwrap();
        assert_eq!(timeline, rebuilt);
        assert_eq!(timeline.loop_duration(), Duration::from_secs(40));
    }

    #[test]
    fn every_progress_resolves_to_exactly_one_phase() {
        let timeline = Timeline::default();
        for i in 0..10_000 {
            let p = i as f32 / 10_000.0;
            let matching = timeline.phases().iter().filter(|ph| ph.contains(p)).count();
            assert_eq!(matching, 1, "progress {} matched {} phases", p, matching);
        }
    }

    #[test]
    fn scenario_phase_lookup() {
        let timeline = scenario();
        assert_eq!(timeline.active_phase(0.125).label, "Survey");
        assert_eq!(timeline.active_phase(0.25).label, "Foundation");
        assert_eq!(timeline.active_phase(0.999).label, "Skyline");
    }

    #[test]
    fn out_of_domain_progress_falls_back_to_tail() {
        let timeline = scenario();
        assert_eq!(timeline.active_phase(1.0).label, "Skyline");
        assert_eq!(timeline.active_phase(-0.5).label, "Skyline");
        assert_eq!(timeline.active_phase(f32::NAN).label, "Skyline");
    }

    #[test]
    fn phase_index_follows_list_order() {
        let timeline = scenario();
        let phase = timeline.active_phase(0.3).clone();
        assert_eq!(timeline.phase_index(&phase), 1);
    }

    #[test]
    fn rejects_empty_phase_list() {
        let err = Timeline::new(40.0, vec![]).unwrap_err();
        assert!(err.to_string().contains("at least one phase"));
    }

    #[test]
    fn rejects_bad_loop_duration() {
        assert!(Timeline::new(0.0, default_phases()).is_err());
        assert!(Timeline::new(-3.0, default_phases()).is_err());
        assert!(Timeline::new(f64::INFINITY, default_phases()).is_err());
    }

    #[test]
    fn rejects_gaps() {
        let err = Timeline::new(
            40.0,
            vec![Phase::new("A", "", 0.0, 0.4), Phase::new("B", "", 0.5, 1.0)],
        )
        .unwrap_err();
        assert!(err.to_string().contains("gap"));
    }

    #[test]
    fn rejects_overlaps() {
        let err = Timeline::new(
            40.0,
            vec![Phase::new("A", "", 0.0, 0.6), Phase::new("B", "", 0.5, 1.0)],
        )
        .unwrap_err();
        assert!(err.to_string().contains("overlaps"));
    }

    #[test]
    fn rejects_zero_width_phase() {
        let err = Timeline::new(
            40.0,
            vec![
                Phase::new("A", "", 0.0, 0.5),
                Phase::new("Blink", "", 0.5, 0.5),
                Phase::new("B", "", 0.5, 1.0),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("Blink"));
    }

    #[test]
    fn rejects_partial_coverage() {
        assert!(Timeline::new(40.0, vec![Phase::new("A", "", 0.1, 1.0)]).is_err());
        assert!(Timeline::new(40.0, vec![Phase::new("A", "", 0.0, 0.9)]).is_err());
    }
}
