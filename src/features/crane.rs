use super::{EntityWindows, SceneEntity, VISIBLE_THRESHOLD};
use crate::gfx::math::Color;
use crate::scene::ScenePainter;
use crate::timeline::{AnimationWindow, FrameClock};
use glam::Vec3;
use serde::{Deserialize, Serialize};

const MAST_HEIGHT: f32 = 9.0;
const BOOM_LENGTH: f32 = 9.0;
const BOOM_SWING: f32 = 0.4;
const BOOM_RATE: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraneSpec {
    pub position: [f32; 3],
    /// Loop-progress offset applied to both windows.
    #[serde(default)]
    pub delay: f32,
}

pub fn default_cranes() -> Vec<CraneSpec> {
    vec![
        CraneSpec { position: [-12.0, 0.0, -2.0], delay: 0.0 },
        CraneSpec { position: [10.0, 0.0, 6.0], delay: 0.05 },
    ]
}

#[derive(Debug, Clone)]
pub struct Crane {
    position: Vec3,
    arrive: AnimationWindow,
    depart: AnimationWindow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CraneState {
    pub position: Vec3,
    pub active: f32,
    pub visible: bool,
    pub boom_yaw: f32,
}

impl Crane {
    pub fn new(spec: &CraneSpec, windows: &EntityWindows) -> Self {
        Self {
            position: Vec3::from(spec.position),
            arrive: windows.crane_arrive.delayed(spec.delay),
            depart: windows.crane_depart.delayed(spec.delay),
        }
    }
}

impl SceneEntity for Crane {
    type State = CraneState;

    fn name(&self) -> &'static str {
        "crane"
    }

    fn evaluate(&self, clock: &FrameClock) -> CraneState {
        let arrive = self.arrive.eased(clock.progress);
        let remaining = 1.0 - self.depart.progress(clock.progress);
        let active = (arrive * remaining).clamp(0.0, 1.0);
        CraneState {
            position: self.position,
            active,
            visible: active > VISIBLE_THRESHOLD,
            boom_yaw: ((clock.elapsed_secs * BOOM_RATE).sin() as f32) * BOOM_SWING,
        }
    }
}

impl CraneState {
    pub fn render(&self, painter: &mut ScenePainter) {
        if !self.visible {
            return;
        }
        let base = self.position;
        painter.solid_box(
            base + Vec3::new(0.0, 0.12, 0.0),
            Vec3::new(1.2, 0.24, 1.2),
            0.0,
            Color::hex(0x1e1e1e),
        );
        painter.solid_box(
            base + Vec3::new(0.0, MAST_HEIGHT / 2.0, 0.0),
            Vec3::new(0.25, MAST_HEIGHT, 0.25),
            0.0,
            Color::hex(0xfbbf24),
        );
        painter.solid_box(
            base + Vec3::new(0.0, MAST_HEIGHT, 0.0),
            Vec3::new(0.25, 0.25, BOOM_LENGTH),
            self.boom_yaw,
            Color::hex(0xfacc15),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crane(delay: f32) -> Crane {
        Crane::new(
            &CraneSpec { position: [0.0, 0.0, 0.0], delay },
            &EntityWindows::default(),
        )
    }

    #[test]
    fn absent_during_survey() {
        let state = crane(0.0).evaluate(&FrameClock::at_progress(0.2));
        assert_eq!(state.active, 0.0);
        assert!(!state.visible);
    }

    #[test]
    fn on_site_between_arrival_and_departure() {
        let state = crane(0.0).evaluate(&FrameClock::at_progress(0.55));
        assert_eq!(state.active, 1.0);
        assert!(state.visible);
    }

    #[test]
    fn gone_after_departure() {
        let state = crane(0.0).evaluate(&FrameClock::at_progress(0.9));
        assert_eq!(state.active, 0.0);
        assert!(!state.visible);
    }

    #[test]
    fn delay_desynchronises_identical_cranes() {
        let clock = FrameClock::at_progress(0.36);
        let early = crane(0.0).evaluate(&clock);
        let late = crane(0.05).evaluate(&clock);
        assert!(early.visible);
        assert!(!late.visible);

        // The delayed crane is still packing up after the first has left.
        let clock = FrameClock::at_progress(0.86);
        assert!(!crane(0.0).evaluate(&clock).visible);
        assert!(crane(0.05).evaluate(&clock).visible);
    }

    #[test]
    fn boom_swings_with_wall_time() {
        let clock = FrameClock { elapsed_secs: 0.0, progress: 0.5 };
        assert_eq!(crane(0.0).evaluate(&clock).boom_yaw, 0.0);

        let quarter_turn = std::f64::consts::FRAC_PI_2 / BOOM_RATE;
        let clock = FrameClock { elapsed_secs: quarter_turn, progress: 0.5 };
        assert!((crane(0.0).evaluate(&clock).boom_yaw - BOOM_SWING).abs() < 1e-5);
    }
}
