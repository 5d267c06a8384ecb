use super::{EntityWindows, SceneEntity};
use crate::gfx::math::Color;
use crate::scene::ScenePainter;
use crate::timeline::{AnimationWindow, FrameClock};
use glam::Vec3;
use std::f64::consts::TAU;

const GRID_SIZE: f32 = 70.0;
const GRID_DIVISIONS: usize = 70;
const GRID_HEIGHT: f32 = 0.04;
const SPIN_RATE: f64 = 0.1;

/// Survey grid that fades in over the bare site, then out as digging starts.
#[derive(Debug, Clone)]
pub struct BlueprintGrid {
    appear: AnimationWindow,
    fade: AnimationWindow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridState {
    pub opacity: f32,
    pub rotation: f32,
}

impl BlueprintGrid {
    pub fn new(windows: &EntityWindows) -> Self {
        Self {
            appear: windows.blueprint_appear,
            fade: windows.blueprint_fade,
        }
    }
}

impl SceneEntity for BlueprintGrid {
    type State = GridState;

    fn name(&self) -> &'static str {
        "blueprint-grid"
    }

    fn evaluate(&self, clock: &FrameClock) -> GridState {
        let appear = self.appear.eased(clock.progress);
        let fade = self.fade.progress(clock.progress);
        GridState {
            opacity: (appear * (1.0 - fade)).clamp(0.0, 1.0),
            // Spins with wall time, not loop time.
            rotation: (clock.elapsed_secs * SPIN_RATE).rem_euclid(TAU) as f32,
        }
    }
}

impl GridState {
    pub fn render(&self, painter: &mut ScenePainter) {
        if self.opacity <= 0.0 {
            return;
        }
        let color = Color::hex(0x2ddafc).with_alpha(self.opacity);
        let half = GRID_SIZE * 0.5;
        let (sin, cos) = self.rotation.sin_cos();
        let rotate = |x: f32, z: f32| Vec3::new(x * cos + z * sin, GRID_HEIGHT, -x * sin + z * cos);

        for i in 0..=GRID_DIVISIONS {
            let offset = -half + GRID_SIZE * i as f32 / GRID_DIVISIONS as f32;
            painter.line(rotate(offset, -half), rotate(offset, half), 1.0, color);
            painter.line(rotate(-half, offset), rotate(half, offset), 1.0, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> BlueprintGrid {
        BlueprintGrid::new(&EntityWindows::default())
    }

    #[test]
    fn hidden_before_survey() {
        let state = grid().evaluate(&FrameClock::at_progress(0.02));
        assert_eq!(state.opacity, 0.0);
    }

    #[test]
    fn fully_visible_between_windows() {
        let state = grid().evaluate(&FrameClock::at_progress(0.25));
        assert!((state.opacity - 1.0).abs() < 1e-5);
    }

    #[test]
    fn combined_opacity_is_appear_times_remaining() {
        // appear is complete, fade is halfway
        let state = grid().evaluate(&FrameClock::at_progress(0.325));
        assert!((state.opacity - 0.5).abs() < 1e-3);
        let state = grid().evaluate(&FrameClock::at_progress(0.6));
        assert_eq!(state.opacity, 0.0);
    }

    #[test]
    fn rotation_follows_wall_time() {
        let clock = FrameClock { elapsed_secs: 5.0, progress: 0.1 };
        let state = grid().evaluate(&clock);
        assert!((state.rotation - 0.5).abs() < 1e-6);

        let clock = FrameClock { elapsed_secs: 1.0e9, progress: 0.1 };
        let state = grid().evaluate(&clock);
        assert!((0.0..std::f32::consts::TAU + 1e-4).contains(&state.rotation));
    }
}
