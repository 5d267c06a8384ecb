use super::{EntityWindows, SceneEntity};
use crate::gfx::math::Color;
use crate::scene::ScenePainter;
use crate::timeline::{AnimationWindow, FrameClock};
use glam::Vec3;

const BASE_OPACITY: f32 = 0.15;
const BOOST: f32 = 0.25;
const RADIUS: f32 = 50.0;
const SEGMENTS: usize = 64;

/// City-light glow on the ground that brightens as towers are clad.
#[derive(Debug, Clone)]
pub struct SkylineGlow {
    appear: AnimationWindow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowState {
    pub opacity: f32,
}

impl SkylineGlow {
    pub fn new(windows: &EntityWindows) -> Self {
        Self { appear: windows.glow }
    }
}

impl SceneEntity for SkylineGlow {
    type State = GlowState;

    fn name(&self) -> &'static str {
        "skyline-glow"
    }

    fn evaluate(&self, clock: &FrameClock) -> GlowState {
        let appear = self.appear.eased(clock.progress);
        GlowState {
            opacity: (BASE_OPACITY + appear * BOOST).clamp(0.0, 1.0),
        }
    }
}

impl GlowState {
    pub fn render(&self, painter: &mut ScenePainter) {
        let color = Color::hex(0x60a5fa).with_alpha(self.opacity);
        painter.disc(Vec3::new(0.0, 0.02, 0.0), RADIUS, SEGMENTS, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opacity_at(p: f32) -> f32 {
        SkylineGlow::new(&EntityWindows::default())
            .evaluate(&FrameClock::at_progress(p))
            .opacity
    }

    #[test]
    fn baseline_before_the_window() {
        assert!((opacity_at(0.1) - 0.15).abs() < 1e-6);
    }

    #[test]
    fn full_boost_after_the_window() {
        assert!((opacity_at(0.95) - 0.40).abs() < 1e-6);
    }

    #[test]
    fn midpoint_is_halfway_between() {
        assert!((opacity_at(0.775) - 0.275).abs() < 1e-3);
    }
}
