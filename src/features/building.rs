use super::{EntityWindows, SceneEntity, VISIBLE_THRESHOLD};
use crate::gfx::math::Color;
use crate::scene::ScenePainter;
use crate::timeline::{AnimationWindow, FrameClock};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Share of the tower height taken by the poured foundation.
const FOUNDATION_RATIO: f32 = 0.25;
/// Foundations never collapse fully; a slab always marks the plot.
const MIN_FOUNDATION_HEIGHT: f32 = 0.04;
const SKELETON_LINE_WIDTH: f32 = 1.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSpec {
    pub position: [f32; 3],
    pub footprint: [f32; 2],
    pub height: f32,
    pub color: Color,
}

impl BuildingSpec {
    fn new(position: [f32; 3], footprint: [f32; 2], height: f32, color: u32) -> Self {
        Self {
            position,
            footprint,
            height,
            color: Color::hex(color),
        }
    }
}

pub fn default_buildings() -> Vec<BuildingSpec> {
    vec![
        BuildingSpec::new([-10.0, 0.0, -4.0], [4.0, 4.0], 9.0, 0x99c4ff),
        BuildingSpec::new([-4.0, 0.0, 2.0], [3.0, 5.0], 12.0, 0xdce6ff),
        BuildingSpec::new([2.0, 0.0, -3.0], [4.4, 4.4], 14.0, 0x9ac7ff),
        BuildingSpec::new([8.0, 0.0, 4.0], [3.6, 3.6], 11.0, 0xf1f5ff),
        BuildingSpec::new([12.0, 0.0, -2.0], [4.5, 3.2], 13.0, 0xb6d6ff),
        BuildingSpec::new([-14.0, 0.0, 5.0], [3.2, 3.0], 10.0, 0x88bbff),
    ]
}

/// One tower going through foundation, frame and cladding, then dissolving.
#[derive(Debug, Clone)]
pub struct Building {
    spec: BuildingSpec,
    foundation: AnimationWindow,
    skeleton: AnimationWindow,
    facade: AnimationWindow,
    reset: AnimationWindow,
}

/// Render parameters for one box of a building, relative to its plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxState {
    pub size: Vec3,
    pub center_y: f32,
    pub opacity: f32,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildingState {
    pub position: Vec3,
    pub color: Color,
    pub foundation: BoxState,
    pub skeleton: BoxState,
    pub facade: BoxState,
}

impl Building {
    pub fn new(spec: BuildingSpec, windows: &EntityWindows) -> Self {
        Self {
            spec,
            foundation: windows.foundation,
            skeleton: windows.skeleton,
            facade: windows.facade,
            reset: windows.reset,
        }
    }
}

impl SceneEntity for Building {
    type State = BuildingState;

    fn name(&self) -> &'static str {
        "building"
    }

    fn evaluate(&self, clock: &FrameClock) -> BuildingState {
        let t = clock.progress;
        let [width, depth] = self.spec.footprint;
        let height = self.spec.height;

        let foundation = self.foundation.eased(t);
        let skeleton = self.skeleton.eased(t);
        let facade = self.facade.eased(t);
        let fade = 1.0 - self.reset.progress(t);

        let foundation_height = (height * FOUNDATION_RATIO * foundation).max(MIN_FOUNDATION_HEIGHT);
        let shell = Vec3::new(width, height, depth);

        BuildingState {
            position: Vec3::from(self.spec.position),
            color: self.spec.color,
            foundation: BoxState {
                size: Vec3::new(width, foundation_height, depth),
                center_y: foundation_height / 2.0,
                opacity: fade,
                visible: true,
            },
            skeleton: BoxState {
                size: shell,
                center_y: height / 2.0,
                opacity: skeleton * fade,
                visible: skeleton > 0.0,
            },
            facade: BoxState {
                size: shell,
                center_y: height / 2.0,
                opacity: facade.min(1.0) * fade,
                visible: facade > VISIBLE_THRESHOLD,
            },
        }
    }
}

impl BuildingState {
    pub fn render(&self, painter: &mut ScenePainter) {
        let at = |b: &BoxState| self.position + Vec3::new(0.0, b.center_y, 0.0);

        if self.foundation.visible && self.foundation.opacity > 0.0 {
            let color = Color::hex(0x8f8a87).with_alpha(self.foundation.opacity);
            painter.solid_box(at(&self.foundation), self.foundation.size, 0.0, color);
        }
        if self.skeleton.visible && self.skeleton.opacity > 0.0 {
            let color = Color::hex(0x9be5ff).with_alpha(self.skeleton.opacity);
            painter.wire_box(at(&self.skeleton), self.skeleton.size, SKELETON_LINE_WIDTH, color);
        }
        if self.facade.visible && self.facade.opacity > 0.0 {
            let color = self.color.with_alpha(self.facade.opacity);
            painter.solid_box(at(&self.facade), self.facade.size, 0.0, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tower() -> Building {
        Building::new(
            BuildingSpec::new([2.0, 0.0, -3.0], [4.4, 4.4], 12.0, 0x9ac7ff),
            &EntityWindows::default(),
        )
    }

    fn at(p: f32) -> BuildingState {
        tower().evaluate(&FrameClock::at_progress(p))
    }

    #[test]
    fn empty_plot_before_foundation() {
        let state = at(0.1);
        assert_eq!(state.foundation.size.y, MIN_FOUNDATION_HEIGHT);
        assert_eq!(state.foundation.opacity, 1.0);
        assert!(!state.skeleton.visible);
        assert!(!state.facade.visible);
    }

    #[test]
    fn foundation_halfway_through_its_window() {
        let state = at(0.34);
        let expected = (12.0 * 0.25 * 0.5f32).max(MIN_FOUNDATION_HEIGHT);
        assert!((state.foundation.size.y - expected).abs() < 1e-3);
        assert!((state.foundation.center_y - expected / 2.0).abs() < 1e-3);
        assert_eq!(state.foundation.size.x, 4.4);
    }

    #[test]
    fn skeleton_then_facade() {
        let framing = at(0.53);
        assert!(framing.skeleton.visible);
        assert!(framing.skeleton.opacity > 0.0 && framing.skeleton.opacity < 1.0);
        assert!(!framing.facade.visible);

        let cladding = at(0.8);
        assert_eq!(cladding.skeleton.opacity, 1.0);
        assert!(cladding.facade.visible);
        assert_eq!(cladding.facade.size, Vec3::new(4.4, 12.0, 4.4));
    }

    #[test]
    fn complete_before_reset() {
        let state = at(0.89);
        assert_eq!(state.foundation.size.y, 3.0);
        assert_eq!(state.foundation.opacity, 1.0);
        assert_eq!(state.skeleton.opacity, 1.0);
        assert_eq!(state.facade.opacity, 1.0);
    }

    #[test]
    fn reset_fades_every_stage_together() {
        let state = at(0.95);
        for stage in [state.foundation, state.skeleton, state.facade] {
            assert!((stage.opacity - 0.5).abs() < 1e-3, "stage opacity {}", stage.opacity);
        }
    }

    #[test]
    fn opacities_stay_in_range_over_the_loop() {
        for i in 0..1000 {
            let state = at(i as f32 / 1000.0);
            for stage in [state.foundation, state.skeleton, state.facade] {
                assert!((0.0..=1.0).contains(&stage.opacity));
            }
        }
    }
}
