use super::{EntityWindows, SceneEntity, VISIBLE_THRESHOLD};
use crate::gfx::math::Color;
use crate::scene::ScenePainter;
use crate::timeline::{AnimationWindow, FrameClock};
use glam::Vec3;

pub fn default_tree_positions() -> Vec<[f32; 3]> {
    vec![
        [-16.0, 0.0, -6.0],
        [-12.0, 0.0, 10.0],
        [-6.0, 0.0, 14.0],
        [6.0, 0.0, 15.0],
        [12.0, 0.0, -8.0],
        [16.0, 0.0, 8.0],
        [4.0, 0.0, -14.0],
        [-4.0, 0.0, -12.0],
    ]
}

/// Landscaping planted once the towers are clad. Every tree shares one window.
#[derive(Debug, Clone)]
pub struct Trees {
    positions: Vec<Vec3>,
    appear: AnimationWindow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeState {
    pub position: Vec3,
    pub scale: f32,
    pub visible: bool,
}

impl Trees {
    pub fn new(positions: &[[f32; 3]], windows: &EntityWindows) -> Self {
        Self {
            positions: positions.iter().copied().map(Vec3::from).collect(),
            appear: windows.trees,
        }
    }
}

impl SceneEntity for Trees {
    type State = Vec<TreeState>;

    fn name(&self) -> &'static str {
        "trees"
    }

    fn evaluate(&self, clock: &FrameClock) -> Vec<TreeState> {
        let appear = self.appear.eased(clock.progress);
        self.positions
            .iter()
            .map(|&position| TreeState {
                position,
                scale: appear,
                visible: appear > VISIBLE_THRESHOLD,
            })
            .collect()
    }
}

impl TreeState {
    pub fn render(&self, painter: &mut ScenePainter) {
        if !self.visible {
            return;
        }
        let s = self.scale;
        painter.solid_box(
            self.position + Vec3::new(0.0, 0.6 * s, 0.0),
            Vec3::new(0.3, 1.4, 0.3) * s,
            0.0,
            Color::hex(0x4f3d30),
        );
        painter.pyramid(
            self.position + Vec3::new(0.0, 0.8 * s, 0.0),
            0.8 * s,
            1.6 * s,
            Color::hex(0x3b8250),
        );
    }
}
