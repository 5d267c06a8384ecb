pub mod blueprint;
pub mod building;
pub mod crane;
pub mod glow;
pub mod page;
pub mod site;
pub mod ticker;
pub mod trees;

use crate::timeline::{AnimationWindow, FrameClock};
use serde::{Deserialize, Serialize};

/// Anything below this eased progress is treated as not yet on screen.
pub const VISIBLE_THRESHOLD: f32 = 0.02;

/// A scene object whose render parameters are a pure function of the frame clock.
pub trait SceneEntity {
    type State;

    fn name(&self) -> &'static str;
    fn evaluate(&self, clock: &FrameClock) -> Self::State;
}

/// Per-entity animation windows over loop progress.
///
/// These are independent of the named ticker phases; boundaries that happen
/// to coincide (0.25 for instance) are not linked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityWindows {
    pub blueprint_appear: AnimationWindow,
    pub blueprint_fade: AnimationWindow,
    pub crane_arrive: AnimationWindow,
    pub crane_depart: AnimationWindow,
    pub foundation: AnimationWindow,
    pub skeleton: AnimationWindow,
    pub facade: AnimationWindow,
    pub reset: AnimationWindow,
    pub trees: AnimationWindow,
    pub glow: AnimationWindow,
}

impl Default for EntityWindows {
    fn default() -> Self {
        Self {
            blueprint_appear: AnimationWindow::new(0.05, 0.25),
            blueprint_fade: AnimationWindow::new(0.25, 0.40),
            crane_arrive: AnimationWindow::new(0.32, 0.45),
            crane_depart: AnimationWindow::new(0.70, 0.85),
            foundation: AnimationWindow::new(0.25, 0.43),
            skeleton: AnimationWindow::new(0.43, 0.63),
            facade: AnimationWindow::new(0.63, 0.88),
            reset: AnimationWindow::new(0.90, 1.00),
            trees: AnimationWindow::new(0.70, 0.95),
            glow: AnimationWindow::new(0.65, 0.90),
        }
    }
}
