use super::SceneEntity;
use crate::gfx::math::Color;
use crate::scene::ScenePainter;
use crate::timeline::FrameClock;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// (edge length, height, colour) drawn bottom to top.
const GROUND_LAYERS: [(f32, f32, u32); 4] = [
    (160.0, 0.0, 0x0e1216),
    (80.0, 0.01, 0x1c2f21),
    (60.0, 0.02, 0x223524),
    (38.0, 0.03, 0x1a2b1d),
];

/// (centre x, centre z, width, depth, colour) at road height.
const ROADS: [(f32, f32, f32, f32, u32); 4] = [
    (0.0, 0.0, 38.0, 6.0, 0x14181f),
    (0.0, 0.0, 6.0, 28.0, 0x14181f),
    (0.0, 0.0, 0.3, 26.0, 0xf8fafc),
    (0.0, 0.0, 30.0, 0.3, 0xf8fafc),
];
const ROAD_HEIGHT: f32 = 0.051;

/// The static plot: layered ground and the road cross. Always visible.
#[derive(Debug, Clone, Default)]
pub struct Site;

impl Site {
    pub fn render(&self, painter: &mut ScenePainter) {
        for (size, y, color) in GROUND_LAYERS {
            painter.ground_quad(Vec3::new(0.0, y, 0.0), [size, size], Color::hex(color));
        }
    }

    pub fn render_roads(&self, painter: &mut ScenePainter) {
        for (i, (x, z, w, d, color)) in ROADS.into_iter().enumerate() {
            let y = ROAD_HEIGHT + i as f32 * 0.002;
            painter.ground_quad(Vec3::new(x, y, z), [w, d], Color::hex(color));
        }
    }
}

/// Key light circling the site; drives face shading.
#[derive(Debug, Clone, Default)]
pub struct Sun;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunState {
    pub position: Vec3,
}

impl SunState {
    pub fn direction(&self) -> Vec3 {
        self.position.normalize_or_zero()
    }
}

impl SceneEntity for Sun {
    type State = SunState;

    fn name(&self) -> &'static str {
        "sun"
    }

    fn evaluate(&self, clock: &FrameClock) -> SunState {
        let t = clock.elapsed_secs * 0.1;
        SunState {
            position: Vec3::new(
                (t.sin() * 40.0) as f32,
                (25.0 + (t * 0.5).sin() * 5.0) as f32,
                (t.cos() * 40.0) as f32,
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StarsConfig {
    pub count: usize,
    pub radius: f32,
    pub seed: u64,
    /// Twinkle cycles per second; 0 freezes the sky.
    pub twinkle_speed: f32,
}

impl Default for StarsConfig {
    fn default() -> Self {
        Self {
            count: 2200,
            radius: 120.0,
            seed: 0x5eed,
            twinkle_speed: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vec3,
    pub brightness: f32,
    pub twinkle_phase: f32,
}

// Dimmest point of a twinkle, relative to the star's base brightness.
const TWINKLE_FLOOR: f32 = 0.6;
// Alpha steps stars are bucketed into so each step is one draw batch.
const ALPHA_LEVELS: usize = 16;

impl Star {
    pub fn brightness_at(&self, elapsed_secs: f64, speed: f32) -> f32 {
        let angle = (elapsed_secs * speed as f64 * std::f64::consts::TAU) as f32 + self.twinkle_phase;
        let wave = 0.5 + 0.5 * angle.sin();
        self.brightness * (TWINKLE_FLOOR + (1.0 - TWINKLE_FLOOR) * wave)
    }
}

/// Night sky scattered once over the upper hemisphere, twinkling with time.
#[derive(Debug, Clone)]
pub struct StarField {
    stars: Vec<Star>,
    twinkle_speed: f32,
}

impl StarField {
    pub fn new(config: &StarsConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let stars = (0..config.count)
            .map(|_| {
                let azimuth = rng.gen_range(0.0..std::f32::consts::TAU);
                // Keep stars above the horizon line.
                let elevation = rng.gen_range(0.05f32..1.0).asin();
                let r = config.radius * rng.gen_range(0.85..1.0);
                Star {
                    position: Vec3::new(
                        r * elevation.cos() * azimuth.cos(),
                        r * elevation.sin(),
                        r * elevation.cos() * azimuth.sin(),
                    ),
                    brightness: rng.gen_range(0.25..1.0),
                    twinkle_phase: rng.gen_range(0.0..std::f32::consts::TAU),
                }
            })
            .collect();
        Self {
            stars,
            twinkle_speed: config.twinkle_speed,
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn render(&self, painter: &mut ScenePainter, elapsed_secs: f64) {
        let mut levels: Vec<Vec<Vec3>> = vec![Vec::new(); ALPHA_LEVELS];
        for star in &self.stars {
            let b = star.brightness_at(elapsed_secs, self.twinkle_speed).clamp(0.0, 1.0);
            levels[(b * (ALPHA_LEVELS - 1) as f32).round() as usize].push(star.position);
        }
        for (level, positions) in levels.iter().enumerate() {
            let alpha = level as f32 / (ALPHA_LEVELS - 1) as f32;
            let color = Color::hex(0xe2e8f0).with_alpha(alpha);
            for &at in positions {
                painter.point(at, 1.5, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_field_is_deterministic_per_seed() {
        let config = StarsConfig::default();
        let a = StarField::new(&config);
        let b = StarField::new(&config);
        assert_eq!(a.stars(), b.stars());
        assert_eq!(a.stars().len(), config.count);
    }

    #[test]
    fn stars_sit_above_the_horizon_within_radius() {
        let config = StarsConfig {
            count: 200,
            radius: 100.0,
            seed: 7,
            ..StarsConfig::default()
        };
        for star in StarField::new(&config).stars() {
            assert!(star.position.y > 0.0);
            assert!(star.position.length() <= 100.0 + 1e-3);
            assert!((0.25..1.0).contains(&star.brightness));
        }
    }

    #[test]
    fn stars_twinkle_within_their_base_brightness() {
        let config = StarsConfig::default();
        let field = StarField::new(&config);
        let star = field.stars()[0];
        let samples: Vec<f32> = (0..50)
            .map(|i| star.brightness_at(i as f64 * 0.1, config.twinkle_speed))
            .collect();
        let lo = samples.iter().copied().fold(f32::MAX, f32::min);
        let hi = samples.iter().copied().fold(f32::MIN, f32::max);
        assert!(lo >= star.brightness * TWINKLE_FLOOR - 1e-5);
        assert!(hi <= star.brightness + 1e-5);
        assert!(hi - lo > star.brightness * 0.2);
    }

    #[test]
    fn stars_do_not_twinkle_in_step() {
        let field = StarField::new(&StarsConfig::default());
        let phases: Vec<f32> = field.stars().iter().take(20).map(|s| s.twinkle_phase).collect();
        assert!(phases.windows(2).any(|w| (w[0] - w[1]).abs() > 0.1));
    }

    #[test]
    fn zero_speed_holds_brightness_steady() {
        let field = StarField::new(&StarsConfig::default());
        let star = field.stars()[3];
        assert_eq!(star.brightness_at(0.0, 0.0), star.brightness_at(37.5, 0.0));
    }

    #[test]
    fn sun_orbits_at_constant_radius() {
        for &t in &[0.0, 7.5, 120.0, 9999.0] {
            let state = Sun.evaluate(&FrameClock { elapsed_secs: t, progress: 0.0 });
            let horizontal = (state.position.x.powi(2) + state.position.z.powi(2)).sqrt();
            assert!((horizontal - 40.0).abs() < 1e-3);
            assert!((20.0..=30.0).contains(&state.position.y));
        }
    }
}
