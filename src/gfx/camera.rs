use super::math::{Color, Vec2};
use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

const NEAR: f32 = 0.1;
const FAR: f32 = 500.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub look_at: [f32; 3],
    pub fov_degrees: f32,
    pub fog_near: f32,
    pub fog_far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [28.0, 18.0, 28.0],
            look_at: [0.0, 4.0, 0.0],
            fov_degrees: 40.0,
            fog_near: 40.0,
            fog_far: 220.0,
        }
    }
}

/// Fixed perspective camera projecting world space onto the surface in pixels.
#[derive(Debug, Clone)]
pub struct Camera {
    eye: Vec3,
    view_proj: Mat4,
    viewport: [f32; 2],
    fog: (f32, f32),
}

impl Camera {
    pub fn new(config: &CameraConfig, viewport: [f32; 2]) -> Self {
        let eye = Vec3::from(config.position);
        let aspect = if viewport[1] > 0.0 { viewport[0] / viewport[1] } else { 1.0 };
        let view = Mat4::look_at_rh(eye, Vec3::from(config.look_at), Vec3::Y);
        let proj = Mat4::perspective_rh_gl(config.fov_degrees.to_radians(), aspect, NEAR, FAR);
        Self {
            eye,
            view_proj: proj * view,
            viewport,
            fog: (config.fog_near, config.fog_far),
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn depth(&self, point: Vec3) -> f32 {
        self.eye.distance(point)
    }

    /// Screen position of a point, or `None` when it sits behind the near plane.
    pub fn project(&self, point: Vec3) -> Option<Vec2> {
        let clip = self.view_proj * point.extend(1.0);
        if clip.w < NEAR {
            return None;
        }
        Some(self.to_screen(clip))
    }

    /// Projects a planar polygon, clipping it against the near plane first.
    pub fn project_polygon(&self, points: &[Vec3]) -> Vec<Vec2> {
        let clip: Vec<Vec4> = points
            .iter()
            .map(|p| self.view_proj * p.extend(1.0))
            .collect();
        clip_near(&clip)
            .into_iter()
            .map(|c| self.to_screen(c))
            .collect()
    }

    pub fn project_segment(&self, a: Vec3, b: Vec3) -> Option<(Vec2, Vec2)> {
        let mut ca = self.view_proj * a.extend(1.0);
        let mut cb = self.view_proj * b.extend(1.0);
        match (ca.w >= NEAR, cb.w >= NEAR) {
            (false, false) => return None,
            (true, false) => cb = ca.lerp(cb, (NEAR - ca.w) / (cb.w - ca.w)),
            (false, true) => ca = cb.lerp(ca, (NEAR - cb.w) / (ca.w - cb.w)),
            (true, true) => {}
        }
        Some((self.to_screen(ca), self.to_screen(cb)))
    }

    /// Blends `color` toward `background` with distance from the eye.
    pub fn fogged(&self, color: Color, point: Vec3, background: Color) -> Color {
        let (near, far) = self.fog;
        if far <= near {
            return color;
        }
        let t = (self.depth(point) - near) / (far - near);
        color.mix(background, t)
    }

    fn to_screen(&self, clip: Vec4) -> Vec2 {
        let ndc = clip.truncate() / clip.w;
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport[0],
            (1.0 - ndc.y) * 0.5 * self.viewport[1],
        )
    }
}

// Sutherland-Hodgman against w >= NEAR.
fn clip_near(points: &[Vec4]) -> Vec<Vec4> {
    let mut out = Vec::with_capacity(points.len() + 2);
    for (i, &current) in points.iter().enumerate() {
        let next = points[(i + 1) % points.len()];
        let current_in = current.w >= NEAR;
        let next_in = next.w >= NEAR;
        if current_in {
            out.push(current);
        }
        if current_in != next_in {
            let t = (NEAR - current.w) / (next.w - current.w);
            out.push(current.lerp(next, t));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(&CameraConfig::default(), [1600.0, 900.0])
    }

    #[test]
    fn target_projects_to_screen_centre() {
        let cam = camera();
        let p = cam.project(Vec3::new(0.0, 4.0, 0.0)).unwrap();
        assert!((p.x - 800.0).abs() < 0.5);
        assert!((p.y - 450.0).abs() < 0.5);
    }

    #[test]
    fn higher_points_are_higher_on_screen() {
        let cam = camera();
        let low = cam.project(Vec3::new(0.0, 0.0, 0.0)).unwrap();
        let high = cam.project(Vec3::new(0.0, 10.0, 0.0)).unwrap();
        assert!(high.y < low.y);
    }

    #[test]
    fn points_behind_the_eye_are_rejected() {
        let cam = camera();
        assert!(cam.project(Vec3::new(60.0, 18.0, 60.0)).is_none());
    }

    #[test]
    fn polygons_crossing_the_near_plane_are_clipped() {
        let cam = camera();
        let quad = [
            Vec3::new(-80.0, 0.0, -80.0),
            Vec3::new(80.0, 0.0, -80.0),
            Vec3::new(80.0, 0.0, 80.0),
            Vec3::new(-80.0, 0.0, 80.0),
        ];
        let projected = cam.project_polygon(&quad);
        assert!(projected.len() >= 3);
        assert!(projected.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn segments_are_trimmed_at_the_near_plane() {
        let cam = camera();
        let behind = Vec3::new(60.0, 18.0, 60.0);
        let target = Vec3::new(0.0, 4.0, 0.0);
        let (a, b) = cam.project_segment(behind, target).unwrap();
        assert!(a.x.is_finite() && a.y.is_finite());
        assert!((b.x - 800.0).abs() < 0.5);
        assert!(cam.project_segment(behind, Vec3::new(70.0, 18.0, 70.0)).is_none());
    }

    #[test]
    fn fog_grows_with_distance() {
        let cam = camera();
        let white = Color::hex(0xffffff);
        let black = Color::hex(0x000000);
        let near = cam.fogged(white, Vec3::new(20.0, 10.0, 20.0), black);
        let far = cam.fogged(white, Vec3::new(-150.0, 0.0, -150.0), black);
        assert_eq!(near.r, 1.0);
        assert!(far.r < 0.5);
    }
}
