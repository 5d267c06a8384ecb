use crate::config::Config;
use crate::features::blueprint::{BlueprintGrid, GridState};
use crate::features::building::{Building, BuildingState};
use crate::features::crane::{Crane, CraneState};
use crate::features::glow::{GlowState, SkylineGlow};
use crate::features::site::{Site, StarField, Sun, SunState};
use crate::features::trees::{TreeState, Trees};
use crate::features::SceneEntity;
use crate::gfx::camera::{Camera, CameraConfig};
use crate::gfx::draw::DrawContext;
use crate::gfx::math::{Color, Vec2};
use crate::timeline::FrameClock;
use glam::{Quat, Vec3};
use log::debug;
use std::cmp::Ordering;

const AMBIENT: f32 = 0.55;
const DIFFUSE: f32 = 0.45;
const PYRAMID_SIDES: usize = 6;

/// Lambert term on top of a fixed ambient floor.
pub fn shade(color: Color, normal: Vec3, sun: Vec3) -> Color {
    let lambert = normal.dot(sun).max(0.0);
    color.scale(AMBIENT + DIFFUSE * lambert)
}

/// Draws world-space primitives through the camera into a `DrawContext`.
pub struct ScenePainter<'a> {
    draw: &'a mut DrawContext,
    camera: &'a Camera,
    sun: Vec3,
    background: Color,
}

struct Face {
    points: Vec<Vec3>,
    normal: Vec3,
    center: Vec3,
}

impl<'a> ScenePainter<'a> {
    pub fn new(draw: &'a mut DrawContext, camera: &'a Camera, sun: Vec3, background: Color) -> Self {
        Self {
            draw,
            camera,
            sun: sun.normalize_or_zero(),
            background,
        }
    }

    /// Flat rectangle in the XZ plane.
    pub fn ground_quad(&mut self, center: Vec3, size: [f32; 2], color: Color) {
        let (hw, hd) = (size[0] * 0.5, size[1] * 0.5);
        let corners = [
            center + Vec3::new(-hw, 0.0, -hd),
            center + Vec3::new(hw, 0.0, -hd),
            center + Vec3::new(hw, 0.0, hd),
            center + Vec3::new(-hw, 0.0, hd),
        ];
        self.flat(&corners, color);
    }

    pub fn disc(&mut self, center: Vec3, radius: f32, segments: usize, color: Color) {
        let ring: Vec<Vec3> = (0..segments.max(3))
            .map(|i| {
                let a = std::f32::consts::TAU * i as f32 / segments.max(3) as f32;
                center + Vec3::new(a.cos() * radius, 0.0, a.sin() * radius)
            })
            .collect();
        self.flat(&ring, color);
    }

    /// Box around `center`, rotated by `yaw` about the vertical axis.
    pub fn solid_box(&mut self, center: Vec3, size: Vec3, yaw: f32, color: Color) {
        let rot = Quat::from_rotation_y(yaw);
        let h = size * 0.5;
        let corner = |x: f32, y: f32, z: f32| center + rot * Vec3::new(x * h.x, y * h.y, z * h.z);
        let quad = |normal: Vec3, pts: [Vec3; 4]| Face {
            center: (pts[0] + pts[1] + pts[2] + pts[3]) * 0.25,
            normal: rot * normal,
            points: pts.to_vec(),
        };
        let faces = vec![
            quad(Vec3::Y, [corner(-1., 1., -1.), corner(1., 1., -1.), corner(1., 1., 1.), corner(-1., 1., 1.)]),
            quad(Vec3::NEG_Y, [corner(-1., -1., -1.), corner(-1., -1., 1.), corner(1., -1., 1.), corner(1., -1., -1.)]),
            quad(Vec3::X, [corner(1., -1., -1.), corner(1., -1., 1.), corner(1., 1., 1.), corner(1., 1., -1.)]),
            quad(Vec3::NEG_X, [corner(-1., -1., -1.), corner(-1., 1., -1.), corner(-1., 1., 1.), corner(-1., -1., 1.)]),
            quad(Vec3::Z, [corner(-1., -1., 1.), corner(-1., 1., 1.), corner(1., 1., 1.), corner(1., -1., 1.)]),
            quad(Vec3::NEG_Z, [corner(-1., -1., -1.), corner(1., -1., -1.), corner(1., 1., -1.), corner(-1., 1., -1.)]),
        ];
        self.faces(faces, color);
    }

    pub fn wire_box(&mut self, center: Vec3, size: Vec3, width_px: f32, color: Color) {
        let h = size * 0.5;
        let c = |x: f32, y: f32, z: f32| center + Vec3::new(x * h.x, y * h.y, z * h.z);
        let mut edges = Vec::with_capacity(12);
        for y in [-1.0, 1.0] {
            edges.push((c(-1., y, -1.), c(1., y, -1.)));
            edges.push((c(1., y, -1.), c(1., y, 1.)));
            edges.push((c(1., y, 1.), c(-1., y, 1.)));
            edges.push((c(-1., y, 1.), c(-1., y, -1.)));
        }
        for (x, z) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            edges.push((c(x, -1., z), c(x, 1., z)));
        }
        for (a, b) in edges {
            self.line(a, b, width_px, color);
        }
    }

    pub fn line(&mut self, a: Vec3, b: Vec3, width_px: f32, color: Color) {
        if let Some((sa, sb)) = self.camera.project_segment(a, b) {
            let color = self.camera.fogged(color, (a + b) * 0.5, self.background);
            self.draw.line(sa, sb, width_px, color);
        }
    }

    /// Upright pyramid standing on `base_center`.
    pub fn pyramid(&mut self, base_center: Vec3, radius: f32, height: f32, color: Color) {
        let apex = base_center + Vec3::new(0.0, height, 0.0);
        let ring: Vec<Vec3> = (0..PYRAMID_SIDES)
            .map(|i| {
                let a = std::f32::consts::TAU * i as f32 / PYRAMID_SIDES as f32;
                base_center + Vec3::new(a.cos() * radius, 0.0, a.sin() * radius)
            })
            .collect();
        let faces = (0..PYRAMID_SIDES)
            .map(|i| {
                let a = ring[i];
                let b = ring[(i + 1) % PYRAMID_SIDES];
                Face {
                    normal: (apex - a).cross(b - a).normalize_or_zero(),
                    center: (a + b + apex) / 3.0,
                    points: vec![a, apex, b],
                }
            })
            .collect();
        self.faces(faces, color);
    }

    pub fn point(&mut self, at: Vec3, size_px: f32, color: Color) {
        if let Some(p) = self.camera.project(at) {
            let half = size_px * 0.5;
            self.draw.rect(p.x - half, p.y - half, size_px, size_px, color);
        }
    }

    fn flat(&mut self, points: &[Vec3], color: Color) {
        let center = points.iter().copied().sum::<Vec3>() / points.len().max(1) as f32;
        let color = self.camera.fogged(color, center, self.background);
        let projected: Vec<Vec2> = self.camera.project_polygon(points);
        self.draw.polygon(&projected, color);
    }

    // Back faces are culled; the rest are painted far to near.
    fn faces(&mut self, faces: Vec<Face>, color: Color) {
        let eye = self.camera.eye();
        let mut visible: Vec<(f32, Face)> = faces
            .into_iter()
            .filter(|f| f.normal.dot(eye - f.center) > 0.0)
            .map(|f| (self.camera.depth(f.center), f))
            .collect();
        visible.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        for (_, face) in visible {
            let lit = shade(color, face.normal, self.sun);
            let lit = self.camera.fogged(lit, face.center, self.background);
            let projected = self.camera.project_polygon(&face.points);
            self.draw.polygon(&projected, lit);
        }
    }
}

/// Every entity state for one refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneFrame {
    pub clock: FrameClock,
    pub sun: SunState,
    pub grid: GridState,
    pub glow: GlowState,
    pub buildings: Vec<BuildingState>,
    pub cranes: Vec<CraneState>,
    pub trees: Vec<TreeState>,
}

/// Standing props, drawn in depth order after the ground layers.
#[derive(Debug, Clone, Copy)]
pub enum Prop<'f> {
    Building(&'f BuildingState),
    Crane(&'f CraneState),
    Tree(&'f TreeState),
}

impl Prop<'_> {
    pub fn position(&self) -> Vec3 {
        match self {
            Prop::Building(b) => b.position,
            Prop::Crane(c) => c.position,
            Prop::Tree(t) => t.position,
        }
    }

    fn render(&self, painter: &mut ScenePainter) {
        match self {
            Prop::Building(b) => b.render(painter),
            Prop::Crane(c) => c.render(painter),
            Prop::Tree(t) => t.render(painter),
        }
    }
}

impl SceneFrame {
    /// Props sorted far to near from `eye`.
    pub fn props_by_depth(&self, eye: Vec3) -> Vec<Prop<'_>> {
        let mut props: Vec<Prop> = self
            .buildings
            .iter()
            .map(Prop::Building)
            .chain(self.cranes.iter().map(Prop::Crane))
            .chain(self.trees.iter().map(Prop::Tree))
            .collect();
        props.sort_by(|a, b| {
            let da = eye.distance(a.position());
            let db = eye.distance(b.position());
            db.partial_cmp(&da).unwrap_or(Ordering::Equal)
        });
        props
    }
}

pub struct Scene {
    camera: CameraConfig,
    site: Site,
    stars: StarField,
    sun: Sun,
    grid: BlueprintGrid,
    glow: SkylineGlow,
    buildings: Vec<Building>,
    cranes: Vec<Crane>,
    trees: Trees,
}

impl Scene {
    pub fn new(config: &Config) -> Self {
        let windows = &config.windows;
        let scene = Self {
            camera: config.camera.clone(),
            site: Site,
            stars: StarField::new(&config.stars),
            sun: Sun,
            grid: BlueprintGrid::new(windows),
            glow: SkylineGlow::new(windows),
            buildings: config
                .buildings
                .iter()
                .cloned()
                .map(|spec| Building::new(spec, windows))
                .collect(),
            cranes: config.cranes.iter().map(|spec| Crane::new(spec, windows)).collect(),
            trees: Trees::new(&config.trees, windows),
        };
        debug!("Scene entities: {}", scene.entity_names().join(", "));
        scene
    }

    /// Names of the animated entities, one per instance.
    pub fn entity_names(&self) -> Vec<&'static str> {
        let mut names = vec![self.sun.name(), self.grid.name(), self.glow.name()];
        names.extend(self.buildings.iter().map(|b| b.name()));
        names.extend(self.cranes.iter().map(|c| c.name()));
        names.push(self.trees.name());
        names
    }

    pub fn camera(&self, viewport: [f32; 2]) -> Camera {
        Camera::new(&self.camera, viewport)
    }

    pub fn evaluate(&self, clock: &FrameClock) -> SceneFrame {
        SceneFrame {
            clock: *clock,
            sun: self.sun.evaluate(clock),
            grid: self.grid.evaluate(clock),
            glow: self.glow.evaluate(clock),
            buildings: self.buildings.iter().map(|b| b.evaluate(clock)).collect(),
            cranes: self.cranes.iter().map(|c| c.evaluate(clock)).collect(),
            trees: self.trees.evaluate(clock),
        }
    }

    pub fn render(&self, frame: &SceneFrame, painter: &mut ScenePainter) {
        self.stars.render(painter, frame.clock.elapsed_secs);
        self.site.render(painter);
        frame.glow.render(painter);
        self.site.render_roads(painter);
        frame.grid.render(painter);
        for prop in frame.props_by_depth(painter.camera.eye()) {
            prop.render(painter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene::new(&Config::default())
    }

    #[test]
    fn evaluates_every_configured_entity() {
        let frame = scene().evaluate(&FrameClock::at_progress(0.5));
        assert_eq!(frame.buildings.len(), 6);
        assert_eq!(frame.cranes.len(), 2);
        assert_eq!(frame.trees.len(), 8);
    }

    #[test]
    fn lists_entity_instances() {
        let names = scene().entity_names();
        assert_eq!(names.len(), 3 + 6 + 2 + 1);
        assert_eq!(names.iter().filter(|n| **n == "building").count(), 6);
        assert_eq!(names[1], "blueprint-grid");
    }

    #[test]
    fn same_clock_same_frame() {
        let scene = scene();
        let clock = FrameClock { elapsed_secs: 123.4, progress: 0.085 };
        assert_eq!(scene.evaluate(&clock), scene.evaluate(&clock));
    }

    #[test]
    fn props_sort_far_to_near() {
        let scene = scene();
        let frame = scene.evaluate(&FrameClock::at_progress(0.8));
        let eye = scene.camera([1600.0, 900.0]).eye();
        let props = frame.props_by_depth(eye);
        assert_eq!(props.len(), 16);
        for pair in props.windows(2) {
            assert!(eye.distance(pair[0].position()) >= eye.distance(pair[1].position()));
        }
    }

    #[test]
    fn shading_keeps_an_ambient_floor() {
        let white = Color::hex(0xffffff);
        let lit = shade(white, Vec3::Y, Vec3::Y);
        let dark = shade(white, Vec3::NEG_Y, Vec3::Y);
        assert_eq!(lit.r, 1.0);
        assert!((dark.r - AMBIENT).abs() < 1e-6);
        assert_eq!(dark.a, 1.0);
    }
}
