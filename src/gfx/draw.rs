use super::gl::{ATTR_POS, UNIFORM_COLOR, UNIFORM_VIEWPORT};
use super::math::{Color, Vec2};
use anyhow::Result;
use glow::HasContext;

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
}

/// Batches flat-coloured triangles in pixel space (origin top-left).
///
/// Consecutive primitives sharing a colour go out in one draw call; a colour
/// change flushes the pending batch first.
pub struct DrawContext {
    gl: glow::Context,
    program: glow::Program,
    vbo: glow::Buffer,
    vertices: Vec<Vertex>,
    batch_color: Option<Color>,

    u_viewport: Option<glow::UniformLocation>,
    u_color: Option<glow::UniformLocation>,
    a_pos: Option<u32>,
}

impl DrawContext {
    pub fn new(gl: glow::Context, program: glow::Program) -> Result<Self> {
        let vbo = unsafe {
            gl.create_buffer()
                .map_err(|e| anyhow::anyhow!("Failed to create buffer: {}", e))?
        };

        let u_viewport = unsafe { gl.get_uniform_location(program, UNIFORM_VIEWPORT) };
        let u_color = unsafe { gl.get_uniform_location(program, UNIFORM_COLOR) };
        let a_pos = unsafe { gl.get_attrib_location(program, ATTR_POS) };

        Ok(Self {
            gl,
            program,
            vbo,
            vertices: Vec::with_capacity(4096),
            batch_color: None,
            u_viewport,
            u_color,
            a_pos,
        })
    }

    pub fn begin(&mut self, viewport_px: [f32; 2], clear: Color) {
        self.vertices.clear();
        self.batch_color = None;

        unsafe {
            self.gl.viewport(0, 0, viewport_px[0] as i32, viewport_px[1] as i32);
            self.gl.clear_color(clear.r, clear.g, clear.b, clear.a);
            self.gl.clear(glow::COLOR_BUFFER_BIT);

            self.gl.enable(glow::BLEND);
            self.gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);

            self.gl.use_program(Some(self.program));
            if let Some(loc) = &self.u_viewport {
                self.gl.uniform_2_f32(Some(loc), viewport_px[0], viewport_px[1]);
            }
        }
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let x2 = x + w;
        let y2 = y + h;
        self.triangles(
            color,
            &[[x, y], [x2, y], [x2, y2], [x, y], [x2, y2], [x, y2]],
        );
    }

    /// Convex polygon, fanned from its first point.
    pub fn polygon(&mut self, points: &[Vec2], color: Color) {
        if points.len() < 3 {
            return;
        }
        let mut tris = Vec::with_capacity((points.len() - 2) * 3);
        for i in 1..points.len() - 1 {
            tris.push([points[0].x, points[0].y]);
            tris.push([points[i].x, points[i].y]);
            tris.push([points[i + 1].x, points[i + 1].y]);
        }
        self.triangles(color, &tris);
    }

    pub fn line(&mut self, a: Vec2, b: Vec2, width: f32, color: Color) {
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let len = (dx * dx + dy * dy).sqrt();
        if len < f32::EPSILON {
            return;
        }
        let (nx, ny) = (-dy / len * width * 0.5, dx / len * width * 0.5);
        self.polygon(
            &[
                Vec2::new(a.x + nx, a.y + ny),
                Vec2::new(b.x + nx, b.y + ny),
                Vec2::new(b.x - nx, b.y - ny),
                Vec2::new(a.x - nx, a.y - ny),
            ],
            color,
        );
    }

    fn triangles(&mut self, color: Color, points: &[[f32; 2]]) {
        if color.a <= 0.0 {
            return;
        }
        if self.batch_color != Some(color) {
            self.flush_batch();
            self.set_color(color);
            self.batch_color = Some(color);
        }
        self.vertices.extend(points.iter().map(|&pos| Vertex { pos }));
    }

    fn set_color(&mut self, color: Color) {
        unsafe {
            if let Some(loc) = &self.u_color {
                self.gl.uniform_4_f32(Some(loc), color.r, color.g, color.b, color.a);
            }
        }
    }

    fn flush_batch(&mut self) {
        if self.vertices.is_empty() {
            return;
        }

        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            self.gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&self.vertices),
                glow::DYNAMIC_DRAW,
            );

            if let Some(a_pos) = self.a_pos {
                self.gl.enable_vertex_attrib_array(a_pos);
                self.gl.vertex_attrib_pointer_f32(
                    a_pos,
                    2,
                    glow::FLOAT,
                    false,
                    std::mem::size_of::<Vertex>() as i32,
                    0,
                );
            }

            self.gl.draw_arrays(glow::TRIANGLES, 0, self.vertices.len() as i32);
        }

        self.vertices.clear();
    }

    pub fn flush(&mut self) {
        self.flush_batch();
        self.batch_color = None;
    }
}

impl Drop for DrawContext {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_program(self.program);
        }
    }
}
