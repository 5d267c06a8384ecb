use anyhow::{anyhow, bail, Result};
use glow::HasContext;

pub const SCENE_VERT: &str = include_str!("../../assets/shaders/scene.vert.glsl");
pub const SCENE_FRAG: &str = include_str!("../../assets/shaders/scene.frag.glsl");

/// Vertex position in surface pixels.
pub const ATTR_POS: &str = "aPos";
/// Surface size in pixels, for the pixel to NDC mapping.
pub const UNIFORM_VIEWPORT: &str = "uViewport";
/// Flat RGBA of the current batch.
pub const UNIFORM_COLOR: &str = "uColor";

/// Builds the flat-colour scene program from the bundled GLSL sources.
///
/// Every shader created along the way is released before returning,
/// whether or not the program links.
pub fn load_scene_program(gl: &glow::Context) -> Result<glow::Program> {
    let stages = [
        (glow::VERTEX_SHADER, SCENE_VERT, "vertex"),
        (glow::FRAGMENT_SHADER, SCENE_FRAG, "fragment"),
    ];
    let mut shaders = Vec::with_capacity(stages.len());
    let mut result = Ok(());
    for (kind, source, stage) in stages {
        match unsafe { compile_stage(gl, kind, source) } {
            Ok(shader) => shaders.push(shader),
            Err(e) => {
                result = Err(e.context(format!("scene {} shader", stage)));
                break;
            }
        }
    }

    let program = match result {
        Ok(()) => unsafe { link(gl, &shaders) },
        Err(e) => Err(e),
    };
    for shader in shaders {
        unsafe { gl.delete_shader(shader) };
    }
    program
}

unsafe fn compile_stage(gl: &glow::Context, kind: u32, source: &str) -> Result<glow::Shader> {
    let shader = gl.create_shader(kind).map_err(|e| anyhow!("glCreateShader: {}", e))?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);
    if !gl.get_shader_compile_status(shader) {
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        bail!("compile failed: {}", log.trim());
    }
    Ok(shader)
}

unsafe fn link(gl: &glow::Context, shaders: &[glow::Shader]) -> Result<glow::Program> {
    let program = gl.create_program().map_err(|e| anyhow!("glCreateProgram: {}", e))?;
    for &shader in shaders {
        gl.attach_shader(program, shader);
    }
    gl.link_program(program);
    let linked = gl.get_program_link_status(program);
    for &shader in shaders {
        gl.detach_shader(program, shader);
    }
    if !linked {
        let log = gl.get_program_info_log(program);
        gl.delete_program(program);
        bail!("scene program link failed: {}", log.trim());
    }
    Ok(program)
}
