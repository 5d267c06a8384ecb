pub mod anim;
pub mod camera;
pub mod draw;
pub mod font;
pub mod gl;
pub mod math;
pub mod segments;
