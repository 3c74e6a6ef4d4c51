//! The narrow OpenGL surface the renderer uses.
//!
//! Object handles are raw GL names (`0` means none), so saved bindings can be
//! restored exactly as they were queried.

use std::num::NonZeroU32;

use glow::HasContext;

/// OpenGL calls issued by the renderer.
///
/// Implemented for [`glow::Context`]. Every call must happen on the thread
/// that owns the context.
pub trait GlApi {
    fn get_error(&self) -> u32;
    fn get_integer(&self, pname: u32) -> i32;
    fn get_integer_slice(&self, pname: u32, out: &mut [i32]);
    fn is_enabled(&self, cap: u32) -> bool;
    fn enable(&self, cap: u32);
    fn disable(&self, cap: u32);

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn scissor(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear(&self, mask: u32);
    fn blend_equation(&self, mode: u32);
    fn blend_equation_separate(&self, mode_rgb: u32, mode_alpha: u32);
    fn blend_func(&self, src: u32, dst: u32);
    fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32);

    fn create_shader(&self, kind: u32) -> Result<u32, String>;
    fn shader_source(&self, shader: u32, source: &str);
    fn compile_shader(&self, shader: u32);
    fn shader_compile_status(&self, shader: u32) -> bool;
    fn shader_info_log(&self, shader: u32) -> String;
    fn delete_shader(&self, shader: u32);

    fn create_program(&self) -> Result<u32, String>;
    fn attach_shader(&self, program: u32, shader: u32);
    fn detach_shader(&self, program: u32, shader: u32);
    fn link_program(&self, program: u32);
    fn program_link_status(&self, program: u32) -> bool;
    fn program_info_log(&self, program: u32) -> String;
    fn use_program(&self, program: u32);
    fn delete_program(&self, program: u32);
    fn uniform_location(&self, program: u32, name: &str) -> Option<u32>;
    fn uniform_1_i32(&self, location: u32, value: i32);
    fn uniform_matrix_4(&self, location: u32, matrix: &[f32; 16]);

    fn create_buffer(&self) -> Result<u32, String>;
    fn bind_buffer(&self, target: u32, buffer: u32);
    fn buffer_data(&self, target: u32, data: &[u8], usage: u32);
    fn delete_buffer(&self, buffer: u32);
    fn create_vertex_array(&self) -> Result<u32, String>;
    fn bind_vertex_array(&self, vertex_array: u32);
    fn delete_vertex_array(&self, vertex_array: u32);
    fn enable_vertex_attrib_array(&self, index: u32);
    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );
    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: i32);

    fn create_texture(&self) -> Result<u32, String>;
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, target: u32, texture: u32);
    fn tex_parameter_i32(&self, target: u32, pname: u32, value: i32);
    fn pixel_store_i32(&self, pname: u32, value: i32);
    fn tex_image_2d_rgba(&self, width: i32, height: i32, pixels: &[u8]);
    fn delete_texture(&self, texture: u32);
}

const MAX_QUEUED_ERRORS: usize = 16;

/// Drain the GL error queue, logging every pending error.
///
/// Returns the first error found. A pending error is a programming mistake,
/// so debug builds also assert.
pub fn check_gl_error(gl: &impl GlApi, checkpoint: &str) -> Option<u32> {
    let mut first = None;
    // A lost context keeps reporting errors; don't spin on it.
    for _ in 0..MAX_QUEUED_ERRORS {
        let code = gl.get_error();
        if code == glow::NO_ERROR {
            break;
        }
        log::error!("GL error 0x{code:04X} at {checkpoint}");
        first.get_or_insert(code);
    }
    debug_assert!(first.is_none(), "GL error at {checkpoint}");
    first
}

fn name(id: u32) -> Option<NonZeroU32> {
    NonZeroU32::new(id)
}

// SAFETY for every call below: the renderer only uses the context from the
// thread it is current on, and handles come from the same context.
impl GlApi for glow::Context {
    fn get_error(&self) -> u32 {
        unsafe { HasContext::get_error(self) }
    }

    fn get_integer(&self, pname: u32) -> i32 {
        unsafe { self.get_parameter_i32(pname) }
    }

    fn get_integer_slice(&self, pname: u32, out: &mut [i32]) {
        unsafe { self.get_parameter_i32_slice(pname, out) }
    }

    fn is_enabled(&self, cap: u32) -> bool {
        unsafe { HasContext::is_enabled(self, cap) }
    }

    fn enable(&self, cap: u32) {
        unsafe { HasContext::enable(self, cap) }
    }

    fn disable(&self, cap: u32) {
        unsafe { HasContext::disable(self, cap) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { HasContext::viewport(self, x, y, width, height) }
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { HasContext::scissor(self, x, y, width, height) }
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { HasContext::clear_color(self, r, g, b, a) }
    }

    fn clear(&self, mask: u32) {
        unsafe { HasContext::clear(self, mask) }
    }

    fn blend_equation(&self, mode: u32) {
        unsafe { HasContext::blend_equation(self, mode) }
    }

    fn blend_equation_separate(&self, mode_rgb: u32, mode_alpha: u32) {
        unsafe { HasContext::blend_equation_separate(self, mode_rgb, mode_alpha) }
    }

    fn blend_func(&self, src: u32, dst: u32) {
        unsafe { HasContext::blend_func(self, src, dst) }
    }

    fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
        unsafe { HasContext::blend_func_separate(self, src_rgb, dst_rgb, src_alpha, dst_alpha) }
    }

    fn create_shader(&self, kind: u32) -> Result<u32, String> {
        unsafe { HasContext::create_shader(self, kind).map(|s| s.0.get()) }
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(shader) = name(shader) {
            unsafe { HasContext::shader_source(self, glow::NativeShader(shader), source) }
        }
    }

    fn compile_shader(&self, shader: u32) {
        if let Some(shader) = name(shader) {
            unsafe { HasContext::compile_shader(self, glow::NativeShader(shader)) }
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        name(shader)
            .is_some_and(|s| unsafe { self.get_shader_compile_status(glow::NativeShader(s)) })
    }

    fn shader_info_log(&self, shader: u32) -> String {
        name(shader)
            .map(|s| unsafe { self.get_shader_info_log(glow::NativeShader(s)) })
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        if let Some(shader) = name(shader) {
            unsafe { HasContext::delete_shader(self, glow::NativeShader(shader)) }
        }
    }

    fn create_program(&self) -> Result<u32, String> {
        unsafe { HasContext::create_program(self).map(|p| p.0.get()) }
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let (Some(program), Some(shader)) = (name(program), name(shader)) {
            unsafe {
                HasContext::attach_shader(
                    self,
                    glow::NativeProgram(program),
                    glow::NativeShader(shader),
                )
            }
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let (Some(program), Some(shader)) = (name(program), name(shader)) {
            unsafe {
                HasContext::detach_shader(
                    self,
                    glow::NativeProgram(program),
                    glow::NativeShader(shader),
                )
            }
        }
    }

    fn link_program(&self, program: u32) {
        if let Some(program) = name(program) {
            unsafe { HasContext::link_program(self, glow::NativeProgram(program)) }
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        name(program)
            .is_some_and(|p| unsafe { self.get_program_link_status(glow::NativeProgram(p)) })
    }

    fn program_info_log(&self, program: u32) -> String {
        name(program)
            .map(|p| unsafe { self.get_program_info_log(glow::NativeProgram(p)) })
            .unwrap_or_default()
    }

    fn use_program(&self, program: u32) {
        unsafe { HasContext::use_program(self, name(program).map(glow::NativeProgram)) }
    }

    fn delete_program(&self, program: u32) {
        if let Some(program) = name(program) {
            unsafe { HasContext::delete_program(self, glow::NativeProgram(program)) }
        }
    }

    fn uniform_location(&self, program: u32, uniform: &str) -> Option<u32> {
        let program = name(program)?;
        unsafe { self.get_uniform_location(glow::NativeProgram(program), uniform) }.map(|l| l.0)
    }

    fn uniform_1_i32(&self, location: u32, value: i32) {
        let location = glow::NativeUniformLocation(location);
        unsafe { HasContext::uniform_1_i32(self, Some(&location), value) }
    }

    fn uniform_matrix_4(&self, location: u32, matrix: &[f32; 16]) {
        let location = glow::NativeUniformLocation(location);
        unsafe { self.uniform_matrix_4_f32_slice(Some(&location), false, matrix) }
    }

    fn create_buffer(&self) -> Result<u32, String> {
        unsafe { HasContext::create_buffer(self).map(|b| b.0.get()) }
    }

    fn bind_buffer(&self, target: u32, buffer: u32) {
        unsafe { HasContext::bind_buffer(self, target, name(buffer).map(glow::NativeBuffer)) }
    }

    fn buffer_data(&self, target: u32, data: &[u8], usage: u32) {
        unsafe { self.buffer_data_u8_slice(target, data, usage) }
    }

    fn delete_buffer(&self, buffer: u32) {
        if let Some(buffer) = name(buffer) {
            unsafe { HasContext::delete_buffer(self, glow::NativeBuffer(buffer)) }
        }
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        unsafe { HasContext::create_vertex_array(self).map(|v| v.0.get()) }
    }

    fn bind_vertex_array(&self, vertex_array: u32) {
        unsafe {
            HasContext::bind_vertex_array(self, name(vertex_array).map(glow::NativeVertexArray))
        }
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        if let Some(vertex_array) = name(vertex_array) {
            unsafe { HasContext::delete_vertex_array(self, glow::NativeVertexArray(vertex_array)) }
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { HasContext::enable_vertex_attrib_array(self, index) }
    }

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        unsafe {
            HasContext::vertex_attrib_pointer_f32(
                self, index, size, data_type, normalized, stride, offset,
            )
        }
    }

    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: i32) {
        unsafe { HasContext::draw_elements(self, mode, count, element_type, offset) }
    }

    fn create_texture(&self) -> Result<u32, String> {
        unsafe { HasContext::create_texture(self).map(|t| t.0.get()) }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { HasContext::active_texture(self, unit) }
    }

    fn bind_texture(&self, target: u32, texture: u32) {
        unsafe { HasContext::bind_texture(self, target, name(texture).map(glow::NativeTexture)) }
    }

    fn tex_parameter_i32(&self, target: u32, pname: u32, value: i32) {
        unsafe { HasContext::tex_parameter_i32(self, target, pname, value) }
    }

    fn pixel_store_i32(&self, pname: u32, value: i32) {
        unsafe { HasContext::pixel_store_i32(self, pname, value) }
    }

    fn tex_image_2d_rgba(&self, width: i32, height: i32, pixels: &[u8]) {
        unsafe {
            self.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                width,
                height,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(pixels),
            )
        }
    }

    fn delete_texture(&self, texture: u32) {
        if let Some(texture) = name(texture) {
            unsafe { HasContext::delete_texture(self, glow::NativeTexture(texture)) }
        }
    }
}
