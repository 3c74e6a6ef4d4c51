//! Capture and restore of the global GL state the renderer touches.

use super::gl::GlApi;

/// Snapshot of every piece of GL state a draw batch changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedGlState {
    pub program: i32,
    /// 2D texture bound on unit 0, the unit the image material samples.
    pub texture: i32,
    pub active_texture: i32,
    pub array_buffer: i32,
    pub element_array_buffer: i32,
    pub vertex_array: i32,
    pub blend_src_rgb: i32,
    pub blend_dst_rgb: i32,
    pub blend_src_alpha: i32,
    pub blend_dst_alpha: i32,
    pub blend_equation_rgb: i32,
    pub blend_equation_alpha: i32,
    pub viewport: [i32; 4],
    pub blend: bool,
    pub cull_face: bool,
    pub depth_test: bool,
    pub scissor_test: bool,
}

impl SavedGlState {
    pub fn capture(gl: &impl GlApi) -> Self {
        let mut viewport = [0; 4];
        gl.get_integer_slice(glow::VIEWPORT, &mut viewport);
        // The binding query answers for the active unit only.
        let active_texture = gl.get_integer(glow::ACTIVE_TEXTURE);
        gl.active_texture(glow::TEXTURE0);
        let texture = gl.get_integer(glow::TEXTURE_BINDING_2D);
        gl.active_texture(active_texture as u32);
        Self {
            program: gl.get_integer(glow::CURRENT_PROGRAM),
            texture,
            active_texture,
            array_buffer: gl.get_integer(glow::ARRAY_BUFFER_BINDING),
            element_array_buffer: gl.get_integer(glow::ELEMENT_ARRAY_BUFFER_BINDING),
            vertex_array: gl.get_integer(glow::VERTEX_ARRAY_BINDING),
            blend_src_rgb: gl.get_integer(glow::BLEND_SRC_RGB),
            blend_dst_rgb: gl.get_integer(glow::BLEND_DST_RGB),
            blend_src_alpha: gl.get_integer(glow::BLEND_SRC_ALPHA),
            blend_dst_alpha: gl.get_integer(glow::BLEND_DST_ALPHA),
            blend_equation_rgb: gl.get_integer(glow::BLEND_EQUATION_RGB),
            blend_equation_alpha: gl.get_integer(glow::BLEND_EQUATION_ALPHA),
            viewport,
            blend: gl.is_enabled(glow::BLEND),
            cull_face: gl.is_enabled(glow::CULL_FACE),
            depth_test: gl.is_enabled(glow::DEPTH_TEST),
            scissor_test: gl.is_enabled(glow::SCISSOR_TEST),
        }
    }

    pub fn restore(&self, gl: &impl GlApi) {
        gl.use_program(self.program as u32);
        gl.active_texture(glow::TEXTURE0);
        gl.bind_texture(glow::TEXTURE_2D, self.texture as u32);
        gl.active_texture(self.active_texture as u32);
        gl.bind_vertex_array(self.vertex_array as u32);
        gl.bind_buffer(glow::ARRAY_BUFFER, self.array_buffer as u32);
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, self.element_array_buffer as u32);
        gl.blend_equation_separate(self.blend_equation_rgb as u32, self.blend_equation_alpha as u32);
        gl.blend_func_separate(
            self.blend_src_rgb as u32,
            self.blend_dst_rgb as u32,
            self.blend_src_alpha as u32,
            self.blend_dst_alpha as u32,
        );
        set_capability(gl, glow::BLEND, self.blend);
        set_capability(gl, glow::CULL_FACE, self.cull_face);
        set_capability(gl, glow::DEPTH_TEST, self.depth_test);
        set_capability(gl, glow::SCISSOR_TEST, self.scissor_test);
        let [x, y, width, height] = self.viewport;
        gl.viewport(x, y, width, height);
    }
}

fn set_capability(gl: &impl GlApi, cap: u32, enabled: bool) {
    if enabled {
        gl.enable(cap);
    } else {
        gl.disable(cap);
    }
}

/// Restores the captured state when dropped, on every exit path.
pub struct GlStateGuard<'g, G: GlApi> {
    gl: &'g G,
    saved: SavedGlState,
}

impl<'g, G: GlApi> GlStateGuard<'g, G> {
    pub fn new(gl: &'g G) -> Self {
        Self {
            gl,
            saved: SavedGlState::capture(gl),
        }
    }

    pub fn saved(&self) -> &SavedGlState {
        &self.saved
    }
}

impl<G: GlApi> Drop for GlStateGuard<'_, G> {
    fn drop(&mut self) {
        self.saved.restore(self.gl);
    }
}
