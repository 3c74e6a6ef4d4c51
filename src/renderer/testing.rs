//! A GL implementation that models binding state and records calls.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use raw_window_handle::{
    HandleError, HasWindowHandle, RawWindowHandle, WebWindowHandle, WindowHandle,
};

use super::gl::GlApi;
use crate::error::Result;
use crate::geometry::{Point, Size};
use crate::platform::{GlContextProvider, Window};

#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    Enable(u32),
    Disable(u32),
    ClearColor([f32; 4]),
    Clear(u32),
    UseProgram(u32),
    BindTexture(u32),
    Scissor(i32, i32, i32, i32),
    BufferData { target: u32, len: usize, usage: u32 },
    DrawElements { count: i32, offset: i32 },
    TexImage { width: i32, height: i32, len: usize },
    DeleteProgram(u32),
    DeleteBuffer(u32),
    DeleteVertexArray(u32),
    DeleteTexture(u32),
}

#[derive(Debug, Default)]
struct State {
    program: u32,
    /// 2D binding per texture unit.
    textures: HashMap<u32, u32>,
    active_texture: u32,
    unpack_alignment: i32,
    array_buffer: u32,
    element_array_buffer: u32,
    vertex_array: u32,
    blend_src_rgb: u32,
    blend_dst_rgb: u32,
    blend_src_alpha: u32,
    blend_dst_alpha: u32,
    blend_equation_rgb: u32,
    blend_equation_alpha: u32,
    viewport: [i32; 4],
    enabled: HashSet<u32>,
    live: HashSet<u32>,
}

pub struct FakeGl {
    state: RefCell<State>,
    calls: RefCell<Vec<GlCall>>,
    next_name: Cell<u32>,
    compiles_left: Cell<Option<usize>>,
}

impl FakeGl {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State {
                active_texture: glow::TEXTURE0,
                unpack_alignment: 4,
                blend_src_rgb: glow::ONE,
                blend_src_alpha: glow::ONE,
                blend_equation_rgb: glow::FUNC_ADD,
                blend_equation_alpha: glow::FUNC_ADD,
                ..State::default()
            }),
            calls: RefCell::new(Vec::new()),
            next_name: Cell::new(1),
            compiles_left: Cell::new(None),
        }
    }

    /// Pretend another library left its own state bound.
    pub fn set_foreign_state(&self) {
        let mut state = self.state.borrow_mut();
        state.program = 77;
        state.textures = [(glow::TEXTURE0, 5), (glow::TEXTURE3, 7)].into_iter().collect();
        state.active_texture = glow::TEXTURE3;
        state.unpack_alignment = 8;
        state.array_buffer = 11;
        state.element_array_buffer = 12;
        state.vertex_array = 13;
        state.blend_src_rgb = glow::ONE;
        state.blend_dst_rgb = glow::ONE;
        state.blend_src_alpha = glow::ZERO;
        state.blend_dst_alpha = glow::ONE;
        state.blend_equation_rgb = glow::FUNC_SUBTRACT;
        state.blend_equation_alpha = glow::MAX;
        state.viewport = [1, 2, 300, 400];
        state.enabled = [glow::CULL_FACE, glow::DEPTH_TEST].into_iter().collect();
    }

    /// Let `count` more shader compiles succeed, then fail every one after.
    pub fn fail_compile_after(&self, count: usize) {
        self.compiles_left.set(Some(count));
    }

    pub fn take_calls(&self) -> Vec<GlCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    /// `(count, offset)` of every draw since the calls were last taken.
    pub fn draw_calls(&self) -> Vec<(i32, i32)> {
        self.draw_calls_in(&self.calls.borrow())
    }

    pub fn draw_calls_in(&self, calls: &[GlCall]) -> Vec<(i32, i32)> {
        calls
            .iter()
            .filter_map(|c| match c {
                GlCall::DrawElements { count, offset } => Some((*count, *offset)),
                _ => None,
            })
            .collect()
    }

    /// 2D texture bound on `unit`, whichever unit is active.
    pub fn texture_on_unit(&self, unit: u32) -> u32 {
        let state = self.state.borrow();
        state.textures.get(&unit).copied().unwrap_or(0)
    }

    /// Objects created and not yet deleted.
    pub fn live_objects(&self) -> usize {
        self.state.borrow().live.len()
    }

    fn record(&self, call: GlCall) {
        self.calls.borrow_mut().push(call);
    }

    fn create(&self) -> u32 {
        let name = self.next_name.get();
        self.next_name.set(name + 1);
        self.state.borrow_mut().live.insert(name);
        name
    }

    fn delete(&self, name: u32) -> bool {
        name != 0 && self.state.borrow_mut().live.remove(&name)
    }
}

impl GlApi for FakeGl {
    fn get_error(&self) -> u32 {
        glow::NO_ERROR
    }

    fn get_integer(&self, pname: u32) -> i32 {
        let state = self.state.borrow();
        let value = match pname {
            glow::CURRENT_PROGRAM => state.program,
            glow::TEXTURE_BINDING_2D => state
                .textures
                .get(&state.active_texture)
                .copied()
                .unwrap_or(0),
            glow::ACTIVE_TEXTURE => state.active_texture,
            glow::UNPACK_ALIGNMENT => state.unpack_alignment as u32,
            glow::ARRAY_BUFFER_BINDING => state.array_buffer,
            glow::ELEMENT_ARRAY_BUFFER_BINDING => state.element_array_buffer,
            glow::VERTEX_ARRAY_BINDING => state.vertex_array,
            glow::BLEND_SRC_RGB => state.blend_src_rgb,
            glow::BLEND_DST_RGB => state.blend_dst_rgb,
            glow::BLEND_SRC_ALPHA => state.blend_src_alpha,
            glow::BLEND_DST_ALPHA => state.blend_dst_alpha,
            glow::BLEND_EQUATION_RGB => state.blend_equation_rgb,
            glow::BLEND_EQUATION_ALPHA => state.blend_equation_alpha,
            _ => 0,
        };
        value as i32
    }

    fn get_integer_slice(&self, pname: u32, out: &mut [i32]) {
        if pname == glow::VIEWPORT {
            let viewport = self.state.borrow().viewport;
            for (slot, value) in out.iter_mut().zip(viewport) {
                *slot = value;
            }
        }
    }

    fn is_enabled(&self, cap: u32) -> bool {
        self.state.borrow().enabled.contains(&cap)
    }

    fn enable(&self, cap: u32) {
        self.state.borrow_mut().enabled.insert(cap);
        self.record(GlCall::Enable(cap));
    }

    fn disable(&self, cap: u32) {
        self.state.borrow_mut().enabled.remove(&cap);
        self.record(GlCall::Disable(cap));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.state.borrow_mut().viewport = [x, y, width, height];
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Scissor(x, y, width, height));
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.record(GlCall::ClearColor([r, g, b, a]));
    }

    fn clear(&self, mask: u32) {
        self.record(GlCall::Clear(mask));
    }

    fn blend_equation(&self, mode: u32) {
        self.blend_equation_separate(mode, mode);
    }

    fn blend_equation_separate(&self, mode_rgb: u32, mode_alpha: u32) {
        let mut state = self.state.borrow_mut();
        state.blend_equation_rgb = mode_rgb;
        state.blend_equation_alpha = mode_alpha;
    }

    fn blend_func(&self, src: u32, dst: u32) {
        self.blend_func_separate(src, dst, src, dst);
    }

    fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
        let mut state = self.state.borrow_mut();
        state.blend_src_rgb = src_rgb;
        state.blend_dst_rgb = dst_rgb;
        state.blend_src_alpha = src_alpha;
        state.blend_dst_alpha = dst_alpha;
    }

    fn create_shader(&self, _kind: u32) -> std::result::Result<u32, String> {
        Ok(self.create())
    }

    fn shader_source(&self, _shader: u32, _source: &str) {}

    fn compile_shader(&self, _shader: u32) {}

    fn shader_compile_status(&self, _shader: u32) -> bool {
        match self.compiles_left.get() {
            None => true,
            Some(0) => false,
            Some(left) => {
                self.compiles_left.set(Some(left - 1));
                true
            }
        }
    }

    fn shader_info_log(&self, _shader: u32) -> String {
        "forced failure".to_string()
    }

    fn delete_shader(&self, shader: u32) {
        self.delete(shader);
    }

    fn create_program(&self) -> std::result::Result<u32, String> {
        Ok(self.create())
    }

    fn attach_shader(&self, _program: u32, _shader: u32) {}

    fn detach_shader(&self, _program: u32, _shader: u32) {}

    fn link_program(&self, _program: u32) {}

    fn program_link_status(&self, _program: u32) -> bool {
        true
    }

    fn program_info_log(&self, _program: u32) -> String {
        String::new()
    }

    fn use_program(&self, program: u32) {
        self.state.borrow_mut().program = program;
        self.record(GlCall::UseProgram(program));
    }

    fn delete_program(&self, program: u32) {
        if self.delete(program) {
            self.record(GlCall::DeleteProgram(program));
        }
    }

    fn uniform_location(&self, _program: u32, name: &str) -> Option<u32> {
        match name {
            "ProjMtx" => Some(0),
            "Texture" => Some(1),
            _ => None,
        }
    }

    fn uniform_1_i32(&self, _location: u32, _value: i32) {}

    fn uniform_matrix_4(&self, _location: u32, _matrix: &[f32; 16]) {}

    fn create_buffer(&self) -> std::result::Result<u32, String> {
        Ok(self.create())
    }

    fn bind_buffer(&self, target: u32, buffer: u32) {
        let mut state = self.state.borrow_mut();
        match target {
            glow::ARRAY_BUFFER => state.array_buffer = buffer,
            glow::ELEMENT_ARRAY_BUFFER => state.element_array_buffer = buffer,
            _ => {}
        }
    }

    fn buffer_data(&self, target: u32, data: &[u8], usage: u32) {
        self.record(GlCall::BufferData {
            target,
            len: data.len(),
            usage,
        });
    }

    fn delete_buffer(&self, buffer: u32) {
        if self.delete(buffer) {
            self.record(GlCall::DeleteBuffer(buffer));
        }
    }

    fn create_vertex_array(&self) -> std::result::Result<u32, String> {
        Ok(self.create())
    }

    fn bind_vertex_array(&self, vertex_array: u32) {
        self.state.borrow_mut().vertex_array = vertex_array;
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        if self.delete(vertex_array) {
            self.record(GlCall::DeleteVertexArray(vertex_array));
        }
    }

    fn enable_vertex_attrib_array(&self, _index: u32) {}

    fn vertex_attrib_pointer_f32(
        &self,
        _index: u32,
        _size: i32,
        _data_type: u32,
        _normalized: bool,
        _stride: i32,
        _offset: i32,
    ) {
    }

    fn draw_elements(&self, _mode: u32, count: i32, _element_type: u32, offset: i32) {
        self.record(GlCall::DrawElements { count, offset });
    }

    fn create_texture(&self) -> std::result::Result<u32, String> {
        Ok(self.create())
    }

    fn active_texture(&self, unit: u32) {
        self.state.borrow_mut().active_texture = unit;
    }

    fn bind_texture(&self, _target: u32, texture: u32) {
        let mut state = self.state.borrow_mut();
        let unit = state.active_texture;
        state.textures.insert(unit, texture);
        drop(state);
        self.record(GlCall::BindTexture(texture));
    }

    fn tex_parameter_i32(&self, _target: u32, _pname: u32, _value: i32) {}

    fn pixel_store_i32(&self, pname: u32, value: i32) {
        if pname == glow::UNPACK_ALIGNMENT {
            self.state.borrow_mut().unpack_alignment = value;
        }
    }

    fn tex_image_2d_rgba(&self, width: i32, height: i32, pixels: &[u8]) {
        self.record(GlCall::TexImage {
            width,
            height,
            len: pixels.len(),
        });
    }

    fn delete_texture(&self, texture: u32) {
        if self.delete(texture) {
            self.record(GlCall::DeleteTexture(texture));
        }
    }
}

/// Window with an optional web handle; the id is arbitrary.
pub struct FakeWindow {
    handle: Option<RawWindowHandle>,
}

impl FakeWindow {
    pub fn with_handle() -> Self {
        Self {
            handle: Some(RawWindowHandle::Web(WebWindowHandle::new(1))),
        }
    }

    pub fn without_handle() -> Self {
        Self { handle: None }
    }
}

impl HasWindowHandle for FakeWindow {
    fn window_handle(&self) -> std::result::Result<WindowHandle<'_>, HandleError> {
        match self.handle {
            // SAFETY: a web handle is a plain id; nothing is dereferenced.
            Some(raw) => Ok(unsafe { WindowHandle::borrow_raw(raw) }),
            None => Err(HandleError::Unavailable),
        }
    }
}

impl Window for FakeWindow {
    fn position(&self) -> Point {
        Point::zero()
    }

    fn size(&self) -> Size {
        Size::new(100.0, 100.0)
    }
}

#[derive(Default)]
pub struct FakeProvider {
    pub created: usize,
}

impl GlContextProvider for FakeProvider {
    type Gl = FakeGl;

    fn create_context(&mut self, _window: &dyn Window) -> Result<FakeGl> {
        self.created += 1;
        Ok(FakeGl::new())
    }
}
