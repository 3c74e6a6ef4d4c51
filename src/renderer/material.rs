use std::mem::{offset_of, size_of};

use super::gl::{check_gl_error, GlApi};
use super::shaders;
use crate::error::{Error, Result};
use crate::mesh::{DrawBuffer, DrawIndex, DrawVertex};

const ATTRIBUTE_POSITION: u32 = 0;
const ATTRIBUTE_UV: u32 = 1;
const ATTRIBUTE_COLOR: u32 = 2;

/// The three classes of geometry, drawn in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    /// Solid triangles.
    Plain,
    /// Quadratic bezier triangles, cut along the curve in the fragment stage.
    Curved,
    /// Textured quads.
    Image,
}

impl MaterialKind {
    fn fragment_source(self) -> &'static str {
        match self {
            MaterialKind::Plain => shaders::PLAIN_FRAGMENT,
            MaterialKind::Curved => shaders::CURVED_FRAGMENT,
            MaterialKind::Image => shaders::IMAGE_FRAGMENT,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MaterialKind::Plain => "plain material",
            MaterialKind::Curved => "curved material",
            MaterialKind::Image => "image material",
        }
    }
}

/// Shader program plus vertex array and buffers for one [`MaterialKind`].
#[derive(Debug)]
pub struct Material {
    kind: MaterialKind,
    program: u32,
    vertex_array: u32,
    vertex_buffer: u32,
    element_buffer: u32,
    proj_mtx: Option<u32>,
    texture: Option<u32>,
}

impl Material {
    /// Compile, link and allocate everything the material needs.
    ///
    /// Anything allocated before a failure is released again.
    pub fn new(gl: &impl GlApi, kind: MaterialKind) -> Result<Self> {
        let mut material = Self {
            kind,
            program: 0,
            vertex_array: 0,
            vertex_buffer: 0,
            element_buffer: 0,
            proj_mtx: None,
            texture: None,
        };
        if let Err(err) = material.allocate(gl) {
            material.shut_down(gl);
            return Err(err);
        }
        Ok(material)
    }

    pub fn kind(&self) -> MaterialKind {
        self.kind
    }

    /// GL name of the linked program.
    pub fn program(&self) -> u32 {
        self.program
    }

    fn allocate(&mut self, gl: &impl GlApi) -> Result<()> {
        self.program = link_program(gl, shaders::VERTEX, self.kind.fragment_source())?;
        self.proj_mtx = gl.uniform_location(self.program, "ProjMtx");
        self.texture = gl.uniform_location(self.program, "Texture");

        self.vertex_buffer = gl.create_buffer().map_err(Error::GlResource)?;
        self.element_buffer = gl.create_buffer().map_err(Error::GlResource)?;
        self.vertex_array = gl.create_vertex_array().map_err(Error::GlResource)?;

        gl.bind_vertex_array(self.vertex_array);
        gl.bind_buffer(glow::ARRAY_BUFFER, self.vertex_buffer);
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, self.element_buffer);

        let stride = size_of::<DrawVertex>() as i32;
        gl.enable_vertex_attrib_array(ATTRIBUTE_POSITION);
        gl.enable_vertex_attrib_array(ATTRIBUTE_UV);
        gl.enable_vertex_attrib_array(ATTRIBUTE_COLOR);
        gl.vertex_attrib_pointer_f32(
            ATTRIBUTE_POSITION,
            2,
            glow::FLOAT,
            false,
            stride,
            offset_of!(DrawVertex, pos) as i32,
        );
        gl.vertex_attrib_pointer_f32(
            ATTRIBUTE_UV,
            2,
            glow::FLOAT,
            false,
            stride,
            offset_of!(DrawVertex, uv) as i32,
        );
        gl.vertex_attrib_pointer_f32(
            ATTRIBUTE_COLOR,
            4,
            glow::FLOAT,
            true,
            stride,
            offset_of!(DrawVertex, color) as i32,
        );

        gl.bind_vertex_array(0);
        gl.bind_buffer(glow::ARRAY_BUFFER, 0);
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, 0);
        check_gl_error(gl, self.kind.label());
        Ok(())
    }

    /// Upload one frame of geometry and issue its draw commands in order.
    ///
    /// Expects the 2D render state to be set up by the caller.
    pub fn draw(&self, gl: &impl GlApi, buffer: &DrawBuffer, projection: &[f32; 16], height: u32) {
        gl.use_program(self.program);
        if let Some(location) = self.texture {
            gl.uniform_1_i32(location, 0);
        }
        if let Some(location) = self.proj_mtx {
            gl.uniform_matrix_4(location, projection);
        }

        gl.bind_vertex_array(self.vertex_array);
        gl.bind_buffer(glow::ARRAY_BUFFER, self.vertex_buffer);
        gl.buffer_data(
            glow::ARRAY_BUFFER,
            bytemuck::cast_slice(&buffer.vertex_buffer),
            glow::STREAM_DRAW,
        );
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, self.element_buffer);
        gl.buffer_data(
            glow::ELEMENT_ARRAY_BUFFER,
            bytemuck::cast_slice(&buffer.index_buffer),
            glow::STREAM_DRAW,
        );

        let mut offset = 0i32;
        for command in &buffer.command_buffer {
            if command.elem_count == 0 {
                continue;
            }
            if let Some(texture) = command.texture {
                gl.active_texture(glow::TEXTURE0);
                gl.bind_texture(glow::TEXTURE_2D, texture.0);
            }
            // Scissor origin is the bottom-left corner.
            let clip = command.clip_rect;
            gl.scissor(
                clip.x as i32,
                (height as f32 - clip.height - clip.y) as i32,
                clip.width as i32,
                clip.height as i32,
            );
            gl.draw_elements(
                glow::TRIANGLES,
                command.elem_count as i32,
                glow::UNSIGNED_INT,
                offset,
            );
            offset += command.elem_count as i32 * size_of::<DrawIndex>() as i32;
        }
    }

    /// Release the program, vertex array and buffers.
    pub fn shut_down(&self, gl: &impl GlApi) {
        gl.use_program(0);
        gl.delete_program(self.program);
        gl.bind_buffer(glow::ARRAY_BUFFER, 0);
        gl.delete_buffer(self.vertex_buffer);
        gl.delete_buffer(self.element_buffer);
        gl.delete_vertex_array(self.vertex_array);
        check_gl_error(gl, self.kind.label());
    }
}

fn compile_shader(gl: &impl GlApi, kind: u32, source: &str) -> Result<u32> {
    let shader = gl.create_shader(kind).map_err(Error::GlResource)?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);
    if !gl.shader_compile_status(shader) {
        let log = gl.shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(Error::ShaderCompile(log));
    }
    Ok(shader)
}

fn link_program(gl: &impl GlApi, vertex_source: &str, fragment_source: &str) -> Result<u32> {
    let vertex = compile_shader(gl, glow::VERTEX_SHADER, vertex_source)?;
    let fragment = match compile_shader(gl, glow::FRAGMENT_SHADER, fragment_source) {
        Ok(shader) => shader,
        Err(err) => {
            gl.delete_shader(vertex);
            return Err(err);
        }
    };

    let program = match gl.create_program() {
        Ok(program) => program,
        Err(err) => {
            gl.delete_shader(vertex);
            gl.delete_shader(fragment);
            return Err(Error::GlResource(err));
        }
    };
    gl.attach_shader(program, vertex);
    gl.attach_shader(program, fragment);
    gl.link_program(program);

    for shader in [vertex, fragment] {
        gl.detach_shader(program, shader);
        gl.delete_shader(shader);
    }

    if !gl.program_link_status(program) {
        let log = gl.program_info_log(program);
        gl.delete_program(program);
        return Err(Error::ProgramLink(log));
    }
    Ok(program)
}
