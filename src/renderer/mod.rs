//! OpenGL backend: three materials drawing one frame's [`DrawList`].

mod gl;
mod material;
mod shaders;
mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use gl::{check_gl_error, GlApi};
pub use material::{Material, MaterialKind};
pub use state::{GlStateGuard, SavedGlState};

use crate::error::Result;
use crate::mesh::DrawList;
use crate::platform::{GlContextProvider, Window};
use crate::style::Color;

/// Renderer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    pub clear_color: Color,
    pub multisample: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: Color::rgb8(114, 144, 154),
            multisample: true,
        }
    }
}

impl RendererConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn multisample(mut self, enabled: bool) -> Self {
        self.multisample = enabled;
        self
    }
}

/// Column-major orthographic projection.
pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> [f32; 16] {
    [
        2.0 / (right - left),
        0.0,
        0.0,
        0.0,
        0.0,
        2.0 / (top - bottom),
        0.0,
        0.0,
        0.0,
        0.0,
        -2.0 / (far - near),
        0.0,
        (right + left) / (left - right),
        (top + bottom) / (bottom - top),
        (far + near) / (near - far),
        1.0,
    ]
}

/// Owns the GL context and the plain, curved and image materials.
///
/// Must stay on the thread its context is current on.
pub struct Renderer<G: GlApi> {
    gl: G,
    plain: Material,
    curved: Material,
    image: Material,
    config: RendererConfig,
}

impl<G: GlApi> Renderer<G> {
    /// Create a GL context for `window` and set up all materials.
    ///
    /// Shader compile or link failures are fatal and returned as is.
    pub fn init<P>(provider: &mut P, window: &dyn Window, config: RendererConfig) -> Result<Self>
    where
        P: GlContextProvider<Gl = G>,
    {
        let handle = window.window_handle()?;
        log::info!(
            "creating GL context for {:?} ({}x{})",
            handle.as_raw(),
            window.size().width,
            window.size().height
        );
        let gl = provider.create_context(window)?;
        Self::with_context(gl, config)
    }

    /// Set up all materials on an existing, current context.
    pub fn with_context(gl: G, config: RendererConfig) -> Result<Self> {
        if config.multisample {
            gl.enable(glow::MULTISAMPLE);
        }

        let plain = Material::new(&gl, MaterialKind::Plain)?;
        let curved = match Material::new(&gl, MaterialKind::Curved) {
            Ok(material) => material,
            Err(err) => {
                plain.shut_down(&gl);
                return Err(err);
            }
        };
        let image = match Material::new(&gl, MaterialKind::Image) {
            Ok(material) => material,
            Err(err) => {
                plain.shut_down(&gl);
                curved.shut_down(&gl);
                return Err(err);
            }
        };

        let c = config.clear_color;
        gl.clear_color(c.r, c.g, c.b, c.a);
        check_gl_error(&gl, "renderer init");
        log::info!("renderer initialized");

        Ok(Self {
            gl,
            plain,
            curved,
            image,
            config,
        })
    }

    pub fn gl(&self) -> &G {
        &self.gl
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn clear(&self) {
        self.gl
            .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
    }

    /// Draw a frame at `width` x `height` pixels.
    ///
    /// Plain geometry is drawn first, then curves, then images. The GL state
    /// is saved before each material and restored right after it.
    pub fn render_draw_list(&self, draw_list: &DrawList, width: u32, height: u32) {
        let projection = orthographic(0.0, width as f32, height as f32, 0.0, -5.0, 5.0);
        let batches = [
            (&self.plain, &draw_list.draw_buffer),
            (&self.curved, &draw_list.bezier_buffer),
            (&self.image, &draw_list.image_buffer),
        ];

        for (material, buffer) in batches {
            if buffer.is_empty() {
                continue;
            }
            let _saved = GlStateGuard::new(&self.gl);
            self.setup_render_state(width, height);
            material.draw(&self.gl, buffer, &projection, height);
            check_gl_error(&self.gl, material.kind().label());
        }

        log::trace!(
            "frame {}x{}: {} commands, {} vertices",
            width,
            height,
            draw_list.command_count(),
            draw_list.draw_buffer.vertex_buffer.len()
                + draw_list.bezier_buffer.vertex_buffer.len()
                + draw_list.image_buffer.vertex_buffer.len()
        );
    }

    fn setup_render_state(&self, width: u32, height: u32) {
        let gl = &self.gl;
        gl.enable(glow::BLEND);
        gl.blend_equation(glow::FUNC_ADD);
        gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        gl.disable(glow::CULL_FACE);
        gl.disable(glow::DEPTH_TEST);
        gl.enable(glow::SCISSOR_TEST);
        gl.viewport(0, 0, width as i32, height as i32);
    }

    /// Release every material. Consumes the renderer; the context is
    /// returned so its owner can destroy it.
    pub fn shut_down(self) -> G {
        self.plain.shut_down(&self.gl);
        self.curved.shut_down(&self.gl);
        self.image.shut_down(&self.gl);
        log::info!("renderer shut down");
        self.gl
    }
}
