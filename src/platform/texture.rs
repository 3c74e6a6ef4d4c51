use std::path::Path;

use super::Texture;
use crate::error::{Error, Result};
use crate::geometry::Size;
use crate::mesh::TextureId;
use crate::renderer::GlApi;

/// Decoded RGBA8 pixels, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Decode an encoded image (PNG, JPEG, GIF, WebP).
    pub fn from_memory(bytes: &[u8]) -> Result<Self> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        Ok(Self::from_image(rgba))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let rgba = image::open(path)?.to_rgba8();
        Ok(Self::from_image(rgba))
    }

    /// Wrap raw RGBA8 pixels. `None` if the length doesn't match the size.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = width as usize * height as usize * 4;
        (pixels.len() == expected).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    fn from_image(rgba: image::RgbaImage) -> Self {
        let (width, height) = rgba.dimensions();
        Self {
            width,
            height,
            pixels: rgba.into_raw(),
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }
}

/// A 2D RGBA texture owned by a GL context.
#[derive(Debug)]
pub struct GlTexture {
    id: TextureId,
    size: Size,
}

impl GlTexture {
    /// Upload `data` into a new texture with linear filtering.
    ///
    /// The caller's texture binding and unpack alignment survive the upload.
    pub fn upload(gl: &impl GlApi, data: &TextureData) -> Result<Self> {
        let name = gl.create_texture().map_err(Error::GlResource)?;
        let previous = gl.get_integer(glow::TEXTURE_BINDING_2D) as u32;
        let alignment = gl.get_integer(glow::UNPACK_ALIGNMENT);

        gl.bind_texture(glow::TEXTURE_2D, name);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        gl.tex_image_2d_rgba(data.width as i32, data.height as i32, &data.pixels);
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, alignment);
        gl.bind_texture(glow::TEXTURE_2D, previous);

        log::debug!(
            "uploaded texture {} ({}x{})",
            name,
            data.width,
            data.height
        );
        Ok(Self {
            id: TextureId(name),
            size: data.size(),
        })
    }

    pub fn delete(self, gl: &impl GlApi) {
        gl.delete_texture(self.id.0);
    }
}

impl Texture for GlTexture {
    fn id(&self) -> TextureId {
        self.id
    }

    fn size(&self) -> Size {
        self.size
    }
}
