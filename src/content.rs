//! Renderable content: text, shaped text or an image, plus the cache that
//! keeps text meshes alive across frames for stable widget ids.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::geometry::{Rect, Size};
use crate::layout::LayoutOption;
use crate::platform::Texture;
use crate::style::Style;
use crate::text::{TextContext, TextMesh, TextShaper};

/// Text, shaped text or an image; never more than one kind at a time.
///
/// Text content lazily shapes itself into a [`TextMesh`] on [`Content::build`]
/// and keeps it until the rect, the text or a shaping-relevant style field
/// changes.
pub struct Content {
    text: Option<String>,
    text_context: Option<Box<dyn TextContext>>,
    /// Borrowed; the texture's owner releases it.
    image: Option<Rc<dyn Texture>>,
    text_mesh: TextMesh,
    /// Rect and style of the last build.
    built: Option<(Rect, Style)>,
    disposed: bool,
}

impl Content {
    fn empty() -> Self {
        Self {
            text: None,
            text_context: None,
            image: None,
            text_mesh: TextMesh::new(),
            built: None,
            disposed: false,
        }
    }

    /// Content with nothing to render; must be given a fixed size to be measured.
    pub fn none() -> Self {
        Self::empty()
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::empty()
        }
    }

    pub fn image(texture: Rc<dyn Texture>) -> Self {
        Self {
            image: Some(texture),
            ..Self::empty()
        }
    }

    /// Content wrapping text that was already shaped.
    pub fn shaped(context: Box<dyn TextContext>) -> Self {
        Self {
            text: Some(context.text().to_string()),
            text_context: Some(context),
            ..Self::empty()
        }
    }

    pub fn get_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Replace the text. The mesh is rebuilt on the next [`Content::build`].
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn get_image(&self) -> Option<&Rc<dyn Texture>> {
        self.image.as_ref()
    }

    pub fn text_context(&self) -> Option<&dyn TextContext> {
        self.text_context.as_deref()
    }

    pub fn text_mesh(&self) -> &TextMesh {
        &self.text_mesh
    }

    /// Whether the text mesh reflects the current text.
    pub fn is_built(&self) -> bool {
        self.built.is_some() && self.context_matches_text()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn context_matches_text(&self) -> bool {
        match (&self.text_context, &self.text) {
            (Some(context), Some(text)) => context.text() == text,
            _ => false,
        }
    }

    /// Natural size of the content, rounded up to whole pixels.
    ///
    /// Fixed width and height options win over the measured size. Text is
    /// measured with the style's font; images report their texture size.
    pub fn get_size(
        &self,
        style: &Style,
        options: &[LayoutOption],
        shaper: &mut dyn TextShaper,
    ) -> Result<Size> {
        if self.disposed {
            return Err(Error::Disposed);
        }

        let mut width = LayoutOption::fixed_width(options);
        let mut height = LayoutOption::fixed_height(options);

        if width.is_none() || height.is_none() {
            let natural = if let Some(text) = &self.text {
                Some(style.text_actual_size(text, shaper)?)
            } else {
                self.image.as_ref().map(|image| image.size())
            };
            if let Some(natural) = natural {
                width = width.or(Some(natural.width));
                height = height.or(Some(natural.height));
            }
        }

        match (width, height) {
            (None, None) => Err(Error::Unmeasurable),
            (w, h) => Ok(Size::new(
                w.unwrap_or(0.0).ceil(),
                h.unwrap_or(0.0).ceil(),
            )),
        }
    }

    /// Shape the text for `rect` and `style` and rebuild the text mesh at the
    /// rect's top-left corner.
    ///
    /// A no-op returning `false` when rect, text and the shaping-relevant
    /// style fields match the previous build.
    pub fn build(&mut self, rect: Rect, style: &Style, shaper: &mut dyn TextShaper) -> Result<bool> {
        if self.disposed {
            return Err(Error::Disposed);
        }
        let Some(text) = self.text.as_deref() else {
            return Err(Error::NoText);
        };

        let rebuild_needed = match &self.built {
            Some((last_rect, last_style)) => {
                *last_rect != rect
                    || Style::requires_text_rebuild(Some(last_style), style)
                    || !self.context_matches_text()
            }
            None => true,
        };
        if !rebuild_needed {
            return Ok(false);
        }

        log::trace!("rebuilding text content {:?} at {:?}", text, rect);

        // Release the previous shaped text before asking for a new one.
        self.text_context = None;
        let context = shaper.create_text_context(
            text,
            &style.font,
            rect.width.ceil(),
            rect.height.ceil(),
            style.text_alignment,
        )?;

        self.text_mesh.clear();
        self.text_mesh
            .build(rect.top_left(), style.font_color, context.as_ref())?;
        self.text_context = Some(context);
        self.built = Some((rect, style.clone()));
        Ok(true)
    }

    /// Release the shaped text. Disposing twice is an error.
    pub fn dispose(&mut self) -> Result<()> {
        if self.disposed {
            return Err(Error::Disposed);
        }
        self.disposed = true;
        self.text_context = None;
        self.text_mesh.clear();
        self.built = None;
        Ok(())
    }
}

impl Default for Content {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Content")
            .field("text", &self.text)
            .field("shaped", &self.text_context.is_some())
            .field("image", &self.image)
            .field("built", &self.built.as_ref().map(|(rect, _)| rect))
            .field("disposed", &self.disposed)
            .finish()
    }
}

/// Shared content keyed by widget id, reused across frames.
///
/// Owned by the caller and passed into each render pass. Entries are
/// `Rc`-shared, so the cache stays on the UI thread.
#[derive(Debug)]
pub struct ContentCache {
    entries: HashMap<String, Rc<RefCell<Content>>>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::with_capacity(256),
        }
    }

    /// The content for `id`, created on first use.
    ///
    /// The stored text is always overwritten with `text`: the same entry is
    /// returned for an id even when its text changed.
    pub fn cached(&mut self, text: &str, id: &str) -> Rc<RefCell<Content>> {
        let entry = self
            .entries
            .entry(id.to_string())
            .or_insert_with(|| Rc::new(RefCell::new(Content::text(text))));
        entry.borrow_mut().set_text(text);
        entry.clone()
    }

    pub fn get(&self, id: &str) -> Option<Rc<RefCell<Content>>> {
        self.entries.get(id).cloned()
    }

    /// Drop an entry, releasing its shaped text once no one else holds it.
    pub fn remove(&mut self, id: &str) -> Option<Rc<RefCell<Content>>> {
        self.entries.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new()
    }
}
