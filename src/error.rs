use thiserror::Error;

/// Errors surfaced by the rendering and layout core.
///
/// Precondition failures are returned to the caller immediately and are never
/// retried. GPU errors are not represented here: they are checked with
/// `glGetError` and reported through debug assertions.
#[derive(Error, Debug)]
pub enum Error {
    #[error("node {0:?} is not part of the visual tree")]
    NodeNotFound(crate::visual::NodeId),

    #[error("node {0:?} cannot become a child of its own descendant")]
    InvalidHierarchy(crate::visual::NodeId),

    #[error("no id is specified in the visual name `{0}`")]
    InvalidName(String),

    #[error("content has no text to build")]
    NoText,

    #[error("content is neither text nor image and has no fixed size")]
    Unmeasurable,

    #[error("content has already been disposed")]
    Disposed,

    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    #[error("shader program link failed: {0}")]
    ProgramLink(String),

    #[error("failed to allocate GL resource: {0}")]
    GlResource(String),

    #[error("text shaping failed: {0}")]
    TextShaping(String),

    #[error("tessellation failed: {0:?}")]
    Tessellation(lyon::tessellation::TessellationError),

    #[error("image decoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("window handle unavailable: {0}")]
    WindowHandle(#[from] raw_window_handle::HandleError),
}

impl From<lyon::tessellation::TessellationError> for Error {
    fn from(err: lyon::tessellation::TessellationError) -> Self {
        Error::Tessellation(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
