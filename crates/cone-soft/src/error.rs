use cone_hal::ShaderStage;

/// Errors raised by the software device.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("unknown {kind} handle {id}")]
    UnknownHandle { kind: &'static str, id: u32 },

    /// Attachments that cannot form a framebuffer.
    #[error("incomplete framebuffer: {0}")]
    IncompleteFramebuffer(&'static str),

    #[error("no framebuffer bound")]
    NoFramebuffer,

    #[error("matrix stack overflow")]
    StackOverflow,

    #[error("matrix stack underflow")]
    StackUnderflow,

    /// A shader stage failed to compile. `log` holds the diagnostic.
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("program failed to link:\n{log}")]
    Link { log: String },

    #[error("no program in use")]
    NoProgram,

    #[error("uniform `{0}` used before being set")]
    UnsetUniform(String),

    /// A draw needs a vertex input that is disabled or has no pointer.
    #[error("vertex input `{0}` is not enabled")]
    MissingAttribute(String),

    #[error("vertex data of {len} floats does not fit stride {stride}")]
    MisalignedData { len: usize, stride: usize },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
