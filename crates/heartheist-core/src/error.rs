//! Error types for `heartheist-core`.
//!
//! Each error variant carries enough context to diagnose the problem without
//! a debugger: the offending token, the missing scene, the byte offset.

use heartheist_storage::StorageError;

/// Errors from parsing or rendering a [`Template`](crate::template::Template).
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// A `{{` was opened but never closed.
    #[error("unterminated placeholder starting at byte {offset}")]
    Unterminated { offset: usize },

    /// The placeholder name is empty or contains characters outside `[A-Za-z0-9_]`.
    #[error("invalid placeholder name '{name}' at byte {offset}")]
    InvalidName { name: String, offset: usize },

    /// The placeholder asked for an escaping context that does not exist.
    #[error("unknown escaping context '{context}' for placeholder '{name}'")]
    UnknownContext { name: String, context: String },

    /// One or more placeholders had no value in the render context.
    #[error("no value for placeholder(s): {}", names.join(", "))]
    MissingValues { names: Vec<String> },
}

/// Errors from the scene library.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// The scene template file does not exist.
    #[error("stage template not found: {key}")]
    NotFound { key: String },

    /// The scene template exists but is not valid UTF-8.
    #[error("stage template '{key}' is not valid UTF-8")]
    InvalidEncoding { key: String },

    /// The underlying storage backend returned an error.
    #[error("scene storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from a full render pass.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The scene for the current stage could not be loaded.
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// The scene template could not be parsed or rendered.
    #[error("failed to render stage '{stage}': {source}")]
    Template {
        stage: String,
        #[source]
        source: TemplateError,
    },
}
