//! Items observed by a notify transform.
//!
//! An [`Artifact`] is a file-like build output; a [`BuildError`] is a failure
//! raised by some upstream stage. Both are read-only here: the transform only
//! inspects fields and forwards the shared reference.

use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde_json::{json, Value};

use crate::error::BoxError;

/// Payload state of an artifact.
#[derive(Debug, Clone, Default)]
pub enum ArtifactContents {
    /// Folder marker or placeholder with no payload.
    #[default]
    Empty,
    /// Fully buffered payload.
    Buffer(Bytes),
    /// Payload produced lazily by a downstream reader.
    Streamed,
}

/// File-like build artifact.
#[derive(Debug, Clone)]
pub struct Artifact {
    path: PathBuf,
    base: PathBuf,
    cwd: PathBuf,
    contents: ArtifactContents,
}

impl Artifact {
    /// Creates an artifact rooted at `base`. `cwd` defaults to `base`.
    pub fn new(path: impl Into<PathBuf>, base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            path: path.into(),
            cwd: base.clone(),
            base,
            contents: ArtifactContents::Empty,
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn with_contents(mut self, contents: impl Into<Bytes>) -> Self {
        self.contents = ArtifactContents::Buffer(contents.into());
        self
    }

    pub fn streamed(mut self) -> Self {
        self.contents = ArtifactContents::Streamed;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn contents(&self) -> &ArtifactContents {
        &self.contents
    }

    /// Path relative to `base`; the full path when it does not live under `base`.
    pub fn relative(&self) -> &Path {
        self.path.strip_prefix(&self.base).unwrap_or(&self.path)
    }

    pub fn basename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Extension including the leading dot, empty when there is none.
    pub fn extname(&self) -> String {
        self.path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default()
    }

    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn is_null(&self) -> bool {
        matches!(self.contents, ArtifactContents::Empty)
    }

    pub fn is_stream(&self) -> bool {
        matches!(self.contents, ArtifactContents::Streamed)
    }

    /// A null artifact whose path has no extension is treated as a folder.
    pub fn is_directory(&self) -> bool {
        self.is_null() && self.path.extension().is_none()
    }

    /// View of this artifact as seen by templates under `file.*`.
    pub fn template_value(&self) -> Value {
        json!({
            "path": self.path.to_string_lossy(),
            "relative": self.relative().to_string_lossy(),
            "base": self.base.to_string_lossy(),
            "cwd": self.cwd.to_string_lossy(),
            "basename": self.basename(),
            "extname": self.extname(),
            "stem": self.stem(),
            "isNull": self.is_null(),
            "isStream": self.is_stream(),
            "isDirectory": self.is_directory(),
        })
    }
}

/// Error raised by an upstream pipeline stage.
#[derive(Debug)]
pub struct BuildError {
    message: String,
    plugin: Option<String>,
    cause: Option<BoxError>,
}

impl BuildError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            plugin: None,
            cause: None,
        }
    }

    /// Name of the stage that raised the error.
    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin = Some(plugin.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Wraps any error, taking its display text as the message.
    pub fn wrap<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::new(err.to_string()).with_cause(err)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn plugin(&self) -> Option<&str> {
        self.plugin.as_deref()
    }

    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// View of this error as seen by templates under `error.*`.
    pub fn template_value(&self) -> Value {
        json!({
            "message": self.message,
            "plugin": self.plugin,
            "cause": self.cause.as_ref().map(|c| c.to_string()),
        })
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.plugin {
            Some(plugin) => write!(f, "{plugin}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|c| c as &(dyn std::error::Error + 'static))
    }
}

/// Borrowed view of whatever is being notified about.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Artifact(&'a Artifact),
    Error(&'a BuildError),
}

impl<'a> Subject<'a> {
    pub fn is_error(&self) -> bool {
        matches!(self, Subject::Error(_))
    }

    pub fn artifact(&self) -> Option<&'a Artifact> {
        match self {
            Subject::Artifact(artifact) => Some(artifact),
            Subject::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&'a BuildError> {
        match self {
            Subject::Error(err) => Some(err),
            Subject::Artifact(_) => None,
        }
    }
}

impl<'a> From<&'a Artifact> for Subject<'a> {
    fn from(artifact: &'a Artifact) -> Self {
        Subject::Artifact(artifact)
    }
}

impl<'a> From<&'a BuildError> for Subject<'a> {
    fn from(err: &'a BuildError) -> Self {
        Subject::Error(err)
    }
}
