//! Error types for reading project definitions.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for project reading operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad category of a read failure.
///
/// Callers that orchestrate many reads usually only care about which of these
/// buckets a failure falls in, not the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The project file does not exist or cannot be read.
    NotFound,
    /// The project file is not a well-formed XML document.
    Parse,
    /// A version or identifier literal has the wrong shape.
    Format,
    /// A reference element lacks its `Include` attribute.
    MissingAttribute,
}

/// Errors that can occur while reading a single project definition.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Project file not found.
    #[error("Project file not found at path: {path}")]
    #[diagnostic(
        code(dotnetversion::projects::project_not_found),
        help("Check that the solution entry points to an existing project file")
    )]
    ProjectNotFound {
        /// The path that was read.
        path: PathBuf,
    },

    /// I/O error occurred.
    #[error("I/O error during {operation}{}: {source}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(dotnetversion::projects::io_error),
        help("Check that the project file is readable and encoded as UTF-8 or BOM-marked UTF-16")
    )]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// Optional path where the error occurred.
        path: Option<PathBuf>,
        /// Description of the operation being performed.
        operation: String,
    },

    /// Project file is not well-formed XML.
    #[error("Malformed project file{}: {message}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(dotnetversion::projects::malformed_project),
        help("Open the project file in an XML-aware editor and fix the reported syntax error")
    )]
    MalformedProject {
        /// Path to the project file, when known.
        path: Option<PathBuf>,
        /// Description of the parse error.
        message: String,
    },

    /// A version literal could not be parsed.
    #[error("Invalid version '{value}': {reason}")]
    #[diagnostic(
        code(dotnetversion::projects::invalid_version),
        help("Versions have two to four numeric components, e.g. '1.2', '1.2.3' or '1.2.3.4'")
    )]
    InvalidVersion {
        /// The text that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A project identifier could not be parsed as a GUID.
    #[error("Invalid project id '{value}' for project '{project}': {source}")]
    #[diagnostic(
        code(dotnetversion::projects::invalid_project_id),
        help("Project ids are GUIDs such as '9A19103F-16F7-4668-BE54-9A1E7A4F7556'")
    )]
    InvalidProjectId {
        /// Name of the project the identifier belongs to.
        project: String,
        /// The text that failed to parse.
        value: String,
        /// The underlying parse error.
        #[source]
        source: uuid::Error,
    },

    /// A reference element is missing a required attribute.
    #[error("<{element}> in {} is missing the required '{attribute}' attribute", path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "project".to_string()))]
    #[diagnostic(
        code(dotnetversion::projects::missing_attribute),
        help("Every reference element must name its target through the attribute")
    )]
    MissingAttribute {
        /// Path to the project file, when known.
        path: Option<PathBuf>,
        /// Local name of the offending element.
        element: String,
        /// The attribute that was expected.
        attribute: String,
    },
}

impl Error {
    /// Returns the broad category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProjectNotFound { .. } | Self::Io { .. } => ErrorKind::NotFound,
            Self::MalformedProject { .. } => ErrorKind::Parse,
            Self::InvalidVersion { .. } | Self::InvalidProjectId { .. } => ErrorKind::Format,
            Self::MissingAttribute { .. } => ErrorKind::MissingAttribute,
        }
    }

    /// Attaches a file path to errors raised while parsing in-memory content.
    #[must_use]
    pub(crate) fn with_path(self, file: &std::path::Path) -> Self {
        match self {
            Self::MalformedProject { path: None, message } => Self::MalformedProject {
                path: Some(file.to_path_buf()),
                message,
            },
            Self::MissingAttribute {
                path: None,
                element,
                attribute,
            } => Self::MissingAttribute {
                path: Some(file.to_path_buf()),
                element,
                attribute,
            },
            other => other,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            path: None,
            operation: "file operation".to_string(),
        }
    }
}
