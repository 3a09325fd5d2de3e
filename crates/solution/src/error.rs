//! Error types for solution-level operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for solution operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while enumerating a solution or assembling its graph.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Solution file not found.
    #[error("Solution file not found at path: {path}")]
    #[diagnostic(
        code(dotnetversion::solution::solution_not_found),
        help("Pass the path of an existing .sln file")
    )]
    SolutionNotFound {
        /// The path that was read.
        path: PathBuf,
    },

    /// The solution file does not follow the expected format.
    #[error("Invalid solution file {path}{}: {message}", line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    #[diagnostic(
        code(dotnetversion::solution::invalid_solution),
        help("Regenerate the solution with 'dotnet sln' or fix the reported line by hand")
    )]
    InvalidSolution {
        /// Path to the solution file.
        path: PathBuf,
        /// 1-based line number, when the problem is tied to a line.
        line: Option<usize>,
        /// Description of the problem.
        message: String,
    },

    /// I/O error occurred.
    #[error("I/O error during {operation}{}: {source}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(dotnetversion::solution::io_error),
        help("Check that the solution file is readable and UTF-8 encoded")
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

    /// Reading one of the solution's projects failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Project(#[from] dotnetversion_projects::Error),

    /// Two projects share a name, so references to it are ambiguous.
    #[error("Project name '{name}' is used by more than one project")]
    #[diagnostic(
        code(dotnetversion::solution::duplicate_project),
        help("Project references are matched by file name; rename one of the projects")
    )]
    DuplicateProject {
        /// The shared name.
        name: String,
    },

    /// Project references form a cycle.
    #[error("Project references form a cycle involving '{project}'")]
    #[diagnostic(
        code(dotnetversion::solution::dependency_cycle),
        help("Remove one of the project references that closes the cycle")
    )]
    DependencyCycle {
        /// A project that is part of the cycle.
        project: String,
    },
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
