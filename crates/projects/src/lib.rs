//! Project metadata extraction for .NET project definitions.
//!
//! Given a project listed by a solution (its path, name and declared GUID),
//! this crate reads the project file and produces an immutable [`ProjectMap`]:
//! the project's identity, its canonical version and its outbound references to
//! other projects and to external packages.
//!
//! # Version resolution
//!
//! A project may declare `<Version>`, `<VersionPrefix>`, both, or neither.
//! [`resolve_version`] applies the precedence rule:
//!
//! - neither declared: [`Version::NOT_VERSIONED`] (`0.0.0.0`)
//! - a prefix declared: the prefix, even when `<Version>` is also present
//! - otherwise: the full version
//!
//! Malformed version text is an error, never a silent fallback.
//!
//! # Example
//!
//! ```rust,ignore
//! use dotnetversion_projects::{ProjectEntry, ProjectMap};
//!
//! let entry = ProjectEntry::new(
//!     "/repo/src/App/App.csproj",
//!     "App",
//!     "{9A19103F-16F7-4668-BE54-9A1E7A4F7556}",
//! );
//! let project = ProjectMap::create(&entry)?;
//!
//! println!("{} {}", project.name(), project.version());
//! for reference in project.project_references() {
//!     println!("  -> {reference}");
//! }
//! ```
//!
//! # Namespaces
//!
//! Legacy project files put every element in the MSBuild XML namespace. By
//! default the reader matches elements in whatever namespace the document root
//! uses; [`NamespaceHandling::Unqualified`] restricts matching to elements
//! without a namespace.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod error;
pub mod manifest;
pub mod project;
pub mod version;

pub use config::{NamespaceHandling, ReaderOptions};
pub use error::{Error, ErrorKind, Result};
pub use manifest::{ProjectManifest, RawPackageReference, reference_name};
pub use project::{PackageReference, ProjectEntry, ProjectMap, ProjectReader};
pub use version::{ResolvedVersion, Version, resolve_version};
